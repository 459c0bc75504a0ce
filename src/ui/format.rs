//! Pure presentation helpers: day grouping and label formatting. Nothing here
//! keeps state; groups are recomputed from the view on every frame.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use super::state::ViewEntry;

pub struct DayGroup<'a> {
    pub label: String,
    pub entries: Vec<&'a ViewEntry>,
}

/// "Today" for the current calendar day in `now`'s zone, otherwise a short
/// month/day such as "Mar 5".
pub fn day_label<Tz>(at: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = at.with_timezone(&now.timezone());
    if local.date_naive() == now.date_naive() {
        "Today".to_string()
    } else {
        local.format("%b %-d").to_string()
    }
}

pub fn time_label<Tz>(at: &DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(zone).format("%H:%M").to_string()
}

/// Splits the ordered view into runs of consecutive entries sharing a day
/// label. Order is preserved, so a label can appear twice when pending
/// entries sit ahead of older confirmed ones.
pub fn group_by_day<'a, Tz>(entries: &'a [ViewEntry], now: &DateTime<Tz>) -> Vec<DayGroup<'a>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut groups: Vec<DayGroup<'a>> = Vec::new();

    for entry in entries {
        let label = day_label(&entry.created_at, now);
        match groups.last_mut() {
            Some(group) if group.label == label => group.entries.push(entry),
            _ => groups.push(DayGroup {
                label,
                entries: vec![entry],
            }),
        }
    }

    groups
}

pub fn avatar_initial(author: &str) -> String {
    author
        .chars()
        .next()
        .map(|first| first.to_uppercase().collect())
        .unwrap_or_default()
}

pub fn count_label(count: usize) -> String {
    format!("{count} messages")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset};

    use super::*;
    use crate::ui::state::{EntryKey, EntryState};

    fn entry(id: &str, created_at: DateTime<Utc>) -> ViewEntry {
        ViewEntry {
            key: EntryKey::Confirmed(id.to_string()),
            id: Some(id.to_string()),
            author: "Ana".to_string(),
            body: "Hi!".to_string(),
            created_at,
            state: EntryState::Confirmed,
        }
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn today_versus_short_date() {
        let now = at("2025-03-05T12:00:00Z");
        assert_eq!(day_label(&at("2025-03-05T00:10:00Z"), &now), "Today");
        assert_eq!(day_label(&at("2025-03-04T23:59:00Z"), &now), "Mar 4");
    }

    #[test]
    fn day_boundary_follows_viewer_zone() {
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = at("2025-03-05T02:00:00Z").with_timezone(&jakarta);
        // 18:00 UTC on the 4th is already the 5th in UTC+7.
        assert_eq!(day_label(&at("2025-03-04T18:00:00Z"), &now), "Today");
        assert_eq!(time_label(&at("2025-03-04T18:00:00Z"), &jakarta), "01:00");
    }

    #[test]
    fn groups_consecutive_days() {
        let now = at("2025-03-05T12:00:00Z");
        let entries = vec![
            entry("c", now - Duration::hours(1)),
            entry("b", now - Duration::hours(2)),
            entry("a", now - Duration::days(2)),
        ];

        let groups = group_by_day(&entries, &now);
        let summary: Vec<_> = groups
            .iter()
            .map(|group| (group.label.as_str(), group.entries.len()))
            .collect();
        assert_eq!(summary, [("Today", 2), ("Mar 3", 1)]);
    }

    #[test]
    fn initials_and_counts() {
        assert_eq!(avatar_initial("ana"), "A");
        assert_eq!(avatar_initial("élodie"), "É");
        assert_eq!(avatar_initial(""), "");
        assert_eq!(count_label(0), "0 messages");
    }
}
