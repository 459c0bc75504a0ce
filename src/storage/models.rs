use chrono::{DateTime, Utc};

use crate::common::Message;

/// Row shape of the `messages` table. `created_at` is stored as UTC
/// milliseconds so ordering in SQL matches ordering in Rust.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: i64,
}

impl MessageRow {
    pub fn into_message(self) -> Option<Message> {
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at)?;
        Some(Message {
            id: self.id,
            author: self.author,
            body: self.body,
            created_at,
        })
    }
}
