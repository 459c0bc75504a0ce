use std::collections::{BTreeSet, HashSet};
use std::mem;

use chrono::{DateTime, Utc};

use crate::common::validation::check_not_empty;
use crate::common::{GuestbookCommand, GuestbookEvent, Message, SubmitTicket, ValidationError};
use crate::gateway::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Shown optimistically; create() is in flight or acknowledged but not
    /// yet seen in a reload.
    Pending,
    Confirmed,
    /// create() was rejected. Stays visible until the next reload.
    Failed,
}

/// Stable identity of a row in the view, usable as a UI id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Pending(SubmitTicket),
    Confirmed(String),
}

/// A message the visitor submitted that the read path has not returned yet.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub ticket: SubmitTicket,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Store id reported by a successful create().
    pub accepted_id: Option<String>,
    /// Latest reload request issued when the acknowledgement arrived.
    pub accepted_after: u64,
    pub failure: Option<GatewayError>,
}

impl PendingEntry {
    /// Whether the entry stays visible next to `snapshot`, the result of
    /// reload `request`.
    fn survives(&self, request: u64, snapshot: &[Message]) -> bool {
        if self.failure.is_some() {
            return false;
        }
        match &self.accepted_id {
            None => true,
            Some(id) if snapshot.iter().any(|message| &message.id == id) => false,
            // Reloads run concurrently with creates, so a snapshot requested
            // before the acknowledgement can predate the commit. Only a later
            // one shows the record is really gone.
            Some(_) => request <= self.accepted_after,
        }
    }
}

/// One row of the ordered message view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    pub key: EntryKey,
    /// Present only on confirmed entries; deletion needs it.
    pub id: Option<String>,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub state: EntryState,
}

/// Feedback shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Inline, next to the form.
    Invalid(ValidationError),
    /// Blocking; asks the operator to re-enter the admin key.
    Unauthorized,
    /// Blocking; generic retry prompt. Also used for a delete that lost a
    /// race, which the operator cannot tell apart from any other failure.
    DeletionFailed,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Invalid(err) => err.to_string(),
            Notice::Unauthorized => "Unauthorized. Check your admin key.".to_string(),
            Notice::DeletionFailed => "Failed to delete message. Please try again.".to_string(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        !matches!(self, Notice::Invalid(_))
    }
}

/// Client state of the guestbook: confirmed messages from the last reload
/// merged with the visitor's pending ones.
///
/// All transitions happen on the UI thread. Methods that need the network
/// return the command to send instead of sending it.
pub struct GuestbookState {
    confirmed: Vec<Message>,
    /// Newest first.
    pending: Vec<PendingEntry>,
    pub author_input: String,
    pub body_input: String,
    /// Held only in memory; never persisted.
    pub admin_key: String,
    pub show_admin: bool,
    pub notice: Option<Notice>,
    deleting: BTreeSet<String>,
    confirming_delete: Option<String>,
    reloads_requested: u64,
    loaded: bool,
}

impl GuestbookState {
    pub fn new() -> Self {
        Self {
            confirmed: Vec::new(),
            pending: Vec::new(),
            author_input: String::new(),
            body_input: String::new(),
            admin_key: String::new(),
            show_admin: false,
            notice: None,
            deleting: BTreeSet::new(),
            confirming_delete: None,
            reloads_requested: 0,
            loaded: false,
        }
    }

    /// Numbers a new reload. Send the returned command to the client.
    pub fn request_reload(&mut self) -> GuestbookCommand {
        self.reloads_requested += 1;
        GuestbookCommand::Reload {
            request: self.reloads_requested,
        }
    }

    /// Replaces the confirmed list with the snapshot returned for reload
    /// `request`.
    ///
    /// Failed entries are dropped. An acknowledged entry is dropped once its
    /// id is in the snapshot, or when a reload requested after the
    /// acknowledgement no longer has it. Entries still in flight stay.
    pub fn reload(&mut self, request: u64, messages: Vec<Message>) {
        self.confirmed = normalize(messages);
        let before = self.pending.len();
        let confirmed = &self.confirmed;
        self.pending
            .retain(|entry| entry.survives(request, confirmed));
        self.deleting
            .retain(|id| self.confirmed.iter().any(|message| &message.id == id));
        self.loaded = true;

        log::debug!(
            "Reloaded {} confirmed messages, cleared {} pending",
            self.confirmed.len(),
            before - self.pending.len()
        );
    }

    /// Queues a message optimistically. Fails locally, without any network
    /// call, when either field is empty.
    pub fn submit(&mut self, author: &str, body: &str) -> Result<GuestbookCommand, ValidationError> {
        check_not_empty(author, body)?;

        let ticket = SubmitTicket::new();
        let author = author.trim().to_string();
        let body = body.trim().to_string();

        self.pending.insert(
            0,
            PendingEntry {
                ticket,
                author: author.clone(),
                body: body.clone(),
                created_at: Utc::now(),
                accepted_id: None,
                accepted_after: 0,
                failure: None,
            },
        );

        Ok(GuestbookCommand::Submit {
            ticket,
            author,
            body,
        })
    }

    /// Submits the form fields. On success both fields are cleared before the
    /// command is handed back; on failure they are left as typed.
    pub fn submit_form(&mut self) -> Result<GuestbookCommand, ValidationError> {
        if let Err(err) = check_not_empty(&self.author_input, &self.body_input) {
            self.notice = Some(Notice::Invalid(err.clone()));
            return Err(err);
        }

        let author = mem::take(&mut self.author_input);
        let body = mem::take(&mut self.body_input);
        if matches!(self.notice, Some(Notice::Invalid(_))) {
            self.notice = None;
        }
        self.submit(&author, &body)
    }

    /// Applies a result from the background client. Returns a follow-up
    /// command when one is needed.
    pub fn apply(&mut self, event: GuestbookEvent) -> Option<GuestbookCommand> {
        match event {
            GuestbookEvent::Loaded { request, messages } => self.reload(request, messages),
            GuestbookEvent::SubmitAccepted { ticket, id } => self.accept(ticket, id),
            GuestbookEvent::SubmitFailed { ticket, error } => self.fail(ticket, error),
            GuestbookEvent::Deleted { id } => {
                self.deleting.remove(&id);
                return Some(self.request_reload());
            }
            GuestbookEvent::DeleteFailed { id, error } => {
                self.deleting.remove(&id);
                self.notice = Some(match error {
                    GatewayError::Unauthorized => Notice::Unauthorized,
                    _ => Notice::DeletionFailed,
                });
            }
        }
        None
    }

    fn accept(&mut self, ticket: SubmitTicket, id: String) {
        let Some(index) = self.pending.iter().position(|entry| entry.ticket == ticket) else {
            log::debug!("Acknowledgement for unknown entry {ticket}");
            return;
        };

        // A reload raced ahead of the acknowledgement and already carries the
        // record, so the optimistic copy would be a duplicate.
        if self.confirmed.iter().any(|message| message.id == id) {
            self.pending.remove(index);
            return;
        }

        let entry = &mut self.pending[index];
        entry.accepted_id = Some(id);
        entry.accepted_after = self.reloads_requested;
    }

    fn fail(&mut self, ticket: SubmitTicket, error: GatewayError) {
        match self.pending.iter_mut().find(|entry| entry.ticket == ticket) {
            Some(entry) => {
                log::warn!("Message from {} was not saved: {error}", entry.author);
                if let GatewayError::Validation(reason) = &error {
                    self.notice = Some(Notice::Invalid(reason.clone()));
                }
                entry.failure = Some(error);
            }
            None => log::debug!("Failure for unknown entry {ticket}: {error}"),
        }
    }

    /// Asks for a delete of a confirmed message. Refused (returns `None`) when
    /// no key is entered, the id is not a confirmed entry, or a delete of it
    /// is already in flight. The entry stays visible until a reload.
    pub fn delete(&mut self, id: &str, secret: &str) -> Option<GuestbookCommand> {
        if secret.is_empty() {
            return None;
        }
        if !self.confirmed.iter().any(|message| message.id == id) {
            log::debug!("Refusing delete of {id}: not a confirmed message");
            return None;
        }
        if !self.deleting.insert(id.to_string()) {
            return None;
        }

        Some(GuestbookCommand::Delete {
            id: id.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn request_delete(&mut self, id: &str) {
        self.confirming_delete = Some(id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = None;
    }

    /// Sends the delete the operator just confirmed, using the entered key.
    pub fn confirm_delete(&mut self) -> Option<GuestbookCommand> {
        let id = self.confirming_delete.take()?;
        let secret = self.admin_key.clone();
        self.delete(&id, &secret)
    }

    pub fn confirming_delete(&self) -> Option<&str> {
        self.confirming_delete.as_deref()
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    pub fn can_moderate(&self) -> bool {
        !self.admin_key.is_empty()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn pending(&self) -> &[PendingEntry] {
        &self.pending
    }

    /// Pending entries first (newest first), then confirmed entries by
    /// `created_at` descending with ties broken by id descending.
    pub fn view(&self) -> Vec<ViewEntry> {
        let pending = self.pending.iter().map(|entry| ViewEntry {
            key: EntryKey::Pending(entry.ticket),
            id: None,
            author: entry.author.clone(),
            body: entry.body.clone(),
            created_at: entry.created_at,
            state: if entry.failure.is_some() {
                EntryState::Failed
            } else {
                EntryState::Pending
            },
        });

        let confirmed = self.confirmed.iter().map(|message| ViewEntry {
            key: EntryKey::Confirmed(message.id.clone()),
            id: Some(message.id.clone()),
            author: message.author.clone(),
            body: message.body.clone(),
            created_at: message.created_at,
            state: EntryState::Confirmed,
        });

        pending.chain(confirmed).collect()
    }

    pub fn message_count(&self) -> usize {
        self.pending.len() + self.confirmed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }
}

impl Default for GuestbookState {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorts newest first (ties by id descending) and keeps one entry per id.
fn normalize(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut seen = HashSet::new();
    messages.retain(|message| seen.insert(message.id.clone()));
    messages
}
