use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed guestbook message as returned by the read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A validated record waiting to be handed to the store. `created_at` is set
/// by the gateway when the submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Client-generated correlation token tying an asynchronous create() result
/// back to the pending entry that issued it. Never sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket(Uuid);

impl SubmitTicket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmitTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmitTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
