use crate::gateway::GatewayError;

use super::types::{Message, SubmitTicket};

/// Results the background client sends back up to the UI.
#[derive(Debug, Clone)]
pub enum GuestbookEvent {
    Loaded { request: u64, messages: Vec<Message> },
    SubmitAccepted { ticket: SubmitTicket, id: String },
    SubmitFailed {
        ticket: SubmitTicket,
        error: GatewayError,
    },
    Deleted { id: String },
    DeleteFailed { id: String, error: GatewayError },
}
