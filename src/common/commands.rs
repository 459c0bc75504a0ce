use super::types::SubmitTicket;

/// Commands the UI sends down to the background client.
#[derive(Debug, Clone)]
pub enum GuestbookCommand {
    /// Fetch the recent window again (full reload). `request` is echoed
    /// back on the `Loaded` event.
    Reload { request: u64 },
    /// Create a message. The ticket comes back with the result so the UI can
    /// find the pending entry it belongs to.
    Submit {
        ticket: SubmitTicket,
        author: String,
        body: String,
    },
    /// Delete a confirmed message using the operator's admin key.
    Delete { id: String, secret: String },
}
