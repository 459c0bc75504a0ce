pub mod commands;
pub mod events;
pub mod types;
pub mod validation;

pub use commands::GuestbookCommand;
pub use events::GuestbookEvent;
pub use types::{Message, NewMessage, SubmitTicket};
pub use validation::{MAX_AUTHOR_CHARS, MAX_BODY_CHARS, ValidationError};
