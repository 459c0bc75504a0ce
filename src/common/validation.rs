use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_AUTHOR_CHARS: usize = 50;
pub const MAX_BODY_CHARS: usize = 140;

/// Client-correctable input problems. Raised before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Name is required")]
    MissingAuthor,

    #[error("Message is required")]
    MissingBody,

    #[error("Name must be 50 characters or less (got {chars})")]
    AuthorTooLong { chars: usize },

    #[error("Message must be 140 characters or less (got {chars})")]
    BodyTooLong { chars: usize },
}

/// Trims both fields and checks them against the length limits. Lengths are
/// counted in chars, not bytes.
pub fn validate_submission(author: &str, body: &str) -> Result<(String, String), ValidationError> {
    let author = author.trim();
    let body = body.trim();

    if author.is_empty() {
        return Err(ValidationError::MissingAuthor);
    }
    if body.is_empty() {
        return Err(ValidationError::MissingBody);
    }

    let chars = author.chars().count();
    if chars > MAX_AUTHOR_CHARS {
        return Err(ValidationError::AuthorTooLong { chars });
    }

    let chars = body.chars().count();
    if chars > MAX_BODY_CHARS {
        return Err(ValidationError::BodyTooLong { chars });
    }

    Ok((author.to_string(), body.to_string()))
}

/// The cheap check the UI runs before anything leaves the process.
pub fn check_not_empty(author: &str, body: &str) -> Result<(), ValidationError> {
    if author.trim().is_empty() {
        return Err(ValidationError::MissingAuthor);
    }
    if body.trim().is_empty() {
        return Err(ValidationError::MissingBody);
    }
    Ok(())
}
