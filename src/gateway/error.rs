use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::ValidationError;

/// Everything a create or delete can fail with, as seen by callers. Store
/// causes are logged at the gateway and never carried in here.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to submit message. Please try again.")]
    Submission,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Message not found")]
    NotFound,

    #[error("Failed to delete message. Please try again.")]
    Deletion,
}
