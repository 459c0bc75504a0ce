pub mod database;
pub mod message_db;
pub mod models;

pub use message_db::SqliteMessageStore;

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::common::{Message, NewMessage};

/// Failures raised by a [`MessageStore`]. These never leave the gateway; it
/// logs the cause and translates them into the public error taxonomy.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message {0} not found")]
    NotFound(String),

    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Durable, append-only message collection.
///
/// Implementations serialize concurrent creates (every create gets a distinct
/// id) and report a delete of a missing id as [`StoreError::NotFound`].
pub trait MessageStore: Send + Sync {
    /// Persists the record and returns the id the store assigned to it.
    fn create(&self, record: &NewMessage) -> Result<String, StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Point-in-time snapshot of at most `limit` messages, newest first, ties
    /// broken by id descending.
    fn list(&self, limit: usize) -> Result<Vec<Message>, StoreError>;
}

/// Ensure the directory holding `path` exists
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
