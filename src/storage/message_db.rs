use rusqlite::{Result as SqlResult, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::database::Database;
use super::models::MessageRow;
use super::{MessageStore, StoreError};
use crate::common::{MAX_AUTHOR_CHARS, MAX_BODY_CHARS, Message, NewMessage};

/// SQLite-backed message store. The single connection sits behind a mutex,
/// which is what serializes concurrent writers.
pub struct SqliteMessageStore {
    db: Mutex<Database>,
}

impl SqliteMessageStore {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        Ok(Self::from_database(Database::open(path, &schema())?))
    }

    /// Throwaway store for tests and `--local` runs without a data dir
    pub fn in_memory() -> SqlResult<Self> {
        Ok(Self::from_database(Database::in_memory(&schema())?))
    }

    fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StoreError> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    /// Get message count
    pub fn count(&self) -> Result<usize, StoreError> {
        let db = self.lock()?;
        let count: i64 =
            db.connection()
                .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn schema() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            author TEXT NOT NULL CHECK (length(author) BETWEEN 1 AND {MAX_AUTHOR_CHARS}),
            body TEXT NOT NULL CHECK (length(body) BETWEEN 1 AND {MAX_BODY_CHARS}),
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_messages_recent ON messages(created_at DESC, id DESC);"
    )
}

impl MessageStore for SqliteMessageStore {
    fn create(&self, record: &NewMessage) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let db = self.lock()?;
        db.connection().execute(
            "INSERT INTO messages (id, author, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                record.author,
                record.body,
                record.created_at.timestamp_millis()
            ],
        )?;
        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let db = self.lock()?;
        let removed = db
            .connection()
            .execute("DELETE FROM messages WHERE id = ?1", params![id])?;

        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<Message>, StoreError> {
        let db = self.lock()?;
        let mut stmt = db.connection().prepare(
            "SELECT id, author, body, created_at
             FROM messages
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(MessageRow {
                    id: row.get(0)?,
                    author: row.get(1)?,
                    body: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|row| {
                let id = row.id.clone();
                row.into_message().ok_or_else(|| {
                    StoreError::Unavailable(format!("message {id} has an invalid timestamp"))
                })
            })
            .collect()
    }
}
