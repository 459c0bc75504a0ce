use rusqlite::{Connection, Result as SqlResult};
use std::path::Path;
use std::time::Duration;

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An open SQLite connection with the store's schema applied.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the file at `path` in WAL mode and applies `schema`.
    pub fn open<P: AsRef<Path>>(path: P, schema: &str) -> SqlResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // journal_mode answers with the mode actually in effect.
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        log::info!("Opened message database {} ({mode} journal)", path.display());

        Self::with_schema(conn, schema)
    }

    pub fn in_memory(schema: &str) -> SqlResult<Self> {
        Self::with_schema(Connection::open_in_memory()?, schema)
    }

    fn with_schema(conn: Connection, schema: &str) -> SqlResult<Self> {
        conn.execute_batch(schema)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn journal_mode(&self) -> SqlResult<String> {
        self.conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
    }
}
