//! SQLite-backed key-value backend.
//!
//! # Invariants
//! - Connections are opened through `db::open_db*`, so the `kv_store` table
//!   exists before the first read.
//! - `set` is a single upsert statement; a failed write leaves the previous
//!   value intact.

use crate::db::{open_db, open_db_in_memory};
use crate::storage::{BackendResult, KvBackend};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// [`KvBackend`] over one SQLite connection.
#[derive(Debug)]
pub struct SqliteKvBackend {
    conn: Mutex<Connection>,
}

impl SqliteKvBackend {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> BackendResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection already migrated by `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> BackendResult<T>) -> BackendResult<T> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&conn)
    }
}

impl KvBackend for SqliteKvBackend {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1;",
                    [key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now') * 1000)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
            Ok(())
        })
    }
}
