//! Persistence backends for the single note slot.
//!
//! # Responsibility
//! - Define the key-value contract the note store persists through.
//! - Provide in-memory and SQLite implementations.
//!
//! # Invariants
//! - Values are written wholesale; there are no partial writes.
//! - `get` on a missing key is `Ok(None)`, never an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteKvBackend;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by a persistence backend.
#[derive(Debug)]
pub enum BackendError {
    Db(DbError),
    /// Backend refused or could not serve the request.
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-value string store used for durability.
pub trait KvBackend: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> BackendResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> BackendResult<()>;
}

impl<B: KvBackend + ?Sized> KvBackend for &B {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set(key, value)
    }
}

impl<B: KvBackend + ?Sized> KvBackend for std::sync::Arc<B> {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set(key, value)
    }
}
