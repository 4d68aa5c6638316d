//! Core domain logic for Notekeeper.
//! This crate owns the note collection, its persistence and its search view.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::id::{generate_note_id, NoteId};
pub use model::note::{now_timestamp, GeoPoint, Note, NoteInput, NoteValidationError, Timestamp};
pub use search::filter::filter;
pub use storage::{BackendError, BackendResult, KvBackend, MemoryBackend, SqliteKvBackend};
pub use store::error::{LoadError, PersistError, StoreError, StoreResult};
pub use store::note_store::NoteStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
