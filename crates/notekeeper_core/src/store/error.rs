//! Error taxonomy for note store operations.
//!
//! `StoreError` is caller-facing and returned before any state change.
//! `LoadError` and `PersistError` are infrastructure failures: the store
//! logs and retains them but degrades instead of failing the caller.

use crate::model::id::NoteId;
use crate::model::note::NoteValidationError;
use crate::storage::BackendError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected mutation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Title or content is blank.
    Validation(NoteValidationError),
    /// Update targets an id the store does not hold.
    NotFound(NoteId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Slot could not be read or parsed at load time.
///
/// Recovered by starting from an empty list.
#[derive(Debug)]
pub enum LoadError {
    Backend(BackendError),
    /// Slot content is not a valid note list.
    Corrupt(serde_json::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "failed to read notes slot: {err}"),
            Self::Corrupt(err) => write!(f, "notes slot is corrupt: {err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Corrupt(err) => Some(err),
        }
    }
}

/// Snapshot could not be written after a successful in-memory mutation.
#[derive(Debug)]
pub enum PersistError {
    Encode(serde_json::Error),
    Backend(BackendError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Backend(err) => write!(f, "failed to write notes slot: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Backend(err) => Some(err),
        }
    }
}
