//! Authoritative note collection and its persistence protocol.
//!
//! # Responsibility
//! - Own the ordered in-memory note list.
//! - Persist the full list to one backend slot after every mutation.
//!
//! # Invariants
//! - A store only exists after its slot has been loaded.
//! - Persistence failures never undo or fail an in-memory mutation.
//!
//! # See also
//! - `storage` for backend implementations.

pub mod codec;
pub mod error;
pub mod note_store;
