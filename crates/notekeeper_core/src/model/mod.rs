//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its creation input.
//! - Own identifier and timestamp generation for new records.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Stored notes always carry non-blank title and content.

pub mod id;
pub mod note;
