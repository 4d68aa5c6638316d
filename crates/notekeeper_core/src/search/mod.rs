//! Search over the in-memory note list.
//!
//! # Responsibility
//! - Derive the filtered, display-ordered view consumed by list screens.
//! - Stay pure: no store access, no I/O.

pub mod filter;
