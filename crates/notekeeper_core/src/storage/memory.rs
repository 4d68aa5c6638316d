//! In-process key-value backend.
//!
//! Used for tests and ephemeral sessions. Read/write failures can be injected
//! to exercise the store's degraded paths.

use crate::storage::{BackendError, BackendResult, KvBackend};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Map-backed [`KvBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with `value` already stored under `key`.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let backend = Self::default();
        backend
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        backend
    }

    /// Makes subsequent `get` calls fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `set` calls fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!("read of `{key}` refused")));
        }
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!("write of `{key}` refused")));
        }
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
