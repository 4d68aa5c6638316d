//! Note store: in-memory source of truth with mutate-then-persist writes.
//!
//! # Responsibility
//! - Load the note slot once, at construction.
//! - Apply add/update/remove to the in-memory list and persist the full list.
//!
//! # Invariants
//! - List order is insertion order; updates keep position.
//! - The state lock covers the mutation and snapshot encoding only; backend
//!   I/O runs after it is released, so readers never wait on a write.
//! - Snapshots carry a revision; the write gate drops any snapshot older than
//!   the last one attempted, so a slow writer cannot resurrect stale data.
//! - Persist failures are logged and retained, never propagated.
//! - Ids are unique at all times; duplicates in a loaded slot are re-keyed
//!   and the repaired list is written back.

use crate::config::StoreConfig;
use crate::model::id::generate_note_id;
use crate::model::note::{now_timestamp, Note, NoteInput};
use crate::search::filter::filter;
use crate::storage::KvBackend;
use crate::store::codec::{decode_notes, encode_notes};
use crate::store::error::{LoadError, PersistError, StoreError, StoreResult};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct StoreState {
    notes: Vec<Note>,
    revision: u64,
}

#[derive(Default)]
struct WriteGate {
    attempted_revision: u64,
}

/// Encoded list captured under the state lock.
struct Snapshot {
    revision: u64,
    count: usize,
    blob: serde_json::Result<String>,
}

/// Owner of the note collection.
///
/// The only constructors load the slot first, so no mutation can race the
/// initial read.
pub struct NoteStore<B: KvBackend> {
    backend: B,
    config: StoreConfig,
    state: Mutex<StoreState>,
    write_gate: Mutex<WriteGate>,
    // Separate from the gate so readers never wait on backend I/O.
    last_persist_error: Mutex<Option<Arc<PersistError>>>,
    load_error: Option<LoadError>,
}

impl<B: KvBackend> NoteStore<B> {
    /// Loads the default `"notes"` slot from `backend`.
    pub fn load(backend: B) -> Self {
        Self::load_with_config(backend, StoreConfig::default())
    }

    /// Loads the configured slot from `backend`.
    ///
    /// A missing slot yields an empty store. An unreadable or corrupt slot
    /// also yields an empty store, with the cause kept in [`Self::load_error`].
    pub fn load_with_config(backend: B, config: StoreConfig) -> Self {
        let (notes, rekeyed, load_error) = match read_slot(&backend, &config.slot_key) {
            Ok(mut notes) => {
                let rekeyed = rekey_duplicate_ids(&mut notes);
                info!(
                    "event=store_load module=store status=ok slot={} count={} rekeyed={rekeyed}",
                    config.slot_key,
                    notes.len()
                );
                (notes, rekeyed, None)
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=recovered slot={} error={err}",
                    config.slot_key
                );
                (Vec::new(), 0, Some(err))
            }
        };

        let store = Self {
            backend,
            config,
            state: Mutex::new(StoreState { notes, revision: 0 }),
            write_gate: Mutex::new(WriteGate::default()),
            last_persist_error: Mutex::new(None),
            load_error,
        };
        if rekeyed > 0 {
            let snapshot = capture(&mut lock(&store.state));
            store.persist(snapshot);
        }
        store
    }

    /// Error recovered from during load, if any.
    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    /// Most recent persist failure since the last successful write.
    pub fn last_persist_error(&self) -> Option<Arc<PersistError>> {
        lock(&self.last_persist_error).clone()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a note from `input`, appends it and persists the list.
    ///
    /// # Errors
    /// - `StoreError::Validation` when title or content is blank; the list is
    ///   unchanged and nothing is persisted.
    pub fn add(&self, input: NoteInput) -> StoreResult<Note> {
        input.validate()?;
        let note = Note::from_input(generate_note_id(), input, now_timestamp());

        let snapshot = {
            let mut state = lock(&self.state);
            state.notes.push(note.clone());
            capture(&mut state)
        };
        debug!(
            "event=note_add module=store status=ok note_id={} revision={}",
            note.id, snapshot.revision
        );

        self.persist(snapshot);
        Ok(note)
    }

    /// Replaces the stored note with the same id, keeping its position.
    ///
    /// `created_at` is taken from the stored note and `updated_at` is set to
    /// now (never earlier than the previous value). Timestamps on `note` are
    /// ignored.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no stored note has `note.id`. Checked
    ///   first, so an unknown id is reported even when the fields are blank.
    /// - `StoreError::Validation` for blank title/content.
    pub fn update(&self, note: Note) -> StoreResult<Note> {
        let now = now_timestamp();

        let (updated, snapshot) = {
            let mut state = lock(&self.state);
            let Some(slot) = state.notes.iter_mut().find(|current| current.id == note.id) else {
                debug!(
                    "event=note_update module=store status=error error_code=not_found note_id={}",
                    note.id
                );
                return Err(StoreError::NotFound(note.id));
            };
            note.validate()?;

            let floor = std::cmp::max(&slot.updated_at, &slot.created_at);
            let updated_at = std::cmp::max(&now, floor).clone();
            let updated = Note {
                created_at: slot.created_at.clone(),
                updated_at,
                ..note
            };
            *slot = updated.clone();
            (updated, capture(&mut state))
        };
        debug!(
            "event=note_update module=store status=ok note_id={} revision={}",
            updated.id, snapshot.revision
        );

        self.persist(snapshot);
        Ok(updated)
    }

    /// Removes the note with `id` and persists the list.
    ///
    /// Unknown ids are a no-op, not an error. Returns whether a note was
    /// removed.
    pub fn remove(&self, id: &str) -> bool {
        let (removed, snapshot) = {
            let mut state = lock(&self.state);
            let before = state.notes.len();
            state.notes.retain(|note| note.id != id);
            let removed = state.notes.len() != before;
            (removed, capture(&mut state))
        };
        debug!(
            "event=note_remove module=store status=ok note_id={id} removed={removed} revision={}",
            snapshot.revision
        );

        self.persist(snapshot);
        removed
    }

    /// Snapshot of all notes in list order.
    pub fn list(&self) -> Vec<Note> {
        lock(&self.state).notes.clone()
    }

    /// Looks up one note by id.
    pub fn get(&self, id: &str) -> Option<Note> {
        lock(&self.state)
            .notes
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    /// Filters the current list; see [`filter`].
    pub fn search(&self, term: &str) -> Vec<Note> {
        filter(&lock(&self.state).notes, term)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).notes.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).notes.is_empty()
    }

    /// Writes `snapshot` unless a newer one was already attempted.
    ///
    /// The gate serializes backend writes; the state lock is not held here.
    fn persist(&self, snapshot: Snapshot) {
        let mut gate = lock(&self.write_gate);
        if snapshot.revision <= gate.attempted_revision {
            debug!(
                "event=store_persist module=store status=skipped revision={} attempted_revision={}",
                snapshot.revision, gate.attempted_revision
            );
            return;
        }
        gate.attempted_revision = snapshot.revision;

        let result = snapshot
            .blob
            .map_err(PersistError::Encode)
            .and_then(|blob| {
                self.backend
                    .set(&self.config.slot_key, &blob)
                    .map_err(PersistError::Backend)
            });

        match result {
            Ok(()) => {
                info!(
                    "event=store_persist module=store status=ok slot={} revision={} count={}",
                    self.config.slot_key, snapshot.revision, snapshot.count
                );
                *lock(&self.last_persist_error) = None;
            }
            Err(err) => {
                error!(
                    "event=store_persist module=store status=error slot={} revision={} error={err}",
                    self.config.slot_key, snapshot.revision
                );
                *lock(&self.last_persist_error) = Some(Arc::new(err));
            }
        }
    }
}

fn read_slot<B: KvBackend>(backend: &B, slot_key: &str) -> Result<Vec<Note>, LoadError> {
    let Some(blob) = backend.get(slot_key).map_err(LoadError::Backend)? else {
        return Ok(Vec::new());
    };
    decode_notes(&blob).map_err(LoadError::Corrupt)
}

/// Gives every later copy of an already-seen id a fresh id.
///
/// The first occurrence keeps its id. Returns the number of re-keyed notes.
fn rekey_duplicate_ids(notes: &mut [Note]) -> usize {
    let mut seen: HashSet<String> = notes.iter().map(|note| note.id.clone()).collect();
    if seen.len() == notes.len() {
        return 0;
    }

    let mut first_seen = HashSet::with_capacity(notes.len());
    let mut rekeyed = 0;
    for note in notes.iter_mut() {
        if first_seen.insert(note.id.clone()) {
            continue;
        }
        let mut fresh = generate_note_id();
        while !seen.insert(fresh.clone()) {
            fresh = generate_note_id();
        }
        warn!(
            "event=store_load module=store status=repaired error_code=duplicate_id note_id={} new_id={fresh}",
            note.id
        );
        note.id = fresh;
        rekeyed += 1;
    }
    rekeyed
}

fn capture(state: &mut StoreState) -> Snapshot {
    state.revision += 1;
    Snapshot {
        revision: state.revision,
        count: state.notes.len(),
        blob: encode_notes(&state.notes),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::model::note::NoteInput;
    use crate::storage::MemoryBackend;

    #[test]
    fn update_never_moves_updated_at_backwards() {
        let store = NoteStore::load(MemoryBackend::new());
        let created = store.add(NoteInput::new("t", "c")).unwrap();

        let mut future = created.clone();
        future.content = "edited".to_string();
        {
            let mut state = super::lock(&store.state);
            state.notes[0].updated_at = "2999-01-01T00:00:00.000Z".to_string();
        }

        let updated = store.update(future).unwrap();
        assert_eq!(updated.updated_at, "2999-01-01T00:00:00.000Z");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn stale_snapshot_is_not_written() {
        let backend = MemoryBackend::new();
        let store = NoteStore::load(&backend);
        store.add(NoteInput::new("one", "body")).unwrap();

        let stale = {
            let mut state = super::lock(&store.state);
            let mut snapshot = super::capture(&mut state);
            snapshot.revision = 0;
            snapshot.blob = Ok("[]".to_string());
            snapshot
        };
        store.persist(stale);

        assert_eq!(backend.write_count(), 1);
        assert_ne!(backend.raw("notes").as_deref(), Some("[]"));
    }
}
