use notekeeper_core::{
    filter, BackendResult, GeoPoint, KvBackend, LoadError, MemoryBackend, Note, NoteInput,
    NoteStore, NoteValidationError, PersistError, StoreConfig, StoreError,
};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn stored_notes(backend: &MemoryBackend) -> Vec<Note> {
    let blob = backend.raw("notes").expect("notes slot should be written");
    serde_json::from_str(&blob).expect("slot should hold a note list")
}

#[test]
fn missing_slot_loads_empty_store() {
    let store = NoteStore::load(MemoryBackend::new());
    assert!(store.is_empty());
    assert!(store.load_error().is_none());
}

#[test]
fn add_assigns_unique_ids_and_equal_timestamps() {
    let store = NoteStore::load(MemoryBackend::new());
    let mut ids = HashSet::new();
    for i in 0..50 {
        let note = store
            .add(NoteInput::new(format!("title {i}"), "body"))
            .unwrap();
        assert_eq!(note.created_at, note.updated_at);
        assert!(ids.insert(note.id));
    }
    assert_eq!(store.len(), 50);
}

#[test]
fn add_keeps_attachments_and_persists_full_list() {
    let backend = MemoryBackend::new();
    let store = NoteStore::load(&backend);
    let input = NoteInput::new("Trip", "photos from the summit")
        .with_image("file:///summit.jpg")
        .with_location(GeoPoint::new(46.5, 8.0));

    let note = store.add(input).unwrap();

    assert_eq!(note.image_uri.as_deref(), Some("file:///summit.jpg"));
    assert_eq!(note.location, Some(GeoPoint::new(46.5, 8.0)));
    assert_eq!(stored_notes(&backend), store.list());
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn add_with_blank_fields_is_rejected_without_persisting() {
    let backend = MemoryBackend::new();
    let store = NoteStore::load(&backend);
    store.add(NoteInput::new("kept", "body")).unwrap();
    let before = store.list();

    let err = store.add(NoteInput::new("  ", "body")).unwrap_err();
    assert_eq!(err, StoreError::Validation(NoteValidationError::EmptyTitle));
    let err = store.add(NoteInput::new("title", "\n")).unwrap_err();
    assert_eq!(err, StoreError::Validation(NoteValidationError::EmptyContent));

    assert_eq!(store.list(), before);
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn update_replaces_in_place_and_keeps_created_at() {
    let store = NoteStore::load(MemoryBackend::new());
    let first = store.add(NoteInput::new("first", "a")).unwrap();
    let second = store.add(NoteInput::new("second", "b")).unwrap();
    let third = store.add(NoteInput::new("third", "c")).unwrap();

    let mut edited = second.clone();
    edited.title = "second, edited".to_string();
    edited.audio_uri = Some("file:///memo.m4a".to_string());
    edited.created_at = "1999-01-01T00:00:00.000Z".to_string();

    let updated = store.update(edited).unwrap();
    assert_eq!(updated.created_at, second.created_at);
    assert!(updated.updated_at >= second.updated_at);
    assert!(updated.updated_at >= updated.created_at);

    let ids: Vec<_> = store.list().into_iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![first.id, second.id.clone(), third.id]);
    assert_eq!(store.get(&second.id), Some(updated));
}

#[test]
fn update_unknown_id_is_not_found_and_list_unchanged() {
    let backend = MemoryBackend::new();
    let store = NoteStore::load(&backend);
    let note = store.add(NoteInput::new("title", "body")).unwrap();
    let before = store.list();

    let mut ghost = note;
    ghost.id = "00000000-0000-0000-0000-000000000000".to_string();
    let err = store.update(ghost).unwrap_err();

    assert_eq!(
        err,
        StoreError::NotFound("00000000-0000-0000-0000-000000000000".to_string())
    );
    assert_eq!(store.list(), before);
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn update_with_blank_content_is_rejected() {
    let store = NoteStore::load(MemoryBackend::new());
    let note = store.add(NoteInput::new("title", "body")).unwrap();

    let mut blanked = note.clone();
    blanked.content = "   ".to_string();
    let err = store.update(blanked).unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get(&note.id), Some(note));
}

#[test]
fn remove_unknown_id_is_a_no_op() {
    let store = NoteStore::load(MemoryBackend::new());
    store.add(NoteInput::new("title", "body")).unwrap();
    let before = store.list();

    assert!(!store.remove("missing"));
    assert_eq!(store.list(), before);
}

#[test]
fn remove_twice_matches_remove_once() {
    let backend = MemoryBackend::new();
    let store = NoteStore::load(&backend);
    let a = store.add(NoteInput::new("a", "a")).unwrap();
    let b = store.add(NoteInput::new("b", "b")).unwrap();

    assert!(store.remove(&a.id));
    let after_once = store.list();
    assert!(!store.remove(&a.id));

    assert_eq!(store.list(), after_once);
    assert_eq!(store.list(), vec![b]);
    assert_eq!(stored_notes(&backend), after_once);
}

#[test]
fn list_returns_a_detached_snapshot() {
    let store = NoteStore::load(MemoryBackend::new());
    store.add(NoteInput::new("title", "body")).unwrap();

    let mut snapshot = store.list();
    snapshot[0].title = "changed outside".to_string();
    snapshot.clear();

    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].title, "title");
}

#[test]
fn reload_reconstructs_the_same_list() {
    let backend = MemoryBackend::new();
    let expected = {
        let store = NoteStore::load(&backend);
        store.add(NoteInput::new("one", "1")).unwrap();
        let two = store
            .add(NoteInput::new("two", "2").with_location(GeoPoint::new(1.5, -2.25)))
            .unwrap();
        store.add(NoteInput::new("three", "3")).unwrap();
        let mut edited = two;
        edited.content = "2, edited".to_string();
        store.update(edited).unwrap();
        store.list()
    };

    let reloaded = NoteStore::load(&backend);
    assert_eq!(reloaded.list(), expected);
}

#[test]
fn corrupt_slot_recovers_empty_and_next_write_repairs_it() {
    let backend = MemoryBackend::with_value("notes", "{not json");
    let store = NoteStore::load(&backend);

    assert!(store.is_empty());
    assert!(matches!(store.load_error(), Some(LoadError::Corrupt(_))));

    let note = store.add(NoteInput::new("fresh", "start")).unwrap();
    assert_eq!(stored_notes(&backend), vec![note]);
}

#[test]
fn unreadable_slot_recovers_empty() {
    let backend = MemoryBackend::with_value("notes", "[]");
    backend.set_fail_reads(true);
    let store = NoteStore::load(&backend);

    assert!(store.is_empty());
    assert!(matches!(store.load_error(), Some(LoadError::Backend(_))));
}

#[test]
fn persist_failure_keeps_mutation_and_is_reported() {
    let backend = MemoryBackend::new();
    let store = NoteStore::load(&backend);
    backend.set_fail_writes(true);

    let note = store.add(NoteInput::new("offline", "still visible")).unwrap();
    assert_eq!(store.list(), vec![note.clone()]);
    let err = store
        .last_persist_error()
        .expect("failed write should be retained");
    assert!(matches!(*err, PersistError::Backend(_)));
    assert!(backend.raw("notes").is_none());

    backend.set_fail_writes(false);
    store.remove(&note.id);
    assert!(store.last_persist_error().is_none());
    assert_eq!(stored_notes(&backend), Vec::<Note>::new());
}

#[test]
fn legacy_app_blob_loads_unchanged() {
    let blob = r#"[
        {"id":"3f1c2a9e-7b4d-4c1e-9a2b-1c3d4e5f6a7b","title":"Groceries","content":"milk, eggs",
         "createdAt":"2024-05-01T08:00:00.000Z","updatedAt":"2024-05-02T09:30:00.000Z",
         "audioUri":null,"imageUri":"file:///cache/ImagePicker/a.jpg",
         "location":{"latitude":37.7749,"longitude":-122.4194}},
        {"id":"9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d","title":"Idea","content":"write it down",
         "createdAt":"2024-05-03T10:00:00.000Z","updatedAt":"2024-05-03T10:00:00.000Z",
         "location":null}
    ]"#;
    let store = NoteStore::load(MemoryBackend::with_value("notes", blob));

    assert!(store.load_error().is_none());
    let notes = store.list();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].title, "Groceries");
    assert!(!notes[0].has_audio());
    assert_eq!(
        notes[0].location.map(|point| point.map_url()).as_deref(),
        Some("https://www.google.com/maps?q=37.7749,-122.4194")
    );
    assert!(!notes[1].has_location());
}

#[test]
fn custom_slot_key_is_used_for_reads_and_writes() {
    let backend = MemoryBackend::new();
    let config = StoreConfig::default().with_slot_key("notes_v2");
    let store = NoteStore::load_with_config(&backend, config);
    store.add(NoteInput::new("title", "body")).unwrap();

    assert!(backend.raw("notes").is_none());
    assert!(backend.raw("notes_v2").is_some());
    assert_eq!(store.config().slot_key, "notes_v2");
}

#[test]
fn concurrent_adds_all_land_in_memory_and_slot() {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(NoteStore::load(Arc::clone(&backend)));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .add(NoteInput::new(format!("w{worker} n{i}"), "body"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 80);
    assert_eq!(stored_notes(&backend), store.list());
}

#[test]
fn groceries_and_meeting_scenario() {
    let store = NoteStore::load(MemoryBackend::new());

    let groceries = store
        .add(NoteInput::new("Groceries", "milk, eggs"))
        .unwrap();
    assert_eq!(store.len(), 1);
    let meeting = store
        .add(NoteInput::new("Meeting", "Discuss Q1 milk sales"))
        .unwrap();
    assert_eq!(store.len(), 2);

    let hits = filter(&store.list(), "milk");
    assert_eq!(hits, vec![groceries.clone(), meeting.clone()]);
    assert_eq!(store.search("milk"), hits);

    store.remove(&groceries.id);
    assert_eq!(store.list(), vec![meeting]);
}

#[test]
fn update_unknown_id_reports_not_found_before_validation() {
    let store = NoteStore::load(MemoryBackend::new());
    let mut ghost = store.add(NoteInput::new("title", "body")).unwrap();
    ghost.id = "missing".to_string();
    ghost.title = "  ".to_string();

    let err = store.update(ghost).unwrap_err();
    assert_eq!(err, StoreError::NotFound("missing".to_string()));
}

#[test]
fn duplicate_ids_in_slot_are_rekeyed_and_written_back() {
    let blob = r#"[
        {"id":"d","title":"a","content":"first","createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z"},
        {"id":"d","title":"b","content":"second","createdAt":"2024-01-02T00:00:00.000Z","updatedAt":"2024-01-02T00:00:00.000Z"}
    ]"#;
    let backend = MemoryBackend::with_value("notes", blob);
    let store = NoteStore::load(&backend);

    let notes = store.list();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, "d");
    assert_ne!(notes[1].id, "d");
    assert_eq!(stored_notes(&backend), notes);

    let mut edited = notes[1].clone();
    edited.title = "edited".to_string();
    store.update(edited).unwrap();
    let titles: Vec<_> = store.list().into_iter().map(|note| note.title).collect();
    assert_eq!(titles, vec!["a", "edited"]);

    assert!(store.remove("d"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].title, "edited");
}

/// Backend whose writes park until the test releases them.
struct ParkedWriteBackend {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl KvBackend for ParkedWriteBackend {
    fn get(&self, _key: &str) -> BackendResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> BackendResult<()> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(())
    }
}

#[test]
fn readers_do_not_wait_on_an_in_flight_write() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let store = Arc::new(NoteStore::load(ParkedWriteBackend {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    }));

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.add(NoteInput::new("slow", "write")).unwrap())
    };
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("write should reach the backend");

    assert!(store.last_persist_error().is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(store.search("slow").len(), 1);

    release_tx.send(()).unwrap();
    writer.join().unwrap();
}
