//! Blob encoding for the note slot.
//!
//! The slot holds a JSON array of notes in list order. The shape matches what
//! the mobile app wrote, so existing blobs load unchanged.

use crate::model::note::Note;

/// Serializes the full list.
pub fn encode_notes(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string(notes)
}

/// Parses a full list previously produced by [`encode_notes`].
pub fn decode_notes(blob: &str) -> serde_json::Result<Vec<Note>> {
    serde_json::from_str(blob)
}
