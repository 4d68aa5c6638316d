//! Case-insensitive substring filter over notes.
//!
//! # Invariants
//! - A blank term returns every note in the original order.
//! - Matching is per note; results keep the relative input order.
//! - A note matches when its title OR content contains the term.

use crate::model::note::Note;

/// Returns the notes whose title or content contains `term`, ignoring case.
///
/// The term is matched as typed once it has any non-whitespace character, so
/// `"milk "` only matches text containing a trailing space after `milk`.
pub fn filter(notes: &[Note], term: &str) -> Vec<Note> {
    if term.trim().is_empty() {
        return notes.to_vec();
    }

    let needle = term.to_lowercase();
    notes
        .iter()
        .filter(|note| matches_term(note, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lowercased.
fn matches_term(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}
