//! Note identifier generation.
//!
//! # Invariants
//! - Ids are hyphenated 8-4-4-4-12 lowercase hex strings.
//! - The leading 48 bits carry the Unix millisecond clock; the remaining bits
//!   are random, so ids minted in the same instant still differ.
//! - Uniqueness is probabilistic. Persisted ids from older data are accepted
//!   as opaque strings and never re-parsed.

use uuid::Uuid;

/// Stable identifier of a note.
///
/// Kept as a string alias so ids loaded from older blobs stay opaque.
pub type NoteId = String;

/// Generates a fresh note id (UUID version 7).
pub fn generate_note_id() -> NoteId {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::generate_note_id;
    use std::collections::HashSet;

    fn is_hex_group(part: &str, len: usize) -> bool {
        part.len() == len
            && part
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn id_has_uuid_grouping() {
        let id = generate_note_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 5);
        for (part, len) in parts.iter().zip([8, 4, 4, 4, 12]) {
            assert!(is_hex_group(part, len), "bad group `{part}` in `{id}`");
        }
    }

    #[test]
    fn ids_minted_back_to_back_are_distinct() {
        let ids: HashSet<_> = (0..1_000).map(|_| generate_note_id()).collect();
        assert_eq!(ids.len(), 1_000);
    }
}
