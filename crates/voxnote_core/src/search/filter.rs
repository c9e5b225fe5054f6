//! Case-insensitive substring filter.
//!
//! # Invariants
//! - Relative order of the input collection is preserved.
//! - An empty query matches every note.

use crate::model::note::Note;

/// Returns the notes whose content contains `query`, ignoring case.
///
/// The query is matched verbatim apart from case folding: it is not trimmed,
/// so `" "` only matches notes that contain a space.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    if query.is_empty() {
        return notes.iter().collect();
    }

    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| note.content.to_lowercase().contains(needle.as_str()))
        .collect()
}
