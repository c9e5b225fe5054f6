//! Snapshot repository over one key-value slot.
//!
//! # Invariants
//! - The slot value is a JSON array of `{id, date, content}` objects in
//!   newest-first order.
//! - Loaded collections never contain duplicate ids.

use crate::model::note::Note;
use crate::storage::{KeyValueStore, StorageError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default slot key for the note snapshot.
pub const NOTES_STORAGE_KEY: &str = "notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Snapshot persistence error.
#[derive(Debug)]
pub enum RepoError {
    /// Backend read/write failure.
    Storage(StorageError),
    /// Collection could not be encoded to JSON.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode note snapshot: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// How the stored snapshot was interpreted at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No snapshot has been written yet.
    Missing,
    /// Snapshot parsed as-is.
    Loaded,
    /// Snapshot is not a JSON array and was treated as empty.
    Malformed,
    /// Snapshot parsed, but some entries were discarded: `invalid` entries
    /// that do not decode as notes and `duplicates` repeating an earlier id.
    Repaired { invalid: usize, duplicates: usize },
}

/// Result of reading the snapshot slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLoad {
    pub notes: Vec<Note>,
    pub status: LoadStatus,
}

/// Reads and writes the note snapshot through a key-value backend.
pub struct NoteSnapshotRepository<S: KeyValueStore> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> NoteSnapshotRepository<S> {
    /// Creates a repository bound to the default `notes` slot.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, NOTES_STORAGE_KEY)
    }

    /// Creates a repository bound to a custom slot key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Reads the snapshot.
    ///
    /// # Errors
    /// - Returns `RepoError::Storage` when the backend read itself fails.
    ///   Unparsable content is not an error; see [`LoadStatus::Malformed`]
    ///   and [`LoadStatus::Repaired`].
    pub fn load(&self) -> RepoResult<SnapshotLoad> {
        let Some(raw) = self.storage.get(&self.key)? else {
            info!(
                "event=notes_load module=repo status=ok snapshot=missing key={}",
                self.key
            );
            return Ok(SnapshotLoad {
                notes: Vec::new(),
                status: LoadStatus::Missing,
            });
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded snapshot=malformed key={} bytes={} error={}",
                    self.key,
                    raw.len(),
                    err
                );
                return Ok(SnapshotLoad {
                    notes: Vec::new(),
                    status: LoadStatus::Malformed,
                });
            }
        };

        let total = entries.len();
        let parsed = decode_entries(&self.key, entries);
        let invalid = total - parsed.len();
        let notes = dedupe_by_id(parsed);
        let duplicates = total - invalid - notes.len();
        let status = if invalid > 0 || duplicates > 0 {
            warn!(
                "event=notes_load module=repo status=repaired key={} dropped_invalid={} dropped_duplicates={}",
                self.key, invalid, duplicates
            );
            LoadStatus::Repaired {
                invalid,
                duplicates,
            }
        } else {
            LoadStatus::Loaded
        };

        info!(
            "event=notes_load module=repo status=ok snapshot=present key={} count={}",
            self.key,
            notes.len()
        );
        Ok(SnapshotLoad { notes, status })
    }

    /// Overwrites the slot with the full collection.
    pub fn save(&mut self, notes: &[Note]) -> RepoResult<()> {
        let encoded = serde_json::to_string(notes).map_err(RepoError::Encode)?;
        self.storage.set(&self.key, &encoded)?;
        Ok(())
    }
}

/// Decodes entries one by one so a single bad entry does not cost the rest
/// of the collection.
fn decode_entries(key: &str, entries: Vec<serde_json::Value>) -> Vec<Note> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Note>(entry) {
            Ok(note) => Some(note),
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=skipped key={} entry_index={} error={}",
                    key, index, err
                );
                None
            }
        })
        .collect()
}

/// Keeps the first occurrence of each id; the snapshot is newest-first, so
/// the newest copy wins.
fn dedupe_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::with_capacity(notes.len());
    notes
        .into_iter()
        .filter(|note| seen.insert(note.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LoadStatus, NoteSnapshotRepository};
    use crate::model::note::Note;
    use crate::storage::memory::InMemoryKeyValueStore;
    use crate::storage::KeyValueStore;
    use chrono::Utc;

    #[test]
    fn missing_slot_loads_empty() {
        let repo = NoteSnapshotRepository::new(InMemoryKeyValueStore::new());
        let loaded = repo.load().unwrap();
        assert!(loaded.notes.is_empty());
        assert_eq!(loaded.status, LoadStatus::Missing);
    }

    #[test]
    fn malformed_slot_loads_empty() {
        let mut storage = InMemoryKeyValueStore::new();
        storage.set("notes", "{not json").unwrap();
        let repo = NoteSnapshotRepository::new(storage);

        let loaded = repo.load().unwrap();
        assert!(loaded.notes.is_empty());
        assert_eq!(loaded.status, LoadStatus::Malformed);
    }

    #[test]
    fn non_array_snapshot_is_treated_as_malformed() {
        let mut storage = InMemoryKeyValueStore::new();
        storage
            .set("notes", r#"{"id":"a","content":"not a list"}"#)
            .unwrap();
        let repo = NoteSnapshotRepository::new(storage);
        assert_eq!(repo.load().unwrap().status, LoadStatus::Malformed);
    }

    #[test]
    fn undecodable_entries_are_dropped_individually() {
        let mut storage = InMemoryKeyValueStore::new();
        storage
            .set(
                "notes",
                r#"[{"id":"a","date":"2024-02-01T12:30:00.000Z","content":"keep"},
                    {"id":"b","content":"no date"},
                    {"id":"c","date":"soon","content":"bad date"}]"#,
            )
            .unwrap();
        let repo = NoteSnapshotRepository::new(storage);

        let loaded = repo.load().unwrap();
        assert_eq!(
            loaded.status,
            LoadStatus::Repaired {
                invalid: 2,
                duplicates: 0
            }
        );
        assert_eq!(loaded.notes.len(), 1);
        assert_eq!(loaded.notes[0].id, "a");
    }

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let now = Utc::now();
        let notes = vec![
            Note::new("a", now, "newest"),
            Note::new("b", now, "other"),
            Note::new("a", now, "older copy"),
        ];
        let mut storage = InMemoryKeyValueStore::new();
        storage
            .set("notes", &serde_json::to_string(&notes).unwrap())
            .unwrap();
        let repo = NoteSnapshotRepository::new(storage);

        let loaded = repo.load().unwrap();
        assert_eq!(
            loaded.status,
            LoadStatus::Repaired {
                invalid: 0,
                duplicates: 1
            }
        );
        assert_eq!(loaded.notes.len(), 2);
        assert_eq!(loaded.notes[0].content, "newest");
    }

    #[test]
    fn custom_key_is_used_for_reads_and_writes() {
        let mut repo = NoteSnapshotRepository::with_key(InMemoryKeyValueStore::new(), "memo");
        repo.save(&[Note::new("a", Utc::now(), "x")]).unwrap();
        assert!(repo.storage().get("memo").unwrap().is_some());
        assert!(repo.storage().get("notes").unwrap().is_none());
    }
}
