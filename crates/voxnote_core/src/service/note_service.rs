//! Note store: the in-memory collection mirrored to durable storage.
//!
//! # Responsibility
//! - Own the session's ordered note collection.
//! - Provide create/delete/filter operations.
//! - Persist a full snapshot after every mutation.
//!
//! # Invariants
//! - Collection order is newest-first by insertion.
//! - Ids are unique within the collection.
//! - The in-memory collection only changes when the snapshot write succeeds.

use crate::idgen::UuidGenerator;
use crate::model::note::{Note, NoteValidationError};
use crate::repo::note_repo::{LoadStatus, NoteSnapshotRepository, RepoError};
use crate::search::filter::filter_notes;
use crate::storage::{KeyValueStore, StorageError};
use chrono::Utc;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteStoreResult<T> = Result<T, NoteStoreError>;

/// Note store operation error.
#[derive(Debug)]
pub enum NoteStoreError {
    /// Content failed validation; nothing was stored.
    Validation(NoteValidationError),
    /// Snapshot read or write failed; the collection is unchanged.
    Repo(RepoError),
}

impl NoteStoreError {
    /// Returns the backend failure when this error came from storage.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::Repo(RepoError::Storage(err)) => Some(err),
            _ => None,
        }
    }
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "note snapshot failure: {err}"),
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteStoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NoteStoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Session-owned note collection backed by a snapshot repository.
pub struct NoteStore<S: KeyValueStore> {
    repo: NoteSnapshotRepository<S>,
    ids: UuidGenerator,
    notes: Vec<Note>,
    load_status: LoadStatus,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Loads the collection using the default id generator.
    pub fn load(repo: NoteSnapshotRepository<S>) -> NoteStoreResult<Self> {
        Self::load_with_generator(repo, UuidGenerator::default())
    }

    /// Loads the collection with a caller-provided id generator.
    ///
    /// # Errors
    /// - Returns `NoteStoreError::Repo` only when the backend read fails.
    ///   Malformed snapshots load as an empty collection.
    pub fn load_with_generator(
        repo: NoteSnapshotRepository<S>,
        ids: UuidGenerator,
    ) -> NoteStoreResult<Self> {
        let loaded = repo.load()?;
        Ok(Self {
            repo,
            ids,
            notes: loaded.notes,
            load_status: loaded.status,
        })
    }

    /// Notes in newest-first order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// How the snapshot was interpreted when this store was loaded.
    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    pub fn repository(&self) -> &NoteSnapshotRepository<S> {
        &self.repo
    }

    /// Creates a note, prepends it and persists the snapshot.
    ///
    /// # Errors
    /// - `Validation` for empty or whitespace-only content.
    /// - `Repo` when the snapshot write fails; the note is not kept.
    pub fn create(&mut self, content: impl Into<String>) -> NoteStoreResult<Note> {
        let content = content.into();
        Note::validate_content(&content)?;

        let mut id = self.ids.generate();
        while self.get(&id).is_some() {
            id = self.ids.generate();
        }
        let note = Note::new(id, Utc::now(), content);

        self.notes.insert(0, note.clone());
        if let Err(err) = self.repo.save(&self.notes) {
            self.notes.remove(0);
            error!(
                "event=note_create module=service status=error note_id={} error={}",
                note.id, err
            );
            return Err(err.into());
        }

        info!(
            "event=note_create module=service status=ok note_id={} content_len={} count={}",
            note.id,
            note.content.chars().count(),
            self.notes.len()
        );
        Ok(note)
    }

    /// Deletes the note with `id` and persists the snapshot.
    ///
    /// Unknown ids are a no-op: nothing changes and nothing is written.
    pub fn delete(&mut self, id: &str) -> NoteStoreResult<()> {
        let Some(position) = self.notes.iter().position(|note| note.id == id) else {
            info!("event=note_delete module=service status=skipped reason=not_found note_id={id}");
            return Ok(());
        };

        let removed = self.notes.remove(position);
        if let Err(err) = self.repo.save(&self.notes) {
            self.notes.insert(position, removed);
            error!(
                "event=note_delete module=service status=error note_id={} error={}",
                id, err
            );
            return Err(err.into());
        }

        info!(
            "event=note_delete module=service status=ok note_id={} count={}",
            id,
            self.notes.len()
        );
        Ok(())
    }

    /// Filters the in-memory collection; see [`filter_notes`].
    pub fn filter(&self, query: &str) -> Vec<&Note> {
        filter_notes(&self.notes, query)
    }
}
