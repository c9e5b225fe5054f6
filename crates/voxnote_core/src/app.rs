//! Application session wiring.
//!
//! # Responsibility
//! - Own the note store, the search query and the creation dialog.
//! - Route dialog saves and card deletions to the store.
//!
//! # Invariants
//! - The visible list is always the store collection narrowed by the current
//!   query, never a stale copy.

use crate::config::AppConfig;
use crate::dictation::capability::{PermissionGate, SpeechCapability};
use crate::dictation::controller::DictationController;
use crate::model::note::Note;
use crate::notice::{Notice, NoticeQueue};
use crate::repo::note_repo::NoteSnapshotRepository;
use crate::service::note_service::{NoteStore, NoteStoreResult};
use crate::storage::KeyValueStore;
use crate::ui::card::NoteCard;
use crate::ui::dialog::CreationDialog;
use chrono::{DateTime, Utc};

/// One user session of the notes application.
pub struct NotesApp<S, C, P>
where
    S: KeyValueStore,
    C: SpeechCapability,
    P: PermissionGate,
{
    store: NoteStore<S>,
    search_query: String,
    dialog: CreationDialog<C, P>,
    notices: NoticeQueue,
}

impl<S, C, P> NotesApp<S, C, P>
where
    S: KeyValueStore,
    C: SpeechCapability,
    P: PermissionGate,
{
    pub fn new(store: NoteStore<S>, dialog: CreationDialog<C, P>) -> Self {
        Self {
            store,
            search_query: String::new(),
            dialog,
            notices: NoticeQueue::new(),
        }
    }

    /// Loads the note snapshot and wires every component from `config`.
    pub fn bootstrap(
        storage: S,
        speech: C,
        permissions: P,
        config: &AppConfig,
    ) -> NoteStoreResult<Self> {
        let repo = NoteSnapshotRepository::with_key(storage, config.storage_key.clone());
        let store = NoteStore::load(repo)?;
        let dictation = DictationController::new(speech, permissions, config.dictation.clone());
        Ok(Self::new(store, CreationDialog::new(dictation)))
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn dialog(&self) -> &CreationDialog<C, P> {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut CreationDialog<C, P> {
        &mut self.dialog
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Search box keystroke.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Notes matching the current query, newest first.
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.store.filter(&self.search_query)
    }

    /// Card view models for the visible notes.
    pub fn cards(&self, now: DateTime<Utc>) -> Vec<NoteCard> {
        self.visible_notes()
            .into_iter()
            .map(|note| NoteCard::from_note(note, now))
            .collect()
    }

    /// Save button of the creation dialog.
    ///
    /// Returns `Ok(None)` when the draft is empty. On a storage failure the
    /// draft is kept so the user can retry.
    pub fn save_draft(&mut self) -> NoteStoreResult<Option<Note>> {
        let Some(content) = self.dialog.take_pending_draft() else {
            return Ok(None);
        };

        match self.store.create(content) {
            Ok(note) => {
                self.dialog.finish_save();
                Ok(Some(note))
            }
            Err(err) => {
                self.dialog.fail_save(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete action of a note card.
    pub fn delete_note(&mut self, id: &str) -> NoteStoreResult<()> {
        self.store.delete(id).map_err(|err| {
            self.notices.push(Notice::NoteDeleteFailed {
                reason: err.to_string(),
            });
            err
        })
    }

    /// Removes and returns every pending notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = self.dialog.drain_notices();
        notices.extend(self.notices.drain());
        notices
    }
}
