//! Core of the VoxNote notes application.
//!
//! Owns the note collection, its durable snapshot, the search filter, the
//! dictation state machine and the dialog state. Platform services (storage,
//! speech engine, permission prompt, secure randomness) are traits
//! implemented by the host.

pub mod app;
pub mod config;
pub mod db;
pub mod dictation;
pub mod idgen;
pub mod logging;
pub mod model;
pub mod notice;
pub mod repo;
pub mod search;
pub mod service;
pub mod storage;
pub mod ui;

pub use app::NotesApp;
pub use config::{AppConfig, ConfigError, DictationConfig};
pub use dictation::{
    DevicePermission, DictationController, DictationError, DictationState, PermissionAnswer,
    PermissionGate, PermissionState, RecognitionConfig, RecognitionEngine, RecognitionError,
    RecognitionErrorKind, RecognitionResult, SessionId, SpeechCapability, StartOutcome,
};
pub use idgen::{NoSecureSource, OsSecureSource, SecureRandomSource, UuidGenerator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use notice::{Notice, NoticeQueue, NoticeSeverity};
pub use repo::note_repo::{
    LoadStatus, NoteSnapshotRepository, RepoError, RepoResult, SnapshotLoad, NOTES_STORAGE_KEY,
};
pub use search::filter::filter_notes;
pub use service::note_service::{NoteStore, NoteStoreError, NoteStoreResult};
pub use storage::memory::InMemoryKeyValueStore;
pub use storage::sqlite::SqliteKeyValueStore;
pub use storage::{KeyValueStore, StorageError, StorageResult};
pub use ui::{CreationDialog, NoteCard};
