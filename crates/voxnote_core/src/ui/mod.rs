//! Presentation state for the note list and the creation dialog.
//!
//! # Responsibility
//! - Hold the small amount of local UI state (draft, onboarding, open flag).
//! - Route user actions to the note store and the dictation controller.
//!
//! # Invariants
//! - No business rule lives here beyond routing and flag bookkeeping.

pub mod card;
pub mod dialog;

pub use card::{derive_excerpt, relative_age, NoteCard};
pub use dialog::CreationDialog;
