//! Voice dictation into the note draft.
//!
//! # Responsibility
//! - Declare the host collaborators dictation depends on (speech engine,
//!   permission prompt).
//! - Drive one recognition session at a time through an explicit state
//!   machine.
//!
//! # Invariants
//! - At most one session is active per controller.
//! - Callbacks tagged with a finished session never reach the draft.

pub mod capability;
pub mod controller;

pub use capability::{
    DevicePermission, PermissionAnswer, PermissionGate, PermissionState, PermissionStateError,
    RecognitionAlternative, RecognitionConfig, RecognitionEngine, RecognitionError,
    RecognitionErrorKind, RecognitionResult, SpeechCapability,
};
pub use controller::{
    compose_transcript, DictationController, DictationError, DictationState, SessionId,
    StartOutcome,
};
