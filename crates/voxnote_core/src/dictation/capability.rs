//! Host capability contracts for speech recognition and device permissions.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Device permission names understood by the permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevicePermission {
    Microphone,
}

impl DevicePermission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
        }
    }
}

/// Permission state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The user has not decided yet; an explicit request will prompt them.
    Prompt,
}

pub const PERMISSION_STATE_GRANTED: &str = "granted";
pub const PERMISSION_STATE_DENIED: &str = "denied";
pub const PERMISSION_STATE_PROMPT: &str = "prompt";

impl PermissionState {
    /// Stable string id matching host permission APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => PERMISSION_STATE_GRANTED,
            Self::Denied => PERMISSION_STATE_DENIED,
            Self::Prompt => PERMISSION_STATE_PROMPT,
        }
    }

    /// Parses a host-reported state string.
    pub fn parse(value: &str) -> Result<Self, PermissionStateError> {
        match value.trim() {
            PERMISSION_STATE_GRANTED => Ok(Self::Granted),
            PERMISSION_STATE_DENIED => Ok(Self::Denied),
            PERMISSION_STATE_PROMPT => Ok(Self::Prompt),
            "" => Err(PermissionStateError::Empty),
            other => Err(PermissionStateError::Unsupported(other.to_string())),
        }
    }
}

/// Permission state parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStateError {
    Empty,
    Unsupported(String),
}

impl Display for PermissionStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "permission state must not be empty"),
            Self::Unsupported(value) => write!(f, "permission state is unsupported: {value}"),
        }
    }
}

impl Error for PermissionStateError {}

/// Answer to a permission query or request.
///
/// Hosts that resolve asynchronously return `Pending` and later deliver the
/// state through `DictationController::on_permission_resolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionAnswer {
    Ready(PermissionState),
    Pending,
    /// The host could not evaluate the permission at all.
    Failed(String),
}

/// Host permission prompt.
pub trait PermissionGate {
    /// Reads the current state without prompting.
    fn query(&mut self, permission: DevicePermission) -> PermissionAnswer;
    /// Prompts the user. Only called after `query` reported `Prompt`.
    fn request(&mut self, permission: DevicePermission) -> PermissionAnswer;
}

/// Settings applied to every engine before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// BCP 47 language tag, e.g. `pt-BR`.
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            lang: "pt-BR".to_string(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

/// One transcription candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One recognized segment; the first alternative is the best one.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<RecognitionAlternative>,
    pub is_final: bool,
}

impl RecognitionResult {
    /// Builds a single-alternative result.
    pub fn single(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence: 1.0,
            }],
            is_final,
        }
    }

    pub fn best_transcript(&self) -> Option<&str> {
        self.alternatives
            .first()
            .map(|alternative| alternative.transcript.as_str())
    }
}

/// Error categories reported by speech engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    LanguageNotSupported,
    Other(String),
}

impl RecognitionErrorKind {
    /// Parses the engine's error code (`no-speech`, `audio-capture`, ...).
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(code) => code.as_str(),
        }
    }
}

/// Engine failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionError {
    pub kind: RecognitionErrorKind,
    pub message: String,
}

impl RecognitionError {
    pub fn new(kind: RecognitionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for RecognitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "speech recognition error: {}", self.kind.as_str())
        } else {
            write!(
                f,
                "speech recognition error: {} ({})",
                self.kind.as_str(),
                self.message
            )
        }
    }
}

impl Error for RecognitionError {}

/// A running speech recognizer.
pub trait RecognitionEngine {
    /// Applies `config` and begins listening.
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), RecognitionError>;
    /// Stops listening.
    ///
    /// Must tolerate being called on an engine that never started or has
    /// already failed.
    fn stop(&mut self);
}

/// Host speech-recognition support.
pub trait SpeechCapability {
    type Engine: RecognitionEngine;

    /// Whether the host can recognize speech at all.
    fn is_supported(&self) -> bool;
    /// Instantiates a fresh engine for one session.
    fn create_engine(&mut self) -> Result<Self::Engine, RecognitionError>;
}
