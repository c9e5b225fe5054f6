//! Dictation session state machine.
//!
//! # Responsibility
//! - Start and stop recognition sessions on behalf of the creation dialog.
//! - Reconcile the optimistic engine start with the microphone permission.
//! - Turn recognition events into draft text.
//!
//! # Invariants
//! - The engine handle lives only inside the active session; it is dropped
//!   on every transition back to `Idle` or `Errored`.
//! - An aborted session stops its engine exactly once.
//! - Events carrying a stale `SessionId` are ignored.
//! - `stop` is idempotent.

use crate::config::DictationConfig;
use crate::dictation::capability::{
    DevicePermission, PermissionAnswer, PermissionGate, PermissionState, RecognitionEngine,
    RecognitionError, RecognitionResult, SpeechCapability,
};
use crate::notice::{Notice, NoticeQueue};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Identifies one start-to-stop lifetime of the speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationState {
    Idle,
    /// Engine started, microphone permission not confirmed yet.
    Requesting,
    Recording,
    /// The last session ended because the engine failed.
    Errored,
}

/// What `start` achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A session is live (`Requesting` or `Recording`).
    Listening(SessionId),
    Unsupported,
    PermissionDenied,
    EngineFailed,
}

/// Precondition failures of the controller API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationError {
    /// Another session is still active; it must be stopped first.
    SessionActive(SessionId),
}

impl Display for DictationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionActive(id) => write!(f, "dictation session {id} is already active"),
        }
    }
}

impl Error for DictationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermissionPhase {
    AwaitingQuery,
    AwaitingRequest,
    Granted,
}

struct ActiveSession<E> {
    id: SessionId,
    engine: E,
    phase: PermissionPhase,
    started_at: Instant,
}

/// Owns the single dictation session slot.
pub struct DictationController<C: SpeechCapability, P: PermissionGate> {
    speech: C,
    permissions: P,
    config: DictationConfig,
    session: Option<ActiveSession<C::Engine>>,
    state: DictationState,
    last_error: Option<RecognitionError>,
    next_session: u64,
    notices: NoticeQueue,
}

impl<C: SpeechCapability, P: PermissionGate> DictationController<C, P> {
    pub fn new(speech: C, permissions: P, config: DictationConfig) -> Self {
        Self {
            speech,
            permissions,
            config,
            session: None,
            state: DictationState::Idle,
            last_error: None,
            next_session: 1,
            notices: NoticeQueue::new(),
        }
    }

    pub fn state(&self) -> DictationState {
        self.state
    }

    /// Whether a session currently owns the engine.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Engine failure that moved the controller to `Errored`, if any.
    pub fn last_error(&self) -> Option<&RecognitionError> {
        self.last_error.as_ref()
    }

    pub fn speech(&self) -> &C {
        &self.speech
    }

    pub fn permissions(&self) -> &P {
        &self.permissions
    }

    pub fn permissions_mut(&mut self) -> &mut P {
        &mut self.permissions
    }

    /// Removes and returns pending user notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Starts a new session.
    ///
    /// The engine is started before the permission is confirmed. A denial,
    /// immediate or later, stops it again.
    ///
    /// # Errors
    /// - `SessionActive` when a session is already running.
    pub fn start(&mut self) -> Result<StartOutcome, DictationError> {
        if let Some(id) = self.active_session() {
            warn!("event=dictation_start module=dictation status=rejected reason=session_active session={id}");
            return Err(DictationError::SessionActive(id));
        }

        if !self.speech.is_supported() {
            info!("event=dictation_start module=dictation status=unsupported");
            self.state = DictationState::Idle;
            self.notices.push(Notice::DictationUnsupported);
            return Ok(StartOutcome::Unsupported);
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;

        let recognition = self.config.recognition_config();
        let engine = self
            .speech
            .create_engine()
            .and_then(|mut engine| engine.start(&recognition).map(|()| engine));
        let engine = match engine {
            Ok(engine) => engine,
            Err(err) => {
                error!(
                    "event=dictation_start module=dictation status=error session={} error={}",
                    id, err
                );
                self.fail(err);
                return Ok(StartOutcome::EngineFailed);
            }
        };

        self.session = Some(ActiveSession {
            id,
            engine,
            phase: PermissionPhase::AwaitingQuery,
            started_at: Instant::now(),
        });
        self.state = DictationState::Requesting;
        self.last_error = None;
        info!(
            "event=dictation_start module=dictation status=ok session={} lang={}",
            id, recognition.lang
        );

        let answer = self.permissions.query(DevicePermission::Microphone);
        self.apply_permission_answer(answer);

        Ok(match self.state {
            DictationState::Requesting | DictationState::Recording => StartOutcome::Listening(id),
            _ => StartOutcome::PermissionDenied,
        })
    }

    /// Delivers an asynchronously resolved permission state.
    ///
    /// Returns `false` when the answer was ignored (stale session or no
    /// answer outstanding).
    pub fn on_permission_resolved(&mut self, session: SessionId, state: PermissionState) -> bool {
        let awaiting = match self.session.as_ref() {
            Some(active) if active.id == session => active.phase != PermissionPhase::Granted,
            _ => false,
        };
        if !awaiting {
            debug!(
                "event=dictation_permission module=dictation status=ignored session={} state={}",
                session,
                state.as_str()
            );
            return false;
        }

        self.apply_permission_answer(PermissionAnswer::Ready(state));
        true
    }

    /// Applies recognition results and returns the new draft text.
    ///
    /// `results` is the full result list of the session so far; the draft is
    /// replaced, not appended to. Returns `None` for stale sessions.
    pub fn on_result(&mut self, session: SessionId, results: &[RecognitionResult]) -> Option<String> {
        if self.active_session() != Some(session) {
            debug!("event=dictation_result module=dictation status=ignored session={session}");
            return None;
        }

        let transcript = compose_transcript(results);
        debug!(
            "event=dictation_result module=dictation status=ok session={} segments={} transcript_len={}",
            session,
            results.len(),
            transcript.chars().count()
        );
        Some(transcript)
    }

    /// Handles an engine failure: stops the engine and moves to `Errored`.
    ///
    /// Returns `false` when the error belonged to a finished session.
    pub fn on_error(&mut self, session: SessionId, err: RecognitionError) -> bool {
        if self.active_session() != Some(session) {
            debug!(
                "event=dictation_error module=dictation status=ignored session={} error={}",
                session, err
            );
            return false;
        }

        error!(
            "event=dictation_error module=dictation status=error session={} error={}",
            session, err
        );
        if let Some(mut active) = self.session.take() {
            active.engine.stop();
        }
        self.fail(err);
        true
    }

    /// Stops the active session. Safe to call at any time.
    ///
    /// Returns `true` when a session was actually stopped. Also clears an
    /// `Errored` state back to `Idle` together with its `last_error`.
    pub fn stop(&mut self) -> bool {
        let stopped = match self.session.take() {
            Some(mut active) => {
                active.engine.stop();
                info!(
                    "event=dictation_stop module=dictation status=ok session={}",
                    active.id
                );
                true
            }
            None => false,
        };
        self.state = DictationState::Idle;
        self.last_error = None;
        stopped
    }

    /// Aborts a session whose permission answer has not arrived in time.
    ///
    /// Returns `true` when a session was aborted.
    pub fn poll_timeout(&mut self, now: Instant) -> bool {
        let expired = match self.session.as_ref() {
            Some(active) if active.phase != PermissionPhase::Granted => {
                now.saturating_duration_since(active.started_at)
                    >= self.config.permission_timeout()
            }
            _ => false,
        };
        if !expired {
            return false;
        }

        warn!("event=dictation_permission module=dictation status=timeout");
        self.abort(Notice::MicrophonePermissionTimedOut);
        true
    }

    fn apply_permission_answer(&mut self, answer: PermissionAnswer) {
        let Some(phase) = self.session.as_ref().map(|active| active.phase) else {
            return;
        };

        match (answer, phase) {
            (PermissionAnswer::Ready(PermissionState::Granted), _) => {
                if let Some(active) = self.session.as_mut() {
                    active.phase = PermissionPhase::Granted;
                    info!(
                        "event=dictation_permission module=dictation status=granted session={}",
                        active.id
                    );
                }
                self.state = DictationState::Recording;
            }
            (PermissionAnswer::Ready(PermissionState::Prompt), PermissionPhase::AwaitingQuery) => {
                if let Some(active) = self.session.as_mut() {
                    active.phase = PermissionPhase::AwaitingRequest;
                }
                let answer = self.permissions.request(DevicePermission::Microphone);
                self.apply_permission_answer(answer);
            }
            (PermissionAnswer::Ready(state), _) => {
                info!(
                    "event=dictation_permission module=dictation status=denied state={}",
                    state.as_str()
                );
                self.abort(Notice::MicrophonePermissionDenied);
            }
            (PermissionAnswer::Pending, _) => {
                debug!("event=dictation_permission module=dictation status=pending");
            }
            (PermissionAnswer::Failed(reason), _) => {
                error!(
                    "event=dictation_permission module=dictation status=error reason={}",
                    reason
                );
                self.abort(Notice::MicrophonePermissionDenied);
            }
        }
    }

    fn abort(&mut self, notice: Notice) {
        if let Some(mut active) = self.session.take() {
            active.engine.stop();
            info!(
                "event=dictation_abort module=dictation status=ok session={}",
                active.id
            );
        }
        self.state = DictationState::Idle;
        self.notices.push(notice);
    }

    fn fail(&mut self, err: RecognitionError) {
        self.notices.push(Notice::RecognitionFailed {
            kind: err.kind.clone(),
        });
        self.last_error = Some(err);
        self.state = DictationState::Errored;
    }
}

/// Concatenates the best alternative of every result segment.
pub fn compose_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter_map(RecognitionResult::best_transcript)
        .collect()
}
