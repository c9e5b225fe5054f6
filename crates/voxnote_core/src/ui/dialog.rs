//! Note creation dialog state.
//!
//! # Invariants
//! - Onboarding is visible until the user picks "record" or "type", and
//!   again whenever the draft is cleared back to empty.
//! - Closing the dialog never leaves a dictation session running.

use crate::dictation::capability::{
    PermissionGate, PermissionState, RecognitionError, RecognitionResult, SpeechCapability,
};
use crate::dictation::controller::{
    DictationController, DictationError, DictationState, SessionId, StartOutcome,
};
use crate::notice::{Notice, NoticeQueue};
use std::time::Instant;

/// Modal used to compose a new note by typing or dictation.
pub struct CreationDialog<C: SpeechCapability, P: PermissionGate> {
    open: bool,
    draft: String,
    onboarding: bool,
    dictation: DictationController<C, P>,
    notices: NoticeQueue,
}

impl<C: SpeechCapability, P: PermissionGate> CreationDialog<C, P> {
    pub fn new(dictation: DictationController<C, P>) -> Self {
        Self {
            open: false,
            draft: String::new(),
            onboarding: true,
            dictation,
            notices: NoticeQueue::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn shows_onboarding(&self) -> bool {
        self.onboarding
    }

    /// True while a session owns the engine (the stop button is shown).
    pub fn is_recording(&self) -> bool {
        self.dictation.is_active()
    }

    pub fn dictation_state(&self) -> DictationState {
        self.dictation.state()
    }

    pub fn dictation(&self) -> &DictationController<C, P> {
        &self.dictation
    }

    pub fn dictation_mut(&mut self) -> &mut DictationController<C, P> {
        &mut self.dictation
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the modal and stops any running session. The draft is kept.
    pub fn close(&mut self) {
        self.dictation.stop();
        self.open = false;
    }

    /// "Type" choice on the onboarding prompt.
    pub fn choose_typing(&mut self) {
        self.onboarding = false;
    }

    /// Text area edit.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        if self.draft.is_empty() {
            self.onboarding = true;
        }
    }

    /// "Record" choice on the onboarding prompt.
    ///
    /// # Errors
    /// - `SessionActive` when a session is already running.
    pub fn start_recording(&mut self) -> Result<StartOutcome, DictationError> {
        let outcome = self.dictation.start()?;
        match outcome {
            StartOutcome::Listening(_) => self.onboarding = false,
            StartOutcome::PermissionDenied => self.onboarding = true,
            StartOutcome::Unsupported | StartOutcome::EngineFailed => {}
        }
        Ok(outcome)
    }

    /// Stop button. Idempotent.
    pub fn stop_recording(&mut self) {
        self.dictation.stop();
    }

    /// Engine result event; replaces the draft with the session transcript.
    pub fn on_recognition_result(&mut self, session: SessionId, results: &[RecognitionResult]) {
        if let Some(transcript) = self.dictation.on_result(session, results) {
            self.draft = transcript;
        }
    }

    /// Engine error event.
    pub fn on_recognition_error(&mut self, session: SessionId, err: RecognitionError) {
        self.dictation.on_error(session, err);
    }

    /// Asynchronous permission answer.
    pub fn on_permission_resolved(&mut self, session: SessionId, state: PermissionState) {
        let applied = self.dictation.on_permission_resolved(session, state);
        if applied && !self.dictation.is_active() {
            self.onboarding = true;
        }
    }

    /// Aborts a session stuck waiting for permission.
    pub fn poll_timeout(&mut self, now: Instant) {
        if self.dictation.poll_timeout(now) {
            self.onboarding = true;
        }
    }

    /// Draft content to hand to the store, or `None` when there is nothing
    /// to save. Stops dictation so the saved text is final.
    pub fn take_pending_draft(&mut self) -> Option<String> {
        self.dictation.stop();
        if self.draft.trim().is_empty() {
            return None;
        }
        Some(self.draft.clone())
    }

    /// Resets the dialog after the store accepted the draft.
    pub fn finish_save(&mut self) {
        self.draft.clear();
        self.onboarding = true;
        self.notices.push(Notice::NoteSaved);
    }

    /// Keeps the draft and reports why the save did not happen.
    pub fn fail_save(&mut self, reason: impl Into<String>) {
        self.notices.push(Notice::NoteSaveFailed {
            reason: reason.into(),
        });
    }

    /// Removes and returns pending notices from the dialog and dictation.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = self.dictation.drain_notices();
        notices.extend(self.notices.drain());
        notices
    }
}
