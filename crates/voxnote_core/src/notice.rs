//! User-facing notices.
//!
//! Core code never talks to a toast or alert widget directly. Components push
//! notices into a [`NoticeQueue`] and the host drains it after each event.

use crate::dictation::capability::RecognitionErrorKind;
use std::collections::VecDeque;

/// How prominently the host should present a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    /// Transient confirmation (toast).
    Info,
    /// Blocking explanation of why an action did not happen (alert).
    Error,
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoteSaved,
    NoteSaveFailed { reason: String },
    NoteDeleteFailed { reason: String },
    DictationUnsupported,
    MicrophonePermissionDenied,
    MicrophonePermissionTimedOut,
    RecognitionFailed { kind: RecognitionErrorKind },
}

impl Notice {
    pub fn severity(&self) -> NoticeSeverity {
        match self {
            Self::NoteSaved => NoticeSeverity::Info,
            _ => NoticeSeverity::Error,
        }
    }

    /// Text shown to the user, in Brazilian Portuguese like the rest of the UI.
    pub fn message(&self) -> String {
        match self {
            Self::NoteSaved => "Nota criada com sucesso".to_string(),
            Self::NoteSaveFailed { reason } => format!("Não foi possível salvar a nota: {reason}"),
            Self::NoteDeleteFailed { reason } => {
                format!("Não foi possível apagar a nota: {reason}")
            }
            Self::DictationUnsupported => {
                "Infelizmente seu navegador não suporta a API de gravação!".to_string()
            }
            Self::MicrophonePermissionDenied => {
                "Ative a permissão para acesso ao microfone do seu dispositivo.".to_string()
            }
            Self::MicrophonePermissionTimedOut => {
                "A permissão do microfone não foi respondida; a gravação foi cancelada."
                    .to_string()
            }
            Self::RecognitionFailed { kind } => {
                format!("A gravação parou por uma falha no reconhecimento de voz ({}).", kind.as_str())
            }
        }
    }
}

/// FIFO of pending notices.
#[derive(Debug, Default, Clone)]
pub struct NoticeQueue {
    pending: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        self.pending.push_back(notice);
    }

    /// Removes and returns every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
