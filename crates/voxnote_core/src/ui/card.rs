//! Note card view model.

use crate::model::note::{Note, NoteId};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Maximum excerpt length in characters.
pub const EXCERPT_MAX_CHARS: usize = 280;

/// Everything a card needs to render one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    /// Target id for the card's delete action.
    pub id: NoteId,
    /// Relative creation time, e.g. `há 2 dias`.
    pub age_label: String,
    /// Collapsed single-line preview.
    pub excerpt: String,
    /// Full content for the expanded view.
    pub content: String,
}

impl NoteCard {
    pub fn from_note(note: &Note, now: DateTime<Utc>) -> Self {
        Self {
            id: note.id.clone(),
            age_label: relative_age(note.created_at, now),
            excerpt: derive_excerpt(&note.content, EXCERPT_MAX_CHARS),
            content: note.content.clone(),
        }
    }
}

/// Collapses whitespace runs and truncates to `max_chars` characters.
pub fn derive_excerpt(content: &str, max_chars: usize) -> String {
    let normalized = WHITESPACE_RE.replace_all(content, " ");
    let trimmed = normalized.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut excerpt: String = trimmed.chars().take(max_chars).collect();
    excerpt.push_str("...");
    excerpt
}

/// Portuguese distance from `created_at` to `now`, e.g. `há 2 dias`.
///
/// Future timestamps (clock skew) read as `agora mesmo`.
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 45 {
        "agora mesmo".to_string()
    } else if minutes < 1 {
        "há 1 minuto".to_string()
    } else if hours < 1 {
        ago(minutes, "minuto", "minutos")
    } else if days < 1 {
        ago(hours, "hora", "horas")
    } else if days < 30 {
        ago(days, "dia", "dias")
    } else if days < 365 {
        ago(days / 30, "mês", "meses")
    } else {
        ago(days / 365, "ano", "anos")
    }
}

fn ago(count: i64, singular: &str, plural: &str) -> String {
    let unit = if count == 1 { singular } else { plural };
    format!("há {count} {unit}")
}
