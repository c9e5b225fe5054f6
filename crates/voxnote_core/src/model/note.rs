//! Note domain model.
//!
//! # Responsibility
//! - Define the record persisted in the `notes` snapshot.
//! - Keep the serialized field names stable (`id`, `date`, `content`).
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - `content` is never blank for notes created through the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque note identifier.
///
/// Kept as a string alias: ids read back from storage are not guaranteed to
/// be UUIDs.
pub type NoteId = String;

/// One saved memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Serialized as `date` to match the snapshot schema.
    #[serde(rename = "date", deserialize_with = "deserialize_date")]
    pub created_at: DateTime<Utc>,
    pub content: String,
}

impl Note {
    /// Builds a note from already-validated parts.
    pub fn new(id: impl Into<NoteId>, created_at: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at,
            content: content.into(),
        }
    }

    /// Checks content rules shared by every creation path.
    pub fn validate_content(content: &str) -> Result<(), NoteValidationError> {
        if content.trim().is_empty() {
            return Err(NoteValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Offset-less layouts accepted for `date`, read as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses a stored `date` value.
///
/// Accepts RFC 3339 with any offset, ISO date-times without an offset
/// (taken as UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_note_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_note_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized note date `{raw}`")))
}

/// Note content rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Content is empty or whitespace-only.
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}
