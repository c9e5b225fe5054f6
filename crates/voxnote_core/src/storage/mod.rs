//! Durable key-value slot contract and backends.
//!
//! # Responsibility
//! - Define the narrow storage seam the note store persists through.
//! - Report read/write failures as values instead of panicking.
//!
//! # Invariants
//! - `set` is a full overwrite of one slot; there are no partial writes.
//! - A failed `set` leaves the previous slot value in place.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a key-value backend.
#[derive(Debug)]
pub enum StorageError {
    /// Writing the value would exceed the backend capacity.
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        quota_bytes: usize,
    },
    /// SQLite backend failure.
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes required, {quota_bytes} available"
            ),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value store with whole-value overwrite semantics.
pub trait KeyValueStore {
    /// Reads one slot. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Overwrites one slot.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Deletes one slot. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}
