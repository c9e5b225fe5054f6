//! Persistence of the note collection.
//!
//! # Responsibility
//! - Translate between the in-memory collection and the stored snapshot.
//! - Isolate the JSON snapshot format from store orchestration.
//!
//! # Invariants
//! - Every write is a full-collection snapshot; there are no diffs.
//! - Unparsable snapshots degrade to an empty collection, never a fault.

pub mod note_repo;
