//! Domain model for saved notes.
//!
//! # Invariants
//! - Every note is identified by an id that is unique within its collection.
//! - Notes are immutable after creation; deletion removes them outright.

pub mod note;
