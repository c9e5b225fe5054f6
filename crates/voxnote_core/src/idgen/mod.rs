//! Note identifier generation.
//!
//! # Responsibility
//! - Produce unique id strings for new notes.
//! - Prefer a cryptographically secure source, degrade to a pseudo-random one.
//!
//! # Invariants
//! - Generated ids always use the 36-char `8-4-4-4-12` hyphenated layout.
//! - Generation never fails.

pub mod uuid_generator;

pub use uuid_generator::{
    insecure_uuid, NoSecureSource, OsSecureSource, SecureRandomSource, UuidGenerator,
};
