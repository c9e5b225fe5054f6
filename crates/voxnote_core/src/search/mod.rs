//! In-memory note search.
//!
//! # Responsibility
//! - Narrow the visible note list on every keystroke.
//! - Keep the filter pure so callers can run it against any collection.

pub mod filter;
