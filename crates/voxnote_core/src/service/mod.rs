//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into note lifecycle operations.
//! - Keep UI and host layers decoupled from storage details.

pub mod note_service;
