//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define the canonical `Note` record shared by repository, FFI and CLI.
//!
//! # Invariants
//! - Every note is identified by a `NoteId` that is never reused.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
