//! Repository layer: the note collection and its persisted snapshot.
//!
//! # Responsibility
//! - Keep UI/FFI callers decoupled from store and serialization details.
//! - Report load/persist failures as values, never panics.

pub mod notes_repo;
pub mod snapshot;
