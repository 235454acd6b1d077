//! Core domain logic for PocketNote.
//! This crate is the single source of truth for note collection invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, NotesConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, UNTITLED_NOTE_TITLE};
pub use repo::notes_repo::{
    NotesRepository, RepoError, RepoErrorKind, RepoResult, RepoStatus, NOTES_STORAGE_KEY,
};
pub use repo::snapshot::{SnapshotError, SNAPSHOT_SCHEMA_VERSION};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
