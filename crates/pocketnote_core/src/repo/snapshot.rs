//! Versioned serialized form of the whole note collection.
//!
//! # Invariants
//! - Every encoded snapshot carries `schema_version`.
//! - Decoding rejects versions this binary does not know.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot schema version written by this binary.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed notes snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("notes snapshot schema version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    schema_version: u32,
    notes: &'a [Note],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    schema_version: u32,
    #[serde(default)]
    notes: Vec<Note>,
}

/// Serializes `notes` in display order.
pub fn encode_notes(notes: &[Note]) -> Result<Vec<u8>, SnapshotError> {
    let snapshot = SnapshotRef {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        notes,
    };
    Ok(serde_json::to_vec(&snapshot)?)
}

/// Revives a snapshot produced by [`encode_notes`], preserving order.
pub fn decode_notes(bytes: &[u8]) -> Result<Vec<Note>, SnapshotError> {
    let snapshot: SnapshotOwned = serde_json::from_slice(bytes)?;
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.schema_version,
            supported: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    Ok(snapshot.notes)
}
