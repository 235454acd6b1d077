//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its identity type.
//! - Provide display projections used by list rows.
//!
//! # Invariants
//! - `id` is assigned at creation and never changes.
//! - `updated_at` is refreshed on every content change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Title shown for notes saved without one.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled Note";

/// Stable identifier of one note.
///
/// Serialized as a plain string. Freshly generated ids are UUIDv7, so they
/// sort by creation time, but any non-empty string loaded from storage is
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// May be empty; see [`Note::display_title`].
    pub title: String,
    /// May be empty.
    pub content: String,
    /// Last modification time, serialized as RFC 3339.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note with a fresh id stamped at `now`.
    #[cfg(test)]
    pub(crate) fn new(title: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_id(NoteId::generate(), title, content, now)
    }

    /// Creates a note with a caller-provided id.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            updated_at: now,
        }
    }

    /// Replaces title and content and stamps the modification time.
    pub fn revise(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.title = title.into();
        self.content = content.into();
        self.updated_at = now;
    }

    /// Title for list rows, falling back to [`UNTITLED_NOTE_TITLE`].
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_NOTE_TITLE
        } else {
            self.title.as_str()
        }
    }

    /// First non-blank content line, capped at `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self
            .content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("");
        let mut preview = line.chars().take(max_chars).collect::<String>();
        if line.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }

    /// Case-insensitive substring match over title and content.
    ///
    /// `needle_lower` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }

    /// Case-insensitive substring match over title and content.
    pub fn matches(&self, query: &str) -> bool {
        self.matches_lowercase(query.to_lowercase().as_str())
    }
}
