//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list/editor/settings use-cases to Dart via FRB.
//! - Own the single process-scoped notes repository handle.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are flattened into envelope messages; nothing throws into Dart.
//! - The repository is created lazily on first use and runs its initial load
//!   exactly once per process.

use log::warn;
use pocketnote_core::config::default_db_path;
use pocketnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NoteId, NotesConfig, NotesRepository, SqliteStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::sync::OnceCell;

const PREVIEW_MAX_CHARS: usize = 80;

static NOTES_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static NOTES_REPOSITORY: OnceCell<NotesRepository<SqliteStore>> = OnceCell::const_new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Points the notes store at an app-private database file.
///
/// # FFI contract
/// - Must be called before the first `notes_*` call to take effect.
/// - Repeating the same path is accepted; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_notes_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "notes db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    if NOTES_REPOSITORY.initialized() && resolve_notes_db_path() != requested {
        return "notes repository already open; restart the app to change its db path"
            .to_string();
    }

    let active = NOTES_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "notes db path already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Row projection used by the note list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    /// Title with `Untitled Note` fallback.
    pub display_title: String,
    /// First content line, truncated for single-line rendering.
    pub preview: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
}

/// Collection envelope for list/search/load calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Notes in display order (newest first).
    pub items: Vec<NoteItem>,
    pub loading: bool,
    /// Last load/persist failure, if any.
    pub error: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl NotesListResponse {
    fn failure(message: String) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: Some(message.clone()),
            message,
        }
    }
}

/// Single-note envelope for editor and settings actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected note, when one exists after the action.
    pub note: Option<NoteItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: false,
            note,
            message: message.into(),
        }
    }
}

/// Forces a reload from storage and returns the refreshed list.
pub async fn notes_load() -> NotesListResponse {
    let repo = match repository().await {
        Ok(repo) => repo,
        Err(message) => return NotesListResponse::failure(message),
    };
    // Failure lands in `status().error`, which the list envelope carries.
    let _ = repo.load().await;
    list_response(repo, repo.notes())
}

/// Returns the current collection snapshot.
pub async fn notes_list() -> NotesListResponse {
    match repository().await {
        Ok(repo) => list_response(repo, repo.notes()),
        Err(message) => NotesListResponse::failure(message),
    }
}

/// Filters notes by case-insensitive substring over title and content.
pub async fn notes_search(query: String) -> NotesListResponse {
    match repository().await {
        Ok(repo) => list_response(repo, repo.search(query.as_str())),
        Err(message) => NotesListResponse::failure(message),
    }
}

/// Looks up one note for the editor screen.
pub async fn notes_get(id: String) -> NoteActionResponse {
    let repo = match repository().await {
        Ok(repo) => repo,
        Err(message) => return NoteActionResponse::failure(message, None),
    };
    match repo.get(&NoteId::from(id)) {
        Some(note) => NoteActionResponse::success("Note found.", Some(to_note_item(&note))),
        None => NoteActionResponse::failure("Note not found.", None),
    }
}

/// Creates a note from editor input. Empty title/content are accepted.
///
/// On persist failure `ok=false` but `note` still carries the in-memory note.
pub async fn notes_add(title: String, content: String) -> NoteActionResponse {
    let repo = match repository().await {
        Ok(repo) => repo,
        Err(message) => return NoteActionResponse::failure(message, None),
    };
    let (note, persisted) = repo.add_with_outcome(title, content).await;
    let item = Some(to_note_item(&note));
    match persisted {
        Ok(()) => NoteActionResponse::success("Note created.", item),
        Err(err) => NoteActionResponse::failure(format!("notes_add failed: {err}"), item),
    }
}

/// Saves editor changes for an existing note.
///
/// Unknown ids succeed without changes and return `note=None`.
pub async fn notes_update(id: String, title: String, content: String) -> NoteActionResponse {
    let repo = match repository().await {
        Ok(repo) => repo,
        Err(message) => return NoteActionResponse::failure(message, None),
    };
    let id = NoteId::from(id);
    match repo.update(&id, title, content).await {
        Ok(Some(note)) => NoteActionResponse::success("Note saved.", Some(to_note_item(&note))),
        Ok(None) => NoteActionResponse::success("Note not found; nothing changed.", None),
        Err(err) => NoteActionResponse::failure(
            format!("notes_update failed: {err}"),
            repo.get(&id).as_ref().map(to_note_item),
        ),
    }
}

/// Deletes one note. Deleting an unknown id succeeds.
pub async fn notes_delete(id: String) -> NoteActionResponse {
    let repo = match repository().await {
        Ok(repo) => repo,
        Err(message) => return NoteActionResponse::failure(message, None),
    };
    match repo.delete(&NoteId::from(id)).await {
        Ok(true) => NoteActionResponse::success("Note deleted.", None),
        Ok(false) => NoteActionResponse::success("Note not found; nothing changed.", None),
        Err(err) => NoteActionResponse::failure(format!("notes_delete failed: {err}"), None),
    }
}

/// Deletes every note (settings screen "Clear All Notes").
pub async fn notes_clear() -> NoteActionResponse {
    let repo = match repository().await {
        Ok(repo) => repo,
        Err(message) => return NoteActionResponse::failure(message, None),
    };
    match repo.clear().await {
        Ok(removed) => {
            NoteActionResponse::success(format!("Deleted {removed} note(s)."), None)
        }
        Err(err) => NoteActionResponse::failure(format!("notes_clear failed: {err}"), None),
    }
}

async fn repository() -> Result<&'static NotesRepository<SqliteStore>, String> {
    NOTES_REPOSITORY
        .get_or_try_init(|| async {
            let db_path = resolve_notes_db_path();
            let store = SqliteStore::open(&db_path)
                .map_err(|err| format!("notes store open failed: {err}"))?;
            Ok::<_, String>(NotesRepository::open(store).await)
        })
        .await
}

fn resolve_notes_db_path() -> PathBuf {
    NOTES_DB_PATH
        .get_or_init(|| match NotesConfig::from_env() {
            Ok(config) => config.db_path,
            Err(err) => {
                warn!("event=config_resolve module=ffi status=error error={err}");
                default_db_path()
            }
        })
        .clone()
}

fn list_response(repo: &NotesRepository<SqliteStore>, notes: Vec<Note>) -> NotesListResponse {
    let status = repo.status();
    let items = notes.iter().map(to_note_item).collect::<Vec<_>>();
    let message = match (&status.error, items.len()) {
        (Some(error), _) => error.clone(),
        (None, 0) => "No notes.".to_string(),
        (None, 1) => "1 Note".to_string(),
        (None, count) => format!("{count} Notes"),
    };
    NotesListResponse {
        items,
        loading: status.loading,
        error: status.error,
        message,
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        display_title: note.display_title().to_string(),
        preview: note.preview(PREVIEW_MAX_CHARS),
        content: note.content.clone(),
        updated_at_ms: note.updated_at.timestamp_millis(),
    }
}
