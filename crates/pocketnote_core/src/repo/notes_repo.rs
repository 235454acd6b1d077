//! Notes repository: the in-memory collection and its persistence policy.
//!
//! # Responsibility
//! - Own the ordered note collection plus `loading`/`error` status.
//! - Mediate every read and write against the key-value store.
//!
//! # Invariants
//! - The whole collection is stored under [`NOTES_STORAGE_KEY`]; every
//!   mutation rewrites it in full.
//! - `add` inserts at the front; `update` stably re-sorts by `updated_at` DESC.
//! - Note ids are unique within the collection.
//! - A failed write keeps the in-memory mutation and records `error`.
//! - Store-touching operations are serialized by the write gate, so the last
//!   completed write always reflects every earlier mutation.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{Note, NoteId};
use crate::repo::snapshot::{decode_notes, encode_notes, SnapshotError};
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error, info};
use parking_lot::RwLock;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;

/// Fixed key holding the serialized collection.
pub const NOTES_STORAGE_KEY: &str = "notes_app_data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse failure category reported to UI callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoErrorKind {
    /// Reading or decoding the stored collection failed.
    LoadFailure,
    /// Writing the collection after a mutation failed.
    PersistFailure,
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to load notes: {0}")]
    LoadRead(#[source] StoreError),
    #[error("failed to load notes: {0}")]
    LoadDecode(#[source] SnapshotError),
    #[error("failed to save notes: {0}")]
    PersistWrite(#[source] StoreError),
    #[error("failed to save notes: {0}")]
    PersistEncode(#[source] SnapshotError),
}

impl RepoError {
    pub fn kind(&self) -> RepoErrorKind {
        match self {
            Self::LoadRead(_) | Self::LoadDecode(_) => RepoErrorKind::LoadFailure,
            Self::PersistWrite(_) | Self::PersistEncode(_) => RepoErrorKind::PersistFailure,
        }
    }
}

/// Loading/error surface observed by UI callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStatus {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct RepoState {
    notes: Vec<Note>,
    loading: bool,
    error: Option<String>,
}

/// Owned note collection backed by a key-value store.
///
/// Share it across consumers through `Arc<NotesRepository<_>>`; all methods
/// take `&self`.
pub struct NotesRepository<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    state: RwLock<RepoState>,
    write_gate: Mutex<()>,
}

impl<S: KeyValueStore> NotesRepository<S> {
    /// Creates the repository and runs the initial [`load`](Self::load).
    ///
    /// A failed initial load does not fail construction; it is reported via
    /// [`status`](Self::status) and the collection starts empty.
    pub async fn open(store: S) -> Self {
        Self::open_with_clock(store, Box::new(SystemClock)).await
    }

    /// Same as [`open`](Self::open) with an explicit time source.
    pub async fn open_with_clock(store: S, clock: Box<dyn Clock>) -> Self {
        let repo = Self {
            store,
            clock,
            state: RwLock::new(RepoState::default()),
            write_gate: Mutex::new(()),
        };
        // Failure is already recorded in `status().error`.
        let _ = repo.load().await;
        repo
    }

    /// Reloads the collection from the store.
    ///
    /// Absent data yields an empty collection. On failure the current
    /// collection is kept as-is.
    pub async fn load(&self) -> RepoResult<()> {
        let _gate = self.write_gate.lock().await;
        let started_at = Instant::now();
        self.state.write().loading = true;
        info!("event=notes_load module=repo status=start");

        let outcome = self.read_snapshot().await;

        let mut state = self.state.write();
        state.loading = false;
        match outcome {
            Ok(notes) => {
                info!(
                    "event=notes_load module=repo status=ok count={} duration_ms={}",
                    notes.len(),
                    started_at.elapsed().as_millis()
                );
                state.notes = notes;
                state.error = None;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=notes_load module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Creates a note at the front of the collection and persists it.
    ///
    /// Empty title/content are accepted. On a persist failure the note stays
    /// in memory and the error is returned.
    pub async fn add(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> RepoResult<Note> {
        let (note, persisted) = self.add_with_outcome(title, content).await;
        persisted.map(|()| note)
    }

    /// Same as [`add`](Self::add), but hands back the created note even when
    /// the write fails.
    pub async fn add_with_outcome(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> (Note, RepoResult<()>) {
        let _gate = self.write_gate.lock().await;
        let started_at = Instant::now();

        let (note, encoded, count) = {
            let mut state = self.state.write();
            let id = fresh_id(&state.notes);
            let note = Note::with_id(id, title, content, self.clock.now());
            state.notes.insert(0, note.clone());
            (note, encode_notes(&state.notes), state.notes.len())
        };

        let persisted = self.persist("add", started_at, encoded, count).await;
        (note, persisted)
    }

    /// Replaces title/content of note `id` and re-sorts the collection.
    ///
    /// Returns `Ok(None)` without touching the collection or the store when
    /// `id` is unknown.
    pub async fn update(
        &self,
        id: &NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> RepoResult<Option<Note>> {
        let _gate = self.write_gate.lock().await;
        let started_at = Instant::now();

        let (updated, encoded, count) = {
            let mut state = self.state.write();
            let now = self.clock.now();
            let Some(note) = state.notes.iter_mut().find(|note| &note.id == id) else {
                debug!("event=notes_update module=repo status=skipped reason=not_found");
                return Ok(None);
            };
            note.revise(title, content, now);
            let updated = note.clone();
            state
                .notes
                .sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
            (updated, encode_notes(&state.notes), state.notes.len())
        };

        self.persist("update", started_at, encoded, count).await?;
        Ok(Some(updated))
    }

    /// Removes note `id` and persists the rest.
    ///
    /// Returns `Ok(false)` without writing when `id` is unknown, so repeated
    /// deletes are idempotent.
    pub async fn delete(&self, id: &NoteId) -> RepoResult<bool> {
        let _gate = self.write_gate.lock().await;
        let started_at = Instant::now();

        let (encoded, count) = {
            let mut state = self.state.write();
            let before = state.notes.len();
            state.notes.retain(|note| &note.id != id);
            if state.notes.len() == before {
                debug!("event=notes_delete module=repo status=skipped reason=not_found");
                return Ok(false);
            }
            (encode_notes(&state.notes), state.notes.len())
        };

        self.persist("delete", started_at, encoded, count).await?;
        Ok(true)
    }

    /// Drops every note and removes the stored collection.
    ///
    /// Returns how many notes were removed from memory. Memory is cleared even
    /// when the store removal fails.
    pub async fn clear(&self) -> RepoResult<usize> {
        let _gate = self.write_gate.lock().await;
        let started_at = Instant::now();

        let removed = {
            let mut state = self.state.write();
            let removed = state.notes.len();
            state.notes.clear();
            removed
        };

        let result = self
            .store
            .remove(NOTES_STORAGE_KEY)
            .await
            .map_err(RepoError::PersistWrite);
        self.settle("clear", started_at, 0, result)?;
        Ok(removed)
    }

    /// Looks up a note in memory. Never consults the store.
    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.state
            .read()
            .notes
            .iter()
            .find(|note| &note.id == id)
            .cloned()
    }

    /// Snapshot of the collection in display order.
    pub fn notes(&self) -> Vec<Note> {
        self.state.read().notes.clone()
    }

    /// Notes whose title or content contains `query`, ignoring case.
    ///
    /// A blank query returns the full snapshot.
    pub fn search(&self, query: &str) -> Vec<Note> {
        let needle = query.trim().to_lowercase();
        let state = self.state.read();
        if needle.is_empty() {
            return state.notes.clone();
        }
        state
            .notes
            .iter()
            .filter(|note| note.matches_lowercase(needle.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().notes.is_empty()
    }

    pub fn status(&self) -> RepoStatus {
        let state = self.state.read();
        RepoStatus {
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read_snapshot(&self) -> RepoResult<Vec<Note>> {
        let stored = self
            .store
            .get(NOTES_STORAGE_KEY)
            .await
            .map_err(RepoError::LoadRead)?;
        match stored {
            Some(bytes) => decode_notes(&bytes).map_err(RepoError::LoadDecode),
            None => Ok(Vec::new()),
        }
    }

    async fn persist(
        &self,
        op: &'static str,
        started_at: Instant,
        encoded: Result<Vec<u8>, SnapshotError>,
        count: usize,
    ) -> RepoResult<()> {
        let result = match encoded {
            Ok(bytes) => self
                .store
                .set(NOTES_STORAGE_KEY, bytes)
                .await
                .map_err(RepoError::PersistWrite),
            Err(err) => Err(RepoError::PersistEncode(err)),
        };
        self.settle(op, started_at, count, result)
    }

    fn settle(
        &self,
        op: &'static str,
        started_at: Instant,
        count: usize,
        result: RepoResult<()>,
    ) -> RepoResult<()> {
        match &result {
            Ok(()) => {
                self.state.write().error = None;
                info!(
                    "event=notes_{op} module=repo status=ok count={count} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                self.state.write().error = Some(err.to_string());
                error!(
                    "event=notes_{op} module=repo status=error count={count} duration_ms={} error_kind={:?} error={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
            }
        }
        result
    }
}

fn fresh_id(notes: &[Note]) -> NoteId {
    loop {
        let id = NoteId::generate();
        if notes.iter().all(|note| note.id != id) {
            return id;
        }
    }
}
