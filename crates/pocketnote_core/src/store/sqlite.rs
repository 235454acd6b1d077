//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist blobs in the `kv_entries` table of a migrated database.
//! - Keep blocking SQLite work off the async executor threads.
//!
//! # Invariants
//! - One row per key; writes upsert.
//! - All statements run on a blocking worker while holding the connection lock.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already went through `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("sqlite worker for `{op}` failed: {err}")))?;
        debug!(
            "event=kv_{op} module=store backend=sqlite status={}",
            if result.is_ok() { "ok" } else { "error" }
        );
        result
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let key = key.to_string();
        self.run("get", move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1;",
                    [key.as_str()],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let key = key.to_string();
        self.run("set", move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value, Utc::now().timestamp_millis()],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let key = key.to_string();
        self.run("remove", move |conn| {
            conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key.as_str()])?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::store::KeyValueStore;

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.sqlite3");

        {
            let store = SqliteStore::open(&path).expect("open store");
            store.set("k", b"payload".to_vec()).await.expect("set");
            store.set("k", b"payload-2".to_vec()).await.expect("upsert");
        }

        let reopened = SqliteStore::open(&path).expect("reopen store");
        assert_eq!(
            reopened.get("k").await.expect("get"),
            Some(b"payload-2".to_vec())
        );
    }

    #[tokio::test]
    async fn remove_deletes_row_and_tolerates_missing_key() {
        let store = SqliteStore::open_in_memory().expect("open store");
        store.set("k", b"v".to_vec()).await.expect("set");
        store.remove("k").await.expect("remove");
        store.remove("k").await.expect("remove absent key");
        assert_eq!(store.get("k").await.expect("get"), None);
    }
}
