//! Key-value blob stores holding the serialized semester store.
//!
//! # Responsibility
//! - Define the injected `BlobStore` contract (get/put one string by key).
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - `put` replaces the whole value for a key (last writer wins).
//! - Implementations are `Send` so writes can move to a worker thread.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub type BlobResult<T> = Result<T, BlobError>;

/// Blob store access failure.
#[derive(Debug)]
pub enum BlobError {
    /// Backing storage is not reachable (closed, poisoned, disabled).
    Unavailable(String),
    Db(DbError),
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "blob store unavailable: {reason}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for BlobError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BlobError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

/// Injected persistence medium: one string value per key.
pub trait BlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> BlobResult<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn get(&self, key: &str) -> BlobResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> BlobResult<()> {
        (**self).put(key, value)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn get(&self, key: &str) -> BlobResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> BlobResult<()> {
        (**self).put(key, value)
    }
}

/// SQLite-backed blob store over the `kv_blobs` table.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> BlobResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> BlobResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> BlobResult<()> {
        self.conn.execute(
            "INSERT INTO kv_blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, now_epoch_ms()],
        )?;
        Ok(())
    }
}

/// Process-local blob store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.into(), value.into());
        }
        store
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| BlobError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> BlobResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| BlobError::Unavailable("memory store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::{BlobStore, MemoryBlobStore, SqliteBlobStore};

    #[test]
    fn sqlite_put_replaces_previous_value() {
        let store = SqliteBlobStore::open_in_memory().expect("in-memory store should open");
        assert_eq!(store.get("k").expect("get should succeed"), None);

        store.put("k", "first").expect("first put should succeed");
        store.put("k", "second").expect("second put should succeed");
        assert_eq!(
            store.get("k").expect("get should succeed").as_deref(),
            Some("second")
        );
    }

    #[test]
    fn memory_store_starts_with_seed_value() {
        let store = MemoryBlobStore::with_value("k", "v");
        assert_eq!(store.get("k").expect("get should succeed").as_deref(), Some("v"));
        assert_eq!(store.get("other").expect("get should succeed"), None);
    }
}
