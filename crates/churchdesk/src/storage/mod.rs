//! Storage layer for churchdesk.
//!
//! Collections are persisted the way a browser keeps `localStorage`: each
//! record kind is one JSON array stored under a fixed string key, replaced
//! wholesale on every save. [`KeyValueStore`] is that contract and
//! [`Storage`] is its `SQLite` implementation.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A durable string-keyed store of string values.
///
/// `set` replaces any prior value under the key.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All stored keys in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Load the collection stored under `key`.
///
/// Returns `Ok(None)` when nothing has been stored yet.
///
/// # Errors
///
/// Returns [`Error::CorruptState`] if the stored text is not a valid JSON
/// array of `T`, or a storage error if the backend fails.
pub fn load_collection<T, S>(store: &S, key: &str) -> Result<Option<Vec<T>>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let records = serde_json::from_str(&raw).map_err(|source| Error::CorruptState {
        key: key.to_string(),
        source,
    })?;
    Ok(Some(records))
}

/// Serialize `records` as a JSON array and store it under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save_collection<T, S>(store: &S, key: &str, records: &[T]) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(records)?;
    store.set(key, &json)?;
    debug!("Saved {} records under {}", records.len(), key);
    Ok(())
}

/// `SQLite`-backed [`KeyValueStore`].
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When `key` was last written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let stamp: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(stamp
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Get storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_keys, stored_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0) FROM local_storage",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_keys,
            stored_bytes: u64::try_from(stored_bytes).unwrap_or(0),
            db_size_bytes,
        })
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_storage ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored keys.
    pub total_keys: i64,
    /// Bytes of stored values.
    pub stored_bytes: u64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
