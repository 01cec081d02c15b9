//! Progress persistence.
//!
//! The core treats persistence as a black-box key-value store behind the
//! [`ProgressStore`] trait: the whole [`UserProgress`] record round-trips as
//! one JSON blob. The default backing is SQLite with a kv table; an
//! in-memory implementation serves tests and ephemeral hosts.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::progress::UserProgress;

const PROGRESS_KEY: &str = "user_progress";

/// Black-box progress persistence.
///
/// Implementations must round-trip [`UserProgress`] losslessly, including
/// timestamps and nested category maps. Failures are recoverable: callers
/// keep using the in-memory record and may retry.
pub trait ProgressStore {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<UserProgress>, StoreError>;
    fn save(&self, progress: &UserProgress) -> Result<(), StoreError>;
}

/// Returns `~/.config/civique[-dev]/` based on CIVIQUE_ENV.
///
/// Set CIVIQUE_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CIVIQUE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("civique-dev")
    } else {
        base_dir.join("civique")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// SQLite-backed progress store.
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    /// Open the store at `~/.config/civique/progress.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(data_dir()?.join("progress.db"))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ProgressStore for SqliteProgressStore {
    fn load(&self) -> Result<Option<UserProgress>, StoreError> {
        match self.kv_get(PROGRESS_KEY)? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    fn save(&self, progress: &UserProgress) -> Result<(), StoreError> {
        let blob = serde_json::to_string(progress)?;
        self.kv_set(PROGRESS_KEY, &blob)
    }
}

/// In-memory progress store for tests and ephemeral hosts.
///
/// Serializes through JSON like the SQLite store, so round-trip behavior
/// matches the persistent backing.
#[derive(Default)]
pub struct MemoryProgressStore {
    slot: RefCell<Option<String>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<Option<UserProgress>, StoreError> {
        match self.slot.borrow().as_deref() {
            Some(blob) => Ok(Some(serde_json::from_str(blob)?)),
            None => Ok(None),
        }
    }

    fn save(&self, progress: &UserProgress) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(serde_json::to_string(progress)?);
        Ok(())
    }
}
