//! SQLite backend
//!
//! Single table, one row per key:
//! - local_storage(key TEXT PRIMARY KEY, value TEXT NOT NULL)
//!
//! WAL mode so readers in other processes don't block the writer.

use super::PersistentKv;
use crate::error::KvError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// SQLite-backed persistent store (thread-safe)
pub struct SqliteKv {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteKv {
    /// Create or open the database at `path`, creating parent directories
    pub fn open(path: &Path) -> Result<Self, KvError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| KvError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)
            .map_err(KvError::sqlite(format!("failed to open {}", path.display())))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(KvError::sqlite("failed to enable WAL mode"))?;

        let kv = Self::with_connection(conn, Some(path.to_path_buf()))?;
        debug!(path = %path.display(), "SQLite store opened");
        Ok(kv)
    }

    /// Private in-memory database, gone when dropped
    pub fn open_in_memory() -> Result<Self, KvError> {
        let conn = Connection::open_in_memory()
            .map_err(KvError::sqlite("failed to open in-memory database"))?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, KvError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(KvError::sqlite("failed to create schema"))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of stored entries
    pub fn len(&self) -> Result<usize, KvError> {
        let conn = self.conn.lock().map_err(|_| KvError::LockPoisoned)?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))
            .map_err(KvError::sqlite("failed to count entries"))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, KvError> {
        Ok(self.len()? == 0)
    }
}

impl PersistentKv for SqliteKv {
    fn get_item(&self, key: &str) -> Result<Option<String>, KvError> {
        let conn = self.conn.lock().map_err(|_| KvError::LockPoisoned)?;
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(KvError::sqlite(format!("failed to read '{}'", key)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), KvError> {
        let conn = self.conn.lock().map_err(|_| KvError::LockPoisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value) VALUES (?, ?)",
            params![key, value],
        )
        .map_err(KvError::sqlite(format!("failed to write '{}'", key)))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), KvError> {
        let conn = self.conn.lock().map_err(|_| KvError::LockPoisoned)?;
        let removed = conn
            .execute("DELETE FROM local_storage", [])
            .map_err(KvError::sqlite("failed to clear store"))?;
        debug!(removed, "SQLite store cleared");
        Ok(())
    }
}
