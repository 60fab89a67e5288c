//! SQLite-backed cache store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::Cache;
use crate::error::{BuildLensError, Result};

/// Schema for the cache table. Expiry is an absolute Unix timestamp set at
/// write time; expired rows are dropped lazily on read.
const CACHE_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS bucket_cache (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expires_at INTEGER NOT NULL
);
";

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CACHE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Default database path, under the user's cache directory.
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
            .ok_or_else(|| {
                BuildLensError::Config("Could not determine cache directory".to_string())
            })?;

        Ok(cache_dir.join("buildlens").join("cache.db"))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| BuildLensError::Config(format!("Cache lock poisoned: {e}")))
    }
}

impl Cache for SqliteCache {
    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let conn = self.lock()?;
        let expires_at = Utc::now().timestamp() + i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        conn.execute(
            "INSERT OR REPLACE INTO bucket_cache (key, value, expires_at) VALUES (?, ?, ?)",
            params![key, value, expires_at],
        )?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.lock()?;

        let row: Option<(Vec<u8>, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM bucket_cache WHERE key = ?",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, expires_at)) if expires_at > Utc::now().timestamp() => Ok(Some(value)),
            Some(_) => {
                conn.execute("DELETE FROM bucket_cache WHERE key = ?", params![key])?;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
