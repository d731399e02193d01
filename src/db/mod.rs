pub mod models;
pub mod queries;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt JSON column: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot create database directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// V1: Deezer caches, keyed by lowercased, trimmed artist name.
/// `artist_cache.data` holds `ArtistData` as JSON.
const V1_CACHES: &str = "
    CREATE TABLE IF NOT EXISTS artist_cache (
        name        TEXT PRIMARY KEY,
        data        TEXT NOT NULL,
        fetched_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS link_cache (
        name        TEXT PRIMARY KEY,
        link        TEXT NOT NULL,
        fetched_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
";

/// V2: Album history. The full album is kept as JSON; title, theme, size
/// and date are duplicated into columns for listing.
const V2_ALBUMS: &str = "
    CREATE TABLE IF NOT EXISTS albums (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        theme       TEXT NOT NULL,
        track_count INTEGER NOT NULL,
        created_at  TEXT NOT NULL,
        data        TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_albums_created_at ON albums(created_at);
";

/// Schema steps in order; applying step `n` (1-based) sets `user_version = n`.
const MIGRATIONS: &[&str] = &[V1_CACHES, V2_ALBUMS];

/// Artist caches and album history in one SQLite file.
pub struct Database {
    pub conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        Self::prepare(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Schema version recorded in the file (0 for a fresh database).
    pub fn schema_version(&self) -> Result<usize> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version.max(0) as usize)
    }

    /// Apply every step newer than the recorded version, one transaction each.
    fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?;
        for (i, sql) in MIGRATIONS.iter().enumerate().skip(current) {
            let version = i + 1;
            let tx = self.conn.unchecked_transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version as i64)?;
            tx.commit()?;
            log::debug!("Database schema at v{version}");
        }
        Ok(())
    }
}
