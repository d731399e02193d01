use rusqlite::{params, OptionalExtension};

use super::models::{AlbumSummary, StoredAlbum};
use super::{Database, Result};
use crate::album::Album;
use crate::lookup::ArtistData;

/// Cache key for an artist name: trimmed and lowercased.
fn cache_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// SQLite modifier selecting rows newer than `ttl_days`.
fn ttl_modifier(ttl_days: i64) -> String {
    format!("-{} days", ttl_days.max(0))
}

impl Database {
    /// Cached artist metadata fetched within the last `ttl_days`.
    pub fn get_cached_artist(&self, name: &str, ttl_days: i64) -> Result<Option<ArtistData>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM artist_cache
                 WHERE name = ?1 AND fetched_at >= datetime('now', ?2)",
                params![cache_key(name), ttl_modifier(ttl_days)],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn store_cached_artist(&self, name: &str, data: &ArtistData) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.conn.execute(
            "INSERT INTO artist_cache (name, data, fetched_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET data = excluded.data, fetched_at = excluded.fetched_at",
            params![cache_key(name), json],
        )?;
        Ok(())
    }

    /// Cached link resolved within the last `ttl_days`.
    pub fn get_cached_link(&self, name: &str, ttl_days: i64) -> Result<Option<String>> {
        let link = self
            .conn
            .query_row(
                "SELECT link FROM link_cache
                 WHERE name = ?1 AND fetched_at >= datetime('now', ?2)",
                params![cache_key(name), ttl_modifier(ttl_days)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(link)
    }

    pub fn store_cached_link(&self, name: &str, link: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO link_cache (name, link, fetched_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET link = excluded.link, fetched_at = excluded.fetched_at",
            params![cache_key(name), link],
        )?;
        Ok(())
    }

    /// Empty both caches. Returns (artists removed, links removed).
    pub fn clear_caches(&self) -> Result<(usize, usize)> {
        let tx = self.conn.unchecked_transaction()?;
        let artists = tx.execute("DELETE FROM artist_cache", [])?;
        let links = tx.execute("DELETE FROM link_cache", [])?;
        tx.commit()?;
        Ok((artists, links))
    }

    /// Append an album to the history. Returns its id.
    pub fn store_album(&self, album: &Album) -> Result<i64> {
        let json = serde_json::to_string(album)?;
        self.conn.execute(
            "INSERT INTO albums (title, theme, track_count, created_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                album.title,
                album.theme,
                album.tracks.len() as i64,
                album.created_at_display(),
                json,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent albums first.
    pub fn recent_albums(&self, limit: usize) -> Result<Vec<AlbumSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, theme, track_count, created_at FROM albums
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AlbumSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                theme: row.get(2)?,
                track_count: row.get::<_, i64>(3)? as usize,
                created_at: row.get(4)?,
            })
        })?;
        let mut albums = Vec::new();
        for row in rows {
            albums.push(row?);
        }
        Ok(albums)
    }

    pub fn get_album(&self, id: i64) -> Result<Option<StoredAlbum>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM albums WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;

        match data {
            Some(json) => Ok(Some(StoredAlbum {
                id,
                album: serde_json::from_str(&json)?,
            })),
            None => Ok(None),
        }
    }

    pub fn album_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM albums", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
