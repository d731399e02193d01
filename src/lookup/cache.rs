use std::collections::HashSet;

use super::{ArtistData, ArtistLookup, DEFAULT_LINK};
use crate::db::Database;

/// Wraps a lookup with the database artist and link caches.
///
/// Cache reads honour `ttl_days`; `refresh` skips reads but still writes.
/// Cache errors are logged and the call proceeds uncached. Placeholder links
/// are never stored, so a later successful lookup can replace them.
///
/// Names the inner lookup could not resolve are remembered for the lifetime
/// of this value only; a new run searches them again.
pub struct CachedLookup<'db, L> {
    inner: L,
    db: &'db Database,
    ttl_days: i64,
    refresh: bool,
    misses: HashSet<String>,
}

impl<'db, L: ArtistLookup> CachedLookup<'db, L> {
    pub fn new(inner: L, db: &'db Database, ttl_days: i64) -> Self {
        Self {
            inner,
            db,
            ttl_days,
            refresh: false,
            misses: HashSet::new(),
        }
    }

    /// Bypass cached entries (they are overwritten by fresh results).
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

impl<L: ArtistLookup> ArtistLookup for CachedLookup<'_, L> {
    fn lookup(&mut self, name: &str) -> Option<ArtistData> {
        let key = name.trim().to_lowercase();
        if self.misses.contains(&key) {
            log::debug!("Skipping {name}: not found earlier in this run");
            return None;
        }

        if !self.refresh {
            match self.db.get_cached_artist(name, self.ttl_days) {
                Ok(Some(data)) => {
                    log::debug!("Artist cache hit for {name}");
                    return Some(data);
                }
                Ok(None) => {}
                Err(e) => log::warn!("Artist cache read failed for {name}: {e}"),
            }
        }

        let Some(data) = self.inner.lookup(name) else {
            self.misses.insert(key);
            return None;
        };
        if let Err(e) = self.db.store_cached_artist(name, &data) {
            log::warn!("Failed to cache artist {name}: {e}");
        }
        Some(data)
    }

    fn link(&mut self, name: &str) -> String {
        if !self.refresh {
            match self.db.get_cached_link(name, self.ttl_days) {
                Ok(Some(link)) => return link,
                Ok(None) => {}
                Err(e) => log::warn!("Link cache read failed for {name}: {e}"),
            }
        }

        match self.lookup(name) {
            Some(data) if data.link != DEFAULT_LINK => {
                if let Err(e) = self.db.store_cached_link(name, &data.link) {
                    log::warn!("Failed to cache link for {name}: {e}");
                }
                data.link
            }
            _ => DEFAULT_LINK.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{sample_artist, StaticLookup};

    #[test]
    fn test_second_lookup_served_from_cache() {
        let db = Database::open_in_memory().unwrap();
        let mut inner = StaticLookup::default().with(sample_artist("Nekfeu", &["Rap/Hip Hop"], 200));
        {
            let mut cached = CachedLookup::new(&mut inner, &db, 30);
            assert!(cached.lookup("Nekfeu").is_some());
            assert_eq!(cached.lookup("Nekfeu").unwrap().avg_duration, 200);
        }
        assert_eq!(inner.calls_for("Nekfeu"), 1);
    }

    #[test]
    fn test_misses_remembered_for_the_run_only() {
        let db = Database::open_in_memory().unwrap();
        let mut inner = StaticLookup::default();
        {
            let mut cached = CachedLookup::new(&mut inner, &db, 30);
            assert!(cached.lookup("Ghost").is_none());
            assert!(cached.lookup(" ghost ").is_none());
            assert_eq!(cached.link("Ghost"), DEFAULT_LINK);
        }
        assert_eq!(inner.calls_for("Ghost"), 1);
        assert!(db.get_cached_artist("Ghost", 30).unwrap().is_none());

        // A new lookup over the same database searches again
        {
            let mut cached = CachedLookup::new(&mut inner, &db, 30);
            assert!(cached.lookup("Ghost").is_none());
        }
        assert_eq!(inner.calls_for("Ghost"), 2);
    }

    #[test]
    fn test_refresh_bypasses_reads() {
        let db = Database::open_in_memory().unwrap();
        let mut inner = StaticLookup::default().with(sample_artist("Muse", &["Rock"], 240));
        {
            let mut cached = CachedLookup::new(&mut inner, &db, 30).refresh(true);
            cached.lookup("Muse");
            cached.lookup("Muse");
        }
        assert_eq!(inner.calls_for("Muse"), 2);
        // Fresh results were still written
        assert!(db.get_cached_artist("Muse", 30).unwrap().is_some());
    }

    #[test]
    fn test_link_cached_and_placeholder_not_persisted() {
        let db = Database::open_in_memory().unwrap();
        let mut inner = StaticLookup::default().with(sample_artist("Muse", &["Rock"], 240));
        let mut cached = CachedLookup::new(&mut inner, &db, 30);

        assert_eq!(cached.link("Muse"), "https://www.deezer.com/artist/4");
        assert_eq!(cached.link("Ghost"), DEFAULT_LINK);
        drop(cached);

        assert_eq!(
            db.get_cached_link("Muse", 30).unwrap().as_deref(),
            Some("https://www.deezer.com/artist/4")
        );
        assert!(db.get_cached_link("Ghost", 30).unwrap().is_none());
    }

    #[test]
    fn test_catalog_placeholder_link_not_persisted() {
        let db = Database::open_in_memory().unwrap();
        let mut artist = sample_artist("Nameless", &["Pop"], 200);
        artist.link = DEFAULT_LINK.to_string();
        let mut inner = StaticLookup::default().with(artist);
        let mut cached = CachedLookup::new(&mut inner, &db, 30);

        assert_eq!(cached.link("Nameless"), DEFAULT_LINK);
        drop(cached);

        assert!(db.get_cached_link("Nameless", 30).unwrap().is_none());
        // The artist data itself is still cached
        assert!(db.get_cached_artist("Nameless", 30).unwrap().is_some());
    }
}
