pub mod cache;
pub mod deezer;

use serde::{Deserialize, Serialize};

pub use cache::CachedLookup;
pub use deezer::DeezerClient;

/// Link used for tracks whose artist could not be resolved.
pub const DEFAULT_LINK: &str = "https://www.deezer.com";

/// Catalog metadata for one artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistData {
    /// Canonical name as the catalog spells it.
    pub name: String,
    /// Genre labels from the artist's albums, first-seen order, no duplicates.
    pub genres: Vec<String>,
    /// Mean duration of the artist's top tracks, in seconds.
    pub avg_duration: u32,
    pub link: String,
    #[serde(default)]
    pub picture: Option<String>,
    /// Fan count, when the catalog reports one.
    #[serde(default)]
    pub fans: Option<u64>,
}

/// Resolves artist names to catalog metadata.
///
/// Implementations never fail outward: network errors, bad payloads and
/// unknown artists all come back as `None`.
pub trait ArtistLookup {
    fn lookup(&mut self, name: &str) -> Option<ArtistData>;

    /// Reference URL for an artist, or [`DEFAULT_LINK`].
    fn link(&mut self, name: &str) -> String {
        self.lookup(name)
            .map(|data| data.link)
            .unwrap_or_else(|| DEFAULT_LINK.to_string())
    }
}

impl<L: ArtistLookup + ?Sized> ArtistLookup for &mut L {
    fn lookup(&mut self, name: &str) -> Option<ArtistData> {
        (**self).lookup(name)
    }

    fn link(&mut self, name: &str) -> String {
        (**self).link(name)
    }
}

/// Lookup that knows nothing. Every artist takes the fallback path.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl ArtistLookup for Offline {
    fn lookup(&mut self, _name: &str) -> Option<ArtistData> {
        None
    }

    fn link(&mut self, _name: &str) -> String {
        DEFAULT_LINK.to_string()
    }
}

/// In-memory lookup over fixed data, counting calls per name.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct StaticLookup {
    pub(crate) artists: std::collections::HashMap<String, ArtistData>,
    pub(crate) calls: std::collections::HashMap<String, usize>,
}

#[cfg(test)]
impl StaticLookup {
    pub(crate) fn with(mut self, data: ArtistData) -> Self {
        self.artists.insert(data.name.clone(), data);
        self
    }

    pub(crate) fn calls_for(&self, name: &str) -> usize {
        self.calls.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
impl ArtistLookup for StaticLookup {
    fn lookup(&mut self, name: &str) -> Option<ArtistData> {
        *self.calls.entry(name.to_string()).or_insert(0) += 1;
        self.artists.get(name).cloned()
    }
}

#[cfg(test)]
pub(crate) fn sample_artist(name: &str, genres: &[&str], avg_duration: u32) -> ArtistData {
    ArtistData {
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        avg_duration,
        link: format!("https://www.deezer.com/artist/{}", name.len()),
        picture: None,
        fans: Some(1000),
    }
}
