use crate::album::Album;

/// One row of the history listing.
#[derive(Debug, Clone)]
pub struct AlbumSummary {
    pub id: i64,
    pub title: String,
    pub theme: String,
    pub track_count: usize,
    pub created_at: String,
}

/// A history entry with its full album.
#[derive(Debug, Clone)]
pub struct StoredAlbum {
    pub id: i64,
    pub album: Album,
}
