use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use ureq::Agent;

use super::{ArtistData, ArtistLookup, DEFAULT_LINK};
use crate::config::DeezerConfig;

const API_BASE: &str = "https://api.deezer.com";
const USER_AGENT: &str = "AlbumGenerator/2.0";

/// Used when none of the top tracks report a duration.
const DEFAULT_AVG_DURATION: u32 = 180;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),
}

/// Deezer list envelope (`{"data": [...]}`). Error payloads have no `data`.
#[derive(Debug, Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchArtist {
    id: u64,
    name: Option<String>,
    link: Option<String>,
    picture_medium: Option<String>,
    nb_fan: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TopTrack {
    duration: Option<u32>,
    album: Option<AlbumRef>,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AlbumDetail {
    genres: Option<DataList<Genre>>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: Option<String>,
}

/// Blocking Deezer API client.
///
/// Resolves an artist by searching, reading their top tracks, and pulling
/// genres from each track's album.
pub struct DeezerClient {
    agent: Agent,
    album_agent: Agent,
    top_tracks: usize,
}

fn build_agent(timeout_secs: u64) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build()
        .into()
}

impl DeezerClient {
    pub fn new(config: &DeezerConfig) -> Self {
        Self {
            agent: build_agent(config.timeout_secs),
            album_agent: build_agent(config.album_timeout_secs),
            top_tracks: config.top_tracks,
        }
    }

    /// Fetch artist metadata. `Ok(None)` when Deezer has no such artist or
    /// no top tracks for it.
    pub fn fetch_artist(&self, name: &str) -> Result<Option<ArtistData>, LookupError> {
        log::debug!("Searching Deezer for {name}");
        let search: DataList<SearchArtist> = self
            .agent
            .get(&format!("{API_BASE}/search/artist"))
            .header("User-Agent", USER_AGENT)
            .query("q", name)
            .call()?
            .body_mut()
            .read_json()?;

        // First hit is the most relevant one
        let Some(artist) = search.data.into_iter().next() else {
            return Ok(None);
        };

        let top_url = format!("{API_BASE}/artist/{}/top?limit={}", artist.id, self.top_tracks);
        let top: DataList<TopTrack> = self
            .agent
            .get(&top_url)
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_json()?;

        if top.data.is_empty() {
            return Ok(None);
        }

        let genres = self.collect_genres(&top.data);
        Ok(Some(summarize(name, artist, &top.data, genres)))
    }

    /// Genre names across the albums of `tracks`, fetching each album once.
    /// Album failures are logged and skipped.
    fn collect_genres(&self, tracks: &[TopTrack]) -> Vec<String> {
        let mut fetched: HashMap<u64, Vec<String>> = HashMap::new();
        let mut genres: Vec<String> = Vec::new();

        for album_id in tracks.iter().filter_map(|t| t.album.as_ref()?.id) {
            if !fetched.contains_key(&album_id) {
                let names = match self.fetch_album_genres(album_id) {
                    Ok(names) => names,
                    Err(e) => {
                        log::debug!("  album {album_id}: {e}");
                        Vec::new()
                    }
                };
                fetched.insert(album_id, names);
            }
            for genre in &fetched[&album_id] {
                if !genres.contains(genre) {
                    genres.push(genre.clone());
                }
            }
        }

        genres
    }

    fn fetch_album_genres(&self, album_id: u64) -> Result<Vec<String>, LookupError> {
        let album: AlbumDetail = self
            .album_agent
            .get(&format!("{API_BASE}/album/{album_id}"))
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_json()?;

        Ok(album
            .genres
            .map(|list| list.data.into_iter().filter_map(|g| g.name).collect())
            .unwrap_or_default())
    }
}

impl ArtistLookup for DeezerClient {
    fn lookup(&mut self, name: &str) -> Option<ArtistData> {
        match self.fetch_artist(name) {
            Ok(Some(data)) => Some(data),
            Ok(None) => {
                log::info!("Deezer has no match for {name}");
                None
            }
            Err(e) => {
                log::warn!("Deezer lookup failed for {name}: {e}");
                None
            }
        }
    }
}

/// Fold a search hit and its top tracks into `ArtistData`.
fn summarize(query: &str, artist: SearchArtist, tracks: &[TopTrack], genres: Vec<String>) -> ArtistData {
    let durations: Vec<u32> = tracks.iter().filter_map(|t| t.duration).filter(|&d| d > 0).collect();
    let avg_duration = if durations.is_empty() {
        DEFAULT_AVG_DURATION
    } else {
        (durations.iter().map(|&d| d as u64).sum::<u64>() / durations.len() as u64) as u32
    };

    ArtistData {
        name: artist.name.unwrap_or_else(|| query.to_string()),
        genres,
        avg_duration,
        link: artist.link.unwrap_or_else(|| DEFAULT_LINK.to_string()),
        picture: artist.picture_medium.filter(|p| !p.is_empty()),
        fans: artist.nb_fan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_deserialize() {
        let json = r#"{"data": [{"id": 27, "name": "Daft Punk", "link": "https://www.deezer.com/artist/27",
            "picture_medium": "https://e-cdns-images.dzcdn.net/27.jpg", "nb_fan": 4200000, "type": "artist"}],
            "total": 1}"#;
        let resp: DataList<SearchArtist> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].id, 27);
        assert_eq!(resp.data[0].nb_fan, Some(4200000));
    }

    #[test]
    fn test_error_payload_has_no_data() {
        let json = r#"{"error": {"type": "DataException", "message": "no data", "code": 800}}"#;
        let resp: DataList<SearchArtist> = serde_json::from_str(json).unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn test_album_genres_deserialize() {
        let json = r#"{"id": 302127, "genres": {"data": [{"id": 113, "name": "Dance"}, {"id": 106, "name": "Electro"}]}}"#;
        let album: AlbumDetail = serde_json::from_str(json).unwrap();
        let names: Vec<String> = album.genres.unwrap().data.into_iter().filter_map(|g| g.name).collect();
        assert_eq!(names, vec!["Dance", "Electro"]);
    }

    fn hit(name: Option<&str>, link: Option<&str>) -> SearchArtist {
        SearchArtist {
            id: 1,
            name: name.map(String::from),
            link: link.map(String::from),
            picture_medium: Some(String::new()),
            nb_fan: None,
        }
    }

    fn track(duration: Option<u32>) -> TopTrack {
        TopTrack { duration, album: None }
    }

    #[test]
    fn test_summarize_average_duration() {
        let tracks = vec![track(Some(120)), track(Some(181)), track(None)];
        let data = summarize("pnl", hit(Some("PNL"), Some("https://www.deezer.com/artist/1")), &tracks, vec!["Rap/Hip Hop".into()]);
        assert_eq!(data.name, "PNL");
        assert_eq!(data.avg_duration, 150);
        assert_eq!(data.genres, vec!["Rap/Hip Hop"]);
        assert!(data.picture.is_none());
    }

    #[test]
    fn test_summarize_defaults() {
        let data = summarize("someone", hit(None, None), &[track(None)], Vec::new());
        assert_eq!(data.name, "someone");
        assert_eq!(data.avg_duration, DEFAULT_AVG_DURATION);
        assert_eq!(data.link, DEFAULT_LINK);
    }
}
