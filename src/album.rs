use std::collections::{HashMap, HashSet};

use chrono::{Local, NaiveDateTime, SubsecRound};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::Language;
use crate::lookup::ArtistLookup;
use crate::profile::{interpret_artist, ArtistProfile};
use crate::styles::Style;
use crate::title::generate_title;

pub const MAX_ARTISTS: usize = 15;
pub const MIN_TRACKS: usize = 3;
pub const MAX_TRACKS: usize = 30;

/// Inclusive track duration bounds, seconds.
const TRACK_DURATION: (u32, u32) = (150, 300);

const ALBUM_WORDS_FR: &[&str] = &["Écho", "Cycle", "Vision", "Nuit", "Odyssée"];
const ALBUM_WORDS_EN: &[&str] = &["Echo", "Cycle", "Vision", "Night", "Odyssey"];

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("select at least one style")]
    NoStyles,
    #[error("add at least one artist")]
    NoArtists,
    #[error("too many artists: {count} (maximum {})", MAX_ARTISTS)]
    TooManyArtists { count: usize },
    #[error("too few tracks: {count} (minimum {})", MIN_TRACKS)]
    TooFewTracks { count: usize },
    #[error("too many tracks: {count} (maximum {})", MAX_TRACKS)]
    TooManyTracks { count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Seconds.
    pub duration: u32,
    /// BPM, within the source artist's tempo range.
    pub tempo: u32,
    pub mood: String,
    pub theme: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub title: String,
    pub styles: Vec<Style>,
    pub artists: Vec<String>,
    pub theme: String,
    pub narration: String,
    pub tracks: Vec<Track>,
    pub created_at: NaiveDateTime,
}

/// Summary figures shown under a tracklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumStats {
    pub track_count: usize,
    /// Whole minutes, rounded down.
    pub total_minutes: u32,
    /// Integer mean BPM; 0 for an empty album.
    pub average_tempo: u32,
}

impl Album {
    pub fn stats(&self) -> AlbumStats {
        let total_secs: u32 = self.tracks.iter().map(|t| t.duration).sum();
        let tempo_sum: u32 = self.tracks.iter().map(|t| t.tempo).sum();
        let average_tempo = match self.tracks.len() {
            0 => 0,
            n => tempo_sum / n as u32,
        };
        AlbumStats {
            track_count: self.tracks.len(),
            total_minutes: total_secs / 60,
            average_tempo,
        }
    }

    pub fn created_at_display(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}

/// Checks run before any lookup, in order; the first failure wins.
pub fn validate(styles: &[Style], artist_count: usize, track_count: usize) -> Result<(), ValidationError> {
    if styles.is_empty() {
        return Err(ValidationError::NoStyles);
    }
    if artist_count == 0 {
        return Err(ValidationError::NoArtists);
    }
    if artist_count > MAX_ARTISTS {
        return Err(ValidationError::TooManyArtists { count: artist_count });
    }
    if track_count < MIN_TRACKS {
        return Err(ValidationError::TooFewTracks { count: track_count });
    }
    if track_count > MAX_TRACKS {
        return Err(ValidationError::TooManyTracks { count: track_count });
    }
    Ok(())
}

/// Everything album generation needs: the catalog lookup, the random
/// source, and the albums generated so far.
pub struct GenerationContext<'a> {
    lookup: Box<dyn ArtistLookup + 'a>,
    rng: Box<dyn RngCore + 'a>,
    history: Vec<Album>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(lookup: impl ArtistLookup + 'a, rng: impl RngCore + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
            rng: Box::new(rng),
            history: Vec::new(),
        }
    }

    /// Albums generated through this context, oldest first.
    pub fn history(&self) -> &[Album] {
        &self.history
    }

    /// Generate an album and append it to the history.
    ///
    /// Only input validation can fail; lookup problems degrade the affected
    /// artists to randomized profiles.
    pub fn generate_album<S: AsRef<str>>(
        &mut self,
        styles: &[Style],
        artists: &[S],
        track_count: usize,
        theme: &str,
    ) -> Result<Album, ValidationError> {
        validate(styles, artists.len(), track_count)?;

        let lookup = &mut *self.lookup;
        let rng = &mut *self.rng;

        let profiles: Vec<ArtistProfile> = artists
            .iter()
            .map(|name| interpret_artist(name.as_ref(), lookup, rng))
            .collect();
        let real = profiles.iter().filter(|p| p.real_data).count();
        log::info!("{real}/{} artists analysed from catalog data", profiles.len());

        let language = dominant_language(&profiles);
        let tracks = generate_tracks(&profiles, styles, track_count, lookup, rng)
            .into_iter()
            .map(|(_, track)| track)
            .collect();

        let album_words = match language {
            Language::French => ALBUM_WORDS_FR,
            Language::English => ALBUM_WORDS_EN,
        };

        let album = Album {
            title: generate_title(album_words, theme, language, rng),
            styles: styles.to_vec(),
            artists: artists.iter().map(|a| a.as_ref().to_string()).collect(),
            theme: theme.to_string(),
            narration: narration(theme),
            tracks,
            created_at: Local::now().naive_local().trunc_subsecs(0),
        };

        self.history.push(album.clone());
        Ok(album)
    }
}

/// French only with a strict majority; ties go to English.
fn dominant_language(profiles: &[ArtistProfile]) -> Language {
    let french = profiles.iter().filter(|p| p.language == Language::French).count();
    let english = profiles.len() - french;
    if french > english {
        Language::French
    } else {
        Language::English
    }
}

fn narration(theme: &str) -> String {
    format!(
        "Album narratif explorant le thème '{theme}', \
         à travers des esthétiques musicales et émotionnelles variées."
    )
}

/// Build `count` tracks, each tagged with the index of its source profile.
///
/// Themes are not repeated within the album until the chosen artist has none
/// left, at which point the used set is cleared.
fn generate_tracks(
    profiles: &[ArtistProfile],
    styles: &[Style],
    count: usize,
    lookup: &mut dyn ArtistLookup,
    rng: &mut dyn RngCore,
) -> Vec<(usize, Track)> {
    let style_moods: Vec<&str> = styles.iter().flat_map(|s| s.moods().iter().copied()).collect();
    let mut used_themes: HashSet<String> = HashSet::new();
    let mut links: HashMap<String, String> = HashMap::new();
    let mut tracks = Vec::with_capacity(count);

    for _ in 0..count {
        let source = rng.gen_range(0..profiles.len());
        let artist = &profiles[source];

        let mut available: Vec<&str> = artist
            .themes
            .iter()
            .map(String::as_str)
            .filter(|t| !used_themes.contains(*t))
            .collect();
        if available.is_empty() {
            used_themes.clear();
            available = artist.themes.iter().map(String::as_str).collect();
        }
        let theme = available.choose(rng).copied().unwrap_or_default().to_string();
        used_themes.insert(theme.clone());

        let words: Vec<&str> = artist
            .keywords
            .iter()
            .map(String::as_str)
            .chain(style_moods.iter().copied())
            .collect();
        let title = generate_title(&words, &theme, artist.language, rng);

        let link = links
            .entry(artist.name.clone())
            .or_insert_with(|| lookup.link(&artist.name))
            .clone();

        tracks.push((
            source,
            Track {
                title,
                duration: rng.gen_range(TRACK_DURATION.0..=TRACK_DURATION.1),
                tempo: rng.gen_range(artist.tempo_range.0..=artist.tempo_range.1),
                mood: artist.mood.clone(),
                theme,
                link,
            },
        ));
    }

    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::lookup::{sample_artist, CachedLookup, Offline, StaticLookup, DEFAULT_LINK};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn offline_context(seed: u64) -> GenerationContext<'static> {
        GenerationContext::new(Offline, StdRng::seed_from_u64(seed))
    }

    fn profile(name: &str, tempo: (u32, u32), themes: &[&str], language: Language) -> ArtistProfile {
        ArtistProfile {
            name: name.to_string(),
            tempo_range: tempo,
            mood: "sombre".to_string(),
            keywords: vec!["Ombre".to_string(), "Brume".to_string()],
            themes: themes.iter().map(|t| t.to_string()).collect(),
            styles: vec![Style::Rap],
            language,
            real_data: false,
        }
    }

    #[test]
    fn test_validation_errors_in_order() {
        let mut ctx = offline_context(1);
        let no_artists: [&str; 0] = [];
        assert_eq!(
            ctx.generate_album(&[], &["a"], 8, "t").unwrap_err(),
            ValidationError::NoStyles
        );
        assert_eq!(
            ctx.generate_album(&[Style::Rap], &no_artists, 8, "t").unwrap_err(),
            ValidationError::NoArtists
        );
        assert_eq!(
            ctx.generate_album(&[Style::Rap], &["a"], 2, "t").unwrap_err(),
            ValidationError::TooFewTracks { count: 2 }
        );
        assert_eq!(
            ctx.generate_album(&[Style::Rap], &["a"], 31, "t").unwrap_err(),
            ValidationError::TooManyTracks { count: 31 }
        );
        let sixteen: Vec<String> = (0..16).map(|i| format!("artist {i}")).collect();
        assert_eq!(
            ctx.generate_album(&[Style::Rap], &sixteen, 8, "t").unwrap_err(),
            ValidationError::TooManyArtists { count: 16 }
        );
        // Styles are checked before artists, artists before tracks
        assert_eq!(
            ctx.generate_album(&[], &no_artists, 0, "t").unwrap_err(),
            ValidationError::NoStyles
        );
        assert_eq!(
            ctx.generate_album(&[Style::Rap], &sixteen, 0, "t").unwrap_err(),
            ValidationError::TooManyArtists { count: 16 }
        );
        assert!(ctx.history().is_empty());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::NoStyles.to_string(), "select at least one style");
        assert_eq!(
            ValidationError::TooManyArtists { count: 16 }.to_string(),
            "too many artists: 16 (maximum 15)"
        );
        assert_eq!(
            ValidationError::TooFewTracks { count: 2 }.to_string(),
            "too few tracks: 2 (minimum 3)"
        );
    }

    #[test]
    fn test_bounds_are_accepted() {
        let mut ctx = offline_context(2);
        let fifteen: Vec<String> = (0..15).map(|i| format!("artist {i}")).collect();
        assert_eq!(ctx.generate_album(&[Style::Jazz], &fifteen, 3, "t").unwrap().tracks.len(), 3);
        assert_eq!(ctx.generate_album(&[Style::Jazz], &["a"], 30, "t").unwrap().tracks.len(), 30);
    }

    #[test]
    fn test_track_count_and_fields() {
        for seed in 0..20 {
            let mut ctx = offline_context(seed);
            let n = 3 + (seed as usize % 28);
            let album = ctx
                .generate_album(&[Style::Drill, Style::Trap], &["1pliké140", "Freeze Corleone"], n, "rue")
                .unwrap();
            assert_eq!(album.tracks.len(), n);
            assert_eq!(album.styles, vec![Style::Drill, Style::Trap]);
            assert_eq!(album.artists, vec!["1pliké140", "Freeze Corleone"]);
            assert_eq!(album.theme, "rue");
            for t in &album.tracks {
                assert!((150..=300).contains(&t.duration));
                assert!((60..=160).contains(&t.tempo));
                assert_eq!(t.link, DEFAULT_LINK);
                assert!(!t.title.is_empty());
            }
        }
    }

    #[test]
    fn test_tempo_within_source_artist_range() {
        let profiles = vec![
            profile("slow", (60, 70), &["a", "b", "c"], Language::English),
            profile("fast", (150, 160), &["d", "e"], Language::French),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let tracks = generate_tracks(&profiles, &[Style::Lofi], 30, &mut Offline, &mut rng);
        assert_eq!(tracks.len(), 30);
        for (source, track) in &tracks {
            let (low, high) = profiles[*source].tempo_range;
            assert!(track.tempo >= low && track.tempo <= high);
            assert!(profiles[*source].themes.contains(&track.theme));
        }
    }

    #[test]
    fn test_theme_rotation_resets_after_exhaustion() {
        let profiles = vec![profile("solo", (90, 100), &["x", "y"], Language::English)];
        let mut rng = StdRng::seed_from_u64(4);
        let tracks = generate_tracks(&profiles, &[Style::Rap], 10, &mut Offline, &mut rng);
        let themes: Vec<&str> = tracks.iter().map(|(_, t)| t.theme.as_str()).collect();
        // Each pair uses both themes: no repeat until exhausted, then reuse allowed
        for pair in themes.chunks(2) {
            assert_ne!(pair[0], pair[1], "{themes:?}");
        }
    }

    #[test]
    fn test_title_words_from_keywords_and_style_moods() {
        let profiles = vec![profile("solo", (90, 100), &["x"], Language::English)];
        let mut rng = StdRng::seed_from_u64(8);
        let tracks = generate_tracks(&profiles, &[Style::House], 30, &mut Offline, &mut rng);
        let vocab = ["Ombre", "Brume", "groove", "festif", "solaire"];
        for (_, t) in &tracks {
            let lower = t.title.to_lowercase();
            assert!(vocab.iter().any(|w| lower.contains(&w.to_lowercase())), "{}", t.title);
        }
    }

    #[test]
    fn test_real_data_links_and_language() {
        let lookup = StaticLookup::default()
            .with(sample_artist("Nekfeu", &["Rap/Hip Hop"], 200))
            .with(sample_artist("Orelsan", &["Rap/Hip Hop"], 140));
        let mut ctx = GenerationContext::new(lookup, StdRng::seed_from_u64(3));
        let album = ctx
            .generate_album(&[Style::Rap], &["Nekfeu", "Orelsan"], 12, "ville")
            .unwrap();
        for t in &album.tracks {
            assert!(t.link.starts_with("https://www.deezer.com/artist/"));
            assert!((80..=120).contains(&t.tempo));
        }
        assert!(album.narration.starts_with("Album narratif"));
        assert!(album.narration.contains("'ville'"));
    }

    #[test]
    fn test_dominant_language_tie_goes_english() {
        let fr = profile("a", (90, 100), &["x"], Language::French);
        let en = profile("b", (90, 100), &["x"], Language::English);
        assert_eq!(dominant_language(&[fr.clone(), en.clone()]), Language::English);
        assert_eq!(dominant_language(&[fr.clone(), fr.clone(), en.clone()]), Language::French);
        assert_eq!(dominant_language(&[en]), Language::English);
        assert_eq!(dominant_language(&[fr]), Language::French);
    }

    #[test]
    fn test_narration_is_french_for_english_albums() {
        let mut ctx = offline_context(5);
        let album = ctx.generate_album(&[Style::Pop], &["Radiohead"], 4, "hope").unwrap();
        assert_eq!(
            album.narration,
            "Album narratif explorant le thème 'hope', \
             à travers des esthétiques musicales et émotionnelles variées."
        );
    }

    #[test]
    fn test_unknown_artist_searched_once_per_run() {
        let db = Database::open_in_memory().unwrap();
        let mut inner = StaticLookup::default();
        {
            let lookup = CachedLookup::new(&mut inner, &db, 30);
            let mut ctx = GenerationContext::new(lookup, StdRng::seed_from_u64(12));
            let album = ctx.generate_album(&[Style::Rap], &["Ghost"], 5, "t").unwrap();
            assert!(album.tracks.iter().all(|t| t.link == DEFAULT_LINK));
        }
        assert_eq!(inner.calls_for("Ghost"), 1);
    }

    #[test]
    fn test_history_appends_in_order() {
        let mut ctx = offline_context(6);
        let first = ctx.generate_album(&[Style::Rock], &["a"], 3, "one").unwrap();
        let second = ctx.generate_album(&[Style::Rock], &["b"], 3, "two").unwrap();
        assert_eq!(ctx.history().len(), 2);
        assert_eq!(ctx.history()[0], first);
        assert_eq!(ctx.history()[1], second);
    }

    #[test]
    fn test_stats() {
        let mut ctx = offline_context(7);
        let mut album = ctx.generate_album(&[Style::Rock], &["a"], 3, "t").unwrap();
        for (t, (d, bpm)) in album.tracks.iter_mut().zip([(150, 100), (200, 101), (250, 120)]) {
            t.duration = d;
            t.tempo = bpm;
        }
        let stats = album.stats();
        assert_eq!(stats.track_count, 3);
        assert_eq!(stats.total_minutes, 10);
        assert_eq!(stats.average_tempo, 107);

        album.tracks.clear();
        assert_eq!(album.stats().average_tempo, 0);
    }
}
