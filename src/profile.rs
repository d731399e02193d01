use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::language::{classify, Language};
use crate::lookup::ArtistLookup;
use crate::styles::{all_moods, styles_for_genre, Style, FALLBACK_STYLE};

/// Tracks shorter than this on average push the tempo range up.
const SHORT_TRACK_SECS: u32 = 150;
/// BPM added to both tempo bounds for short-track artists.
const SHORT_TRACK_TEMPO_SHIFT: u32 = 10;

pub const MAX_KEYWORDS: usize = 5;
pub const MAX_THEMES: usize = 7;

const KEYWORDS_FR: &[&str] = &[
    "Nuit", "Ombre", "Lueur", "Silence", "Âme", "Vertige",
    "Brume", "Écho", "Aube", "Ciel", "Larme", "Souffle",
];
const KEYWORDS_EN: &[&str] = &[
    "Shadow", "Light", "Echo", "Dream", "Night", "Fire",
    "Silence", "Road", "Sky", "Time", "Soul", "Wind",
];
const THEMES_FR: &[&str] = &[
    "solitude", "mélancolie", "révolte", "liberté", "errance",
    "nostalgie", "espoir", "quête", "transformation",
];
const THEMES_EN: &[&str] = &[
    "loneliness", "freedom", "rebellion", "hope", "melancholy",
    "search", "truth", "transformation", "wandering",
];

/// Creative parameters for one artist, used to constrain track generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistProfile {
    pub name: String,
    /// Inclusive (low, high) BPM.
    pub tempo_range: (u32, u32),
    pub mood: String,
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
    /// Matched styles, main style first. Never empty.
    pub styles: Vec<Style>,
    pub language: Language,
    /// True when built from catalog data, false for the random fallback.
    pub real_data: bool,
}

/// Build a profile for `name`. Never fails: without usable catalog data
/// (no match, lookup error, or no genres) the profile is randomized.
pub fn interpret_artist(
    name: &str,
    lookup: &mut dyn ArtistLookup,
    rng: &mut dyn RngCore,
) -> ArtistProfile {
    match lookup.lookup(name) {
        Some(data) if !data.genres.is_empty() => {
            log::info!("Real data found for {name} ({})", data.genres.join(", "));
            from_catalog(name, &data.genres, data.avg_duration, rng)
        }
        Some(_) => {
            log::warn!("Fallback for {name} (catalog returned no genres)");
            fallback(name, rng)
        }
        None => {
            log::warn!("Fallback for {name} (artist not found)");
            fallback(name, rng)
        }
    }
}

fn from_catalog(
    name: &str,
    genres: &[String],
    avg_duration: u32,
    rng: &mut dyn RngCore,
) -> ArtistProfile {
    let mut styles: Vec<Style> = Vec::new();
    for style in genres.iter().flat_map(|g| styles_for_genre(g)) {
        if !styles.contains(&style) {
            styles.push(style);
        }
    }
    if styles.is_empty() {
        styles.push(FALLBACK_STYLE);
    }
    let main_style = styles[0];

    let (low, high) = main_style.tempo_range();
    let tempo_range = if avg_duration < SHORT_TRACK_SECS {
        (low + SHORT_TRACK_TEMPO_SHIFT, high + SHORT_TRACK_TEMPO_SHIFT)
    } else {
        (low, high)
    };

    let language = classify(name, Some(genres));
    let (keywords, themes) = vocabulary(language, rng);
    let mood = main_style.moods().choose(rng).copied().unwrap_or_default();

    ArtistProfile {
        name: name.to_string(),
        tempo_range,
        mood: mood.to_string(),
        keywords,
        themes,
        styles,
        language,
        real_data: true,
    }
}

fn fallback(name: &str, rng: &mut dyn RngCore) -> ArtistProfile {
    let language = classify(name, None);
    let (keywords, themes) = vocabulary(language, rng);
    let mood = all_moods().choose(rng).copied().unwrap_or_default();

    let low = rng.gen_range(60..=100);
    let high = rng.gen_range((low + 10).max(90)..=160);

    ArtistProfile {
        name: name.to_string(),
        tempo_range: (low, high),
        mood: mood.to_string(),
        keywords,
        themes,
        styles: vec![FALLBACK_STYLE],
        language,
        real_data: false,
    }
}

/// Shuffled, truncated keyword and theme lists for a language.
fn vocabulary(language: Language, rng: &mut dyn RngCore) -> (Vec<String>, Vec<String>) {
    let (keywords, themes) = match language {
        Language::French => (KEYWORDS_FR, THEMES_FR),
        Language::English => (KEYWORDS_EN, THEMES_EN),
    };
    (
        shuffled_prefix(keywords, MAX_KEYWORDS, rng),
        shuffled_prefix(themes, MAX_THEMES, rng),
    )
}

fn shuffled_prefix(words: &[&str], keep: usize, rng: &mut dyn RngCore) -> Vec<String> {
    let mut words = words.to_vec();
    words.shuffle(rng);
    words.into_iter().take(keep).map(String::from).collect()
}
