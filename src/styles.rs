use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A musical style bucket. Closed set; unknown identifiers never parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    #[serde(rename = "rap")]
    Rap,
    #[serde(rename = "trap")]
    Trap,
    #[serde(rename = "drill")]
    Drill,
    #[serde(rename = "boom bap")]
    BoomBap,
    #[serde(rename = "pop")]
    Pop,
    #[serde(rename = "r&b")]
    RnB,
    #[serde(rename = "electro")]
    Electro,
    #[serde(rename = "techno")]
    Techno,
    #[serde(rename = "house")]
    House,
    #[serde(rename = "ambient")]
    Ambient,
    #[serde(rename = "lofi")]
    Lofi,
    #[serde(rename = "jazz")]
    Jazz,
    #[serde(rename = "neo-jazz")]
    NeoJazz,
    #[serde(rename = "rock")]
    Rock,
    #[serde(rename = "indie")]
    Indie,
    #[serde(rename = "metal")]
    Metal,
    #[serde(rename = "cinematic")]
    Cinematic,
}

/// The style used whenever nothing better is known about an artist.
pub const FALLBACK_STYLE: Style = Style::Rap;

/// Static tempo range and mood vocabulary for one style.
#[derive(Debug)]
pub struct StyleDefinition {
    pub id: &'static str,
    /// Inclusive (low, high) BPM.
    pub tempo: (u32, u32),
    pub moods: &'static [&'static str],
}

/// Catalog in declaration order of `Style`.
static CATALOG: [StyleDefinition; 17] = [
    StyleDefinition { id: "rap", tempo: (80, 110), moods: &["brut", "introspectif", "réaliste"] },
    StyleDefinition { id: "trap", tempo: (120, 150), moods: &["tendu", "minimal", "sombre"] },
    StyleDefinition { id: "drill", tempo: (130, 150), moods: &["froid", "menaçant", "urbain"] },
    StyleDefinition { id: "boom bap", tempo: (85, 100), moods: &["authentique", "old-school", "lyrical"] },
    StyleDefinition { id: "pop", tempo: (90, 120), moods: &["émotionnel", "lumineux", "accessible"] },
    StyleDefinition { id: "r&b", tempo: (70, 100), moods: &["sensuel", "intime", "doux"] },
    StyleDefinition { id: "electro", tempo: (115, 140), moods: &["futuriste", "énergique", "hypnotique"] },
    StyleDefinition { id: "techno", tempo: (125, 145), moods: &["industriel", "transe", "sombre"] },
    StyleDefinition { id: "house", tempo: (118, 130), moods: &["groove", "festif", "solaire"] },
    StyleDefinition { id: "ambient", tempo: (50, 80), moods: &["planant", "méditatif", "minimal"] },
    StyleDefinition { id: "lofi", tempo: (60, 90), moods: &["nostalgique", "calme", "intimiste"] },
    StyleDefinition { id: "jazz", tempo: (90, 140), moods: &["libre", "nocturne", "chaleureux"] },
    StyleDefinition { id: "neo-jazz", tempo: (95, 125), moods: &["fluide", "moderne", "atmosphérique"] },
    StyleDefinition { id: "rock", tempo: (100, 140), moods: &["rebelle", "organique", "brut"] },
    StyleDefinition { id: "indie", tempo: (95, 130), moods: &["introspectif", "mélodique", "libre"] },
    StyleDefinition { id: "metal", tempo: (120, 180), moods: &["violent", "épique", "sombre"] },
    StyleDefinition { id: "cinematic", tempo: (60, 100), moods: &["épique", "immersif", "dramatique"] },
];

/// Catalog genre labels → internal style. Order matters: a genre tag can
/// match several entries and the first match becomes the artist's main style.
const GENRE_TABLE: &[(&str, Style)] = &[
    ("Rap/Hip Hop", Style::Rap),
    ("Hip Hop", Style::Rap),
    ("French Rap", Style::Rap),
    ("Trap", Style::Trap),
    ("Drill", Style::Drill),
    ("Pop", Style::Pop),
    ("R&B", Style::RnB),
    ("Electro", Style::Electro),
    ("Dance", Style::House),
    ("Electronic", Style::Electro),
    ("Techno", Style::Techno),
    ("House", Style::House),
    ("Jazz", Style::Jazz),
    ("Rock", Style::Rock),
    ("Alternative", Style::Indie),
    ("Metal", Style::Metal),
];

impl Style {
    pub const ALL: [Style; 17] = [
        Style::Rap,
        Style::Trap,
        Style::Drill,
        Style::BoomBap,
        Style::Pop,
        Style::RnB,
        Style::Electro,
        Style::Techno,
        Style::House,
        Style::Ambient,
        Style::Lofi,
        Style::Jazz,
        Style::NeoJazz,
        Style::Rock,
        Style::Indie,
        Style::Metal,
        Style::Cinematic,
    ];

    pub fn definition(self) -> &'static StyleDefinition {
        &CATALOG[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.definition().id
    }

    pub fn tempo_range(self) -> (u32, u32) {
        self.definition().tempo
    }

    pub fn moods(self) -> &'static [&'static str] {
        self.definition().moods
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Style::ALL
            .iter()
            .copied()
            .find(|style| style.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Style::ALL.iter().map(|s| s.id()).collect();
                format!("unknown style '{s}' (known: {})", known.join(", "))
            })
    }
}

/// Look up a raw style identifier. Absent for anything outside the catalog.
pub fn lookup(style_id: &str) -> Option<&'static StyleDefinition> {
    style_id.parse::<Style>().ok().map(Style::definition)
}

/// Every mood of every style, catalog order, duplicates kept.
pub fn all_moods() -> Vec<&'static str> {
    CATALOG.iter().flat_map(|def| def.moods.iter().copied()).collect()
}

/// Styles whose genre-table label appears (case-insensitively) inside `genre`.
pub fn styles_for_genre(genre: &str) -> Vec<Style> {
    let genre_lower = genre.to_lowercase();
    GENRE_TABLE
        .iter()
        .filter(|(label, _)| genre_lower.contains(&label.to_lowercase()))
        .map(|&(_, style)| style)
        .collect()
}

/// A named starting point: a style mix plus a theme.
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: &'static str,
    pub styles: &'static [Style],
    pub theme: &'static str,
    pub description: &'static str,
}

static PRESETS: [Preset; 5] = [
    Preset {
        name: "Introspectif",
        styles: &[Style::Lofi, Style::Ambient, Style::NeoJazz],
        theme: "introspection",
        description: "Album calme et contemplatif",
    },
    Preset {
        name: "Énergique",
        styles: &[Style::Trap, Style::Electro, Style::Techno],
        theme: "énergie",
        description: "Album dynamique et puissant",
    },
    Preset {
        name: "Nocturne",
        styles: &[Style::Ambient, Style::Jazz, Style::RnB],
        theme: "nuit",
        description: "Ambiance de fin de soirée",
    },
    Preset {
        name: "Urbain",
        styles: &[Style::Rap, Style::Drill, Style::Trap],
        theme: "ville",
        description: "Sonorités street",
    },
    Preset {
        name: "Expérimental",
        styles: &[Style::Techno, Style::Ambient, Style::NeoJazz],
        theme: "exploration",
        description: "Mélange audacieux",
    },
];

pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Find a preset by name, ignoring case and French accents
/// ("energique" finds "Énergique").
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let wanted = crate::language::fold_accents(&name.trim().to_lowercase());
    PRESETS
        .iter()
        .find(|p| crate::language::fold_accents(&p.name.to_lowercase()) == wanted)
}
