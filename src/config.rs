use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;

const DB_FILE_NAME: &str = "albumgen.db";

/// Settings from `config.toml`. Every field is optional in the file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Custom database path (overrides XDG default).
    pub db_path: Option<PathBuf>,
    /// Never contact Deezer; every artist takes the fallback path.
    pub offline: bool,
    /// Track count used when `generate` gets no `--tracks`.
    pub default_tracks: usize,
    /// Theme used when `generate` gets a blank or missing `--theme`.
    pub default_theme: String,
    /// Deezer API settings.
    pub deezer: DeezerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            offline: false,
            default_tracks: 8,
            default_theme: "libre".to_string(),
            deezer: DeezerConfig::default(),
        }
    }
}

/// Deezer API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeezerConfig {
    /// Timeout for artist search and top-track requests, in seconds.
    pub timeout_secs: u64,
    /// Timeout for per-album genre requests, in seconds.
    pub album_timeout_secs: u64,
    /// How many top tracks to inspect per artist.
    pub top_tracks: usize,
    /// Cache TTL in days before re-fetching an artist from Deezer.
    pub cache_ttl_days: i64,
    /// Pause between artists in `lookup`, in milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for DeezerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            album_timeout_secs: 3,
            top_tracks: 10,
            cache_ttl_days: 30,
            rate_limit_ms: 250,
        }
    }
}

impl AppConfig {
    /// Read `config.toml` from the albumgen config directory. A missing file
    /// means built-in defaults; an unreadable or malformed one is reported
    /// and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::config_path().filter(|p| p.exists()) else {
            log::debug!("No albumgen config file, using built-in defaults");
            return Self::default();
        };
        match Self::read(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path).context("cannot read file")?;
        Self::from_toml(&contents).context("invalid TOML")
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The theme to use for a user-supplied value: blank → `default_theme`.
    pub fn resolve_theme(&self, theme: Option<&str>) -> String {
        match theme.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self.default_theme.clone(),
        }
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// `albumgen.db` in the platform data directory, or in the working directory
/// when no home directory can be determined.
pub fn default_db_path() -> PathBuf {
    let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) else {
        return PathBuf::from(DB_FILE_NAME);
    };
    let data_dir = dirs.data_dir();
    if let Err(e) = std::fs::create_dir_all(data_dir) {
        log::warn!("Cannot create {}: {e}", data_dir.display());
    }
    data_dir.join(DB_FILE_NAME)
}
