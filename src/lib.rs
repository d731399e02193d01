pub mod album;
pub mod config;
pub mod db;
pub mod export;
pub mod language;
pub mod lookup;
pub mod profile;
pub mod styles;
pub mod title;

/// Application name for XDG paths
pub const APP_NAME: &str = "albumgen";
