use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::album::Album;

const REPORT_RULE_WIDTH: usize = 60;

/// Output formats for an album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }

    pub fn render(self, album: &Album) -> Result<String> {
        match self {
            Self::Json => to_json(album),
            Self::Csv => Ok(to_csv(album)),
            Self::Text => Ok(to_report(album)),
        }
    }
}

/// Whole album, pretty-printed, tracks nested.
pub fn to_json(album: &Album) -> Result<String> {
    serde_json::to_string_pretty(album).context("Failed to serialize album")
}

/// One row per track: index, title, duration, tempo, mood, theme, link.
pub fn to_csv(album: &Album) -> String {
    let mut out = String::from("#,Title,Duration (s),Tempo (BPM),Mood,Theme,Link\n");
    for (i, t) in album.tracks.iter().enumerate() {
        let row = [
            (i + 1).to_string(),
            csv_field(&t.title),
            t.duration.to_string(),
            t.tempo.to_string(),
            csv_field(&t.mood),
            csv_field(&t.theme),
            csv_field(&t.link),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `m:ss`
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Human-readable report: header block, narration, tracklist.
pub fn to_report(album: &Album) -> String {
    let styles: Vec<&str> = album.styles.iter().map(|s| s.id()).collect();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", album.title);
    let _ = writeln!(out, "{}\n", "=".repeat(REPORT_RULE_WIDTH));
    let _ = writeln!(out, "Theme:   {}", album.theme);
    let _ = writeln!(out, "Styles:  {}", styles.join(", "));
    let _ = writeln!(out, "Artists: {}", album.artists.join(", "));
    let _ = writeln!(out, "Created: {}\n", album.created_at_display());
    let _ = writeln!(out, "{}\n", album.narration);
    let _ = writeln!(out, "TRACKLIST");
    let _ = writeln!(out, "{}\n", "-".repeat(REPORT_RULE_WIDTH));

    for (i, t) in album.tracks.iter().enumerate() {
        let _ = writeln!(out, "{:2}. {}", i + 1, t.title);
        let _ = writeln!(
            out,
            "    {}  |  {} BPM  |  {}",
            format_duration(t.duration),
            t.tempo,
            t.mood
        );
        let _ = writeln!(out, "    Theme: {}", t.theme);
        let _ = writeln!(out, "    {}\n", t.link);
    }

    out
}

/// File name derived from the album title: spaces → `_`, `/` → `-`.
pub fn default_file_name(album: &Album, format: ExportFormat) -> String {
    let stem = album.title.replace(' ', "_").replace('/', "-");
    format!("{stem}.{}", format.extension())
}

/// Render `album` and write it to `path`.
pub fn write_album(album: &Album, format: ExportFormat, path: &Path) -> Result<()> {
    let contents = format.render(album)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Exported {} to {}", format.extension(), path.display());
    Ok(())
}
