use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use albumgen::album::{Album, GenerationContext};
use albumgen::config::AppConfig;
use albumgen::db::Database;
use albumgen::export::{self, ExportFormat};
use albumgen::lookup::{CachedLookup, DeezerClient, Offline};
use albumgen::profile::interpret_artist;
use albumgen::styles::{self, Style};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "albumgen", version, about = "Fictitious album generator")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    #[value(alias = "txt")]
    Text,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Text => ExportFormat::Text,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an album from styles, artists and a theme
    Generate {
        /// Styles (repeat or comma-separate; quote "boom bap" and "r&b")
        #[arg(short, long = "style", value_delimiter = ',')]
        styles: Vec<Style>,

        /// Artist names, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        artists: Vec<String>,

        /// Number of tracks (3-30, defaults to config default_tracks)
        #[arg(short = 'n', long)]
        tracks: Option<usize>,

        /// Album theme (defaults to config default_theme)
        #[arg(short, long)]
        theme: Option<String>,

        /// Start from a preset (explicit --style/--theme override it)
        #[arg(short, long)]
        preset: Option<String>,

        /// Export format (inferred from --output extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Export destination (defaults to a name derived from the title)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible albums
        #[arg(long)]
        seed: Option<u64>,

        /// Skip Deezer lookups; every artist uses the random fallback
        #[arg(long)]
        offline: bool,
    },

    /// Look up artists on Deezer, fill the cache, and show their profiles
    Lookup {
        /// Artist names (comma-separated or repeated)
        #[arg(value_delimiter = ',', required = true)]
        artists: Vec<String>,

        /// Ignore cached entries and fetch again
        #[arg(long)]
        refresh: bool,
    },

    /// List the style catalog
    Styles,

    /// List album presets
    Presets,

    /// List previously generated albums
    History {
        /// Number of results
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Export an album from history
    Export {
        /// Album id (see `albumgen history`)
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Destination (defaults to a name derived from the title)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Empty the artist and link caches
    ClearCache,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load();

    // Resolve database path: CLI > config > XDG default
    let db_path = cli.db_path
        .or(config.db_path.clone())
        .unwrap_or_else(albumgen::config::default_db_path);
    log::info!("Database: {}", db_path.display());

    let db = Database::open(&db_path)
        .context("Failed to open database")?;

    match cli.command {
        Commands::Generate { styles, artists, tracks, theme, preset, format, output, seed, offline } => {
            let preset = match preset.as_deref() {
                Some(name) => Some(styles::find_preset(name).with_context(|| {
                    format!("Unknown preset '{name}'. Run `albumgen presets` to list them.")
                })?),
                None => None,
            };
            if let Some(p) = preset {
                println!("Preset {}: {}", p.name, p.description);
            }

            let styles = match (styles.is_empty(), preset) {
                (true, Some(p)) => p.styles.to_vec(),
                _ => styles,
            };
            let theme = match (theme, preset) {
                (None, Some(p)) => p.theme.to_string(),
                (theme, _) => config.resolve_theme(theme.as_deref()),
            };
            let artists: Vec<String> = artists
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            let track_count = tracks.unwrap_or(config.default_tracks);

            let rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let mut ctx = if offline || config.offline {
                GenerationContext::new(Offline, rng)
            } else {
                let client = DeezerClient::new(&config.deezer);
                GenerationContext::new(
                    CachedLookup::new(client, &db, config.deezer.cache_ttl_days),
                    rng,
                )
            };

            println!("Analysing {} artists...", artists.len());
            let album = ctx
                .generate_album(&styles, &artists, track_count, &theme)
                .context("Album generation failed")?;

            println!();
            print_album(&album);

            let id = db.store_album(&album).context("Failed to save album to history")?;
            println!("Saved to history as #{id}");

            if format.is_some() || output.is_some() {
                let format = format
                    .map(ExportFormat::from)
                    .or_else(|| output.as_deref().and_then(format_from_path))
                    .unwrap_or(ExportFormat::Json);
                export_to(&album, format, output)?;
            }
        }

        Commands::Lookup { artists, refresh } => {
            let artists: Vec<String> = artists
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();

            let client = DeezerClient::new(&config.deezer);
            let mut lookup = CachedLookup::new(client, &db, config.deezer.cache_ttl_days)
                .refresh(refresh);
            let mut rng = StdRng::from_entropy();

            let pb = ProgressBar::new(artists.len() as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} artists {msg}",
                )?
                .progress_chars("=>-"),
            );

            let mut profiles = Vec::with_capacity(artists.len());
            for (i, name) in artists.iter().enumerate() {
                pb.set_message(name.clone());
                profiles.push(interpret_artist(name, &mut lookup, &mut rng));
                pb.inc(1);

                // Be polite to the API between artists
                if i + 1 < artists.len() {
                    thread::sleep(Duration::from_millis(config.deezer.rate_limit_ms));
                }
            }
            pb.finish_and_clear();

            println!(
                "{:<25} {:>8} {:>9} {:>4}  {:<20} {}",
                "Artist", "Source", "Tempo", "Lang", "Styles", "Mood"
            );
            println!("{}", "-".repeat(85));
            for p in &profiles {
                let styles: Vec<&str> = p.styles.iter().map(|s| s.id()).collect();
                println!(
                    "{:<25} {:>8} {:>9} {:>4}  {:<20} {}",
                    truncate(&p.name, 25),
                    if p.real_data { "deezer" } else { "fallback" },
                    format!("{}-{}", p.tempo_range.0, p.tempo_range.1),
                    p.language.code(),
                    styles.join(", "),
                    p.mood,
                );
            }

            let real = profiles.iter().filter(|p| p.real_data).count();
            println!();
            println!("{real}/{} artists resolved from Deezer", profiles.len());
        }

        Commands::Styles => {
            println!("{:<12} {:>9}  {}", "Style", "Tempo", "Moods");
            println!("{}", "-".repeat(60));
            for style in Style::ALL {
                let (low, high) = style.tempo_range();
                println!(
                    "{:<12} {:>9}  {}",
                    style.id(),
                    format!("{low}-{high}"),
                    style.moods().join(", ")
                );
            }
        }

        Commands::Presets => {
            for p in styles::presets() {
                let ids: Vec<&str> = p.styles.iter().map(|s| s.id()).collect();
                println!("{}", p.name);
                println!("  {}", p.description);
                println!("  styles: {}  |  theme: {}", ids.join(", "), p.theme);
                println!();
            }
        }

        Commands::History { limit } => {
            let albums = db.recent_albums(limit).context("Query failed")?;
            if albums.is_empty() {
                println!("No albums generated yet.");
                return Ok(());
            }

            let total = db.album_count().context("Query failed")?;
            println!("{} of {} albums (most recent first):", albums.len(), total);
            println!();
            println!("{:>5}  {:<35} {:<15} {:>6}  {}", "Id", "Title", "Theme", "Tracks", "Created");
            println!("{}", "-".repeat(85));
            for a in &albums {
                println!(
                    "{:>5}  {:<35} {:<15} {:>6}  {}",
                    a.id,
                    truncate(&a.title, 35),
                    truncate(&a.theme, 15),
                    a.track_count,
                    a.created_at
                );
            }
        }

        Commands::Export { id, format, output } => {
            let stored = db.get_album(id).context("Query failed")?;
            let Some(stored) = stored else {
                println!("No album with id {id}. Run `albumgen history` to list them.");
                return Ok(());
            };
            export_to(&stored.album, format.into(), output)?;
        }

        Commands::ClearCache => {
            let (artists, links) = db.clear_caches().context("Failed to clear caches")?;
            println!("Cache cleared: {artists} artists, {links} links");
        }
    }

    Ok(())
}

/// Print an album the way the report reads, followed by its stats.
fn print_album(album: &Album) {
    print!("{}", export::to_report(album));
    let stats = album.stats();
    println!(
        "Stats: {} min | {} BPM average | {} tracks",
        stats.total_minutes, stats.average_tempo, stats.track_count
    );
    println!();
}

fn export_to(album: &Album, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(export::default_file_name(album, format)));
    export::write_album(album, format, &path)?;
    println!("Exported: {}", path.display());
    Ok(())
}

fn format_from_path(path: &Path) -> Option<ExportFormat> {
    match path.extension()?.to_string_lossy().to_lowercase().as_str() {
        "json" => Some(ExportFormat::Json),
        "csv" => Some(ExportFormat::Csv),
        "txt" => Some(ExportFormat::Text),
        _ => None,
    }
}

/// Truncate long names for table display (char-safe).
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
