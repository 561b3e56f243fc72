//! Command-line interface implementation

use clap::Parser;
use std::error::Error;

use crate::catalog::Catalog;
use crate::session::PlaybackSnapshot;

/// Command-line arguments for trackdeck
#[derive(Parser, Debug)]
#[command(author, version, about = "Track playback session demo", long_about = None)]
pub struct Args {
    /// Path to a JSON track catalog (falls back to the built-in demo
    /// catalog)
    #[arg(short = 't', long, env = "TRACKDECK_CATALOG")]
    pub catalog: Option<String>,

    /// Simulated backend status interval in milliseconds
    #[arg(long, env = "TRACKDECK_TICK_MS")]
    pub tick_ms: Option<u64>,

    /// Config file path
    #[arg(short, long, env = "TRACKDECK_CONFIG")]
    pub config: Option<String>,
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Display the track catalog
    pub fn display_catalog(&self, catalog: &Catalog) {
        println!("\nTrack Catalog:");
        println!("{:<5} {:<28} {:<20} {:<8} {}", "#", "Title", "Artist", "Length", "Source");
        println!("{}", "-".repeat(80));

        for (index, track) in catalog.tracks().iter().enumerate() {
            let title = if track.title.len() > 26 {
                format!("{:.23}...", track.title)
            } else {
                track.title.clone()
            };
            println!(
                "{:<5} {:<28} {:<20} {:<8} {}",
                index + 1,
                title,
                track.artist,
                track.duration_label,
                track.source_uri
            );
        }
        println!();
    }

    /// Display the available commands
    pub fn display_help(&self) {
        println!("Commands: play <n> | toggle | next | prev | status | quit");
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a snapshot as a single status line.
pub fn format_snapshot(snapshot: &PlaybackSnapshot, catalog: &Catalog) -> String {
    let Some(index) = snapshot.track_index else {
        return "-- nothing playing".to_string();
    };

    let title = catalog
        .get(index)
        .map(|track| track.title.as_str())
        .unwrap_or("<unknown>");
    let marker = if snapshot.finished {
        "**"
    } else if snapshot.is_playing {
        ">>"
    } else {
        "||"
    };

    format!(
        "{} [{}/{}] {}  {}/{} ({:.0}%)",
        marker,
        index + 1,
        catalog.len(),
        title,
        format_clock(snapshot.position_ms),
        format_clock(snapshot.duration_ms),
        snapshot.progress_ratio() * 100.0
    )
}

/// Formats milliseconds as m:ss.
pub fn format_clock(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
