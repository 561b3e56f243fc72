use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, oneshot};
use tracing_subscriber::EnvFilter;

use trackdeck::audio::sim::SimulatedBackend;
use trackdeck::catalog::{Catalog, CatalogError, Track};
use trackdeck::config::Settings;
use trackdeck::init_app_dirs;
use trackdeck::session::{PlayerSession, SessionCommand, SessionEvent};
use trackdeck::ui::{format_snapshot, Cli};

/// User intents typed at the prompt.
enum UserIntent {
    Play(usize),
    Toggle,
    Next,
    Previous,
    Status,
    Quit,
}

fn parse_intent(line: &str) -> Option<UserIntent> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "play" | "p" => {
            let number = parts.next()?.parse::<usize>().ok()?;
            if number == 0 {
                return None;
            }
            Some(UserIntent::Play(number - 1))
        }
        "toggle" | "t" => Some(UserIntent::Toggle),
        "next" | "n" => Some(UserIntent::Next),
        "prev" | "b" => Some(UserIntent::Previous),
        "status" | "s" => Some(UserIntent::Status),
        "quit" | "q" => Some(UserIntent::Quit),
        _ => None,
    }
}

/// Built-in catalog used when no catalog file is configured. The `ms`
/// query parameter sets each simulated track's length.
fn demo_catalog() -> Result<Catalog, CatalogError> {
    let track = |id: &str, title: &str, artist: &str, label: &str, uri: &str| Track {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        duration_label: label.to_string(),
        source_uri: uri.to_string(),
    };
    Catalog::from_tracks(vec![
        track("marble-halls", "Marble Halls", "Erick", "0:20", "sim://marble-halls?ms=20000"),
        track("glow", "Glow", "Axel", "0:15", "sim://glow?ms=15000"),
        track("pulse", "Pulse", "Erick", "0:30", "sim://pulse?ms=30000"),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize application directories
    init_app_dirs()?;

    // Load configuration from file or create default
    let config_path = match &args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;

    // Override settings with command-line arguments / environment
    if let Some(catalog_path) = args.catalog.clone() {
        settings.catalog_path = Some(catalog_path);
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.tick_ms = tick_ms;
    }
    settings.validate()?;

    let catalog = match &settings.catalog_path {
        Some(path) => Catalog::load(Path::new(path))?,
        None => demo_catalog()?,
    };
    if catalog.is_empty() {
        return Err("Catalog is empty, nothing to play.".into());
    }

    let backend = Arc::new(SimulatedBackend::new(
        Duration::from_millis(settings.tick_ms),
        settings.default_track_ms,
    ));

    let (mut session, command_tx) = PlayerSession::new(
        catalog.clone(),
        backend,
        settings.event_capacity,
        settings.command_buffer,
    );
    let mut events = session.subscribe_events();
    let session_task = tokio::spawn(async move { session.run().await });

    cli.display_catalog(&catalog);
    cli.display_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(SessionEvent::SnapshotChanged(snapshot)) => {
                        println!("{}", format_snapshot(&snapshot, &catalog));
                    }
                    Ok(SessionEvent::TrackChanged { index, track }) => {
                        println!("Now playing [{}]: {} - {}", index + 1, track.title, track.artist);
                    }
                    Ok(SessionEvent::LoadFailed { index, message }) => {
                        println!("Could not play track {}: {}", index + 1, message);
                    }
                    Ok(SessionEvent::Stopped) => {
                        println!("-- stopped");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Snapshots are whole-state, so skipping some is harmless.
                        tracing::debug!("Event stream lagged, skipped {} events.", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed; shut the session down and exit.
                    let _ = command_tx.send(SessionCommand::Shutdown).await;
                    break;
                };
                match parse_intent(line.trim()) {
                    Some(UserIntent::Play(index)) => {
                        let _ = command_tx.send(SessionCommand::PlayTrack { index }).await;
                    }
                    Some(UserIntent::Toggle) => {
                        let _ = command_tx.send(SessionCommand::PlayPauseToggle).await;
                    }
                    Some(UserIntent::Next) => {
                        let _ = command_tx.send(SessionCommand::Next).await;
                    }
                    Some(UserIntent::Previous) => {
                        let _ = command_tx.send(SessionCommand::Previous).await;
                    }
                    Some(UserIntent::Status) => {
                        let (tx, rx) = oneshot::channel();
                        if command_tx.send(SessionCommand::GetSnapshot(tx)).await.is_ok() {
                            if let Ok(snapshot) = rx.await {
                                println!("{}", format_snapshot(&snapshot, &catalog));
                            }
                        }
                    }
                    Some(UserIntent::Quit) => {
                        let _ = command_tx.send(SessionCommand::Shutdown).await;
                        break;
                    }
                    None => {
                        if !line.trim().is_empty() {
                            cli.display_help();
                        }
                    }
                }
            }
        }
    }

    session_task.await?;
    Ok(())
}
