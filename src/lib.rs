//! trackdeck library core functionality
//!
//! The playback-state synchronization core of a small music player: a
//! session task owning at most one live audio resource, a status
//! translator turning raw backend signals into UI snapshots, and the
//! catalog/config/CLI glue around them.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod session;
pub mod ui;

/// Initialize the application directories
pub fn init_app_dirs() -> std::io::Result<()> {
    let default_path = config::Settings::default_path();
    if let Some(config_dir) = default_path.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }
    }
    Ok(())
}
