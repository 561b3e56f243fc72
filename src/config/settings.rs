//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Path to a JSON track catalog; the built-in demo catalog is used
    /// when unset.
    #[serde(default)]
    pub catalog_path: Option<String>,
    /// Simulated backend status interval in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Simulated track length used when a source URI carries no `ms`
    /// override.
    #[serde(default = "default_track_ms")]
    pub default_track_ms: u64,
    /// Capacity of the session event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Capacity of the session command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

fn default_tick_ms() -> u64 {
    250
}

fn default_track_ms() -> u64 {
    30_000
}

fn default_event_capacity() -> usize {
    16
}

fn default_command_buffer() -> usize {
    32
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Settings {
    /// Create default settings
    pub fn default() -> Self {
        Settings {
            catalog_path: None,
            tick_ms: default_tick_ms(),
            default_track_ms: default_track_ms(),
            event_capacity: default_event_capacity(),
            command_buffer: default_command_buffer(),
        }
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("trackdeck").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_ms must be at least 1".to_string(),
            ));
        }
        if self.default_track_ms == 0 {
            return Err(ConfigError::ValidationError(
                "default_track_ms must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 || self.command_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "Channel capacities must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
