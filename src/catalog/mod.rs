//! Static track catalog: the ordered list the session plays from.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;


/// One entry in the track catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique, non-empty identifier.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// Display-only duration string; the authoritative duration comes
    /// from the audio backend's status updates.
    #[serde(default)]
    pub duration_label: String,
    /// URI handed to the audio backend's `create`.
    pub source_uri: String,
}

/// Error types for catalog operations.
#[derive(Debug)]
pub enum CatalogError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> Self {
        CatalogError::IoError(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "I/O error: {}", e),
            CatalogError::ParseError(s) => write!(f, "Parse error: {}", s),
            CatalogError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for CatalogError {}

/// Ordered, validated list of tracks.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate or empty ids and empty
    /// source URIs.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for track in &tracks {
            if track.id.trim().is_empty() {
                return Err(CatalogError::ValidationError(
                    "Track id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(track.id.as_str()) {
                return Err(CatalogError::ValidationError(format!(
                    "Duplicate track id '{}'",
                    track.id
                )));
            }
            if track.source_uri.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "Track '{}' has an empty source URI",
                    track.id
                )));
            }
        }
        Ok(Catalog { tracks })
    }

    /// Loads a catalog from a JSON array file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let tracks: Vec<Track> = serde_json::from_str(&content)?;
        Self::from_tracks(tracks)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Successor index with mandatory wraparound; there is no terminal
    /// "end of list" state. Callers only pass indices of loaded tracks,
    /// so the catalog is non-empty here.
    pub fn wrapping_next(&self, index: usize) -> usize {
        debug_assert!(!self.tracks.is_empty());
        (index + 1) % self.tracks.len()
    }

    /// Predecessor index with wraparound.
    pub fn wrapping_previous(&self, index: usize) -> usize {
        debug_assert!(!self.tracks.is_empty());
        (index + self.tracks.len() - 1) % self.tracks.len()
    }
}
