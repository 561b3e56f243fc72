// src/audio/backend.rs
use async_trait::async_trait;

use crate::audio::error::AudioError;

/// Raw status pushed by a backend while a resource is loaded.
///
/// Delivered at arbitrary frequency (typically several times per second)
/// for as long as the resource is live. A resource that has already been
/// torn down reports `is_loaded: false`; such updates carry no usable
/// position data and are ignored by the translator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlaybackStatus {
    pub is_loaded: bool,
    pub position_ms: u64,
    /// Total length of the source. `None` or `Some(0)` means the backend
    /// does not know it (yet).
    pub duration_ms: Option<u64>,
    pub is_playing: bool,
    /// Set when the source reached its natural end.
    pub finished: bool,
}

/// Callback type for status updates pushed by a resource.
pub type StatusCallback = Box<dyn Fn(RawPlaybackStatus) + Send + Sync + 'static>;

/// One loaded, playable audio source.
///
/// At most one instance is live at any time; the session releases the
/// previous resource before creating the next one. `release` must be
/// idempotent and must stop all further status delivery.
#[async_trait]
pub trait PlaybackResource: Send + Sync {
    /// Starts or resumes playback.
    async fn play(&mut self) -> Result<(), AudioError>;

    /// Pauses playback, keeping the resource loaded.
    async fn pause(&mut self) -> Result<(), AudioError>;

    /// Registers the callback invoked on every status update. Replaces
    /// any previously registered callback.
    fn set_status_callback(&mut self, callback: StatusCallback);

    /// Tears down the underlying stream. Safe to call more than once.
    async fn release(&mut self) -> Result<(), AudioError>;
}

/// Trait defining the external audio primitive.
///
/// The core only depends on this minimal capability set; decoding and
/// output-device handling live behind it.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Creates a new resource for the given source URI. Asynchronous;
    /// fails on network or format errors without leaving anything
    /// loaded.
    async fn create(&self, source_uri: &str) -> Result<Box<dyn PlaybackResource>, AudioError>;
}
