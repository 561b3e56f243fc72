use tokio::sync::oneshot;

use crate::audio::RawPlaybackStatus;
use crate::catalog::Track;

/// Commands that can be sent to the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Load the track at `index` and start playing it, releasing any
    /// previously loaded resource first.
    PlayTrack { index: usize },
    PlayPauseToggle,
    Next,
    Previous,
    /// Raw status forwarded from the active resource's callback, tagged
    /// with the generation of the load that registered it.
    StatusUpdate {
        generation: u64,
        status: RawPlaybackStatus,
    },
    GetSnapshot(oneshot::Sender<PlaybackSnapshot>),
    Shutdown,
}

/// Normalized, point-in-time view of playback state exposed to the UI.
///
/// Recomputed on every status event, never persisted. `position_ms` and
/// `duration_ms` are the source's values verbatim; `duration_ms` is
/// floored to 1 so progress ratios never divide by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub track_index: Option<usize>,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub finished: bool,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        PlaybackSnapshot {
            track_index: None,
            is_playing: false,
            position_ms: 0,
            duration_ms: 1,
            finished: false,
        }
    }
}

impl PlaybackSnapshot {
    /// Playback progress in `[0, 1]`. The source does not guarantee
    /// `position_ms <= duration_ms`, so the position is clamped here.
    pub fn progress_ratio(&self) -> f64 {
        let position = self.position_ms.min(self.duration_ms);
        position as f64 / self.duration_ms as f64
    }
}

/// Updates broadcast by the session task about its state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SnapshotChanged(PlaybackSnapshot),
    TrackChanged { index: usize, track: Track },
    /// Non-fatal: the resource for `index` could not be created or
    /// started; nothing is playing.
    LoadFailed { index: usize, message: String },
    Stopped,
}
