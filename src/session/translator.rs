// src/session/translator.rs
use tracing::{debug, trace};

use crate::audio::RawPlaybackStatus;
use crate::session::state::PlaybackSnapshot;
use crate::session::SESSION_LOG_TARGET;

/// Outcome of feeding one raw status event through the translator.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Translation {
    /// Stale or meaningless event; the snapshot did not change.
    Discarded,
    Updated,
    /// The snapshot changed and this event is the single completion
    /// report for the current resource.
    Finished,
}

/// Translates raw backend status into the UI-facing snapshot.
///
/// Every live resource is tagged with the generation of the load that
/// created it; events carrying any other generation come from a
/// superseded resource and must never touch the snapshot. Completion is
/// reported exactly once per generation: the `finished_handled` flag
/// debounces the repeated `finished` statuses a source keeps sending
/// until it is released, and resets only on the next successful load.
pub(crate) struct StatusTranslator {
    generation: u64,
    finished_handled: bool,
    snapshot: PlaybackSnapshot,
}

impl StatusTranslator {
    pub(crate) fn new() -> Self {
        StatusTranslator {
            generation: 0,
            finished_handled: false,
            snapshot: PlaybackSnapshot::default(),
        }
    }

    /// Arms the translator for a freshly loaded resource.
    pub(crate) fn begin_generation(&mut self, generation: u64, track_index: usize) {
        debug!(target: SESSION_LOG_TARGET, generation, track_index, "Translator armed for new resource.");
        self.generation = generation;
        self.finished_handled = false;
        self.snapshot = PlaybackSnapshot {
            track_index: Some(track_index),
            is_playing: true,
            position_ms: 0,
            duration_ms: 1,
            finished: false,
        };
    }

    /// Returns to the uninitialized state (nothing loaded). Any event
    /// still in flight for the old resource is discarded from here on.
    pub(crate) fn reset(&mut self) {
        self.snapshot = PlaybackSnapshot::default();
        self.finished_handled = false;
    }

    /// Optimistic flip after a transport command was accepted; the next
    /// status event from the source remains authoritative.
    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.snapshot.is_playing = playing;
    }

    pub(crate) fn snapshot(&self) -> &PlaybackSnapshot {
        &self.snapshot
    }

    pub(crate) fn apply(&mut self, generation: u64, status: &RawPlaybackStatus) -> Translation {
        if self.snapshot.track_index.is_none() || generation != self.generation {
            trace!(
                target: SESSION_LOG_TARGET,
                event_generation = generation,
                current_generation = self.generation,
                "Discarding status event from superseded resource."
            );
            return Translation::Discarded;
        }
        if !status.is_loaded {
            trace!(target: SESSION_LOG_TARGET, generation, "Discarding not-loaded status event.");
            return Translation::Discarded;
        }

        self.snapshot.position_ms = status.position_ms;
        self.snapshot.duration_ms = status.duration_ms.filter(|ms| *ms > 0).unwrap_or(1);
        self.snapshot.is_playing = status.is_playing;
        self.snapshot.finished = status.finished;

        if status.finished && !self.finished_handled {
            self.finished_handled = true;
            return Translation::Finished;
        }
        Translation::Updated
    }
}
