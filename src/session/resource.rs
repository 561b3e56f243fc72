// src/session/resource.rs
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::audio::{AudioError, PlaybackResource};
use crate::session::SESSION_LOG_TARGET;

/// The single live playback resource, paired with the identity of the
/// load that created it.
pub(crate) struct ActiveResource {
    resource: Box<dyn PlaybackResource>,
    generation: u64,
    resource_id: Uuid,
    track_index: usize,
}

impl ActiveResource {
    pub(crate) fn new(
        resource: Box<dyn PlaybackResource>,
        generation: u64,
        resource_id: Uuid,
        track_index: usize,
    ) -> Self {
        ActiveResource {
            resource,
            generation,
            resource_id,
            track_index,
        }
    }

    pub(crate) fn track_index(&self) -> usize {
        self.track_index
    }

    pub(crate) async fn play(&mut self) -> Result<(), AudioError> {
        self.resource.play().await
    }

    pub(crate) async fn pause(&mut self) -> Result<(), AudioError> {
        self.resource.pause().await
    }

    /// Releases the underlying resource, consuming the handle. Release
    /// errors are logged, not propagated: by the time this runs the
    /// session has already moved on.
    #[instrument(skip(self), fields(resource_id = %self.resource_id, generation = self.generation))]
    pub(crate) async fn release(mut self) {
        info!(target: SESSION_LOG_TARGET, track_index = self.track_index, "Releasing playback resource.");
        if let Err(e) = self.resource.release().await {
            warn!(target: SESSION_LOG_TARGET, "Resource release reported an error: {}", e);
        }
    }
}
