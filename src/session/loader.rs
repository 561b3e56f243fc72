// src/session/loader.rs
//
// The loadAndPlay path. The one invariant everything here serves:
// release-before-create, never two live resources, even under rapid
// repeated requests.

use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::audio::PlaybackResource;
use crate::session::resource::ActiveResource;
use crate::session::state::{SessionCommand, SessionEvent};
use crate::session::{PlayerSession, SESSION_LOG_TARGET};

/// Loads the track at `index` and starts playing it.
///
/// Any previously loaded resource is fully released before the new one
/// is created, so no status callback of the old resource can be
/// registered alongside the new one. On any failure the session resets
/// to uninitialized and nothing is left loaded.
#[instrument(skip(session), fields(track_index = index))]
pub(crate) async fn load_and_play(session: &mut PlayerSession, index: usize) {
    if let Some(active) = session.active.take() {
        info!(target: SESSION_LOG_TARGET, "Stopping previous resource before loading track {}.", index);
        active.release().await;
    }
    session.translator.reset();

    let track = match session.catalog.get(index) {
        Some(track) => track.clone(),
        None => {
            error!(target: SESSION_LOG_TARGET, "Cannot play track at index {}: Index out of bounds.", index);
            session.current_index = None;
            session.broadcast(SessionEvent::LoadFailed {
                index,
                message: "Invalid track index".to_string(),
            });
            session.broadcast(SessionEvent::Stopped);
            return;
        }
    };

    let generation = session.next_generation();
    let resource_id = Uuid::new_v4();
    info!(
        target: SESSION_LOG_TARGET,
        track_id = %track.id,
        resource_id = %resource_id,
        generation,
        "Loading '{}' from {}.",
        track.title,
        track.source_uri
    );

    let mut resource = match session.backend.create(&track.source_uri).await {
        Ok(resource) => resource,
        Err(e) => {
            error!(target: SESSION_LOG_TARGET, track_id = %track.id, "Failed to create resource: {}", e);
            session.current_index = None;
            session.broadcast(SessionEvent::LoadFailed {
                index,
                message: e.to_string(),
            });
            session.broadcast(SessionEvent::Stopped);
            return;
        }
    };

    // Register status forwarding tagged with this load's generation. A
    // straggling callback from a superseded resource carries the old
    // generation and is discarded by the translator.
    let status_tx = session.internal_command_tx.clone();
    resource.set_status_callback(Box::new(move |status| {
        if let Err(e) = status_tx.try_send(SessionCommand::StatusUpdate { generation, status }) {
            debug!(target: SESSION_LOG_TARGET, generation, "Dropped status update: {}", e);
        }
    }));

    if let Err(e) = resource.play().await {
        error!(target: SESSION_LOG_TARGET, track_id = %track.id, "Failed to start playback: {}", e);
        ActiveResource::new(resource, generation, resource_id, index)
            .release()
            .await;
        session.current_index = None;
        session.broadcast(SessionEvent::LoadFailed {
            index,
            message: e.to_string(),
        });
        session.broadcast(SessionEvent::Stopped);
        return;
    }

    session.active = Some(ActiveResource::new(resource, generation, resource_id, index));
    session.current_index = Some(index);
    session.translator.begin_generation(generation, index);

    session.broadcast(SessionEvent::TrackChanged { index, track });
    session.broadcast(SessionEvent::SnapshotChanged(session.snapshot()));
}
