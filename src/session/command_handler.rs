use tracing::{info, instrument, warn};

use crate::audio::RawPlaybackStatus;
use crate::session::translator::Translation;
use crate::session::state::SessionEvent;
use crate::session::{loader, PlayerSession, SESSION_LOG_TARGET};

#[instrument(skip(session))]
pub(crate) async fn handle_play_track(session: &mut PlayerSession, index: usize) {
    info!(target: SESSION_LOG_TARGET, "Handling PlayTrack command for index {}.", index);
    loader::load_and_play(session, index).await;
}

/// Flips between playing and paused. A caller-usage condition, not an
/// error, when nothing is loaded.
#[instrument(skip(session))]
pub(crate) async fn handle_play_pause_toggle(session: &mut PlayerSession) {
    let currently_playing = session.translator.snapshot().is_playing;

    let result = match session.active.as_mut() {
        Some(active) => {
            if currently_playing {
                active.pause().await
            } else {
                active.play().await
            }
        }
        None => {
            warn!(target: SESSION_LOG_TARGET, "PlayPauseToggle: No resource loaded, ignoring.");
            return;
        }
    };

    match result {
        Ok(()) => {
            session.translator.set_playing(!currently_playing);
            session.broadcast(SessionEvent::SnapshotChanged(session.snapshot()));
        }
        Err(e) => {
            warn!(target: SESSION_LOG_TARGET, "Transport command failed: {}", e);
        }
    }
}

#[instrument(skip(session))]
pub(crate) async fn handle_next(session: &mut PlayerSession) {
    let Some(current) = session.current_index else {
        warn!(target: SESSION_LOG_TARGET, "Next: No resource loaded, ignoring.");
        return;
    };
    let next = session.catalog.wrapping_next(current);
    info!(target: SESSION_LOG_TARGET, "Handling Next command: {} -> {}.", current, next);
    loader::load_and_play(session, next).await;
}

#[instrument(skip(session))]
pub(crate) async fn handle_previous(session: &mut PlayerSession) {
    let Some(current) = session.current_index else {
        warn!(target: SESSION_LOG_TARGET, "Previous: No resource loaded, ignoring.");
        return;
    };
    let previous = session.catalog.wrapping_previous(current);
    info!(target: SESSION_LOG_TARGET, "Handling Previous command: {} -> {}.", current, previous);
    loader::load_and_play(session, previous).await;
}

/// Feeds one raw status event through the translator and reacts to the
/// outcome. Stale events change nothing; a completion advances to the
/// next track exactly once.
pub(crate) async fn handle_status_update(
    session: &mut PlayerSession,
    generation: u64,
    status: RawPlaybackStatus,
) {
    match session.translator.apply(generation, &status) {
        Translation::Discarded => {}
        Translation::Updated => {
            session.broadcast(SessionEvent::SnapshotChanged(session.snapshot()));
        }
        Translation::Finished => {
            session.broadcast(SessionEvent::SnapshotChanged(session.snapshot()));
            handle_track_finished(session).await;
        }
    }
}

#[instrument(skip(session))]
pub(crate) async fn handle_track_finished(session: &mut PlayerSession) {
    let Some(current) = session.current_index else {
        warn!(target: SESSION_LOG_TARGET, "TrackFinished with no current track, ignoring.");
        return;
    };
    let next = session.catalog.wrapping_next(current);
    info!(target: SESSION_LOG_TARGET, "Track {} finished naturally, advancing to {}.", current, next);
    loader::load_and_play(session, next).await;
}
