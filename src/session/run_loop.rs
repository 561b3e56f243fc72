// src/session/run_loop.rs
use tracing::{info, trace};

use super::{command_handler, PlayerSession, SESSION_LOG_TARGET};
use crate::session::state::{SessionCommand, SessionEvent};

/// Runs the session's command processing loop.
///
/// Every mutation of session state happens here, in command order; the
/// status callbacks only enqueue, which is what makes the whole core
/// lock-free.
pub(crate) async fn run_session_loop(session: &mut PlayerSession) {
    info!(target: SESSION_LOG_TARGET, "Session run loop started.");

    while let Some(command) = session.command_rx.recv().await {
        trace!(target: SESSION_LOG_TARGET, "Received command: {:?}", command);
        match command {
            SessionCommand::PlayTrack { index } => {
                command_handler::handle_play_track(session, index).await
            }
            SessionCommand::PlayPauseToggle => {
                command_handler::handle_play_pause_toggle(session).await
            }
            SessionCommand::Next => command_handler::handle_next(session).await,
            SessionCommand::Previous => command_handler::handle_previous(session).await,
            SessionCommand::StatusUpdate { generation, status } => {
                command_handler::handle_status_update(session, generation, status).await
            }
            SessionCommand::GetSnapshot(responder) => {
                let _ = responder.send(session.snapshot()); // Ignore error if receiver dropped
            }
            SessionCommand::Shutdown => {
                info!(target: SESSION_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                break;
            }
        }
    }

    info!(target: SESSION_LOG_TARGET, "Session run loop finished. Performing final cleanup.");
    if let Some(active) = session.active.take() {
        info!(
            target: SESSION_LOG_TARGET,
            track_index = active.track_index(),
            "Releasing active resource during final cleanup."
        );
        active.release().await;
    }
    session.current_index = None;
    session.translator.reset();
    session.broadcast(SessionEvent::Stopped);
    info!(target: SESSION_LOG_TARGET, "Session cleanup complete.");
}
