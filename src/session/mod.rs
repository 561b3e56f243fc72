//! Playback session manager: owns the lifecycle of the single active
//! audio resource and republishes its status as UI-facing snapshots.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, instrument, trace};

use crate::audio::AudioBackend;
use crate::catalog::Catalog;

mod command_handler;
mod loader;
mod resource;
mod run_loop;
mod state;
mod translator;

// Re-export key types for convenience
pub use state::{PlaybackSnapshot, SessionCommand, SessionEvent};

use resource::ActiveResource;
use translator::StatusTranslator;

pub(crate) const SESSION_LOG_TARGET: &str = "trackdeck::session";

/// Manages playback state, the current track index, and interaction with
/// the audio backend.
///
/// Constructed together with its command sender; the session itself runs
/// in a separate task via [`PlayerSession::run`]. Status callbacks from
/// the backend re-enter the command channel as generation-tagged
/// [`SessionCommand::StatusUpdate`]s, so all state changes happen on the
/// session task.
pub struct PlayerSession {
    // --- Configuration ---
    catalog: Catalog,
    backend: Arc<dyn AudioBackend>,

    // --- State ---
    current_index: Option<usize>,
    /// Monotonic load counter; the current value tags the live resource.
    generation: u64,
    active: Option<ActiveResource>,
    translator: StatusTranslator,

    // --- Communication ---
    command_rx: mpsc::Receiver<SessionCommand>,
    /// Sender handed to status callbacks (and kept for internal use).
    internal_command_tx: mpsc::Sender<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl PlayerSession {
    /// Creates a new session and the command channel sender. The session
    /// should be run in a separate task using [`PlayerSession::run`].
    pub fn new(
        catalog: Catalog,
        backend: Arc<dyn AudioBackend>,
        event_capacity: usize,
        command_buffer: usize,
    ) -> (Self, mpsc::Sender<SessionCommand>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer);
        let (event_tx, _) = broadcast::channel(event_capacity);

        let session = PlayerSession {
            catalog,
            backend,
            current_index: None,
            generation: 0,
            active: None,
            translator: StatusTranslator::new(),
            command_rx,
            internal_command_tx: command_tx.clone(),
            event_tx,
        };

        (session, command_tx)
    }

    /// Subscribes to session events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Sends an event via the broadcast channel, logging when nobody is
    /// listening.
    fn broadcast(&self, event: SessionEvent) {
        trace!(target: SESSION_LOG_TARGET, "Broadcasting event: {:?}", event);
        if self.event_tx.send(event.clone()).is_err() {
            // Normal when no consumer has subscribed (yet).
            debug!(target: SESSION_LOG_TARGET, "No active listeners for event: {:?}", event);
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        self.translator.snapshot().clone()
    }

    /// Runs the session's command processing loop. This should be
    /// spawned as a Tokio task.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_session_loop(self).await;
    }
}
