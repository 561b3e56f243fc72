// src/audio/sim.rs
//
// Timer-driven stand-in for a real streaming backend. It "plays" a
// source by ticking a position counter forward and pushing status
// callbacks, which is enough to drive the session end-to-end without
// any decoding or output-device work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, trace, warn};
use url::Url;

use crate::audio::backend::{AudioBackend, PlaybackResource, RawPlaybackStatus, StatusCallback};
use crate::audio::error::AudioError;

const LOG_TARGET: &str = "trackdeck::audio::sim";

type SharedCallback = Arc<Mutex<Option<StatusCallback>>>;

/// Backend producing simulated resources from `sim:` URIs.
///
/// The source length defaults to `default_duration_ms` and can be set
/// per track with an `ms` query parameter, e.g. `sim://intro?ms=4000`.
pub struct SimulatedBackend {
    tick: Duration,
    default_duration_ms: u64,
}

impl SimulatedBackend {
    pub fn new(tick: Duration, default_duration_ms: u64) -> Self {
        SimulatedBackend {
            tick,
            default_duration_ms: default_duration_ms.max(1),
        }
    }

    /// Parses a `sim:` source URI into a display name and a duration.
    pub(crate) fn parse_source(&self, source_uri: &str) -> Result<(String, u64), AudioError> {
        let url = Url::parse(source_uri)?;
        if url.scheme() != "sim" {
            return Err(AudioError::InvalidUri(format!(
                "unsupported scheme '{}' in '{}'",
                url.scheme(),
                source_uri
            )));
        }

        let name = format!(
            "{}{}",
            url.host_str().unwrap_or_default(),
            url.path().trim_end_matches('/')
        );
        let name = if name.is_empty() {
            "sim-source".to_string()
        } else {
            name
        };

        let duration_ms = url
            .query_pairs()
            .find(|(key, _)| key == "ms")
            .and_then(|(_, value)| value.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(self.default_duration_ms);

        Ok((name, duration_ms))
    }
}

#[async_trait]
impl AudioBackend for SimulatedBackend {
    #[instrument(skip(self), fields(source_uri))]
    async fn create(&self, source_uri: &str) -> Result<Box<dyn PlaybackResource>, AudioError> {
        let (name, duration_ms) = self.parse_source(source_uri)?;
        info!(target: LOG_TARGET, name = %name, duration_ms, "Creating simulated resource.");

        let playing = Arc::new(AtomicBool::new(false));
        let callback: SharedCallback = Arc::new(Mutex::new(None));
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let ticker = tokio::spawn({
            let playing = playing.clone();
            let callback = callback.clone();
            let name = name.clone();
            let tick = self.tick;
            async move {
                debug!(target: LOG_TARGET, name = %name, "[Sim Task] Started.");
                let mut position_ms: u64 = 0;
                let mut finished = false;
                loop {
                    tokio::select! {
                        biased; // Prioritize the shutdown signal

                        _ = shutdown_rx.recv() => {
                            debug!(target: LOG_TARGET, name = %name, "[Sim Task] Shutdown signal received.");
                            break;
                        }
                        _ = tokio::time::sleep(tick) => {
                            if playing.load(Ordering::SeqCst) && !finished {
                                position_ms = (position_ms + tick.as_millis() as u64).min(duration_ms);
                                if position_ms >= duration_ms {
                                    finished = true;
                                    playing.store(false, Ordering::SeqCst);
                                    info!(target: LOG_TARGET, name = %name, "[Sim Task] Reached end of source.");
                                }
                            }
                            // Status keeps flowing (finished included) until release,
                            // the way a real source's update stream behaves.
                            let status = RawPlaybackStatus {
                                is_loaded: true,
                                position_ms,
                                duration_ms: Some(duration_ms),
                                is_playing: playing.load(Ordering::SeqCst),
                                finished,
                            };
                            match callback.lock() {
                                Ok(guard) => {
                                    if let Some(cb) = guard.as_ref() {
                                        cb(status);
                                    }
                                }
                                Err(poisoned) => {
                                    error!(target: LOG_TARGET, name = %name, "[Sim Task] Callback mutex poisoned: {}", poisoned);
                                    break;
                                }
                            }
                        }
                    }
                }
                debug!(target: LOG_TARGET, name = %name, "[Sim Task] Finished.");
            }
        });

        Ok(Box::new(SimulatedResource {
            name,
            playing,
            callback,
            shutdown_tx,
            ticker: Some(ticker),
            released: false,
        }))
    }
}

/// One simulated source, live until `release`.
pub struct SimulatedResource {
    name: String,
    playing: Arc<AtomicBool>,
    callback: SharedCallback,
    shutdown_tx: broadcast::Sender<()>,
    ticker: Option<JoinHandle<()>>,
    released: bool,
}

#[async_trait]
impl PlaybackResource for SimulatedResource {
    async fn play(&mut self) -> Result<(), AudioError> {
        if self.released {
            return Err(AudioError::InvalidState(format!(
                "play on released resource '{}'",
                self.name
            )));
        }
        trace!(target: LOG_TARGET, name = %self.name, "Play command.");
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), AudioError> {
        if self.released {
            return Err(AudioError::InvalidState(format!(
                "pause on released resource '{}'",
                self.name
            )));
        }
        trace!(target: LOG_TARGET, name = %self.name, "Pause command.");
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_status_callback(&mut self, cb: StatusCallback) {
        match self.callback.lock() {
            Ok(mut guard) => *guard = Some(cb),
            Err(poisoned) => {
                warn!(target: LOG_TARGET, name = %self.name, "Callback mutex poisoned, status updates disabled: {}", poisoned);
            }
        }
    }

    #[instrument(skip(self), fields(name = %self.name))]
    async fn release(&mut self) -> Result<(), AudioError> {
        if self.released {
            trace!(target: LOG_TARGET, "Release called on already-released resource.");
            return Ok(());
        }
        self.released = true;
        self.playing.store(false, Ordering::SeqCst);

        // Drop the callback first so no status update fires after release
        // returns.
        if let Ok(mut guard) = self.callback.lock() {
            guard.take();
        }

        // Send signal, ignore error if the task already exited.
        if self.shutdown_tx.send(()).is_err() {
            trace!(target: LOG_TARGET, "Ticker already gone when sending shutdown signal.");
        }

        if let Some(mut handle) = self.ticker.take() {
            match timeout(Duration::from_secs(5), &mut handle).await {
                Ok(Ok(())) => {
                    debug!(target: LOG_TARGET, "Ticker task finished gracefully.");
                }
                Ok(Err(e)) => {
                    if e.is_panic() {
                        error!(target: LOG_TARGET, "Ticker task panicked: {:?}", e);
                    } else {
                        debug!(target: LOG_TARGET, "Ticker task was cancelled: {:?}", e);
                    }
                }
                Err(_) => {
                    error!(target: LOG_TARGET, "Timeout waiting for ticker task. Aborting it.");
                    handle.abort();
                }
            }
        }
        info!(target: LOG_TARGET, "Simulated resource released.");
        Ok(())
    }
}

impl Drop for SimulatedResource {
    fn drop(&mut self) {
        // Rely on the explicit async release() for graceful teardown; if
        // it was skipped, at least stop the ticker.
        if let Some(handle) = self.ticker.take() {
            debug!(target: LOG_TARGET, name = %self.name, "Dropping un-released resource, aborting ticker.");
            handle.abort();
        }
    }
}
