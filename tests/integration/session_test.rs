//! Integration tests for the playback session: resource lifecycle,
//! wraparound advance, stale-event discard, completion handling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use trackdeck::audio::sim::SimulatedBackend;
use trackdeck::audio::AudioBackend;
use trackdeck::catalog::{Catalog, Track};
use trackdeck::session::{PlaybackSnapshot, PlayerSession, SessionCommand, SessionEvent};

use crate::test_utils::{MockBackend, TransportCommand};

fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Title {}", id),
        artist: "Artist".to_string(),
        duration_label: "0:30".to_string(),
        source_uri: format!("mock://{}", id),
    }
}

fn catalog_abc() -> Catalog {
    Catalog::from_tracks(vec![track("a"), track("b"), track("c")]).unwrap()
}

fn start_session(
    catalog: Catalog,
    backend: Arc<dyn AudioBackend>,
) -> (
    mpsc::Sender<SessionCommand>,
    broadcast::Receiver<SessionEvent>,
    JoinHandle<()>,
) {
    let (mut session, command_tx) = PlayerSession::new(catalog, backend, 256, 64);
    let events = session.subscribe_events();
    let task = tokio::spawn(async move { session.run().await });
    (command_tx, events, task)
}

/// Round-trips a snapshot request. Commands are handled in order, so
/// the reply also proves every previously sent command has settled.
async fn snapshot_of(command_tx: &mpsc::Sender<SessionCommand>) -> PlaybackSnapshot {
    let (reply_tx, reply_rx) = oneshot::channel();
    command_tx
        .send(SessionCommand::GetSnapshot(reply_tx))
        .await
        .expect("session gone");
    reply_rx.await.expect("session dropped the responder")
}

fn drain_events(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[tokio::test]
async fn at_most_one_live_resource_across_loads() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    for index in [0usize, 1, 2, 0, 2] {
        command_tx
            .send(SessionCommand::PlayTrack { index })
            .await
            .unwrap();
        let snapshot = snapshot_of(&command_tx).await;
        assert_eq!(snapshot.track_index, Some(index));
        assert!(snapshot.is_playing);
        assert_eq!(backend.live_count(), 1, "more than one live resource");
    }
    assert_eq!(backend.created_uris().len(), 5);

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
    assert_eq!(backend.live_count(), 0);
}

#[tokio::test]
async fn advance_wraps_at_both_ends() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    // Next from the last index wraps to 0.
    command_tx
        .send(SessionCommand::PlayTrack { index: 2 })
        .await
        .unwrap();
    command_tx.send(SessionCommand::Next).await.unwrap();
    assert_eq!(snapshot_of(&command_tx).await.track_index, Some(0));

    // Previous from index 0 wraps to the last index.
    command_tx.send(SessionCommand::Previous).await.unwrap();
    assert_eq!(snapshot_of(&command_tx).await.track_index, Some(2));

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn status_updates_reach_the_snapshot() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, mut events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    snapshot_of(&command_tx).await;
    drain_events(&mut events);

    backend.handle(0).emit_playing(1_500, 30_000);
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.position_ms, 1_500);
    assert_eq!(snapshot.duration_ms, 30_000);
    assert!(snapshot.is_playing);

    let drained = drain_events(&mut events);
    assert!(drained
        .iter()
        .any(|event| matches!(event, SessionEvent::SnapshotChanged(s) if s.position_ms == 1_500)));

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn stale_status_events_are_discarded() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    snapshot_of(&command_tx).await;
    let stale = backend.handle(0);

    command_tx
        .send(SessionCommand::PlayTrack { index: 1 })
        .await
        .unwrap();
    snapshot_of(&command_tx).await;
    assert!(stale.is_released());

    // Straggler from the released resource: must not touch track B's
    // snapshot.
    stale.emit_playing(29_000, 30_000);
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(1));
    assert_eq!(snapshot.position_ms, 0);

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn one_advance_per_completion_burst() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    snapshot_of(&command_tx).await;

    // The source reports completion repeatedly before the next load
    // begins; only one advance may result.
    let finished = backend.handle(0);
    finished.emit_finished(30_000);
    finished.emit_finished(30_000);
    finished.emit_finished(30_000);

    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(1));
    assert_eq!(
        backend.created_uris(),
        vec!["mock://a".to_string(), "mock://b".to_string()]
    );
    assert_eq!(backend.live_count(), 1);

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn toggle_without_resource_is_a_no_op() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, mut events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayPauseToggle)
        .await
        .unwrap();
    command_tx.send(SessionCommand::Next).await.unwrap();
    command_tx.send(SessionCommand::Previous).await.unwrap();

    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot, PlaybackSnapshot::default());
    assert!(backend.created_uris().is_empty());
    assert!(drain_events(&mut events).is_empty());

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn toggle_issues_transport_commands() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    command_tx
        .send(SessionCommand::PlayPauseToggle)
        .await
        .unwrap();
    assert!(!snapshot_of(&command_tx).await.is_playing);

    command_tx
        .send(SessionCommand::PlayPauseToggle)
        .await
        .unwrap();
    assert!(snapshot_of(&command_tx).await.is_playing);

    assert_eq!(
        backend.handle(0).commands(),
        vec![
            TransportCommand::Play,
            TransportCommand::Pause,
            TransportCommand::Play
        ]
    );

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

/// Catalog [A, B, C]: play A, complete it, expect exactly one advance
/// to B; wrap backwards from A to C.
#[tokio::test]
async fn completion_scenario_walks_the_catalog() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(0));
    assert!(snapshot.is_playing);

    backend.handle(0).emit_finished(30_000);
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(1));

    // Back to A, then previous again wraps to C; no terminal state.
    command_tx.send(SessionCommand::Previous).await.unwrap();
    assert_eq!(snapshot_of(&command_tx).await.track_index, Some(0));
    command_tx.send(SessionCommand::Previous).await.unwrap();
    assert_eq!(snapshot_of(&command_tx).await.track_index, Some(2));

    assert_eq!(
        backend.created_uris(),
        vec!["mock://a", "mock://b", "mock://a", "mock://c"]
    );

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

/// Rapid double-tap on track B while A is loading: exactly one live
/// resource at the end, and it belongs to B.
#[tokio::test]
async fn rapid_retap_leaves_a_single_live_resource() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, _events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    command_tx
        .send(SessionCommand::PlayTrack { index: 1 })
        .await
        .unwrap();
    command_tx
        .send(SessionCommand::PlayTrack { index: 1 })
        .await
        .unwrap();

    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(1));
    assert_eq!(backend.live_count(), 1);
    assert_eq!(
        backend.created_uris(),
        vec!["mock://a", "mock://b", "mock://b"]
    );
    assert!(backend.handle(0).is_released());
    assert!(backend.handle(1).is_released());
    assert!(!backend.handle(2).is_released());
    assert_eq!(backend.handle(2).uri(), "mock://b");

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn load_failure_resets_to_uninitialized() {
    let backend = Arc::new(MockBackend::new());
    backend.fail_uri("mock://b");
    let (command_tx, mut events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    snapshot_of(&command_tx).await;
    drain_events(&mut events);

    command_tx
        .send(SessionCommand::PlayTrack { index: 1 })
        .await
        .unwrap();
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot, PlaybackSnapshot::default());
    assert_eq!(backend.live_count(), 0);

    let drained = drain_events(&mut events);
    assert!(drained
        .iter()
        .any(|event| matches!(event, SessionEvent::LoadFailed { index: 1, .. })));
    assert!(drained
        .iter()
        .any(|event| matches!(event, SessionEvent::Stopped)));

    // The session stays responsive and can load another track.
    command_tx
        .send(SessionCommand::PlayTrack { index: 2 })
        .await
        .unwrap();
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(2));
    assert_eq!(backend.live_count(), 1);

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn invalid_index_is_a_non_fatal_load_failure() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, mut events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 7 })
        .await
        .unwrap();
    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot, PlaybackSnapshot::default());
    assert!(backend.created_uris().is_empty());
    assert!(drain_events(&mut events)
        .iter()
        .any(|event| matches!(event, SessionEvent::LoadFailed { index: 7, .. })));

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn shutdown_releases_and_is_idempotent() {
    let backend = Arc::new(MockBackend::new());
    let (command_tx, mut events, task) = start_session(catalog_abc(), backend.clone());

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();
    snapshot_of(&command_tx).await;

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
    assert_eq!(backend.live_count(), 0);
    assert!(drain_events(&mut events)
        .iter()
        .any(|event| matches!(event, SessionEvent::Stopped)));

    // Sending again after the loop ended is harmless.
    let _ = command_tx.send(SessionCommand::Shutdown).await;

    // And shutting down a session that never loaded anything works too.
    let quiet_backend = Arc::new(MockBackend::new());
    let (quiet_tx, _quiet_events, quiet_task) = start_session(catalog_abc(), quiet_backend.clone());
    quiet_tx.send(SessionCommand::Shutdown).await.unwrap();
    quiet_task.await.unwrap();
    assert_eq!(quiet_backend.live_count(), 0);
}

/// Full stack against the simulated backend: a short track plays out
/// and the session auto-advances on its own.
#[tokio::test(start_paused = true)]
async fn simulated_backend_plays_through_and_advances() {
    let catalog = Catalog::from_tracks(vec![
        Track {
            id: "short".to_string(),
            title: "Short".to_string(),
            artist: "Sim".to_string(),
            duration_label: "0:00".to_string(),
            source_uri: "sim://short?ms=100".to_string(),
        },
        Track {
            id: "long".to_string(),
            title: "Long".to_string(),
            artist: "Sim".to_string(),
            duration_label: "1:40".to_string(),
            source_uri: "sim://long?ms=100000".to_string(),
        },
    ])
    .unwrap();
    let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(25), 30_000));
    let (command_tx, mut events, task) = start_session(catalog, backend);

    command_tx
        .send(SessionCommand::PlayTrack { index: 0 })
        .await
        .unwrap();

    // Wait for the auto-advance to track 1.
    loop {
        match events.recv().await {
            Ok(SessionEvent::TrackChanged { index: 1, .. }) => break,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => panic!("session ended early"),
        }
    }

    let snapshot = snapshot_of(&command_tx).await;
    assert_eq!(snapshot.track_index, Some(1));
    assert_eq!(snapshot.duration_ms, 100_000);

    command_tx.send(SessionCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}
