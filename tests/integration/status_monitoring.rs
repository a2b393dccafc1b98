//! Status monitor actor lifecycle

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use messenger_status::SnapshotState;
use messenger_status::actors::status_monitor::StatusMonitorHandle;
use messenger_status::monitors::health::HealthState;
use tokio_util::sync::CancellationToken;

use crate::helpers::{Peer, eventually, probe_config, refused_port, spawn_fake_server};

#[tokio::test]
async fn test_nothing_published_before_first_probe() {
    let state = SnapshotState::new();
    assert!(state.current_status().is_none());
}

#[tokio::test]
async fn test_first_cycle_publishes_ok() {
    let server = spawn_fake_server(Peer::Respond {
        delay: Duration::ZERO,
    })
    .await;
    let state = Arc::new(SnapshotState::new());
    let before = Utc::now();

    let handle = StatusMonitorHandle::spawn(
        &probe_config(server.port, 2),
        state.clone(),
        CancellationToken::new(),
    );

    assert!(eventually(100, || state.current_status().is_some()).await);
    let status = state.current_status().unwrap();
    assert_eq!(status.state, HealthState::Ok);
    assert!(status.last_updated >= before);
    assert!(status.last_updated <= Utc::now());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_slow_answer_publishes_slow() {
    let server = spawn_fake_server(Peer::Respond {
        delay: Duration::from_millis(50),
    })
    .await;
    let state = Arc::new(SnapshotState::new());

    let mut config = probe_config(server.port, 2);
    config.slow_after = Some(0);
    let handle = StatusMonitorHandle::spawn(&config, state.clone(), CancellationToken::new());

    assert_eq!(handle.check_now().await.unwrap(), HealthState::Slow);
    assert_eq!(state.current_status().unwrap().state, HealthState::Slow);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_server_publishes_down() {
    let port = refused_port().await;
    let state = Arc::new(SnapshotState::new());

    let handle = StatusMonitorHandle::spawn(&probe_config(port, 1), state.clone(), CancellationToken::new());

    assert_eq!(handle.check_now().await.unwrap(), HealthState::Down);
    assert_eq!(state.current_status().unwrap().state, HealthState::Down);

    // A failing probe never stops the loop
    assert_eq!(handle.check_now().await.unwrap(), HealthState::Down);
    assert!(!handle.is_finished());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_each_check_replaces_status() {
    let server = spawn_fake_server(Peer::Respond {
        delay: Duration::ZERO,
    })
    .await;
    let state = Arc::new(SnapshotState::new());
    let handle = StatusMonitorHandle::spawn(
        &probe_config(server.port, 2),
        state.clone(),
        CancellationToken::new(),
    );

    handle.check_now().await.unwrap();
    let first = state.current_status().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.check_now().await.unwrap();
    let second = state.current_status().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.last_updated >= first.last_updated);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_next_cycle_runs_after_interval() {
    let port = refused_port().await;
    let state = Arc::new(SnapshotState::new());

    let mut config = probe_config(port, 1);
    config.interval = 1;
    let handle = StatusMonitorHandle::spawn(&config, state.clone(), CancellationToken::new());

    assert!(eventually(100, || state.current_status().is_some()).await);
    let first = state.current_status().unwrap();

    // No manual check: the second publish comes from the schedule
    let replaced = eventually(150, || {
        state
            .current_status()
            .is_some_and(|status| !Arc::ptr_eq(&first, &status))
    })
    .await;
    assert!(replaced);

    let second = state.current_status().unwrap();
    assert_eq!(second.state, HealthState::Down);
    assert!(second.last_updated > first.last_updated);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cancel_mid_probe_publishes_nothing() {
    let mut server = spawn_fake_server(Peer::Silent).await;
    let state = Arc::new(SnapshotState::new());
    let cancel = CancellationToken::new();

    let handle = StatusMonitorHandle::spawn(&probe_config(server.port, 10), state.clone(), cancel.clone());

    // The probe is now waiting on a server that never answers
    server.greetings.recv().await.unwrap();
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
        .await
        .expect("monitor did not stop promptly")
        .unwrap();
    assert!(state.current_status().is_none());
}

#[tokio::test]
async fn test_cancel_during_pause_keeps_last_status() {
    let port = refused_port().await;
    let state = Arc::new(SnapshotState::new());
    let cancel = CancellationToken::new();

    let handle = StatusMonitorHandle::spawn(&probe_config(port, 1), state.clone(), cancel.clone());
    assert!(eventually(100, || state.current_status().is_some()).await);
    let published = state.current_status().unwrap();

    cancel.cancel();
    assert!(eventually(100, || handle.is_finished()).await);

    let after = state.current_status().unwrap();
    assert!(Arc::ptr_eq(&published, &after));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_parent_token_stops_monitor() {
    let port = refused_port().await;
    let state = Arc::new(SnapshotState::new());
    let parent = CancellationToken::new();

    let handle = StatusMonitorHandle::spawn(&probe_config(port, 1), state, parent.child_token());
    parent.cancel();

    assert!(eventually(100, || handle.is_finished()).await);
    assert!(handle.check_now().await.is_err());
}
