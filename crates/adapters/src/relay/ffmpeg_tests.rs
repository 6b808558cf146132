// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

fn script(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("relay.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

fn spec() -> RelaySpec {
    RelaySpec {
        input: "ignored".to_string(),
        out_url: "ignored".to_string(),
        video_codec: "copy".to_string(),
        log_level: "warning".to_string(),
        loop_input: false,
    }
}

#[tokio::test]
async fn spawn_failure_is_an_error_not_a_panic() {
    let adapter =
        FfmpegRelayAdapter::with_binary("/nonexistent/ffmpeg", Duration::from_millis(200));
    let result = adapter.start(RelayRole::Relay, &spec()).await;
    assert!(matches!(result, Err(RelayError::SpawnFailed(_))));
}

#[tokio::test]
async fn graceful_stop_of_cooperative_process() {
    let dir = TempDir::new().unwrap();
    let bin = script(&dir, "sleep 30");
    let adapter = FfmpegRelayAdapter::with_binary(&bin, Duration::from_millis(500));

    let handle = adapter.start(RelayRole::Relay, &spec()).await.unwrap();
    assert!(adapter.is_alive(&handle).await);

    adapter.stop(&handle).await;
    assert!(!adapter.is_alive(&handle).await);
}

#[tokio::test]
async fn escalates_to_kill_when_sigterm_is_ignored() {
    let dir = TempDir::new().unwrap();
    let bin = script(&dir, "trap '' TERM\nwhile :; do sleep 0.1; done");
    let adapter = FfmpegRelayAdapter::with_binary(&bin, Duration::from_millis(300));

    let handle = adapter.start(RelayRole::Relay, &spec()).await.unwrap();
    assert!(adapter.is_alive(&handle).await);

    adapter.stop(&handle).await;
    assert!(!adapter.is_alive(&handle).await);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let bin = script(&dir, "sleep 30");
    let adapter = FfmpegRelayAdapter::with_binary(&bin, Duration::from_millis(500));

    let handle = adapter.start(RelayRole::Relay, &spec()).await.unwrap();
    adapter.stop(&handle).await;
    // Second stop on a dead handle must be a no-op
    adapter.stop(&handle).await;
}

#[tokio::test]
async fn is_alive_notices_a_dead_process() {
    let dir = TempDir::new().unwrap();
    let bin = script(&dir, "exit 0");
    let adapter = FfmpegRelayAdapter::with_binary(&bin, Duration::from_millis(500));

    let handle = adapter.start(RelayRole::Relay, &spec()).await.unwrap();
    // Give the script a moment to exit
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!adapter.is_alive(&handle).await);
}
