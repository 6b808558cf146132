// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Relay subprocess adapters
//!
//! A relay ingests one input (the live stream URL, or a looping local
//! asset for the splash role) and republishes it to the outbound
//! endpoint. Exactly one relay per role is live at a time.

mod ffmpeg;

pub use ffmpeg::FfmpegRelayAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRelay, FakeRelayAdapter, RelayCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to spawn relay: {0}")]
    SpawnFailed(String),
}

/// Which job a relay is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayRole {
    /// Placeholder loop published while no live feed is available
    Splash,
    /// The live feeder stream
    Relay,
}

impl std::fmt::Display for RelayRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Splash => write!(f, "splash"),
            Self::Relay => write!(f, "relay"),
        }
    }
}

/// Identity of one live relay process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayHandle {
    pub role: RelayRole,
    /// Process id, which is also the process group id (the relay is
    /// spawned as a session leader)
    pub pid: i32,
}

/// What to run: one input, one outbound publish
#[derive(Debug, Clone)]
pub struct RelaySpec {
    pub input: String,
    pub out_url: String,
    /// Video codec, or `copy` for passthrough
    pub video_codec: String,
    /// ffmpeg `-loglevel` value
    pub log_level: String,
    /// Loop the input forever (splash asset)
    pub loop_input: bool,
}

impl RelaySpec {
    /// ffmpeg argument list for this spec
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            self.log_level.clone(),
        ];
        if self.loop_input {
            args.extend(["-stream_loop".into(), "-1".into(), "-re".into()]);
        }
        args.extend(["-i".into(), self.input.clone()]);
        if self.video_codec == "copy" {
            args.extend(["-c:v".into(), "copy".into()]);
        } else {
            args.extend([
                "-c:v".into(),
                self.video_codec.clone(),
                "-profile:v".into(),
                "main".into(),
                "-preset".into(),
                "veryfast".into(),
            ]);
        }
        if self.loop_input {
            // Splash assets carry no useful audio
            args.push("-an".into());
        } else {
            args.extend(["-c:a".into(), "copy".into()]);
        }
        args.extend(["-f".into(), "rtsp".into(), self.out_url.clone()]);
        args
    }
}

/// Adapter for relay subprocess lifecycle.
///
/// `stop` is idempotent: stopping an already-dead handle is a no-op.
#[async_trait]
pub trait RelayAdapter: Clone + Send + Sync + 'static {
    /// Launch a relay in its own process group
    async fn start(&self, role: RelayRole, spec: &RelaySpec) -> Result<RelayHandle, RelayError>;

    /// Non-blocking liveness check
    async fn is_alive(&self, handle: &RelayHandle) -> bool;

    /// Two-stage teardown: graceful terminate, then a forceful kill of
    /// the whole process group if the relay ignores it
    async fn stop(&self, handle: &RelayHandle);
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
