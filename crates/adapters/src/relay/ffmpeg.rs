// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! ffmpeg relay adapter
//!
//! Relays are spawned as session leaders (`setsid`) so they detach from
//! the supervisor's terminal and the whole transcode pipeline can be
//! signalled as one process group. ffmpeg mid-transcode may ignore a
//! plain SIGTERM, hence the escalation to a group-wide SIGKILL.

use super::{RelayAdapter, RelayError, RelayHandle, RelayRole, RelaySpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::{Child, Command};

/// Relay adapter that runs ffmpeg
#[derive(Clone)]
pub struct FfmpegRelayAdapter {
    binary: String,
    grace: Duration,
    children: Arc<Mutex<HashMap<i32, Child>>>,
}

impl FfmpegRelayAdapter {
    /// Adapter for the `ffmpeg` on PATH with the given per-stage
    /// termination grace period
    pub fn new(grace: Duration) -> Self {
        Self::with_binary("ffmpeg", grace)
    }

    /// Adapter for an explicit binary (tests use a shell script)
    pub fn with_binary(binary: &str, grace: Duration) -> Self {
        Self {
            binary: binary.to_string(),
            grace,
            children: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn take_child(&self, pid: i32) -> Option<Child> {
        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&pid)
    }
}

#[async_trait]
impl RelayAdapter for FfmpegRelayAdapter {
    async fn start(&self, role: RelayRole, spec: &RelaySpec) -> Result<RelayHandle, RelayError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(spec.to_args())
            .stdin(Stdio::null())
            // ffmpeg output goes to the supervisor's own streams
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[allow(unsafe_code)]
        // SAFETY: setsid is async-signal-safe and touches no memory;
        // called between fork and exec to make the child a session leader.
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|e| {
            tracing::error!(%role, binary = %self.binary, error = %e, "relay spawn failed");
            RelayError::SpawnFailed(e.to_string())
        })?;

        let pid = child
            .id()
            .map(|p| p as i32)
            .ok_or_else(|| RelayError::SpawnFailed("relay exited during spawn".to_string()))?;

        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pid, child);

        tracing::info!(%role, pid, "relay started");
        Ok(RelayHandle { role, pid })
    }

    async fn is_alive(&self, handle: &RelayHandle) -> bool {
        let mut children = self.children.lock().unwrap_or_else(|e| e.into_inner());
        let Some(child) = children.get_mut(&handle.pid) else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                tracing::info!(role = %handle.role, pid = handle.pid, %status, "relay exited");
                children.remove(&handle.pid);
                false
            }
            Err(e) => {
                tracing::warn!(role = %handle.role, pid = handle.pid, error = %e, "relay wait failed");
                children.remove(&handle.pid);
                false
            }
        }
    }

    async fn stop(&self, handle: &RelayHandle) {
        let Some(mut child) = self.take_child(handle.pid) else {
            tracing::debug!(role = %handle.role, pid = handle.pid, "relay already stopped");
            return;
        };

        if let Ok(Some(_)) = child.try_wait() {
            return;
        }

        tracing::info!(role = %handle.role, pid = handle.pid, "stopping relay");
        signal_group(handle.pid, libc::SIGTERM);
        if wait_with_grace(&mut child, self.grace).await {
            return;
        }

        tracing::warn!(
            role = %handle.role,
            pid = handle.pid,
            "relay ignored SIGTERM, killing process group"
        );
        signal_group(handle.pid, libc::SIGKILL);
        if !wait_with_grace(&mut child, self.grace).await {
            tracing::error!(role = %handle.role, pid = handle.pid, "relay survived SIGKILL");
        }
    }
}

/// Wait for the child to exit, up to `grace`. Returns true once reaped.
async fn wait_with_grace(child: &mut Child, grace: Duration) -> bool {
    tokio::time::timeout(grace, child.wait()).await.is_ok()
}

/// Signal the whole process group led by `pid`.
#[allow(unsafe_code)]
fn signal_group(pid: i32, signal: i32) {
    if pid <= 0 {
        return;
    }
    // SAFETY: killpg only sends a signal; no memory is touched.
    let rc = unsafe { libc::killpg(pid, signal) };
    if rc != 0 {
        tracing::debug!(
            pid,
            signal,
            error = %std::io::Error::last_os_error(),
            "killpg failed"
        );
    }
}

#[cfg(test)]
#[path = "ffmpeg_tests.rs"]
mod tests;
