// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Outer control loop
//!
//! Wraps the state machine in single-shot or continuous operation. In
//! continuous mode the outbound endpoint always has something publishing:
//! a splash relay loops a placeholder asset whenever no live relay runs,
//! and is re-armed each iteration if it died.

use crate::session::{sleep_cancellable, SessionDeps, StreamSession};
use perch_adapters::{CloudAdapter, RelayAdapter, RelayHandle, RelayRole, RelaySpec, SunsetAdapter};
use perch_core::{AgentConfig, CancelToken, Clock, CycleOutcome};
use perch_storage::StateStore;

/// The supervisor: outer loop plus one stream session
pub struct Agent<C, R, W, S, K> {
    session: StreamSession<C, R, W, S, K>,
    relay: R,
    config: AgentConfig,
    cancel: CancelToken,
}

impl<C, R, W, S, K> Agent<C, R, W, S, K>
where
    C: CloudAdapter,
    R: RelayAdapter,
    W: SunsetAdapter,
    S: StateStore,
    K: Clock,
{
    pub fn new(
        deps: SessionDeps<C, R, W, S>,
        config: AgentConfig,
        cancel: CancelToken,
        clock: K,
    ) -> Self {
        let relay = deps.relay.clone();
        Self {
            session: StreamSession::new(deps, config.clone(), cancel.clone(), clock),
            relay,
            config,
            cancel,
        }
    }

    /// Run one cycle and report its outcome. No splash is armed in
    /// single-shot mode; the host supervisor owns restart policy.
    pub async fn run_once(&self) -> CycleOutcome {
        let mut splash = None;
        self.session.run_cycle(&mut splash).await
    }

    /// Run until cancelled. Tears both relay roles down before returning.
    pub async fn run_continuous(&self) {
        let mut splash: Option<RelayHandle> = None;

        while !self.cancel.is_cancelled() {
            self.ensure_splash(&mut splash).await;

            let outcome = self.session.run_cycle(&mut splash).await;
            tracing::info!(%outcome, "cycle finished");

            if self.cancel.is_cancelled() {
                break;
            }
            // Brief pause so immediate repeated failures (e.g. a
            // persistent auth problem) don't become a tight loop
            if !sleep_cancellable(&self.cancel, self.config.retry_delay).await {
                break;
            }
        }

        if let Some(handle) = splash.take() {
            self.relay.stop(&handle).await;
        }
    }

    /// Start (or restart) the splash relay if one is configured and not
    /// currently publishing
    async fn ensure_splash(&self, splash: &mut Option<RelayHandle>) {
        let Some(asset) = &self.config.splash_asset else {
            return;
        };
        if let Some(handle) = splash {
            if self.relay.is_alive(handle).await {
                return;
            }
            tracing::info!("splash relay died, re-arming");
            *splash = None;
        }

        let spec = RelaySpec {
            input: asset.display().to_string(),
            out_url: self.config.out_url.clone(),
            video_codec: self.config.video_codec.clone(),
            log_level: self.config.relay_log_level.clone(),
            loop_input: true,
        };
        match self.relay.start(RelayRole::Splash, &spec).await {
            Ok(handle) => *splash = Some(handle),
            Err(e) => tracing::warn!(error = %e, "splash relay failed to start"),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
