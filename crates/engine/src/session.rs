// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Stream session state machine
//!
//! One pass per outer-loop iteration. The pipeline holds no state of
//! its own between invocations; everything durable lives in the state
//! store, read at entry and written as decisions are made. Each step
//! can end the cycle early with a distinct [`CycleOutcome`].

use perch_adapters::{
    CloudAdapter, CloudError, RelayAdapter, RelayHandle, RelayRole, RelaySpec, SunsetAdapter,
};
use perch_core::{AgentConfig, CancelToken, Clock, CycleOutcome, FeederSnapshot};
use perch_storage::StateStore;
use std::time::{Duration, Instant};

/// Granularity at which sleeps observe cancellation
const CANCEL_POLL: Duration = Duration::from_millis(250);

/// Why the keep-alive loop stopped
enum StopReason {
    RelayDied,
    LowBattery,
    QuietWindow,
    Cancelled,
}

/// Adapter dependencies for a stream session
pub struct SessionDeps<C, R, W, S> {
    pub cloud: C,
    pub relay: R,
    pub sunset: W,
    pub store: S,
}

/// The per-cycle decision pipeline and keep-alive loop
pub struct StreamSession<C, R, W, S, K> {
    cloud: C,
    relay: R,
    sunset: W,
    store: S,
    clock: K,
    config: AgentConfig,
    cancel: CancelToken,
}

impl<C, R, W, S, K> StreamSession<C, R, W, S, K>
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
        Self {
            cloud: deps.cloud,
            relay: deps.relay,
            sunset: deps.sunset,
            store: deps.store,
            clock,
            config,
            cancel,
        }
    }

    /// Run one full cycle. `splash` is the outer loop's placeholder
    /// relay; it is stopped (and the slot cleared) just before the real
    /// relay takes over the outbound endpoint.
    pub async fn run_cycle(&self, splash: &mut Option<RelayHandle>) -> CycleOutcome {
        // 1. A standing cooldown suppresses everything, including remote calls
        if self.store.is_in_cooldown() {
            tracing::info!(until = ?self.store.load_cooldown(), "in cooldown, skipping cycle");
            return CycleOutcome::Cooldown;
        }

        // 2. The cooldown is spent; open (or refresh) the cloud session
        if let Err(e) = self.store.clear_cooldown() {
            tracing::warn!(error = %e, "failed to clear cooldown marker");
        }
        let tokens = match self.cloud.refresh().await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(error = %e, "session refresh failed");
                return CycleOutcome::AuthError;
            }
        };
        if let Err(e) = self.store.save_tokens(&tokens) {
            tracing::warn!(error = %e, "failed to cache session tokens");
        }

        // 3. Resolve the target feeder by name
        let feeder = match self.find_feeder().await {
            Ok(Some(feeder)) => feeder,
            Ok(None) => {
                tracing::error!(name = %self.config.feeder_name, "feeder not found");
                return CycleOutcome::FeederNotFound;
            }
            // The listing is part of the same remote session as the refresh
            Err(e) => {
                tracing::error!(error = %e, "feeder listing failed");
                return CycleOutcome::AuthError;
            }
        };
        tracing::info!(
            id = %feeder.id,
            state = %feeder.state,
            battery = feeder.battery_percentage,
            "found feeder"
        );

        // 4. The feeder must be ready to stream or already streaming
        if !feeder.state.is_streamable() {
            if feeder.state.is_unreachable() {
                self.enter_cooldown();
            }
            tracing::info!(state = %feeder.state, "feeder not streamable");
            return CycleOutcome::FeederUnavailable;
        }

        // 5. Quiet window near the device's own sleep transition
        if self.sunset.in_quiet_window(self.clock.now()) {
            self.enter_cooldown();
            tracing::info!("inside sunset quiet window");
            return CycleOutcome::QuietWindow;
        }

        // 6. Battery floor: below it we enter recovery and back off
        if feeder.battery_percentage < self.config.min_battery_level {
            tracing::info!(
                battery = feeder.battery_percentage,
                floor = self.config.min_battery_level,
                "battery too low, entering recovery"
            );
            if let Err(e) = self.store.set_recovery() {
                tracing::warn!(error = %e, "failed to persist recovery flag");
            }
            self.enter_cooldown();
            return CycleOutcome::LowBattery;
        }

        // 7. In recovery the higher starting threshold gates resumption
        if self.store.is_recovery_active()
            && feeder.battery_percentage < self.config.min_starting_battery_level
        {
            tracing::info!(
                battery = feeder.battery_percentage,
                floor = self.config.min_starting_battery_level,
                "recovering, battery not yet sufficient"
            );
            self.enter_cooldown();
            return CycleOutcome::RecoveringLowBattery;
        }

        // 8. Sufficiently charged; recovery (if any) is over
        if let Err(e) = self.store.clear_recovery() {
            tracing::warn!(error = %e, "failed to clear recovery flag");
        }
        let watch = match self.cloud.start_watching(&feeder.id).await {
            Ok(watch) => watch,
            Err(e) => {
                tracing::warn!(error = %e, "start-watch failed");
                self.enter_cooldown();
                return CycleOutcome::EmptyStreamUrl;
            }
        };
        if self.cancel.is_cancelled() {
            // The watch session just opened stays unconsumed; the
            // remote side times it out without keep-alives
            tracing::info!("cancelled before relay start");
            return CycleOutcome::Cancelled;
        }

        // 9. The cloud can acknowledge a watch without a usable URL
        let Some(url) = watch.url() else {
            tracing::warn!("start-watch returned no stream URL");
            self.enter_cooldown();
            return CycleOutcome::EmptyStreamUrl;
        };

        // 10. Hand the outbound endpoint over from splash to the live relay
        if let Some(handle) = splash.take() {
            self.relay.stop(&handle).await;
        }
        let spec = self.live_spec(url);
        let handle = match self.relay.start(RelayRole::Relay, &spec).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "relay failed to start");
                return CycleOutcome::RelayStartFailed;
            }
        };

        // 11. Stream until something says stop
        let reason = self.keep_alive_loop(&handle).await;
        match reason {
            StopReason::RelayDied => tracing::info!("relay process exited"),
            StopReason::LowBattery => {
                if let Err(e) = self.store.set_recovery() {
                    tracing::warn!(error = %e, "failed to persist recovery flag");
                }
                self.enter_cooldown();
            }
            StopReason::QuietWindow => tracing::info!("quiet window reached, stopping for the night"),
            StopReason::Cancelled => tracing::info!("cancelled while streaming"),
        }

        // 12. Tear the relay down (idempotent if it already died)
        self.relay.stop(&handle).await;
        CycleOutcome::Completed
    }

    /// Keep the relay and the remote watch session alive until a stop
    /// condition is met. Keep-alive failures are logged and swallowed;
    /// only the slower full feeder re-poll decides battery stops.
    async fn keep_alive_loop(&self, handle: &RelayHandle) -> StopReason {
        let mut last_keep_alive = Instant::now();
        let mut last_feeder_poll = Instant::now();

        loop {
            if !sleep_cancellable(&self.cancel, self.config.poll_interval).await {
                return StopReason::Cancelled;
            }
            if !self.relay.is_alive(handle).await {
                return StopReason::RelayDied;
            }
            if self.sunset.in_quiet_window(self.clock.now()) {
                return StopReason::QuietWindow;
            }

            if last_keep_alive.elapsed() >= self.config.keep_alive_interval {
                last_keep_alive = Instant::now();
                if let Err(e) = self.cloud.keep_alive().await {
                    tracing::warn!(error = %e, "keep-alive failed");
                }
            }

            if last_feeder_poll.elapsed() >= self.config.feeder_refresh_interval {
                last_feeder_poll = Instant::now();
                match self.find_feeder().await {
                    Ok(Some(feeder)) => {
                        tracing::debug!(
                            battery = feeder.battery_percentage,
                            state = %feeder.state,
                            "feeder re-poll"
                        );
                        if feeder.battery_percentage < self.config.min_battery_level {
                            tracing::info!(
                                battery = feeder.battery_percentage,
                                floor = self.config.min_battery_level,
                                "battery fell below floor, stopping stream"
                            );
                            return StopReason::LowBattery;
                        }
                    }
                    Ok(None) => {
                        tracing::warn!("feeder missing from listing during stream");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "feeder re-poll failed");
                    }
                }
            }
        }
    }

    async fn find_feeder(&self) -> Result<Option<FeederSnapshot>, CloudError> {
        let feeders = self.cloud.list_feeders().await?;
        Ok(feeders
            .into_iter()
            .find(|f| f.name == self.config.feeder_name))
    }

    fn live_spec(&self, url: &str) -> RelaySpec {
        RelaySpec {
            input: url.to_string(),
            out_url: self.config.out_url.clone(),
            video_codec: self.config.video_codec.clone(),
            log_level: self.config.relay_log_level.clone(),
            loop_input: false,
        }
    }

    fn enter_cooldown(&self) {
        if let Err(e) = self.store.set_cooldown(self.config.cooldown) {
            tracing::warn!(error = %e, "failed to persist cooldown");
        }
    }
}

/// Sleep for `total`, waking every [`CANCEL_POLL`] to observe the
/// cancellation token. Returns false if cancellation was requested.
pub(crate) async fn sleep_cancellable(cancel: &CancelToken, total: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        tokio::time::sleep(CANCEL_POLL.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
