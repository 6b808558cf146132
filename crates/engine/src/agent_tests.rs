// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;
use perch_adapters::{FakeCloudAdapter, FakeRelayAdapter, FixedSunsetAdapter};
use perch_core::FakeClock;
use perch_storage::MemoryStore;
use std::path::PathBuf;
use std::time::Duration;

type TestAgent = Agent<
    FakeCloudAdapter,
    FakeRelayAdapter,
    FixedSunsetAdapter,
    MemoryStore<FakeClock>,
    FakeClock,
>;

struct Harness {
    cloud: FakeCloudAdapter,
    relay: FakeRelayAdapter,
    cancel: CancelToken,
    agent: TestAgent,
}

fn continuous_config() -> AgentConfig {
    AgentConfig {
        feeder_name: "porch".to_string(),
        out_url: "rtsp://restream.local/feeder".to_string(),
        splash_asset: Some(PathBuf::from("/srv/splash.mp4")),
        poll_interval: Duration::from_millis(1),
        retry_delay: Duration::from_millis(1),
        ..AgentConfig::default()
    }
}

fn harness(config: AgentConfig) -> Harness {
    let cloud = FakeCloudAdapter::new();
    let relay = FakeRelayAdapter::new();
    let clock = FakeClock::new();
    let cancel = CancelToken::new();
    let agent = Agent::new(
        SessionDeps {
            cloud: cloud.clone(),
            relay: relay.clone(),
            sunset: FixedSunsetAdapter::new(),
            store: MemoryStore::new(clock.clone()),
        },
        config,
        cancel.clone(),
        clock,
    );
    Harness {
        cloud,
        relay,
        cancel,
        agent,
    }
}

fn cancel_after(cancel: &CancelToken, delay: Duration) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        cancel.cancel();
    });
}

#[tokio::test]
async fn continuous_mode_arms_splash_and_tears_it_down() {
    let h = harness(continuous_config());
    // Empty listings: every cycle ends in FeederNotFound and retries
    h.cloud.push_listing(vec![]);

    cancel_after(&h.cancel, Duration::from_millis(30));
    h.agent.run_continuous().await;

    assert!(h.relay.starts(perch_adapters::RelayRole::Splash) >= 1);
    assert!(h.relay.stops(perch_adapters::RelayRole::Splash) >= 1);
}

#[tokio::test]
async fn dead_splash_is_rearmed_each_iteration() {
    let h = harness(continuous_config());
    h.cloud.push_listing(vec![]);
    // Every liveness poll reports dead, so each iteration re-arms
    h.relay.die_after_polls(0);

    cancel_after(&h.cancel, Duration::from_millis(30));
    h.agent.run_continuous().await;

    assert!(h.relay.starts(perch_adapters::RelayRole::Splash) >= 2);
}

#[tokio::test]
async fn single_shot_never_arms_a_splash() {
    let h = harness(continuous_config());
    h.cloud.push_listing(vec![]);

    let outcome = h.agent.run_once().await;
    assert_eq!(outcome, CycleOutcome::FeederNotFound);
    assert_eq!(h.relay.starts(perch_adapters::RelayRole::Splash), 0);
}

#[tokio::test]
async fn no_splash_without_an_asset() {
    let h = harness(AgentConfig {
        splash_asset: None,
        ..continuous_config()
    });
    h.cloud.push_listing(vec![]);

    cancel_after(&h.cancel, Duration::from_millis(20));
    h.agent.run_continuous().await;

    assert_eq!(h.relay.starts(perch_adapters::RelayRole::Splash), 0);
}

#[tokio::test]
async fn cancellation_before_the_first_cycle_does_nothing() {
    let h = harness(continuous_config());
    h.cancel.cancel();

    h.agent.run_continuous().await;
    assert!(h.cloud.calls().is_empty());
    assert!(h.relay.calls().is_empty());
}
