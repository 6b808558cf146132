// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;
use perch_adapters::{CloudCall, FakeCloudAdapter, FakeRelayAdapter, FixedSunsetAdapter, RelayCall};
use perch_core::{FakeClock, FeederState};
use perch_storage::{MemoryStore, StateStore};

type TestSession = StreamSession<
    FakeCloudAdapter,
    FakeRelayAdapter,
    FixedSunsetAdapter,
    MemoryStore<FakeClock>,
    FakeClock,
>;

struct Harness {
    cloud: FakeCloudAdapter,
    relay: FakeRelayAdapter,
    sunset: FixedSunsetAdapter,
    store: MemoryStore<FakeClock>,
    cancel: CancelToken,
    session: TestSession,
}

fn test_config() -> AgentConfig {
    AgentConfig {
        feeder_name: "porch".to_string(),
        out_url: "rtsp://restream.local/feeder".to_string(),
        min_battery_level: 40,
        min_starting_battery_level: 70,
        poll_interval: Duration::from_millis(1),
        keep_alive_interval: Duration::from_millis(3),
        feeder_refresh_interval: Duration::from_millis(5),
        retry_delay: Duration::from_millis(1),
        ..AgentConfig::default()
    }
}

fn harness(config: AgentConfig) -> Harness {
    let cloud = FakeCloudAdapter::new();
    let relay = FakeRelayAdapter::new();
    let sunset = FixedSunsetAdapter::new();
    let clock = FakeClock::new();
    let store = MemoryStore::new(clock.clone());
    let cancel = CancelToken::new();
    let session = StreamSession::new(
        SessionDeps {
            cloud: cloud.clone(),
            relay: relay.clone(),
            sunset: sunset.clone(),
            store: store.clone(),
        },
        config,
        cancel.clone(),
        clock,
    );
    Harness {
        cloud,
        relay,
        sunset,
        store,
        cancel,
        session,
    }
}

fn feeder(state: FeederState, battery: u8) -> FeederSnapshot {
    FeederSnapshot {
        id: "id-porch".to_string(),
        name: "porch".to_string(),
        state,
        battery_percentage: battery,
    }
}

fn ready(battery: u8) -> Vec<FeederSnapshot> {
    vec![feeder(FeederState::ReadyToStream, battery)]
}

async fn run(h: &Harness) -> CycleOutcome {
    let mut splash = None;
    h.session.run_cycle(&mut splash).await
}

#[tokio::test]
async fn cooldown_gates_all_remote_and_relay_activity() {
    let h = harness(test_config());
    h.store.set_cooldown(Duration::from_secs(300)).unwrap();
    h.cloud.push_listing(ready(100));

    assert_eq!(run(&h).await, CycleOutcome::Cooldown);
    assert!(h.cloud.calls().is_empty());
    assert!(h.relay.calls().is_empty());
}

#[tokio::test]
async fn auth_failure_ends_the_cycle() {
    let h = harness(test_config());
    h.cloud.fail_refresh();

    assert_eq!(run(&h).await, CycleOutcome::AuthError);
    assert!(h.relay.calls().is_empty());
}

#[tokio::test]
async fn listing_failure_maps_to_auth_error() {
    let h = harness(test_config());
    h.cloud.fail_list_feeders();

    assert_eq!(run(&h).await, CycleOutcome::AuthError);
}

#[tokio::test]
async fn unknown_feeder_name() {
    let h = harness(AgentConfig {
        feeder_name: "garden".to_string(),
        ..test_config()
    });
    h.cloud.push_listing(ready(90));

    assert_eq!(run(&h).await, CycleOutcome::FeederNotFound);
    assert!(!h.store.is_in_cooldown());
}

#[tokio::test]
async fn offline_feeder_sets_cooldown() {
    let h = harness(test_config());
    h.cloud.push_listing(vec![feeder(FeederState::Offline, 90)]);

    assert_eq!(run(&h).await, CycleOutcome::FeederUnavailable);
    assert!(h.store.is_in_cooldown());
    assert!(h.relay.calls().is_empty());
}

#[tokio::test]
async fn unknown_state_is_unavailable_without_cooldown() {
    let h = harness(test_config());
    h.cloud
        .push_listing(vec![feeder(FeederState::Other("PAIRING".to_string()), 90)]);

    assert_eq!(run(&h).await, CycleOutcome::FeederUnavailable);
    assert!(!h.store.is_in_cooldown());
}

#[tokio::test]
async fn quiet_window_suppresses_regardless_of_battery() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(100));
    h.sunset.set_quiet(true);

    assert_eq!(run(&h).await, CycleOutcome::QuietWindow);
    assert!(h.store.is_in_cooldown());
    assert!(h.relay.calls().is_empty());
}

#[tokio::test]
async fn low_battery_sets_recovery_and_cooldown() {
    // battery 35 vs floor 40
    let h = harness(test_config());
    h.cloud.push_listing(ready(35));

    assert_eq!(run(&h).await, CycleOutcome::LowBattery);
    assert!(h.store.is_recovery_active());
    assert!(h.store.is_in_cooldown());
    assert!(h.relay.starts(perch_adapters::RelayRole::Relay) == 0);
    assert!(!h
        .cloud
        .calls()
        .iter()
        .any(|c| matches!(c, CloudCall::StartWatching { .. })));
}

#[tokio::test]
async fn recovery_holds_until_starting_threshold() {
    // recovery active, battery 65 vs starting threshold 70
    let h = harness(test_config());
    h.store.set_recovery().unwrap();
    h.cloud.push_listing(ready(65));

    assert_eq!(run(&h).await, CycleOutcome::RecoveringLowBattery);
    assert!(h.store.is_recovery_active());
    assert!(h.store.is_in_cooldown());
}

#[tokio::test]
async fn recovery_clears_once_recharged() {
    // recovery active, battery 75 >= 70: proceeds to start-watch
    let h = harness(test_config());
    h.store.set_recovery().unwrap();
    h.cloud.push_listing(ready(75));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(1);

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert!(!h.store.is_recovery_active());
    assert!(h
        .cloud
        .calls()
        .iter()
        .any(|c| matches!(c, CloudCall::StartWatching { .. })));
}

#[tokio::test]
async fn outside_recovery_the_low_threshold_gates() {
    // battery 55 is below starting (70) but recovery is not active
    let h = harness(test_config());
    h.cloud.push_listing(ready(55));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(1);

    assert_eq!(run(&h).await, CycleOutcome::Completed);
}

#[tokio::test]
async fn equal_to_threshold_is_acceptable() {
    // strict less-than: battery == floor streams
    let h = harness(test_config());
    h.cloud.push_listing(ready(40));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(1);

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert!(!h.store.is_recovery_active());
}

#[tokio::test]
async fn empty_stream_url_sets_cooldown_without_a_relay() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(None);

    assert_eq!(run(&h).await, CycleOutcome::EmptyStreamUrl);
    assert!(h.store.is_in_cooldown());
    assert!(h.relay.calls().is_empty());
}

#[tokio::test]
async fn start_watch_failure_behaves_like_empty_url() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.fail_start_watching();

    assert_eq!(run(&h).await, CycleOutcome::EmptyStreamUrl);
    assert!(h.store.is_in_cooldown());
}

#[tokio::test]
async fn relay_start_failure() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.fail_next_start();

    assert_eq!(run(&h).await, CycleOutcome::RelayStartFailed);
    assert!(!h.store.is_in_cooldown());
}

#[tokio::test]
async fn cancellation_after_start_watch_skips_the_relay() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.cancel.cancel();

    assert_eq!(run(&h).await, CycleOutcome::Cancelled);
    // The watch session was opened remotely but no relay consumes it
    assert!(h
        .cloud
        .calls()
        .iter()
        .any(|c| matches!(c, CloudCall::StartWatching { .. })));
    assert!(h.relay.calls().is_empty());
}

#[tokio::test]
async fn successful_cycle_hands_over_from_splash() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(2);

    // Outer loop armed a splash before the cycle
    let splash_spec = RelaySpec {
        input: "/srv/splash.mp4".to_string(),
        out_url: "rtsp://restream.local/feeder".to_string(),
        video_codec: "libx264".to_string(),
        log_level: "warning".to_string(),
        loop_input: true,
    };
    let splash_handle = h
        .relay
        .start(perch_adapters::RelayRole::Splash, &splash_spec)
        .await
        .unwrap();
    let mut splash = Some(splash_handle);

    let outcome = h.session.run_cycle(&mut splash).await;
    assert_eq!(outcome, CycleOutcome::Completed);
    assert!(splash.is_none(), "splash slot is cleared on handover");
    assert_eq!(h.relay.stops(perch_adapters::RelayRole::Splash), 1);
    assert_eq!(h.relay.starts(perch_adapters::RelayRole::Relay), 1);
    assert_eq!(h.relay.stops(perch_adapters::RelayRole::Relay), 1);

    // The relay ran with the watch session's URL
    let live = h
        .relay
        .calls()
        .iter()
        .filter_map(|c| match c {
            RelayCall::Start { role } => Some(*role),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(
        live,
        vec![
            perch_adapters::RelayRole::Splash,
            perch_adapters::RelayRole::Relay
        ]
    );
}

#[tokio::test]
async fn keep_alives_flow_while_streaming() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(25);

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert!(h.cloud.keep_alive_count() >= 1, "no keep-alives were sent");
}

#[tokio::test]
async fn a_missed_keep_alive_does_not_abort_the_stream() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.cloud.fail_keep_alive();
    h.relay.die_after_polls(25);

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert!(h.cloud.keep_alive_count() >= 1);
}

#[tokio::test]
async fn battery_drop_mid_stream_enters_recovery() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90)); // initial resolve
    h.cloud.push_listing(ready(10)); // re-poll during streaming
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(200);

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert!(h.store.is_recovery_active());
    assert!(h.store.is_in_cooldown());
    assert_eq!(h.relay.stops(perch_adapters::RelayRole::Relay), 1);
}

#[tokio::test]
async fn quiet_window_reached_mid_stream_stops_cleanly() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(500);

    let sunset = h.sunset.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        sunset.set_quiet(true);
    });

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    // Natural nightly stop: no recovery, relay torn down
    assert!(!h.store.is_recovery_active());
    assert_eq!(h.relay.stops(perch_adapters::RelayRole::Relay), 1);
}

#[tokio::test]
async fn cancellation_mid_stream_tears_the_relay_down() {
    let h = harness(test_config());
    h.cloud.push_listing(ready(90));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(500);

    let cancel = h.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert_eq!(h.relay.stops(perch_adapters::RelayRole::Relay), 1);
}

#[tokio::test]
async fn recovery_persists_across_cycles_until_recharged() {
    let h = harness(test_config());

    // One listing per cycle: drains, recharging, recharged
    h.cloud.push_listing(ready(35));
    h.cloud.push_listing(ready(50));
    h.cloud.push_listing(ready(80));
    h.cloud.set_stream_url(Some("rtsps://cloud.example/live/abc"));
    h.relay.die_after_polls(1);

    // Cycle 1: battery 35 enters recovery
    assert_eq!(run(&h).await, CycleOutcome::LowBattery);
    assert!(h.store.is_recovery_active());

    // Cycle 2: cooldown elapsed, battery back to 50 but still recovering
    h.store.clear_cooldown().unwrap();
    assert_eq!(run(&h).await, CycleOutcome::RecoveringLowBattery);
    assert!(h.store.is_recovery_active());

    // Cycle 3: recharged past the starting threshold
    h.store.clear_cooldown().unwrap();
    assert_eq!(run(&h).await, CycleOutcome::Completed);
    assert!(!h.store.is_recovery_active());
}
