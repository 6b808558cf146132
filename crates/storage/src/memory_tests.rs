// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;
use chrono::Duration as ChronoDuration;
use perch_core::FakeClock;

#[test]
fn cooldown_gates_until_expiry() {
    let clock = FakeClock::new();
    let store = MemoryStore::new(clock.clone());
    store.set_cooldown(Duration::from_secs(120)).unwrap();
    assert!(store.is_in_cooldown());

    clock.advance(ChronoDuration::seconds(121));
    assert!(!store.is_in_cooldown());
}

#[test]
fn clones_share_state() {
    let store = MemoryStore::new(FakeClock::new());
    let view = store.clone();
    store.set_recovery().unwrap();
    assert!(view.is_recovery_active());
}

#[test]
fn tokens_round_trip() {
    let store = MemoryStore::new(FakeClock::new());
    let tokens = SessionTokens {
        refresh_token: "r".to_string(),
        access_token: "a".to_string(),
    };
    store.save_tokens(&tokens).unwrap();
    assert_eq!(store.load_tokens(), Some(tokens));
}
