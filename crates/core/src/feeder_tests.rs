// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;

#[test]
fn wire_roundtrip_for_known_states() {
    for wire in [
        "READY_TO_STREAM",
        "STREAMING",
        "DEEP_SLEEP",
        "OFFLINE",
        "OFF_GRID",
        "OUT_OF_FEEDER",
    ] {
        assert_eq!(FeederState::from_wire(wire).to_string(), wire);
    }
}

#[test]
fn unknown_state_is_preserved() {
    let state = FeederState::from_wire("FIRMWARE_UPDATE");
    assert_eq!(state, FeederState::Other("FIRMWARE_UPDATE".to_string()));
    assert!(!state.is_streamable());
    assert!(!state.is_unreachable());
}

#[test]
fn streamable_states() {
    assert!(FeederState::ReadyToStream.is_streamable());
    assert!(FeederState::Streaming.is_streamable());
    assert!(!FeederState::DeepSleep.is_streamable());
}

#[test]
fn unreachable_states_set() {
    for state in [
        FeederState::DeepSleep,
        FeederState::Offline,
        FeederState::OffGrid,
        FeederState::OutOfFeeder,
    ] {
        assert!(state.is_unreachable(), "{} should be unreachable", state);
    }
    assert!(!FeederState::ReadyToStream.is_unreachable());
    assert!(!FeederState::Streaming.is_unreachable());
}
