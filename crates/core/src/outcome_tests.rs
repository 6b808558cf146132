// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;

#[test]
fn exit_codes_are_stable() {
    assert_eq!(CycleOutcome::Completed.exit_code(), 0);
    assert_eq!(CycleOutcome::Cooldown.exit_code(), 0);
    assert_eq!(CycleOutcome::QuietWindow.exit_code(), 0);
    assert_eq!(CycleOutcome::Cancelled.exit_code(), 0);
    assert_eq!(CycleOutcome::AuthError.exit_code(), 1);
    assert_eq!(CycleOutcome::FeederNotFound.exit_code(), 2);
    assert_eq!(CycleOutcome::FeederUnavailable.exit_code(), 3);
    assert_eq!(CycleOutcome::LowBattery.exit_code(), 4);
    assert_eq!(CycleOutcome::RecoveringLowBattery.exit_code(), 4);
    assert_eq!(CycleOutcome::RelayStartFailed.exit_code(), 5);
    assert_eq!(CycleOutcome::EmptyStreamUrl.exit_code(), 6);
}

#[test]
fn display_names_the_variant() {
    assert_eq!(CycleOutcome::LowBattery.to_string(), "LowBattery");
}
