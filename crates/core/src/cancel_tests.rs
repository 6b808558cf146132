// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

use super::*;

#[test]
fn starts_uncancelled() {
    assert!(!CancelToken::new().is_cancelled());
}

#[test]
fn clones_observe_cancellation() {
    let token = CancelToken::new();
    let view = token.clone();
    token.cancel();
    assert!(view.is_cancelled());
}

#[test]
fn cancel_is_idempotent() {
    let token = CancelToken::new();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
}
