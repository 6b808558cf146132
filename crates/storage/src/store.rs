// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! State store contract

use chrono::{DateTime, Utc};
use perch_core::SessionTokens;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors from state store writes.
///
/// Reads never error: a missing, corrupt, or unreadable flag reads as
/// "not set". The supervisor prefers retrying over refusing to ever
/// run again because of a damaged marker file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Persisted supervisor state.
///
/// All operations are idempotent and safe to call when the underlying
/// storage is absent.
pub trait StateStore: Clone + Send + Sync + 'static {
    /// The persisted cooldown expiry, if one is set and parseable
    fn load_cooldown(&self) -> Option<DateTime<Utc>>;

    /// Persist a cooldown expiring `duration` from now
    fn set_cooldown(&self, duration: Duration) -> Result<(), StoreError>;

    /// Remove the cooldown marker
    fn clear_cooldown(&self) -> Result<(), StoreError>;

    /// Whether a persisted cooldown is still in the future
    fn is_in_cooldown(&self) -> bool;

    /// Mark recovery mode active
    fn set_recovery(&self) -> Result<(), StoreError>;

    /// Clear recovery mode
    fn clear_recovery(&self) -> Result<(), StoreError>;

    /// Whether recovery mode is active
    fn is_recovery_active(&self) -> bool;

    /// Cached session tokens from a previous run, if any
    fn load_tokens(&self) -> Option<SessionTokens>;

    /// Persist session tokens for the next run
    fn save_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError>;
}
