// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Fake relay adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RelayAdapter, RelayError, RelayHandle, RelayRole, RelaySpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded relay call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCall {
    Start { role: RelayRole },
    IsAlive { pid: i32 },
    Stop { role: RelayRole, pid: i32 },
}

/// Fake relay state
#[derive(Debug, Clone)]
pub struct FakeRelay {
    pub role: RelayRole,
    pub spec: RelaySpec,
    pub alive: bool,
    /// How many liveness polls this relay has seen
    pub polls: u32,
}

#[derive(Default)]
struct Inner {
    relays: HashMap<i32, FakeRelay>,
    calls: Vec<RelayCall>,
    next_pid: i32,
    fail_next_start: bool,
    /// Relays report dead after this many liveness polls
    die_after_polls: Option<u32>,
}

/// Fake relay adapter for testing
#[derive(Clone, Default)]
pub struct FakeRelayAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRelayAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next start call fail
    pub fn fail_next_start(&self) {
        self.lock().fail_next_start = true;
    }

    /// Report every relay dead after it has been polled `polls` times,
    /// so keep-alive loop tests terminate
    pub fn die_after_polls(&self, polls: u32) {
        self.lock().die_after_polls = Some(polls);
    }

    /// Mark a relay dead (or alive) directly
    pub fn set_alive(&self, pid: i32, alive: bool) {
        if let Some(relay) = self.lock().relays.get_mut(&pid) {
            relay.alive = alive;
        }
    }

    /// Get a relay by pid
    pub fn relay(&self, pid: i32) -> Option<FakeRelay> {
        self.lock().relays.get(&pid).cloned()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RelayCall> {
        self.lock().calls.clone()
    }

    /// Number of start calls for a role
    pub fn starts(&self, role: RelayRole) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RelayCall::Start { role: r } if *r == role))
            .count()
    }

    /// Number of stop calls for a role
    pub fn stops(&self, role: RelayRole) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RelayCall::Stop { role: r, .. } if *r == role))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RelayAdapter for FakeRelayAdapter {
    async fn start(&self, role: RelayRole, spec: &RelaySpec) -> Result<RelayHandle, RelayError> {
        let mut inner = self.lock();
        inner.calls.push(RelayCall::Start { role });
        if inner.fail_next_start {
            inner.fail_next_start = false;
            return Err(RelayError::SpawnFailed("scripted spawn failure".to_string()));
        }
        inner.next_pid += 1;
        let pid = 10_000 + inner.next_pid;
        inner.relays.insert(
            pid,
            FakeRelay {
                role,
                spec: spec.clone(),
                alive: true,
                polls: 0,
            },
        );
        Ok(RelayHandle { role, pid })
    }

    async fn is_alive(&self, handle: &RelayHandle) -> bool {
        let mut inner = self.lock();
        inner.calls.push(RelayCall::IsAlive { pid: handle.pid });
        let die_after = inner.die_after_polls;
        let Some(relay) = inner.relays.get_mut(&handle.pid) else {
            return false;
        };
        relay.polls += 1;
        if let Some(limit) = die_after {
            if relay.polls > limit {
                relay.alive = false;
            }
        }
        relay.alive
    }

    async fn stop(&self, handle: &RelayHandle) {
        let mut inner = self.lock();
        inner.calls.push(RelayCall::Stop {
            role: handle.role,
            pid: handle.pid,
        });
        // Idempotent: stopping an unknown or dead relay is a no-op
        if let Some(relay) = inner.relays.get_mut(&handle.pid) {
            relay.alive = false;
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
