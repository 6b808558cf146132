// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! In-memory state store for tests and dry runs

use crate::store::{StateStore, StoreError};
use chrono::{DateTime, Utc};
use perch_core::{Clock, SessionTokens};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Inner {
    cooldown_until: Option<DateTime<Utc>>,
    recovery_active: bool,
    tokens: Option<SessionTokens>,
}

/// State store that keeps everything in memory. Clones share state.
#[derive(Clone)]
pub struct MemoryStore<C: Clock> {
    inner: Arc<Mutex<Inner>>,
    clock: C,
}

impl<C: Clock> MemoryStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            clock,
        }
    }
}

impl<C: Clock> StateStore for MemoryStore<C> {
    fn load_cooldown(&self) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cooldown_until
    }

    fn set_cooldown(&self, duration: Duration) -> Result<(), StoreError> {
        let until = self.clock.now() + duration;
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cooldown_until = Some(until);
        Ok(())
    }

    fn clear_cooldown(&self) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cooldown_until = None;
        Ok(())
    }

    fn is_in_cooldown(&self) -> bool {
        match self.load_cooldown() {
            Some(until) => self.clock.now() < until,
            None => false,
        }
    }

    fn set_recovery(&self) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .recovery_active = true;
        Ok(())
    }

    fn clear_recovery(&self) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .recovery_active = false;
        Ok(())
    }

    fn is_recovery_active(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .recovery_active
    }

    fn load_tokens(&self) -> Option<SessionTokens> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tokens
            .clone()
    }

    fn save_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).tokens = Some(tokens.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
