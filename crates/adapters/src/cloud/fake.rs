// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Fake cloud adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CloudAdapter, CloudError};
use async_trait::async_trait;
use perch_core::{FeederSnapshot, SessionTokens, WatchSession};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recorded cloud call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudCall {
    Refresh,
    ListFeeders,
    StartWatching { feeder_id: String },
    KeepAlive,
}

#[derive(Default)]
struct Inner {
    /// Listings served in order; the last one repeats
    listings: VecDeque<Vec<FeederSnapshot>>,
    stream_url: Option<String>,
    fail_refresh: bool,
    fail_list: bool,
    fail_start_watching: bool,
    fail_keep_alive: bool,
    calls: Vec<CloudCall>,
}

/// Fake cloud adapter with scripted responses
#[derive(Clone, Default)]
pub struct FakeCloudAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl FakeCloudAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a feeder listing. Queued listings are served in order and
    /// the final one repeats for all later polls.
    pub fn push_listing(&self, feeders: Vec<FeederSnapshot>) {
        self.lock().listings.push_back(feeders);
    }

    /// Set the stream URL returned from start-watch (None = absent)
    pub fn set_stream_url(&self, url: Option<&str>) {
        self.lock().stream_url = url.map(str::to_string);
    }

    pub fn fail_refresh(&self) {
        self.lock().fail_refresh = true;
    }

    pub fn fail_list_feeders(&self) {
        self.lock().fail_list = true;
    }

    pub fn fail_start_watching(&self) {
        self.lock().fail_start_watching = true;
    }

    pub fn fail_keep_alive(&self) {
        self.lock().fail_keep_alive = true;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<CloudCall> {
        self.lock().calls.clone()
    }

    /// Count of keep-alive calls issued so far
    pub fn keep_alive_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| **c == CloudCall::KeepAlive)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CloudAdapter for FakeCloudAdapter {
    async fn refresh(&self) -> Result<SessionTokens, CloudError> {
        let mut inner = self.lock();
        inner.calls.push(CloudCall::Refresh);
        if inner.fail_refresh {
            return Err(CloudError::Auth("scripted auth failure".to_string()));
        }
        Ok(SessionTokens {
            refresh_token: "fake-refresh".to_string(),
            access_token: "fake-access".to_string(),
        })
    }

    async fn list_feeders(&self) -> Result<Vec<FeederSnapshot>, CloudError> {
        let mut inner = self.lock();
        inner.calls.push(CloudCall::ListFeeders);
        if inner.fail_list {
            return Err(CloudError::Network("scripted listing failure".to_string()));
        }
        let listing = if inner.listings.len() > 1 {
            inner.listings.pop_front()
        } else {
            inner.listings.front().cloned()
        };
        Ok(listing.unwrap_or_default())
    }

    async fn start_watching(&self, feeder_id: &str) -> Result<WatchSession, CloudError> {
        let mut inner = self.lock();
        inner.calls.push(CloudCall::StartWatching {
            feeder_id: feeder_id.to_string(),
        });
        if inner.fail_start_watching {
            return Err(CloudError::Network("scripted watch failure".to_string()));
        }
        Ok(WatchSession {
            stream_url: inner.stream_url.clone(),
        })
    }

    async fn keep_alive(&self) -> Result<(), CloudError> {
        let mut inner = self.lock();
        inner.calls.push(CloudCall::KeepAlive);
        if inner.fail_keep_alive {
            return Err(CloudError::Network("scripted keep-alive failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
