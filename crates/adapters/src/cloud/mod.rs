// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Device cloud adapters

mod http;

pub use http::HttpCloudAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{CloudCall, FakeCloudAdapter};

use async_trait::async_trait;
use perch_core::{FeederSnapshot, SessionTokens, WatchSession};
use thiserror::Error;

/// Errors from cloud operations
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Api(String),
}

/// Adapter for the device cloud session (login, feeders, watching).
///
/// The supervisor issues these calls strictly sequentially: no two
/// calls for the same session are ever in flight at once.
#[async_trait]
pub trait CloudAdapter: Clone + Send + Sync + 'static {
    /// Log in or refresh the session; returns the current token pair
    async fn refresh(&self) -> Result<SessionTokens, CloudError>;

    /// List feeders on the account with battery and device state
    async fn list_feeders(&self) -> Result<Vec<FeederSnapshot>, CloudError>;

    /// Open a watch session for a feeder
    async fn start_watching(&self, feeder_id: &str) -> Result<WatchSession, CloudError>;

    /// Extend the active watch session
    async fn keep_alive(&self) -> Result<(), CloudError>;
}
