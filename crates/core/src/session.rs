// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Cloud session types

/// Token pair owned by the cloud client, mirrored to the state store
/// after every successful refresh so a restart can resume without a
/// username/password login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub refresh_token: String,
    pub access_token: String,
}

/// Result of a successful start-watch call.
///
/// The cloud can acknowledge the watch and still return no stream URL;
/// callers must treat `None` (or empty) as a handled failure.
#[derive(Debug, Clone)]
pub struct WatchSession {
    pub stream_url: Option<String>,
}

impl WatchSession {
    /// The stream URL, if present and non-empty
    pub fn url(&self) -> Option<&str> {
        self.stream_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
