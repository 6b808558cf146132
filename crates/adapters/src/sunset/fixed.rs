// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Fixed sunset adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::SunsetAdapter;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sunset adapter that answers from a switch instead of the sky
#[derive(Clone, Default)]
pub struct FixedSunsetAdapter {
    quiet: Arc<AtomicBool>,
}

impl FixedSunsetAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::SeqCst);
    }
}

impl SunsetAdapter for FixedSunsetAdapter {
    fn in_quiet_window(&self, _now: DateTime<Utc>) -> bool {
        self.quiet.load(Ordering::SeqCst)
    }
}
