// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Sunset quiet-window adapters
//!
//! The device manages its own power budget around sunset; streaming is
//! suppressed from shortly before sunset until local midnight so the
//! supervisor doesn't contend with the sleep transition.

mod solar;

pub use solar::Sunset;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fixed;
#[cfg(any(test, feature = "test-support"))]
pub use fixed::FixedSunsetAdapter;

use chrono::{DateTime, Duration, Utc};
use perch_core::Location;

/// Decides whether "now" is inside the pre-sleep quiet window
pub trait SunsetAdapter: Clone + Send + Sync + 'static {
    fn in_quiet_window(&self, now: DateTime<Utc>) -> bool;
}

/// Quiet window computed from the device location's astronomical sunset.
///
/// The window opens `lead` before today's local sunset and closes at
/// local midnight. With no location configured there is never a quiet
/// window.
#[derive(Clone)]
pub struct SolarSunsetAdapter {
    location: Option<Location>,
    lead: Duration,
}

impl SolarSunsetAdapter {
    pub fn new(location: Option<Location>, lead: std::time::Duration) -> Self {
        Self {
            location,
            lead: Duration::from_std(lead).unwrap_or_else(|_| Duration::minutes(45)),
        }
    }
}

impl SunsetAdapter for SolarSunsetAdapter {
    fn in_quiet_window(&self, now: DateTime<Utc>) -> bool {
        let Some(location) = self.location else {
            return false;
        };
        let local_date = now.with_timezone(&location.timezone).date_naive();
        match solar::sunset_utc(local_date, location.latitude, location.longitude) {
            Sunset::Sets(sunset) => now >= sunset - self.lead,
            // Sun never rises: the device sleeps through the polar night
            Sunset::PolarNight => true,
            // Sun never sets: no sleep transition to avoid
            Sunset::PolarDay => false,
        }
    }
}

#[cfg(test)]
#[path = "sunset_tests.rs"]
mod tests;
