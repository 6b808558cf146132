// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the supervisor's external collaborators
//!
//! Each collaborator sits behind a trait so the engine can be driven
//! against fakes: the device cloud (auth, feeder listing, watch
//! session), the relay subprocess (ffmpeg), and the sunset calculator.

pub mod cloud;
pub mod relay;
pub mod sunset;

pub use cloud::{CloudAdapter, CloudError, HttpCloudAdapter};
pub use relay::{
    FfmpegRelayAdapter, RelayAdapter, RelayError, RelayHandle, RelayRole, RelaySpec,
};
pub use sunset::{SolarSunsetAdapter, SunsetAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use cloud::{CloudCall, FakeCloudAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use relay::{FakeRelay, FakeRelayAdapter, RelayCall};
#[cfg(any(test, feature = "test-support"))]
pub use sunset::FixedSunsetAdapter;
