// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! perch-core: domain types for the Perch stream supervisor
//!
//! This crate provides:
//! - Feeder and session types mirrored from the cloud API
//! - Cycle outcomes and their stable process exit codes
//! - Static agent configuration
//! - Clock and cancellation abstractions for testable control flow

pub mod cancel;
pub mod clock;
pub mod config;
pub mod feeder;
pub mod outcome;
pub mod session;

// Re-exports
pub use cancel::CancelToken;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AgentConfig, ConfigError, Location};
pub use feeder::{FeederSnapshot, FeederState};
pub use outcome::CycleOutcome;
pub use session::{SessionTokens, WatchSession};

// The IANA timezone type used in [`Location`], re-exported so callers
// don't need a direct chrono-tz dependency to parse one.
pub use chrono_tz::Tz;
