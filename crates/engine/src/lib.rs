// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! perch-engine: the supervisory control loop
//!
//! One [`StreamSession`] pass per cycle decides whether to stream, cool
//! down, enter battery recovery, or idle for the quiet window, and owns
//! the live relay plus its keep-alive cadence. The [`Agent`] wraps it
//! in single-shot or continuous operation and owns the splash fallback.

mod agent;
mod session;

pub use agent::Agent;
pub use session::{SessionDeps, StreamSession};
