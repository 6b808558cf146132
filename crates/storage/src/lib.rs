// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! perch-storage: persisted supervisor state
//!
//! Three small pieces of state survive restarts: the cooldown-until
//! timestamp, the recovery flag, and the cached session tokens. The
//! on-disk layout is deliberately plain text so an operator can inspect
//! or clear it by hand.

mod file;
mod memory;
mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{StateStore, StoreError};
