// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! File-backed state store
//!
//! Layout inside the state directory:
//! - `cooldown` — one line, unix timestamp of expiry
//! - `recovery` — presence-only (empty file = active)
//! - `tokens` — `refresh_token=<v>` then `access_token=<v>`

use crate::store::{StateStore, StoreError};
use chrono::{DateTime, Utc};
use perch_core::{Clock, SessionTokens};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

const COOLDOWN_FILE: &str = "cooldown";
const RECOVERY_FILE: &str = "recovery";
const TOKENS_FILE: &str = "tokens";

/// State store over plain files in a single directory
#[derive(Clone)]
pub struct FileStore<C: Clock> {
    dir: PathBuf,
    clock: C,
}

impl<C: Clock> FileStore<C> {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: &Path, clock: C) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            clock,
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl<C: Clock> StateStore for FileStore<C> {
    fn load_cooldown(&self) -> Option<DateTime<Utc>> {
        let content = fs::read_to_string(self.path(COOLDOWN_FILE)).ok()?;
        let seconds: i64 = match content.trim().parse() {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!("ignoring unparseable cooldown marker");
                return None;
            }
        };
        DateTime::from_timestamp(seconds, 0)
    }

    fn set_cooldown(&self, duration: Duration) -> Result<(), StoreError> {
        let until = self.clock.now() + duration;
        fs::write(self.path(COOLDOWN_FILE), format!("{}\n", until.timestamp()))?;
        Ok(())
    }

    fn clear_cooldown(&self) -> Result<(), StoreError> {
        self.remove(COOLDOWN_FILE)
    }

    fn is_in_cooldown(&self) -> bool {
        match self.load_cooldown() {
            Some(until) => self.clock.now() < until,
            None => false,
        }
    }

    fn set_recovery(&self) -> Result<(), StoreError> {
        fs::write(self.path(RECOVERY_FILE), "")?;
        Ok(())
    }

    fn clear_recovery(&self) -> Result<(), StoreError> {
        self.remove(RECOVERY_FILE)
    }

    fn is_recovery_active(&self) -> bool {
        self.path(RECOVERY_FILE).exists()
    }

    fn load_tokens(&self) -> Option<SessionTokens> {
        let content = fs::read_to_string(self.path(TOKENS_FILE)).ok()?;
        let mut refresh_token = None;
        let mut access_token = None;
        for line in content.lines() {
            if let Some(value) = line.strip_prefix("refresh_token=") {
                refresh_token = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("access_token=") {
                access_token = Some(value.to_string());
            }
        }
        Some(SessionTokens {
            refresh_token: refresh_token?,
            access_token: access_token?,
        })
    }

    fn save_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError> {
        let content = format!(
            "refresh_token={}\naccess_token={}\n",
            tokens.refresh_token, tokens.access_token
        );
        fs::write(self.path(TOKENS_FILE), content)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
