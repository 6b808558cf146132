// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Static agent configuration
//!
//! All of this is fixed at startup for the lifetime of the process.

use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "starting battery threshold ({starting}) must be greater than the continue threshold ({low})"
    )]
    ThresholdOrder { low: u8, starting: u8 },
    #[error("battery threshold out of range (0-100): {0}")]
    ThresholdRange(u8),
}

/// Device location for sunset gating
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
}

/// Supervisor configuration, static for the process lifetime
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Feeder to stream, resolved by name from the account listing
    pub feeder_name: String,
    /// Outbound publish endpoint for the relay
    pub out_url: String,
    /// Video codec handed to the relay (`copy` for passthrough)
    pub video_codec: String,
    /// ffmpeg log level for relay processes
    pub relay_log_level: String,
    /// Battery floor to keep a running stream alive
    pub min_battery_level: u8,
    /// Battery floor to start (or resume after recovery) a stream
    pub min_starting_battery_level: u8,
    /// Suppression window written when a cycle ends unfavorably
    pub cooldown: Duration,
    /// Keep-alive loop poll cadence
    pub poll_interval: Duration,
    /// How often to send a keep-alive while a relay runs
    pub keep_alive_interval: Duration,
    /// How often to re-poll full feeder status (battery, state)
    pub feeder_refresh_interval: Duration,
    /// Pause between continuous-mode iterations
    pub retry_delay: Duration,
    /// Grace period per stage of relay termination escalation
    pub stop_grace: Duration,
    /// Looping placeholder asset for the splash relay (continuous mode)
    pub splash_asset: Option<PathBuf>,
    /// Device location; `None` disables sunset gating
    pub location: Option<Location>,
    /// How long before sunset the quiet window opens
    pub quiet_window_lead: Duration,
}

impl AgentConfig {
    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        for threshold in [self.min_battery_level, self.min_starting_battery_level] {
            if threshold > 100 {
                return Err(ConfigError::ThresholdRange(threshold));
            }
        }
        if self.min_starting_battery_level <= self.min_battery_level {
            return Err(ConfigError::ThresholdOrder {
                low: self.min_battery_level,
                starting: self.min_starting_battery_level,
            });
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            feeder_name: String::new(),
            out_url: String::new(),
            video_codec: "libx264".to_string(),
            relay_log_level: "warning".to_string(),
            min_battery_level: 30,
            min_starting_battery_level: 60,
            cooldown: Duration::from_secs(600),
            poll_interval: Duration::from_secs(5),
            keep_alive_interval: Duration::from_secs(30),
            feeder_refresh_interval: Duration::from_secs(300),
            retry_delay: Duration::from_secs(30),
            stop_grace: Duration::from_secs(5),
            splash_asset: None,
            location: None,
            quiet_window_lead: Duration::from_secs(45 * 60),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
