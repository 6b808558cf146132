// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Feeder state as reported by the cloud

/// Device state reported for a feeder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeederState {
    ReadyToStream,
    Streaming,
    DeepSleep,
    Offline,
    OffGrid,
    OutOfFeeder,
    /// A state we don't recognize; kept verbatim for logging
    Other(String),
}

impl FeederState {
    /// Parse the wire representation (`READY_TO_STREAM` etc.)
    pub fn from_wire(s: &str) -> Self {
        match s {
            "READY_TO_STREAM" => Self::ReadyToStream,
            "STREAMING" => Self::Streaming,
            "DEEP_SLEEP" => Self::DeepSleep,
            "OFFLINE" => Self::Offline,
            "OFF_GRID" => Self::OffGrid,
            "OUT_OF_FEEDER" => Self::OutOfFeeder,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether a stream can be started or joined in this state
    pub fn is_streamable(&self) -> bool {
        matches!(self, Self::ReadyToStream | Self::Streaming)
    }

    /// States in which the device cannot be woken remotely.
    ///
    /// Hitting one of these sets a cooldown: re-polling an unreachable
    /// device in a tight loop only drains its radio budget.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::DeepSleep | Self::Offline | Self::OffGrid | Self::OutOfFeeder
        )
    }
}

impl std::fmt::Display for FeederState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadyToStream => write!(f, "READY_TO_STREAM"),
            Self::Streaming => write!(f, "STREAMING"),
            Self::DeepSleep => write!(f, "DEEP_SLEEP"),
            Self::Offline => write!(f, "OFFLINE"),
            Self::OffGrid => write!(f, "OFF_GRID"),
            Self::OutOfFeeder => write!(f, "OUT_OF_FEEDER"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Immutable result of one feeder poll.
///
/// A snapshot is superseded by the next poll, never updated in place.
#[derive(Debug, Clone)]
pub struct FeederSnapshot {
    pub id: String,
    pub name: String,
    pub state: FeederState,
    /// 0-100
    pub battery_percentage: u8,
}

#[cfg(test)]
#[path = "feeder_tests.rs"]
mod tests;
