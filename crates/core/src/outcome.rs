// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Per-cycle outcomes and their process exit codes

/// Result of one pass through the stream session state machine.
///
/// In single-shot mode the process exits with [`CycleOutcome::exit_code`];
/// restart supervisors branch on these, so the mapping is stable:
///
/// | code | outcomes |
/// |------|----------|
/// | 0    | `Completed`, `Cooldown`, `QuietWindow`, `Cancelled` |
/// | 1    | `AuthError` |
/// | 2    | `FeederNotFound` |
/// | 3    | `FeederUnavailable` |
/// | 4    | `LowBattery`, `RecoveringLowBattery` |
/// | 5    | `RelayStartFailed` |
/// | 6    | `EmptyStreamUrl` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A relay ran and was stopped (or died) normally
    Completed,
    /// A prior cooldown is still in effect; nothing was attempted
    Cooldown,
    /// Login/refresh or feeder listing failed
    AuthError,
    /// No feeder with the configured name in the account
    FeederNotFound,
    /// Feeder present but not in a streamable state
    FeederUnavailable,
    /// Inside the pre-sleep quiet window around sunset
    QuietWindow,
    /// Battery below the continue threshold; recovery mode entered
    LowBattery,
    /// Recovery active and battery still below the starting threshold
    RecoveringLowBattery,
    /// Start-watch returned no usable stream URL
    EmptyStreamUrl,
    /// The relay subprocess could not be launched
    RelayStartFailed,
    /// Termination was requested before a relay started
    Cancelled,
}

impl CycleOutcome {
    /// Stable process exit code for single-shot mode
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed | Self::Cooldown | Self::QuietWindow | Self::Cancelled => 0,
            Self::AuthError => 1,
            Self::FeederNotFound => 2,
            Self::FeederUnavailable => 3,
            Self::LowBattery | Self::RecoveringLowBattery => 4,
            Self::RelayStartFailed => 5,
            Self::EmptyStreamUrl => 6,
        }
    }
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
