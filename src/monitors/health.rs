//! Health classification for the monitored messenger server

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::probe::ProbeOutcome;

/// Responsiveness of the monitored server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// No probe has completed yet
    Unknown,
    /// Server answered the greeting in time
    Ok,
    /// Server answered, but only after the slow threshold
    Slow,
    /// Connection failed, was closed, or nothing came back in time
    Down,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HealthState {
    /// Get the string representation (lowercase)
    ///
    /// This matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Ok => "ok",
            HealthState::Slow => "slow",
            HealthState::Down => "down",
        }
    }

    /// Classify the result of a single probe attempt
    ///
    /// `Err` covers every connect/read failure (DNS, refused, reset) and is
    /// always `Down`. A response is `Slow` once its elapsed time reaches
    /// `slow_after`.
    pub fn classify<E>(result: &Result<ProbeOutcome, E>, slow_after: Duration) -> Self {
        match result {
            Ok(ProbeOutcome::Responded { elapsed }) if *elapsed >= slow_after => HealthState::Slow,
            Ok(ProbeOutcome::Responded { .. }) => HealthState::Ok,
            Ok(ProbeOutcome::Closed) | Ok(ProbeOutcome::TimedOut) => HealthState::Down,
            Err(_) => HealthState::Down,
        }
    }
}

/// Point-in-time health record published by the status monitor
///
/// A new value is built for every probe cycle and swapped in whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub state: HealthState,
    pub last_updated: DateTime<Utc>,
}

impl ServerStatus {
    pub fn new(state: HealthState, last_updated: DateTime<Utc>) -> Self {
        Self {
            state,
            last_updated,
        }
    }
}
