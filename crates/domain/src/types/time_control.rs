//! Time allotments and clock snapshots.

use serde::{Deserialize, Serialize};

use crate::{Color, DomainError};

/// Default allotment per side: five minutes.
pub const DEFAULT_INITIAL_TIME_MS: u64 = 300_000;

/// Initial time allotment per side, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    #[serde(rename = "whiteTime")]
    pub white_time_ms: u64,
    #[serde(rename = "blackTime")]
    pub black_time_ms: u64,
}

impl TimeControl {
    /// Same allotment for both sides.
    pub fn symmetric(initial_ms: u64) -> Result<Self, DomainError> {
        if initial_ms == 0 {
            return Err(DomainError::validation("initial time must be positive"));
        }
        Ok(Self {
            white_time_ms: initial_ms,
            black_time_ms: initial_ms,
        })
    }

    pub fn for_color(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white_time_ms,
            Color::Black => self.black_time_ms,
        }
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            white_time_ms: DEFAULT_INITIAL_TIME_MS,
            black_time_ms: DEFAULT_INITIAL_TIME_MS,
        }
    }
}

/// Remaining time for both sides at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    #[serde(rename = "whiteTime")]
    pub white_time_ms: u64,
    #[serde(rename = "blackTime")]
    pub black_time_ms: u64,
}
