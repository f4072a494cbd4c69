//! Progress of the current session against the daily target

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time evaluation of the active session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Generation of the session this snapshot describes
    pub generation: u64,
    pub network_name: String,
    pub started_at: DateTime<Local>,
    pub evaluated_at: DateTime<Local>,

    pub elapsed: Duration,
    pub target: Duration,
    /// Zero once the target is reached
    pub remaining: Duration,
    /// Zero until the target is reached
    pub overtime: Duration,

    /// `elapsed / target`; may exceed 1.0
    pub fraction: f64,

    /// Completion flag for this session. Stays set once raised.
    pub completed: bool,

    /// Wall-clock time at which the target is (or was) reached
    pub target_at: DateTime<Local>,
}

impl ProgressSnapshot {
    pub fn in_overtime(&self) -> bool {
        self.elapsed >= self.target
    }

    /// Fraction clamped to `[0, 1]` for display
    pub fn display_fraction(&self) -> f64 {
        self.fraction.clamp(0.0, 1.0)
    }

    pub fn display_percent(&self) -> f64 {
        self.display_fraction() * 100.0
    }
}
