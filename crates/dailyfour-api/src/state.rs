//! Presence state published by the session engine

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// How the current session came to be current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    /// Started from a live connectivity observation
    Fresh,
    /// Adopted from an open record left by a previous process
    Recovered,
}

/// Read-only view of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSessionInfo {
    /// Increments every time a session becomes current
    pub generation: u64,
    pub network_name: String,
    pub date: NaiveDate,
    pub started_at: DateTime<Local>,
    pub origin: SessionOrigin,
}

/// Whether the user is currently present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresenceState {
    #[default]
    Idle,
    Active(ActiveSessionInfo),
}

impl PresenceState {
    pub fn is_active(&self) -> bool {
        matches!(self, PresenceState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveSessionInfo> {
        match self {
            PresenceState::Active(info) => Some(info),
            PresenceState::Idle => None,
        }
    }
}
