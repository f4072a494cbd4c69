//! Core events emitted by the engines

use chrono::{DateTime, Local};
use dailyfour_api::{ProgressSnapshot, SessionRecord};

/// Events emitted by the session and timer engines
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// A new session became current
    SessionStarted {
        generation: u64,
        network_name: String,
        started_at: DateTime<Local>,
    },

    /// An open session from a previous process was adopted
    SessionResumed {
        generation: u64,
        network_name: String,
        started_at: DateTime<Local>,
    },

    /// The current session ended. `persisted` is false when the record is
    /// waiting in the retry queue.
    SessionClosed {
        record: SessionRecord,
        persisted: bool,
    },

    /// A queued record was written on retry
    PendingPersisted { record: SessionRecord },

    /// Writing a closed record failed; it stays queued
    AppendFailed {
        record: SessionRecord,
        error: String,
        pending: usize,
    },

    /// The current session reached the target for the first time
    TargetReached {
        snapshot: ProgressSnapshot,
        title: String,
        message: String,
    },
}
