//! Persisted session record

use chrono::{NaiveDate, NaiveTime};
use dailyfour_util::{format_date, format_time, serde_date, serde_opt_time, serde_time};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a record is refused before it reaches disk
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("network_name must not be empty")]
    EmptyNetworkName,

    #[error("closed record is missing duration_minutes")]
    MissingDuration,

    #[error("open record must not carry duration_minutes")]
    UnexpectedDuration,

    #[error("open record cannot have met its target")]
    OpenRecordTargetMet,
}

/// One line of a daily log segment.
///
/// An *open* record (no `end_time`) is written when a session starts and acts
/// as the crash checkpoint. The closed record written at session end carries
/// the same identity key and supersedes it on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Calendar day the session started
    #[serde(with = "serde_date")]
    pub date: NaiveDate,

    /// Office network that triggered the session
    #[serde(alias = "ssid")]
    pub network_name: String,

    #[serde(with = "serde_time")]
    pub start_time: NaiveTime,

    #[serde(default, with = "serde_opt_time")]
    pub end_time: Option<NaiveTime>,

    #[serde(default)]
    pub duration_minutes: Option<u64>,

    #[serde(default, alias = "completed_4h")]
    pub target_met: bool,
}

/// Identity of a session within the store: one start on one network on one day
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub date: NaiveDate,
    pub network_name: String,
    pub start_time: NaiveTime,
}

impl SessionRecord {
    /// Record for a session that has just started
    pub fn open(date: NaiveDate, network_name: impl Into<String>, start_time: NaiveTime) -> Self {
        Self {
            date,
            network_name: network_name.into(),
            start_time,
            end_time: None,
            duration_minutes: None,
            target_met: false,
        }
    }

    /// Close this record. `target_met` is derived from `target_minutes`.
    pub fn closed(
        mut self,
        end_time: NaiveTime,
        duration_minutes: u64,
        target_minutes: u64,
    ) -> Self {
        self.end_time = Some(end_time);
        self.duration_minutes = Some(duration_minutes);
        self.target_met = duration_minutes >= target_minutes;
        self
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            date: self.date,
            network_name: self.network_name.clone(),
            start_time: self.start_time,
        }
    }

    /// Check the record shape before it is written.
    ///
    /// Dates and times are well-formed by construction and the duration is
    /// unsigned, so what remains is the name and the open/closed consistency.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.network_name.trim().is_empty() {
            return Err(RecordError::EmptyNetworkName);
        }

        match (self.end_time, self.duration_minutes) {
            (Some(_), None) => Err(RecordError::MissingDuration),
            (None, Some(_)) => Err(RecordError::UnexpectedDuration),
            (None, None) if self.target_met => Err(RecordError::OpenRecordTargetMet),
            _ => Ok(()),
        }
    }

    /// Serialize to one log line (without the trailing newline)
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse one log line
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl std::fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            format_date(self.date),
            self.network_name,
            format_time(self.start_time)
        )?;
        match (self.end_time, self.duration_minutes) {
            (Some(end), Some(minutes)) => write!(f, "-{} ({} min)", format_time(end), minutes),
            _ => write!(f, " (open)"),
        }
    }
}
