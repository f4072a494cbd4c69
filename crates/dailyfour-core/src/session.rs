//! The current session cell

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};
use dailyfour_api::{ActiveSessionInfo, SessionOrigin, SessionRecord};
use dailyfour_util::{elapsed_between, local_datetime, whole_minutes};

/// The session currently in progress. Owned by the session engine alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSession {
    pub generation: u64,
    pub network_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub started_at: DateTime<Local>,
    pub origin: SessionOrigin,
}

impl CurrentSession {
    /// Session starting at `now`, to whole-second precision
    pub fn fresh(generation: u64, network_name: impl Into<String>, now: DateTime<Local>) -> Self {
        let started_at = now.with_nanosecond(0).unwrap_or(now);
        Self {
            generation,
            network_name: network_name.into(),
            date: started_at.date_naive(),
            start_time: started_at.time(),
            started_at,
            origin: SessionOrigin::Fresh,
        }
    }

    /// Adopt an open record. `None` when its start does not exist in the
    /// local timezone.
    pub fn recovered(generation: u64, record: &SessionRecord) -> Option<Self> {
        let started_at = local_datetime(record.date, record.start_time)?;
        Some(Self {
            generation,
            network_name: record.network_name.clone(),
            date: record.date,
            start_time: record.start_time,
            started_at,
            origin: SessionOrigin::Recovered,
        })
    }

    /// Record marking this session as started
    pub fn open_record(&self) -> SessionRecord {
        SessionRecord::open(self.date, self.network_name.clone(), self.start_time)
    }

    /// Finished record for a session ending at `now`
    pub fn close(&self, now: DateTime<Local>, target_minutes: u64) -> SessionRecord {
        let minutes = whole_minutes(elapsed_between(self.started_at, now));
        self.open_record()
            .closed(now.with_nanosecond(0).unwrap_or(now).time(), minutes, target_minutes)
    }

    pub fn info(&self) -> ActiveSessionInfo {
        ActiveSessionInfo {
            generation: self.generation,
            network_name: self.network_name.clone(),
            date: self.date,
            started_at: self.started_at,
            origin: self.origin,
        }
    }
}
