//! Store trait definitions

use chrono::NaiveDate;
use dailyfour_api::SessionRecord;
use tracing::warn;

use crate::StoreResult;

/// Result of scanning for sessions that were never closed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncompleteScan {
    /// The open record to trust, if any
    pub latest: Option<SessionRecord>,
    /// Older open records with no closing record. Left on disk as-is.
    pub orphans: Vec<SessionRecord>,
}

/// Main store trait
pub trait LogStore: Send + Sync {
    /// Validate and append one record to the segment of `record.date`.
    ///
    /// Either the whole line is durable or nothing is: on any error the
    /// store is left as it was.
    fn append(&self, record: &SessionRecord) -> StoreResult<()>;

    /// All sessions that started on `date`, in write order, across active
    /// and archived segments. Unparseable lines are skipped.
    fn read_day(&self, date: NaiveDate) -> StoreResult<Vec<SessionRecord>>;

    /// `read_day` for every day in `from..=to`
    fn read_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<SessionRecord>> {
        let mut sessions = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            sessions.extend(self.read_day(date)?);
        }
        Ok(sessions)
    }

    /// Archive the active segment for `date` once it has reached the size
    /// threshold. Returns whether a rotation happened.
    fn rotate_if_needed(&self, date: NaiveDate) -> StoreResult<bool>;

    /// Open records on the most recent day with any stored data
    fn scan_incomplete(&self) -> StoreResult<IncompleteScan>;

    /// The open record to resume or close at startup
    fn find_latest_incomplete(&self) -> StoreResult<Option<SessionRecord>> {
        let scan = self.scan_incomplete()?;
        if !scan.orphans.is_empty() {
            warn!(
                orphan_count = scan.orphans.len(),
                orphans = ?scan.orphans.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
                "Multiple open sessions found, trusting the latest"
            );
        }
        Ok(scan.latest)
    }
}
