//! In-memory store for tests and dry runs

use chrono::NaiveDate;
use dailyfour_api::SessionRecord;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{collapse_records, scan_open, IncompleteScan, LogStore, StoreError, StoreResult};

/// Store that keeps raw records in a vector
#[derive(Default)]
pub struct MemoryLogStore {
    records: Mutex<Vec<SessionRecord>>,

    /// Configure appends to fail
    pub fail_appends: AtomicBool,

    attempts: AtomicUsize,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with raw records, as if written by an earlier process
    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Append calls made so far, failed ones included
    pub fn append_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Every line written, in order
    pub fn raw_records(&self) -> StoreResult<Vec<SessionRecord>> {
        Ok(self.records()?.clone())
    }

    fn records(&self) -> StoreResult<MutexGuard<'_, Vec<SessionRecord>>> {
        self.records.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, record: &SessionRecord) -> StoreResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        record.validate()?;
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(io::Error::other("simulated append failure").into());
        }
        self.records()?.push(record.clone());
        Ok(())
    }

    fn read_day(&self, date: NaiveDate) -> StoreResult<Vec<SessionRecord>> {
        let records = self.records()?;
        Ok(collapse_records(
            records.iter().filter(|r| r.date == date).cloned(),
        ))
    }

    fn rotate_if_needed(&self, _date: NaiveDate) -> StoreResult<bool> {
        Ok(false)
    }

    fn scan_incomplete(&self) -> StoreResult<IncompleteScan> {
        let latest = self.records()?.iter().map(|r| r.date).max();
        let Some(latest) = latest else {
            return Ok(IncompleteScan::default());
        };
        Ok(scan_open(&self.read_day(latest)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 13).unwrap()
    }

    #[test]
    fn failing_append_stores_nothing() {
        let store = MemoryLogStore::new();
        store.set_fail_appends(true);

        let record = SessionRecord::open(day(), "Office", NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(matches!(store.append(&record), Err(StoreError::Io(_))));
        assert_eq!(store.append_attempts(), 1);
        assert!(store.raw_records().unwrap().is_empty());

        store.set_fail_appends(false);
        store.append(&record).unwrap();
        assert_eq!(store.find_latest_incomplete().unwrap(), Some(record));
    }
}
