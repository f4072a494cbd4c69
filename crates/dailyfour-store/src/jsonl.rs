//! JSON-lines store implementation

use chrono::NaiveDate;
use dailyfour_api::SessionRecord;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::{
    collapse_records, list_day_segments, list_segments, scan_open, IncompleteScan, LogStore,
    SegmentName, StoreError, StoreResult,
};

/// Append-only store of one JSON record per line, split into daily segments
pub struct JsonlLogStore {
    data_dir: PathBuf,
    archive_dir: PathBuf,
    rotate_size_bytes: u64,
    /// Serializes every file operation, including rotation
    lock: Mutex<()>,
}

impl JsonlLogStore {
    /// Open a store, creating the data directory if needed.
    /// The archive directory is created on first rotation.
    pub fn open(
        data_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
        rotate_size_bytes: u64,
    ) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let store = Self {
            data_dir,
            archive_dir: archive_dir.into(),
            rotate_size_bytes: rotate_size_bytes.max(1),
            lock: Mutex::new(()),
        };
        debug!(
            data_dir = %store.data_dir.display(),
            archive_dir = %store.archive_dir.display(),
            rotate_size_bytes = store.rotate_size_bytes,
            "Session log store opened"
        );
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| {
            warn!("Store lock poisoned");
            StoreError::LockPoisoned
        })
    }

    /// The segment new records for `date` go to. Continues after the highest
    /// archived part when the data directory has no segment for the day.
    fn active_segment(&self, date: NaiveDate) -> StoreResult<PathBuf> {
        if let Some((_, path)) = list_day_segments(&self.data_dir, date)?.pop() {
            return Ok(path);
        }

        let part = list_day_segments(&self.archive_dir, date)?
            .iter()
            .map(|(name, _)| name.part)
            .max()
            .map_or(1, |p| p + 1);
        Ok(self.data_dir.join(SegmentName::new(date, part).file_name()))
    }

    /// Segments to read for `date`. Archive copies win over same-named
    /// active files.
    fn read_order(&self, date: NaiveDate) -> StoreResult<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for dir in [&self.archive_dir, &self.data_dir] {
            for (name, path) in list_day_segments(dir, date)? {
                if seen.insert(name) {
                    segments.push((name, path));
                }
            }
        }
        segments.sort_by_key(|(name, _)| name.order_key());
        Ok(segments.into_iter().map(|(_, path)| path).collect())
    }

    fn read_segment(path: &Path, out: &mut Vec<SessionRecord>) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read log segment");
                return;
            }
        };

        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line.trim(),
                Err(_) => {
                    warn!(path = %path.display(), line = index + 1, "Skipping non-UTF-8 log line");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match SessionRecord::from_line(line) {
                Ok(record) => out.push(record),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        error = %e,
                        "Skipping corrupted log line"
                    );
                }
            }
        }
    }

    fn read_day_locked(&self, date: NaiveDate) -> StoreResult<Vec<SessionRecord>> {
        let mut raw = Vec::new();
        for path in self.read_order(date)? {
            Self::read_segment(&path, &mut raw);
        }
        Ok(collapse_records(raw))
    }

    fn unique_archive_path(&self, name: SegmentName) -> PathBuf {
        let mut candidate = self.archive_dir.join(name.file_name());
        let mut k = 1;
        while candidate.exists() {
            candidate = self.archive_dir.join(name.with_collision(k).file_name());
            k += 1;
        }
        candidate
    }

    fn rotate_locked(&self, date: NaiveDate) -> StoreResult<bool> {
        let Some((name, active)) = list_day_segments(&self.data_dir, date)?.pop() else {
            return Ok(false);
        };

        let size = fs::metadata(&active)?.len();
        if size < self.rotate_size_bytes {
            return Ok(false);
        }

        let target = self.unique_archive_path(name);
        let rotation_error = |source| StoreError::Rotation {
            from: active.clone(),
            to: target.clone(),
            source,
        };
        fs::create_dir_all(&self.archive_dir).map_err(rotation_error)?;
        fs::rename(&active, &target).map_err(rotation_error)?;

        let next = SegmentName::new(date, name.part + 1);
        let next_path = self.data_dir.join(next.file_name());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&next_path)?;

        info!(
            from = %active.display(),
            to = %target.display(),
            size,
            next = %next_path.display(),
            "Log segment rotated"
        );
        Ok(true)
    }
}

impl LogStore for JsonlLogStore {
    fn append(&self, record: &SessionRecord) -> StoreResult<()> {
        record.validate()?;
        let mut line = record.to_line()?;
        line.push('\n');

        let _guard = self.lock()?;
        let path = self.active_segment(record.date)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let prior_len = file.metadata()?.len();

        if let Err(e) = file
            .write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
        {
            if let Err(truncate_err) = file.set_len(prior_len) {
                error!(
                    path = %path.display(),
                    error = %truncate_err,
                    "Failed to roll back partial log write"
                );
            }
            return Err(e.into());
        }

        debug!(path = %path.display(), record = %record, "Session record appended");

        if let Err(e) = self.rotate_locked(record.date) {
            error!(error = %e, "Log rotation failed, continuing with current segment");
        }
        Ok(())
    }

    fn read_day(&self, date: NaiveDate) -> StoreResult<Vec<SessionRecord>> {
        let _guard = self.lock()?;
        self.read_day_locked(date)
    }

    fn rotate_if_needed(&self, date: NaiveDate) -> StoreResult<bool> {
        let _guard = self.lock()?;
        self.rotate_locked(date)
    }

    fn scan_incomplete(&self) -> StoreResult<IncompleteScan> {
        let _guard = self.lock()?;

        let mut latest_day = None;
        for dir in [&self.data_dir, &self.archive_dir] {
            for (name, _) in list_segments(dir)? {
                latest_day = latest_day.max(Some(name.date));
            }
        }
        let Some(date) = latest_day else {
            return Ok(IncompleteScan::default());
        };

        let sessions = self.read_day_locked(date)?;
        Ok(scan_open(&sessions))
    }
}
