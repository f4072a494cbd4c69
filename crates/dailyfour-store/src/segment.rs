//! Segment file naming
//!
//! Active segments live in the data directory as `sessions_DD-MM-YYYY.log`
//! (part 1) or `sessions_DD-MM-YYYY_partN.log`. Archived copies keep the same
//! name, with `_K` appended when an earlier archive already took the name.

use chrono::NaiveDate;
use dailyfour_util::{format_date, parse_date};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::StoreResult;

const PREFIX: &str = "sessions_";
const SUFFIX: &str = ".log";
const PART_MARKER: &str = "_part";
const DATE_TOKEN_LEN: usize = 10;

/// Parsed segment file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentName {
    pub date: NaiveDate,
    pub part: u32,
    pub collision: Option<u32>,
}

impl SegmentName {
    pub fn new(date: NaiveDate, part: u32) -> Self {
        Self {
            date,
            part: part.max(1),
            collision: None,
        }
    }

    pub fn with_collision(self, k: u32) -> Self {
        Self {
            collision: Some(k),
            ..self
        }
    }

    /// Read order within a day
    pub fn order_key(&self) -> (u32, u32) {
        (self.part, self.collision.unwrap_or(0))
    }

    pub fn file_name(&self) -> String {
        let mut name = format!("{PREFIX}{}", format_date(self.date));
        if self.part > 1 {
            name.push_str(&format!("{PART_MARKER}{}", self.part));
        }
        if let Some(k) = self.collision {
            name.push_str(&format!("_{k}"));
        }
        name.push_str(SUFFIX);
        name
    }

    pub fn parse(file_name: &str) -> Option<Self> {
        let middle = file_name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
        let (date_token, mut rest) = middle.split_at_checked(DATE_TOKEN_LEN)?;
        let date = parse_date(date_token)?;

        let mut part = 1;
        if let Some(after) = rest.strip_prefix(PART_MARKER) {
            let end = after.find('_').unwrap_or(after.len());
            part = parse_number(&after[..end]).filter(|p| *p >= 1)?;
            rest = &after[end..];
        }

        let collision = match rest {
            "" => None,
            _ => Some(parse_number(rest.strip_prefix('_')?)?),
        };

        Some(Self {
            date,
            part,
            collision,
        })
    }
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Every segment file in `dir`. A missing directory has no segments.
pub fn list_segments(dir: &Path) -> StoreResult<Vec<(SegmentName, PathBuf)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut segments = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().and_then(SegmentName::parse) else {
            continue;
        };
        if entry.file_type()?.is_file() {
            segments.push((name, entry.path()));
        }
    }
    Ok(segments)
}

/// Segments in `dir` for one day, in read order
pub fn list_day_segments(dir: &Path, date: NaiveDate) -> StoreResult<Vec<(SegmentName, PathBuf)>> {
    let mut segments: Vec<_> = list_segments(dir)?
        .into_iter()
        .filter(|(name, _)| name.date == date)
        .collect();
    segments.sort_by_key(|(name, _)| name.order_key());
    Ok(segments)
}
