//! Folding raw log lines into sessions

use dailyfour_api::{RecordKey, SessionRecord};
use std::collections::HashMap;

use crate::IncompleteScan;

/// Collapse one day's raw records into one entry per session.
///
/// A closed record replaces the still-open record carrying the same key, in
/// the position where the open record was first written. Keys are only
/// tracked while open, so sessions that share a start second stay distinct.
pub fn collapse_records(raw: impl IntoIterator<Item = SessionRecord>) -> Vec<SessionRecord> {
    let mut sessions: Vec<SessionRecord> = Vec::new();
    let mut open: HashMap<RecordKey, usize> = HashMap::new();

    for record in raw {
        let key = record.key();
        if record.is_open() {
            if !open.contains_key(&key) {
                open.insert(key, sessions.len());
                sessions.push(record);
            }
        } else if let Some(i) = open.remove(&key) {
            sessions[i] = record;
        } else {
            sessions.push(record);
        }
    }

    sessions
}

/// Split the open sessions of a collapsed day into the latest and the rest
pub fn scan_open(sessions: &[SessionRecord]) -> IncompleteScan {
    let mut open: Vec<SessionRecord> = sessions.iter().filter(|s| s.is_open()).cloned().collect();
    let latest = open.pop();
    IncompleteScan {
        latest,
        orphans: open,
    }
}
