//! Wall-clock access for dailyfour
//!
//! Sessions are recorded in local wall-clock time, so every component asks
//! this module for "now" instead of calling `Local::now()` directly.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `DAILYFOUR_MOCK_TIME` environment variable can be set
//! to shift the clock. Mock time advances at the same rate as real time from
//! the moment the process started.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2026-02-13 09:30:00`)
//!
//! ```bash
//! DAILYFOUR_MOCK_TIME="2026-02-13 09:30:00" dailyfourd --test-mode
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "DAILYFOUR_MOCK_TIME";

const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset between mock time and real time, captured once per process.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let raw = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            match NaiveDateTime::parse_from_str(&raw, MOCK_TIME_FORMAT) {
                Ok(naive_dt) => match Local.from_local_datetime(&naive_dt).single() {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(chrono::Local::now());
                        tracing::info!(
                            mock_time = %raw,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        Some(offset)
                    }
                    None => {
                        tracing::warn!(mock_time = %raw, "Mock time is ambiguous in local timezone");
                        None
                    }
                },
                Err(_) => {
                    tracing::warn!(
                        mock_time = %raw,
                        expected_format = MOCK_TIME_FORMAT,
                        "Invalid mock time format"
                    );
                    None
                }
            }
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Combine a calendar day and a time-of-day into a local timestamp.
///
/// Local times that fall into a DST gap resolve to `None`; ambiguous
/// times (DST fold) resolve to the earlier instant.
pub fn local_datetime(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&date.and_time(time)).earliest()
}

/// Non-negative span from `start` to `end`. Clock anomalies where `end`
/// precedes `start` yield zero.
pub fn elapsed_between(start: DateTime<Local>, end: DateTime<Local>) -> Duration {
    end.signed_duration_since(start)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Whole minutes in a span, rounded down.
pub fn whole_minutes(span: Duration) -> u64 {
    span.as_secs() / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_clamped_when_end_precedes_start() {
        let start = Local.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2026, 2, 13, 9, 0, 0).unwrap();
        assert_eq!(elapsed_between(start, end), Duration::ZERO);
    }

    #[test]
    fn elapsed_counts_across_midnight() {
        let start = Local.with_ymd_and_hms(2026, 2, 13, 23, 30, 0).unwrap();
        let end = Local.with_ymd_and_hms(2026, 2, 14, 0, 45, 0).unwrap();
        assert_eq!(elapsed_between(start, end), Duration::from_secs(75 * 60));
    }

    #[test]
    fn whole_minutes_rounds_down() {
        assert_eq!(whole_minutes(Duration::from_secs(59)), 0);
        assert_eq!(whole_minutes(Duration::from_secs(119)), 1);
        assert_eq!(whole_minutes(Duration::from_secs(4 * 3600 + 660)), 251);
    }

    #[test]
    fn local_datetime_round_trips_components() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 13).unwrap();
        let time = NaiveTime::from_hms_opt(9, 15, 30).unwrap();
        let dt = local_datetime(date, time).unwrap();
        assert_eq!(dt.date_naive(), date);
        assert_eq!(dt.time(), time);
    }

    #[test]
    fn now_moves_with_the_real_clock() {
        let before = chrono::Local::now();
        let t1 = now();
        std::thread::sleep(Duration::from_millis(20));
        let t2 = now();

        assert!(elapsed_between(t1, t2) >= Duration::from_millis(20));
        if !is_mock_time_active() {
            assert!(t1 >= before);
        }
    }

    #[test]
    fn mock_time_format_is_documented() {
        assert_eq!(MOCK_TIME_ENV_VAR, "DAILYFOUR_MOCK_TIME");
        assert!(NaiveDateTime::parse_from_str("2026-02-13 09:30:00", MOCK_TIME_FORMAT).is_ok());
    }
}
