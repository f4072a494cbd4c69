//! Text formats shared by the log records and the status output

use chrono::{NaiveDate, NaiveTime};
use std::time::Duration;

/// Day-first calendar date used in records and segment names, e.g. `13-02-2026`
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Time-of-day used in records, e.g. `09:15:00`
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).ok()
}

/// Format a span as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(span: Duration) -> String {
    let total = span.as_secs();
    let (hours, rem) = (total / 3600, total % 3600);
    format!("{:02}:{:02}:{:02}", hours, rem / 60, rem % 60)
}

/// Format a signed span as `HH:MM:SS`, prefixing negative values with `-`.
pub fn format_signed_hms(span: chrono::Duration) -> String {
    let secs = span.num_seconds();
    let body = format_hms(Duration::from_secs(secs.unsigned_abs()));
    if secs < 0 { format!("-{body}") } else { body }
}

/// Serde adapter for `NaiveDate` in [`DATE_FORMAT`]
pub mod serde_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `NaiveTime` in [`TIME_FORMAT`]
pub mod serde_time {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<NaiveTime>` in [`TIME_FORMAT`], `null` when absent
pub mod serde_opt_time {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.collect_str(&t.format(TIME_FORMAT)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| NaiveTime::parse_from_str(&raw, TIME_FORMAT))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
