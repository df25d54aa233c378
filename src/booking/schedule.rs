//! Flight time parsing and rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Unrecognized flight time '{0}'")]
    Unparsable(String),

    #[error("Flight time '{0}' is before 1970-01-01")]
    BeforeEpoch(String),
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a scheduled departure. Times without an offset are taken as UTC.
pub fn parse_flight_time(input: &str) -> Result<DateTime<Utc>, ScheduleError> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ScheduleError::Unparsable(input.to_string()))
}

/// Unix seconds for a scheduled departure, as passed to the flight contract.
pub fn to_unix_seconds(input: &str) -> Result<u64, ScheduleError> {
    let time = parse_flight_time(input)?;
    u64::try_from(time.timestamp()).map_err(|_| ScheduleError::BeforeEpoch(input.to_string()))
}

/// Render unix seconds reported by a contract.
pub fn from_unix_seconds(seconds: u64) -> Option<DateTime<Utc>> {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
