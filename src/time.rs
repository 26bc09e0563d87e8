//! Conversions between instants and the string formats the API and the CLI use.
//!
//! The API accepts two shapes: date-only (`YYYY-MM-DD`) for closed ranges and
//! second-precision UTC date-time (`YYYY-MM-DDTHH:MM:SSZ`) for since-queries.
//! Users type dates as `DD-MM-YYYY`.

use crate::error::{FloodError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const USER_DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_date(t: DateTime<Utc>) -> String {
    t.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(t: DateTime<Utc>) -> String {
    t.format(DATETIME_FORMAT).to_string()
}

/// Format an instant the way the CLI shows dates back to the user.
pub fn format_user_date(t: DateTime<Utc>) -> String {
    t.format(USER_DATE_FORMAT).to_string()
}

/// Parse a reading timestamp as returned by the API.
///
/// The service emits `YYYY-MM-DDTHH:MM:SSZ`; RFC 3339 with offsets or
/// fractional seconds is accepted as well.
pub fn parse_api_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FloodError::InvalidDate {
            input: s.to_string(),
            expected: "YYYY-MM-DDTHH:MM:SSZ",
        })
}

/// Parse a `DD-MM-YYYY` date typed by the user into midnight UTC.
pub fn parse_user_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, USER_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FloodError::InvalidDate {
            input: s.to_string(),
            expected: "DD-MM-YYYY",
        })
}

/// The instant `hours` before `now`.
pub fn hours_before(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now - Duration::hours(hours)
}
