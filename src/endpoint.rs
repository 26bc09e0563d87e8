//! Endpoint builder: pure functions from (station, measure, window) to the
//! query paths the flood-monitoring service expects.
//!
//! Paths are relative to the service base URL unless they start from an
//! already absolute measure endpoint. No I/O happens here.

use crate::models::DateWindow;
use crate::time::{format_date, format_datetime};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Allow -, _, . unescaped in station references and search words
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

/// Full station collection.
pub fn station_list() -> String {
    "id/stations".to_string()
}

/// Station existence check filtered by reference.
pub fn station_lookup(station_id: &str) -> String {
    format!("id/stations/?stationReference={}", enc(station_id))
}

/// Single station record.
pub fn station_detail(station_id: &str) -> String {
    format!("id/stations/{}", enc(station_id))
}

/// Name search; whitespace runs become `+`.
pub fn station_search(name: &str) -> String {
    let term = name.split_whitespace().map(enc).collect::<Vec<_>>().join("+");
    format!("id/stations?search={}", term)
}

/// Measure catalog of a station.
pub fn station_measures(station_id: &str) -> String {
    format!("id/stations/{}/measures", enc(station_id))
}

/// Query parameters for a window.
///
/// Closed ranges use date-only bounds, since-queries use the full UTC
/// date-time of `start`.
pub fn date_filter(window: &DateWindow) -> String {
    match window.end {
        Some(end) => format!(
            "startdate={}&enddate={}",
            format_date(window.start),
            format_date(end)
        ),
        None => format!("since={}", format_datetime(window.start)),
    }
}

/// All readings of a station within `window`.
pub fn station_readings(station_id: &str, window: &DateWindow) -> String {
    format!(
        "id/stations/{}/readings?{}",
        enc(station_id),
        date_filter(window)
    )
}

/// Readings of one measure endpoint within `window`.
///
/// `measure_endpoint` is usually the absolute URL taken from a station's
/// measure catalog.
pub fn measure_readings(measure_endpoint: &str, window: &DateWindow) -> String {
    let base = measure_endpoint.trim().trim_end_matches('/');
    let filter = date_filter(window);
    if base.contains('?') {
        format!("{}&{}", base, filter)
    } else if base.ends_with("/readings") {
        format!("{}?{}", base, filter)
    } else {
        format!("{}/readings?{}", base, filter)
    }
}
