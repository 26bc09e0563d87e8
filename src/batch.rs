//! Multi-station reading requests.
//!
//! The presentation layer builds a [`ReadingsRequest`] and hands it to
//! [`Client::fetch_readings`]. A failing station is recorded and skipped; the
//! other stations still make it into the combined table.

use crate::api::{Client, Transport};
use crate::error::FloodError;
use crate::models::{DateWindow, MeasureInfo, MeasurementInfo, StationRef};
use crate::readings::ReadingTable;
use crate::stations::{title_case_station, unique_stations};
use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingsRequest {
    pub stations: Vec<StationRef>,
    pub window: DateWindow,
    /// `None` fetches every active measure.
    pub measure: Option<String>,
}

#[derive(Debug)]
pub struct StationFailure {
    pub station: StationRef,
    pub error: FloodError,
}

/// A selected measure of a station that returned no readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyMeasure {
    pub station: StationRef,
    pub measure: String,
}

/// Combined table over all stations that returned data.
#[derive(Debug, Default)]
pub struct BatchReadings {
    pub table: ReadingTable,
    pub info: MeasurementInfo,
    pub failures: Vec<StationFailure>,
    pub empty: Vec<EmptyMeasure>,
}

/// `"Kings Mill: Flow (Stage, m3/s)"`.
pub fn station_column_label(station: &StationRef, column: &str, info: &MeasureInfo) -> String {
    let name = if station.name.is_empty() {
        station.id.clone()
    } else {
        title_case_station(&station.name)
    };
    let mut chars = column.chars();
    let column = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{name}: {column} ({}, {})", info.qualifier, info.unit)
}

impl<T: Transport> Client<T> {
    pub fn fetch_readings(&self, request: &ReadingsRequest) -> BatchReadings {
        let mut out = BatchReadings::default();
        for station in &unique_stations(request.stations.clone()) {
            let fetched = self.get_station_readings(
                &station.id,
                &request.window,
                request.measure.as_deref(),
            );
            let mut readings = match fetched {
                Ok(r) => r,
                Err(error) => {
                    warn!("Station {} ({}) failed: {error}", station.name, station.id);
                    out.failures.push(StationFailure {
                        station: station.clone(),
                        error,
                    });
                    continue;
                }
            };

            out.empty.extend(readings.empty.drain(..).map(|measure| EmptyMeasure {
                station: station.clone(),
                measure,
            }));

            let mut prefixed = MeasurementInfo::new();
            readings.table.rename_columns(|col| {
                let Some(meta) = readings.info.get(col) else {
                    return col.to_string();
                };
                let label = station_column_label(station, col, meta);
                prefixed.insert(label.clone(), meta.clone());
                label
            });

            let table = std::mem::take(&mut out.table);
            out.table = table.outer_join(readings.table);
            // Keep metadata keys aligned with any suffix the join added.
            for col in out.table.columns() {
                if !out.info.contains_key(col) {
                    let base = col.rsplit_once(" (").map_or(col.as_str(), |(b, _)| b);
                    if let Some(meta) = prefixed.get(col).or_else(|| prefixed.get(base)) {
                        out.info.insert(col.clone(), meta.clone());
                    }
                }
            }
        }
        out
    }
}
