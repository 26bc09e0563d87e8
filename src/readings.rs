//! Reading fetch and normalization.
//!
//! Raw reading arrays come back unordered and keyed by measure. They are turned
//! into a [`ReadingTable`]: one row per distinct timestamp (ascending), one
//! column per measure, with missing cells left empty rather than zero.

use crate::api::{Client, Transport};
use crate::catalog::{check_valid_measure_name, select_measure};
use crate::endpoint;
use crate::error::{FloodError, Result};
use crate::models::{
    DateWindow, MeasureDescriptor, MeasureInfo, MeasurementInfo, Reading, ReadingEntry,
};
use crate::time::parse_api_datetime;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One row of a [`ReadingTable`]; `values` lines up with the table's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<Option<f64>>,
}

/// Time-indexed table with outer-join semantics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReadingTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ReadingTable {
    /// Single-column table from one measure's readings.
    ///
    /// Rows are sorted ascending (stable); readings sharing a timestamp
    /// collapse into one row holding the later value.
    pub fn from_readings(label: impl Into<String>, readings: &[Reading]) -> Self {
        let mut sorted = readings.to_vec();
        sorted.sort_by_key(|r| r.timestamp);

        let mut rows: Vec<TableRow> = Vec::with_capacity(sorted.len());
        for r in sorted {
            match rows.last_mut() {
                Some(last) if last.timestamp == r.timestamp => last.values[0] = Some(r.value),
                _ => rows.push(TableRow {
                    timestamp: r.timestamp,
                    values: vec![Some(r.value)],
                }),
            }
        }
        Self {
            columns: vec![label.into()],
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[TableRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Present (timestamp, value) pairs of one column.
    pub fn column(&self, label: &str) -> Option<Vec<(DateTime<Utc>, f64)>> {
        let idx = self.columns.iter().position(|c| c == label)?;
        Some(
            self.rows
                .iter()
                .filter_map(|r| r.values[idx].map(|v| (r.timestamp, v)))
                .collect(),
        )
    }

    /// Earliest and latest timestamp.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }

    pub fn rename_columns(&mut self, mut f: impl FnMut(&str) -> String) {
        for c in &mut self.columns {
            *c = f(c);
        }
    }

    /// Outer join on timestamp. Columns of `other` follow those of `self`;
    /// a label already present gets a ` (2)`, ` (3)`, ... suffix.
    pub fn outer_join(self, other: ReadingTable) -> ReadingTable {
        let left_width = self.columns.len();
        let width = left_width + other.columns.len();

        let mut columns = self.columns;
        for label in other.columns {
            let mut candidate = label.clone();
            let mut n = 2;
            while columns.contains(&candidate) {
                candidate = format!("{label} ({n})");
                n += 1;
            }
            columns.push(candidate);
        }

        let mut merged: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
        for row in self.rows {
            let slot = merged.entry(row.timestamp).or_insert_with(|| vec![None; width]);
            slot[..left_width].copy_from_slice(&row.values);
        }
        for row in other.rows {
            let slot = merged.entry(row.timestamp).or_insert_with(|| vec![None; width]);
            slot[left_width..].copy_from_slice(&row.values);
        }

        ReadingTable {
            columns,
            rows: merged
                .into_iter()
                .map(|(timestamp, values)| TableRow { timestamp, values })
                .collect(),
        }
    }
}

/// Fold any number of tables into one with [`ReadingTable::outer_join`].
pub fn combine(tables: impl IntoIterator<Item = ReadingTable>) -> ReadingTable {
    tables
        .into_iter()
        .fold(ReadingTable::default(), ReadingTable::outer_join)
}

/// Parse raw entries into readings sorted ascending by timestamp.
///
/// Entries without a numeric value are dropped; ties keep input order.
pub fn normalize_readings(entries: &[ReadingEntry]) -> Result<Vec<Reading>> {
    let mut out = Vec::with_capacity(entries.len());
    for e in entries {
        let Some(value) = e.value else {
            continue;
        };
        out.push(Reading {
            timestamp: parse_api_datetime(&e.date_time)?,
            value,
        });
    }
    out.sort_by_key(|r| r.timestamp);
    Ok(out)
}

/// Column labels for a set of measures, unique within the set.
///
/// The parameter name alone when it is unambiguous, otherwise qualified by
/// qualifier and then by the endpoint's last path segment.
pub fn column_labels(measures: &[MeasureDescriptor]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for m in measures {
        *counts.entry(m.parameter.as_str()).or_default() += 1;
    }
    let mut used = HashSet::new();
    measures
        .iter()
        .map(|m| {
            let base = if m.parameter.is_empty() {
                "measure"
            } else {
                m.parameter.as_str()
            };
            let mut label = if counts[m.parameter.as_str()] == 1 {
                base.to_string()
            } else {
                format!("{base} ({})", m.qualifier)
            };
            if used.contains(&label) {
                let tail = m.endpoint.rsplit('/').next().unwrap_or(&m.endpoint);
                label = format!("{base} ({}, {tail})", m.qualifier);
            }
            used.insert(label.clone());
            label
        })
        .collect()
}

/// Readings of one station plus per-column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReadings {
    pub station_id: String,
    pub table: ReadingTable,
    pub info: MeasurementInfo,
    /// Labels of selected measures that returned no readings.
    pub empty: Vec<String>,
}

impl<T: Transport> Client<T> {
    /// Fetch the readings of one station within `window`.
    ///
    /// With `measure` set only that parameter is fetched, after checking it
    /// is a known parameter and that the station records it. Measures that
    /// return no readings contribute no column and are listed in
    /// [`StationReadings::empty`]; if none return any,
    /// [`FloodError::EmptyReadings`] is raised. A reading timestamp that
    /// cannot be parsed is a [`FloodError::MalformedResponse`].
    pub fn get_station_readings(
        &self,
        station_id: &str,
        window: &DateWindow,
        measure: Option<&str>,
    ) -> Result<StationReadings> {
        if let Some(m) = measure {
            check_valid_measure_name(m)?;
        }
        self.check_valid_station(station_id)?;

        let all = self.get_station_measures(station_id)?;
        let selected = match measure {
            Some(m) => select_measure(station_id, all, m)?,
            None => all,
        };
        let labels = column_labels(&selected);

        let mut table = ReadingTable::default();
        let mut meta = MeasurementInfo::new();
        let mut empty = Vec::new();
        for (desc, label) in selected.iter().zip(&labels) {
            let path = endpoint::measure_readings(&desc.endpoint, window);
            let entries: Vec<ReadingEntry> = self.get_records(&path)?;
            let readings =
                normalize_readings(&entries).map_err(|e| FloodError::MalformedResponse {
                    url: self.resolve_url(&path),
                    reason: format!("unreadable reading timestamp: {e}"),
                })?;
            if readings.is_empty() {
                warn!("No readings for {label} at station {station_id}");
                empty.push(label.clone());
                continue;
            }
            table = table.outer_join(ReadingTable::from_readings(label.clone(), &readings));
            meta.insert(label.clone(), MeasureInfo::from_descriptor(desc));
        }

        if table.is_empty() {
            let measure = match measure {
                Some(m) => m.to_string(),
                None if labels.is_empty() => "any measure".to_string(),
                None => labels.join(", "),
            };
            return Err(FloodError::EmptyReadings {
                station: station_id.to_string(),
                measure,
            });
        }
        info!(
            "Station {station_id}: {} row(s) across {} column(s)",
            table.len(),
            table.columns().len()
        );
        Ok(StationReadings {
            station_id: station_id.to_string(),
            table,
            info: meta,
            empty,
        })
    }
}
