use crate::models::MeasurementInfo;
use crate::readings::ReadingTable;
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix text cells that a spreadsheet would evaluate as a formula.
fn sanitize_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save a table as CSV: `timestamp` followed by one column per measure.
/// Missing cells are left empty.
pub fn save_csv<P: AsRef<Path>>(table: &ReadingTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    let mut header = vec!["timestamp".to_string()];
    header.extend(table.columns().iter().map(|c| sanitize_cell(c)));
    wtr.write_record(&header)?;
    for row in table.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true));
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonRow<'a> {
    timestamp: String,
    values: BTreeMap<&'a str, Option<f64>>,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    measurements: &'a MeasurementInfo,
    rows: Vec<JsonRow<'a>>,
}

/// Save a table and its metadata as pretty JSON.
pub fn save_json<P: AsRef<Path>>(
    table: &ReadingTable,
    info: &MeasurementInfo,
    path: P,
) -> Result<()> {
    let rows = table
        .rows()
        .iter()
        .map(|row| JsonRow {
            timestamp: row.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            values: table
                .columns()
                .iter()
                .map(String::as_str)
                .zip(row.values.iter().copied())
                .collect(),
        })
        .collect();
    let export = JsonExport {
        measurements: info,
        rows,
    };
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(&export).context("encode json")?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasureInfo, Reading};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let table = ReadingTable::from_readings(
            "flow",
            &[Reading {
                timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                value: 1.23,
            }],
        );
        let mut info = MeasurementInfo::new();
        info.insert(
            "flow".into(),
            MeasureInfo {
                parameter: "flow".into(),
                qualifier: "Stage".into(),
                unit: "m3/s".into(),
            },
        );
        save_csv(&table, &csvp).unwrap();
        save_json(&table, &info, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn formula_like_cells_are_prefixed() {
        assert_eq!(sanitize_cell("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_cell("@foo"), "'@foo");
        assert_eq!(sanitize_cell("flow"), "flow");
    }
}
