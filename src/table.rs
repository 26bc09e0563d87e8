//! Plain-text table rendering in the `psql` layout.

use crate::models::StationRef;
use crate::readings::ReadingTable;

/// Rows printed by default.
pub const MAX_PRINT_ROWS: usize = 30;

const DATE_HEADER: &str = "Date";

/// Render headers and cells; `right_align[i]` right-aligns column `i`.
pub fn render_psql(headers: &[String], rows: &[Vec<String>], right_align: &[bool]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let rule = |left: char, mid: char, right: char| {
        let inner = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join(mid.to_string().as_str());
        format!("{left}{inner}{right}\n")
    };
    let line = |cells: &[String], align: bool| {
        let body = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if align && right_align.get(i).copied().unwrap_or(false) {
                    format!(" {cell:>w$} ")
                } else {
                    format!(" {cell:<w$} ")
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        format!("|{body}|\n")
    };

    let mut out = rule('+', '+', '+');
    out.push_str(&line(headers, false));
    out.push_str(&rule('|', '+', '|'));
    for row in rows {
        out.push_str(&line(row, true));
    }
    out.push_str(&rule('+', '+', '+'));
    out
}

fn fmt_cell(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.3}"),
        _ => String::new(),
    }
}

/// Render up to `max_rows` rows of a reading table.
pub fn render_readings(table: &ReadingTable, max_rows: usize) -> String {
    let mut headers = vec![DATE_HEADER.to_string()];
    headers.extend(table.columns().iter().cloned());
    let rows: Vec<Vec<String>> = table
        .head(max_rows)
        .iter()
        .map(|row| {
            let mut cells = vec![row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()];
            cells.extend(row.values.iter().map(|v| fmt_cell(*v)));
            cells
        })
        .collect();
    let mut right_align = vec![false];
    right_align.extend(std::iter::repeat_n(true, table.columns().len()));
    render_psql(&headers, &rows, &right_align)
}

/// Render station search results.
pub fn render_stations(stations: &[StationRef]) -> String {
    let headers = vec!["station_id".to_string(), "station_name".to_string()];
    let rows: Vec<Vec<String>> = stations
        .iter()
        .map(|s| vec![s.id.clone(), s.name.clone()])
        .collect();
    render_psql(&headers, &rows, &[false, false])
}
