//! Utility functions for visualization: colors, ranges, axis labels.

use crate::models::MeasurementInfo;
use crate::style::Rgba;
use chrono::{DateTime, Utc};
use plotters::prelude::*;
use std::collections::BTreeSet;

use super::text::estimate_text_width_px;

pub fn to_rgba(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.a as f64 / 255.0)
}

/// Seconds since the epoch, the x coordinate used for every chart.
pub fn x_coord(t: DateTime<Utc>) -> f64 {
    t.timestamp() as f64
}

/// Format an x coordinate back into a short date-time label.
pub fn x_label(x: f64) -> String {
    DateTime::<Utc>::from_timestamp(x.round() as i64, 0)
        .map(|t| t.format("%d-%m %H:%M").to_string())
        .unwrap_or_default()
}

/// Y tick label with precision depending on magnitude.
pub fn y_label(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

/// Padded (min, max) over all values; flat or empty input still yields a
/// non-degenerate range.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Y-axis title for several columns: the shared unit if there is exactly one.
pub fn shared_unit_label(columns: &[String], info: &MeasurementInfo) -> String {
    let units: BTreeSet<&str> = columns
        .iter()
        .filter_map(|c| info.get(c))
        .map(|m| m.unit.as_str())
        .filter(|u| !u.is_empty())
        .collect();
    if units.len() == 1 {
        units.iter().next().map(|u| u.to_string()).unwrap_or_default()
    } else {
        "Value".to_string()
    }
}

/// Compute a tight left label area width for the Y axis (in pixels),
/// based on the formatted tick labels that will appear.
pub fn compute_left_label_area_px(ymin: f64, ymax: f64, ticks: usize, font_px: u32) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin + (ymax - ymin) * t;
        max_px = max_px.max(estimate_text_width_px(&y_label(v), font_px));
    }
    // Room for the axis description and tick marks.
    max_px.saturating_add(18 + font_px + 8).clamp(56, 160)
}
