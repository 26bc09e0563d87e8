//! Station-consistent series styling.
//!
//! All series of one station share a base colour from the MS Office palette;
//! the measures of that station are told apart by shade and marker shape.
//! Assignment depends only on the set of keys, never on input order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Marker shape for data points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Cross,
}

const MARKERS: [MarkerShape; 4] = [
    MarkerShape::Circle,
    MarkerShape::Square,
    MarkerShape::Triangle,
    MarkerShape::Cross,
];

/// Key identifying a unique series (station, measure pair).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub station: String,
    pub measure: String,
}

impl SeriesKey {
    pub fn new(station: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            measure: measure.into(),
        }
    }

    /// Split a combined column label `"Station: Measure (...)"`.
    ///
    /// Labels without a station prefix belong to an unnamed station.
    pub fn from_column_label(label: &str) -> Self {
        match label.split_once(": ") {
            Some((station, measure)) => Self::new(station, measure),
            None => Self::new("", label),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesStyle {
    pub base: Rgba,
    pub shade: Rgba,
    pub marker: MarkerShape,
}

/// MS Office color palette (RGB values).
const MS_OFFICE_PALETTE: [(u8, u8, u8); 10] = [
    (68, 114, 196),  // blue
    (237, 125, 49),  // orange
    (165, 165, 165), // gray
    (255, 192, 0),   // gold
    (91, 155, 213),  // light blue
    (112, 173, 71),  // green
    (38, 68, 120),   // dark blue
    (158, 72, 14),   // dark orange
    (99, 99, 99),    // dark gray
    (153, 115, 0),   // brownish
];

fn adjust_brightness(color: (u8, u8, u8), factor: f64) -> (u8, u8, u8) {
    let scale = |c: u8| (c as f64 * factor).clamp(0.0, 255.0) as u8;
    (scale(color.0), scale(color.1), scale(color.2))
}

/// Assign station-consistent styles from `palette`.
///
/// Stations take palette entries in sorted order (wrapping after the palette
/// is used up). Within a station the measures, in sorted order, step through
/// brightness factors and marker shapes.
pub fn assign_station_styles_with_palette(
    series: &[SeriesKey],
    palette: &[(u8, u8, u8)],
    alpha: u8,
) -> HashMap<SeriesKey, SeriesStyle> {
    let mut by_station: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for key in series {
        by_station
            .entry(key.station.as_str())
            .or_default()
            .insert(key.measure.as_str());
    }

    let mut result = HashMap::new();
    for (station_idx, (station, measures)) in by_station.iter().enumerate() {
        let base_color = palette[station_idx % palette.len()];
        let base = Rgba::new(base_color.0, base_color.1, base_color.2, alpha);
        let n = measures.len().max(1) as f64;
        for (measure_idx, measure) in measures.iter().enumerate() {
            // Spread shades between 0.7x and 1.3x brightness.
            let factor = if n > 1.0 {
                0.7 + 0.6 * (measure_idx as f64 / (n - 1.0))
            } else {
                1.0
            };
            let (r, g, b) = adjust_brightness(base_color, factor);
            result.insert(
                SeriesKey::new(*station, *measure),
                SeriesStyle {
                    base,
                    shade: Rgba::new(r, g, b, alpha),
                    marker: MARKERS[measure_idx % MARKERS.len()],
                },
            );
        }
    }
    result
}

/// Convenience function using the MS Office palette.
pub fn assign_station_styles(series: &[SeriesKey], alpha: u8) -> HashMap<SeriesKey, SeriesStyle> {
    assign_station_styles_with_palette(series, &MS_OFFICE_PALETTE, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_split() {
        let key = SeriesKey::from_column_label("Kings Mill: Flow (Stage, m3/s)");
        assert_eq!(key, SeriesKey::new("Kings Mill", "Flow (Stage, m3/s)"));
        assert_eq!(SeriesKey::from_column_label("flow"), SeriesKey::new("", "flow"));
    }

    #[test]
    fn station_consistent_styles() {
        let series = vec![
            SeriesKey::new("Kings Mill", "Flow"),
            SeriesKey::new("Kings Mill", "Level"),
            SeriesKey::new("Bewdley", "Flow"),
            SeriesKey::new("Bewdley", "Level"),
        ];

        let styles = assign_station_styles(&series, 255);

        // Same station shares a base color, different stations do not
        assert_eq!(styles[&series[0]].base, styles[&series[1]].base);
        assert_eq!(styles[&series[2]].base, styles[&series[3]].base);
        assert_ne!(styles[&series[0]].base, styles[&series[2]].base);

        // Measures within a station differ
        assert_ne!(styles[&series[0]].shade, styles[&series[1]].shade);
        assert_ne!(styles[&series[0]].marker, styles[&series[1]].marker);
    }

    #[test]
    fn assignment_ignores_input_order() {
        let a = vec![SeriesKey::new("A", "x"), SeriesKey::new("B", "y")];
        let b = vec![SeriesKey::new("B", "y"), SeriesKey::new("A", "x")];
        assert_eq!(assign_station_styles(&a, 200), assign_station_styles(&b, 200));
    }
}
