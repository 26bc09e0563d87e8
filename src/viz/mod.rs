//! Visualization: render reading tables to **SVG** or **PNG**.
//!
//! - `Stacked` layout: one panel per column sharing the time axis, y axis
//!   labelled `"parameter - qualifier (unit)"`
//! - `Overlay` layout: all columns in one panel with a legend
//! - Series of one station share a hue (see [`crate::style`])

pub mod fonts;
pub mod text;
pub mod types;
pub mod util;

pub use types::{ChartOptions, DEFAULT_LAYOUT, PlotLayout, STACKED_PANEL_HEIGHT};

use crate::models::MeasurementInfo;
use crate::readings::ReadingTable;
use crate::style::{MarkerShape, SeriesKey, assign_station_styles};
use crate::time::format_user_date;
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::LineSeries;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;

use text::truncate_to_width;
use util::{
    compute_left_label_area_px, padded_range, shared_unit_label, to_rgba, x_coord, x_label,
    y_label,
};

const MARGIN: u32 = 16;
const TITLE_FONT_PX: u32 = 18;
const LABEL_FONT_PX: u32 = 12;
const Y_TICKS: usize = 8;
/// Series longer than this are drawn as plain lines.
const MAX_MARKED_POINTS: usize = 200;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// One drawable column.
struct Series {
    label: String,
    y_desc: String,
    color: RGBAColor,
    marker: MarkerShape,
    points: Vec<(f64, f64)>,
}

/// Convenience: stacked chart with default options.
pub fn plot_readings<P: AsRef<Path>>(
    table: &ReadingTable,
    info: &MeasurementInfo,
    out_path: P,
) -> Result<()> {
    plot_readings_with(table, info, out_path, &ChartOptions::default())
}

/// Fully-configurable entry point. The backend follows the file extension:
/// `.svg` renders vector output, anything else a bitmap.
pub fn plot_readings_with<P: AsRef<Path>>(
    table: &ReadingTable,
    info: &MeasurementInfo,
    out_path: P,
    opts: &ChartOptions,
) -> Result<()> {
    let (start, end) = table.time_span().ok_or_else(|| anyhow!("no data to plot"))?;
    fonts::ensure_fonts_registered(opts.font.as_deref())?;

    let series = build_series(table, info);
    if series.iter().all(|s| s.points.is_empty()) {
        return Err(anyhow!("no numeric values to plot"));
    }

    let (mut x_min, mut x_max) = (x_coord(start), x_coord(end));
    if x_max - x_min < 1.0 {
        x_min -= 1800.0;
        x_max += 1800.0;
    }
    let span = format!("{} - {}", format_user_date(start), format_user_date(end));

    let height = match (opts.height, opts.layout) {
        (0, PlotLayout::Stacked) => STACKED_PANEL_HEIGHT * series.len() as u32,
        (0, PlotLayout::Overlay) => 600,
        (h, _) => h,
    };
    let size = (opts.width, height);

    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_chart(root, &series, x_min, x_max, &span, opts, table.columns(), info)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_chart(root, &series, x_min, x_max, &span, opts, table.columns(), info)?;
    }
    Ok(())
}

fn build_series(table: &ReadingTable, info: &MeasurementInfo) -> Vec<Series> {
    let keys: Vec<SeriesKey> = table
        .columns()
        .iter()
        .map(|c| SeriesKey::from_column_label(c))
        .collect();
    let styles = assign_station_styles(&keys, 255);

    table
        .columns()
        .iter()
        .zip(&keys)
        .map(|(label, key)| {
            let points = table
                .column(label)
                .unwrap_or_default()
                .into_iter()
                .map(|(t, v)| (x_coord(t), v))
                .filter(|(_, v)| v.is_finite())
                .collect();
            let style = styles.get(key);
            Series {
                label: label.clone(),
                y_desc: info
                    .get(label)
                    .map(|m| m.axis_label())
                    .unwrap_or_else(|| "Value".to_string()),
                color: style.map(|s| to_rgba(s.shade)).unwrap_or(BLUE.to_rgba()),
                marker: style.map(|s| s.marker).unwrap_or(MarkerShape::Circle),
                points,
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    series: &[Series],
    x_min: f64,
    x_max: f64,
    span: &str,
    opts: &ChartOptions,
    columns: &[String],
    info: &MeasurementInfo,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&RGBColor(248, 249, 250))
        .map_err(|e| anyhow!("{:?}", e))?;

    match opts.layout {
        PlotLayout::Stacked => {
            let panels = root.split_evenly((series.len(), 1));
            for (panel, s) in panels.iter().zip(series) {
                let title = format!("{} ({span})", s.label);
                draw_panel(panel, std::slice::from_ref(s), x_min, x_max, &title, &s.y_desc, false)?;
            }
        }
        PlotLayout::Overlay => {
            let title = match &opts.title {
                Some(t) => t.clone(),
                None => format!("Readings ({span})"),
            };
            let y_desc = shared_unit_label(columns, info);
            draw_panel(&root, series, x_min, x_max, &title, &y_desc, true)?;
        }
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    series: &[Series],
    x_min: f64,
    x_max: f64,
    title: &str,
    y_desc: &str,
    legend: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (min_val, max_val) = padded_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
    let left_px = compute_left_label_area_px(min_val, max_val, Y_TICKS, LABEL_FONT_PX);
    let (w, _) = area.dim_in_pixel();
    let title = truncate_to_width(title, TITLE_FONT_PX, w.saturating_sub(2 * MARGIN));

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(title, ("sans-serif", TITLE_FONT_PX))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max, min_val..max_val)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| x_label(*x);
    let y_label_fmt = |v: &f64| y_label(*v);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(y_desc)
        .x_labels(8)
        .y_labels(Y_TICKS)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .light_line_style(RGBColor(204, 204, 204).mix(0.7))
        .axis_style(RGBColor(85, 85, 85))
        .label_style(("sans-serif", LABEL_FONT_PX))
        .axis_desc_style(("sans-serif", 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for s in series {
        let color = s.color;
        let style = ShapeStyle {
            color,
            filled: false,
            stroke_width: 2,
        };
        let anno = chart
            .draw_series(LineSeries::new(s.points.clone(), style))
            .map_err(|e| anyhow!("{:?}", e))?;
        if legend {
            anno.label(s.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
        }
        if s.points.len() <= MAX_MARKED_POINTS {
            draw_markers(&mut chart, s)?;
        }
    }

    if legend {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .label_font(("sans-serif", LABEL_FONT_PX))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

fn draw_markers<DB>(chart: &mut Chart<'_, DB>, s: &Series) -> Result<()>
where
    DB: DrawingBackend,
{
    let style = ShapeStyle {
        color: s.color,
        filled: true,
        stroke_width: 1,
    };
    let points = s.points.iter().copied();
    match s.marker {
        MarkerShape::Circle => chart
            .draw_series(points.map(|p| Circle::new(p, 3, style)))
            .map(|_| ()),
        MarkerShape::Square => chart
            .draw_series(points.map(|p| EmptyElement::at(p) + Rectangle::new([(-3, -3), (3, 3)], style)))
            .map(|_| ()),
        MarkerShape::Triangle => chart
            .draw_series(points.map(|p| TriangleMarker::new(p, 4, style)))
            .map(|_| ()),
        MarkerShape::Cross => chart
            .draw_series(points.map(|p| Cross::new(p, 3, style)))
            .map(|_| ()),
    }
    .map_err(|e| anyhow!("{:?}", e))
}
