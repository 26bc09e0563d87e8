//! Public types and constants for the visualization module.

use std::path::PathBuf;

/// How multiple columns are arranged in one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotLayout {
    /// One panel per column, stacked vertically and sharing the time axis.
    Stacked,
    /// Every column in a single panel with a legend.
    Overlay,
}

pub const DEFAULT_LAYOUT: PlotLayout = PlotLayout::Stacked;

/// Panel height used when the caller leaves `height` at zero for a stacked chart.
pub const STACKED_PANEL_HEIGHT: u32 = 320;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    /// Zero lets stacked charts size themselves per panel.
    pub height: u32,
    pub layout: PlotLayout,
    /// Overlay title; stacked panels are titled per column.
    pub title: Option<String>,
    /// TrueType font to register; system locations are searched when unset.
    pub font: Option<PathBuf>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 0,
            layout: DEFAULT_LAYOUT,
            title: None,
            font: None,
        }
    }
}
