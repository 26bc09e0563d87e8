//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover OS fonts, so a TrueType file is read once and
//! registered as "sans-serif" before the first chart is drawn.

use anyhow::{Result, anyhow};
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Searched in order when no font path is given.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

/// First candidate font that exists on this machine.
pub fn find_system_font() -> Option<PathBuf> {
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Register `explicit` (or the first system candidate) once per process.
///
/// Later calls return the outcome of the first one, whatever path they pass.
pub fn ensure_fonts_registered(explicit: Option<&Path>) -> Result<()> {
    REGISTERED
        .get_or_init(|| register(explicit))
        .as_ref()
        .map(|_| ())
        .map_err(|e| anyhow!("{e}"))
}

fn register(explicit: Option<&Path>) -> std::result::Result<PathBuf, String> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(find_system_font)
        .ok_or_else(|| "no usable TrueType font found; pass --font <file.ttf>".to_string())?;
    let bytes = std::fs::read(&path).map_err(|e| format!("read font {}: {e}", path.display()))?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
        .map_err(|_| format!("invalid font file {}", path.display()))?;
    log::debug!("Registered chart font {}", path.display());
    Ok(path)
}
