pub mod domains;
pub mod traders;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle, RGBColor};
use tracing::info;

use crate::config::FALLBACK_FONTS;
use crate::error::{AppError, Result};

pub use domains::{draw_market_share, draw_spread_revenue};
pub use traders::draw_trader_histogram;

pub(crate) type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

pub(crate) const FONT: &str = "sans-serif";

/// Soft palette for the share donuts.
pub(crate) const PASTEL: [RGBColor; 10] = [
    RGBColor(161, 201, 244),
    RGBColor(255, 180, 130),
    RGBColor(141, 229, 161),
    RGBColor(255, 159, 155),
    RGBColor(208, 187, 255),
    RGBColor(222, 187, 155),
    RGBColor(250, 176, 228),
    RGBColor(207, 207, 207),
    RGBColor(255, 254, 163),
    RGBColor(185, 242, 240),
];

/// Dark-to-light ramp for bar charts.
pub(crate) const VIRIDIS: [RGBColor; 7] = [
    RGBColor(68, 1, 84),
    RGBColor(68, 57, 131),
    RGBColor(49, 104, 142),
    RGBColor(33, 145, 140),
    RGBColor(53, 183, 121),
    RGBColor(144, 215, 67),
    RGBColor(253, 231, 37),
];

/// Spread `n` bars evenly over the ramp.
pub(crate) fn viridis(i: usize, n: usize) -> RGBColor {
    if n <= 1 {
        return VIRIDIS[0];
    }
    VIRIDIS[i * (VIRIDIS.len() - 1) / (n - 1)]
}

static FONT_READY: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

/// Register a TrueType font for chart text. Done once per process.
pub fn ensure_font(configured: Option<&Path>) -> Result<()> {
    FONT_READY
        .get_or_init(|| load_font(configured))
        .as_ref()
        .map(|_| ())
        .map_err(|e| AppError::Chart(e.clone()))
}

fn load_font(configured: Option<&Path>) -> std::result::Result<PathBuf, String> {
    let candidates: Vec<PathBuf> = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FALLBACK_FONTS.iter().map(PathBuf::from))
        .collect();
    let Some(path) = candidates.iter().find(|p| p.is_file()) else {
        return Err(
            "no TrueType font found for chart text; set CHART_FONT_PATH to a .ttf file".to_string(),
        );
    };

    let bytes = fs::read(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    // The font registry keeps `'static` references for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    for style in [FontStyle::Normal, FontStyle::Bold] {
        register_font(FONT, style, bytes)
            .map_err(|_| format!("{} is not a usable TrueType font", path.display()))?;
    }

    info!("[CHART] Using font {}", path.display());
    Ok(path.clone())
}

/// `1234567.8` → `1,234,568`.
pub fn thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
