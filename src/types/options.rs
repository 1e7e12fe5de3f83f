use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::{DoubleBufferPolicy, TextMeasure};

/// Fixed height of one table row in pixels.
pub const ROW_HEIGHT_PX: f64 = 19.0;

/// The largest virtual panel (px) browsers support without glitching.
pub const MAX_VIRTUAL_HEIGHT_PX: f64 = 10_000_000.0;

/// Grid configuration supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Height of every header and body row in pixels
    pub row_height_px: f64,
    /// Cap on the virtual panel height
    pub max_virtual_height_px: f64,
    /// When draws are staged off-screen
    pub double_buffer: DoubleBufferPolicy,
    /// Cell width estimation parameters
    pub measure: TextMeasure,
    /// Separators and precision of numeric cells
    pub number_format: NumberFormat,
}

/// How numeric cells are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Inserted between groups of three integer digits; `None` disables
    /// grouping
    pub thousands_separator: Option<char>,
    pub decimal_separator: char,
    /// Fraction digits of float columns
    pub float_precision: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            thousands_separator: Some(','),
            decimal_separator: '.',
            float_precision: 2,
        }
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height_px: ROW_HEIGHT_PX,
            max_virtual_height_px: MAX_VIRTUAL_HEIGHT_PX,
            double_buffer: DoubleBufferPolicy::default(),
            measure: TextMeasure::default(),
            number_format: NumberFormat::default(),
        }
    }
}

impl GridOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
