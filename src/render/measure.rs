//! Cell width measurement.
//!
//! Column widths are only known once a column has been rendered; the table
//! renderer asks a [`Measure`] for the width of every cell it draws.
//! [`TextMeasure`] estimates widths from character counts, which is what the
//! CLI and tests use; a browser host can plug in real layout measurements.

use serde::{Deserialize, Serialize};

use super::node::{CellContent, CellNode};

pub trait Measure {
    /// Rendered width of a cell in pixels, never below its minimum width.
    fn cell_width(&self, cell: &CellNode) -> f64;

    /// Horizontal span `(start, end)` of the tree toggle icon relative to the
    /// cell's left edge, if the cell has one.
    fn toggle_bounds(&self, _cell: &CellNode) -> Option<(f64, f64)> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMeasure {
    /// Average advance of one character
    pub char_width: f64,
    /// Horizontal padding of a cell (both sides)
    pub padding: f64,
    /// Width of one tree indentation guide
    pub indent_width: f64,
    /// Left margin of a leaf tree label
    pub leaf_margin: f64,
    /// Width of the tree toggle icon
    pub icon_width: f64,
    /// Width of one sort glyph
    pub glyph_width: f64,
}

impl Default for TextMeasure {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            padding: 12.0,
            indent_width: 21.0,
            leaf_margin: 12.0,
            icon_width: 16.0,
            glyph_width: 14.0,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

impl TextMeasure {
    fn text_width(&self, text: &str) -> f64 {
        count(text.chars().count()) * self.char_width
    }

    fn content_width(&self, content: &CellContent) -> f64 {
        match content {
            CellContent::Empty => 0.0,
            CellContent::Text(text) => self.text_width(text),
            CellContent::Header { label, sort_glyphs } => {
                self.text_width(label) + count(sort_glyphs.len()) * self.glyph_width
            }
            CellContent::Tree {
                depth,
                label,
                toggle,
            } => {
                let marker = if toggle.is_some() {
                    self.icon_width
                } else {
                    self.leaf_margin
                };
                count(*depth) * self.indent_width + marker + self.text_width(label)
            }
        }
    }
}

impl Measure for TextMeasure {
    fn cell_width(&self, cell: &CellNode) -> f64 {
        let natural = self.content_width(cell.content()) + self.padding;
        cell.min_width().map_or(natural, |min| natural.max(min))
    }

    fn toggle_bounds(&self, cell: &CellNode) -> Option<(f64, f64)> {
        match cell.content() {
            CellContent::Tree {
                depth,
                toggle: Some(_),
                ..
            } => {
                let start = self.padding / 2.0 + count(*depth) * self.indent_width;
                Some((start, start + self.icon_width))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::render::node::{CellTag, Toggle};

    fn cell(content: CellContent) -> CellNode {
        let mut cell = CellNode::new(CellTag::Td);
        cell.content = content;
        cell
    }

    #[test]
    fn test_text_width() {
        let m = TextMeasure::default();
        assert_eq!(m.cell_width(&cell(CellContent::Text("abcd".into()))), 40.0);
        assert_eq!(m.cell_width(&cell(CellContent::Empty)), 12.0);
    }

    #[test]
    fn test_min_width_wins() {
        let m = TextMeasure::default();
        let mut c = cell(CellContent::Text("a".into()));
        c.min_width = Some(100.0);
        assert_eq!(m.cell_width(&c), 100.0);
    }

    #[test]
    fn test_tree_and_toggle_bounds() {
        let m = TextMeasure::default();
        let c = cell(CellContent::Tree {
            depth: 2,
            label: "NY".into(),
            toggle: Some(Toggle::Open),
        });
        assert_eq!(m.cell_width(&c), 2.0 * 21.0 + 16.0 + 14.0 + 12.0);
        assert_eq!(m.toggle_bounds(&c), Some((48.0, 64.0)));

        let leaf = cell(CellContent::Tree {
            depth: 2,
            label: "NY".into(),
            toggle: None,
        });
        assert_eq!(m.toggle_bounds(&leaf), None);
    }

    #[test]
    fn test_header_glyphs() {
        let m = TextMeasure::default();
        let c = cell(CellContent::Header {
            label: "ab".into(),
            sort_glyphs: vec!["arrow_upward"],
        });
        assert_eq!(m.cell_width(&c), 14.0 + 14.0 + 12.0);
    }
}
