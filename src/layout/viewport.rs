//! Logical viewport and the range calculator.

use serde::{Deserialize, Serialize};

/// Half-open logical window of rows and data columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Viewport {
    pub const fn row_count(&self) -> usize {
        self.end_row.saturating_sub(self.start_row)
    }

    pub const fn column_count(&self) -> usize {
        self.end_col.saturating_sub(self.start_col)
    }
}

/// Floor a non-negative float to an index; NaN and negatives map to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn floor_index(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.floor() as usize
    } else {
        0
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_f64(value: usize) -> f64 {
    value as f64
}

/// Inputs to the vertical range estimate.
#[derive(Debug, Clone, Copy)]
pub struct RowRangeInput {
    pub container_height: f64,
    pub scroll_top: f64,
    /// Height of the virtual panel as sized by the previous draw
    pub virtual_height: f64,
    pub row_count: usize,
    /// Header rows currently materialized
    pub header_rows: usize,
    pub row_height: f64,
    /// Row count of the previous draw, used as the anchor when preserving
    /// the scroll position across a forced redraw
    pub anchor_rows: Option<usize>,
}

/// Compute `(start_row, end_row)` from the vertical scroll percentage.
///
/// The window always spans one page of rows; when it would run past the last
/// row it is shifted back so it ends exactly at `row_count`, never starting
/// before 0.
pub fn row_range(input: &RowRangeInput) -> (usize, usize) {
    let total_scroll_height = (input.virtual_height - input.container_height).max(1.0);
    let percent_scroll = (input.scroll_top / total_scroll_height).clamp(0.0, 1.0);
    let page_rows = if input.row_height > 0.0 {
        floor_index(input.container_height / input.row_height)
    } else {
        0
    };
    let relative_rows = input.anchor_rows.unwrap_or(input.row_count);
    let scrollable_rows = (relative_rows + input.header_rows).saturating_sub(page_rows);

    let mut start_row = floor_index(to_f64(scrollable_rows) * percent_scroll);
    let mut end_row = start_row + page_rows;
    if end_row > input.row_count {
        let offset = end_row - input.row_count;
        if offset > start_row {
            start_row = 0;
            end_row = input.row_count;
        } else {
            start_row -= offset;
            end_row -= offset;
        }
    }
    (start_row, end_row)
}

/// Inputs to the horizontal range estimate.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRangeInput {
    pub container_width: f64,
    pub scroll_left: f64,
    pub virtual_width: f64,
    /// Number of data columns (the row-path column is not counted)
    pub column_count: usize,
    /// Columns materialized by the previous draw
    pub rendered_columns: usize,
}

/// Compute `(start_col, end_col)` from the horizontal scroll percentage.
///
/// Column widths are only known after rendering, so the page size is the
/// number of columns the previous draw rendered. This is an estimate; the
/// table renderer fetches missing columns until the container is filled.
pub fn column_range(input: &ColumnRangeInput) -> (usize, usize) {
    let total_scroll_width = (input.virtual_width - input.container_width).max(1.0);
    let percent_left = (input.scroll_left / total_scroll_width).clamp(0.0, 1.0);
    let start_col = floor_index(to_f64(input.column_count.saturating_sub(1)) * percent_left);
    let end_col = start_col + input.rendered_columns.max(1);
    (start_col, end_col)
}

/// Which axes of the viewport changed since the previous draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub row: bool,
    pub column: bool,
}

impl Invalidation {
    pub const fn any(self) -> bool {
        self.row || self.column
    }
}

/// Remembers the last drawn viewport to detect changes.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    last: Option<Viewport>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `viewport` and report what differs from the previous one.
    /// Everything is invalid after a reset.
    pub fn validate(&mut self, viewport: Viewport) -> Invalidation {
        let inv = match self.last {
            Some(last) => Invalidation {
                row: last.start_row != viewport.start_row || last.end_row != viewport.end_row,
                // The column end is only an estimate; it moves as widths converge
                column: last.start_col != viewport.start_col,
            },
            None => Invalidation {
                row: true,
                column: true,
            },
        };
        self.last = Some(viewport);
        inv
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub const fn last(&self) -> Option<Viewport> {
        self.last
    }
}
