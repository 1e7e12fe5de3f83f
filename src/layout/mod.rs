//! Viewport math: converting scroll offsets and content extents into the
//! logical row/column window that is materialized into display nodes.

mod viewport;

pub use viewport::{
    column_range, row_range, ColumnRangeInput, Invalidation, RowRangeInput, Viewport,
    ViewportTracker,
};
pub(crate) use viewport::{floor_index, to_f64};
