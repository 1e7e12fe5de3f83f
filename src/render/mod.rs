//! Rendering engine.
//!
//! This module provides:
//! - The owned node tree (table, rows, cells) and its reusable node pools
//! - Header and body renderers, and the table renderer that drives both
//! - Type-aware value formatting and cell width measurement
//! - The double-buffer controller and HTML/text serialisation

pub mod body;
pub mod buffer;
pub mod cache;
pub mod format;
pub mod header;
mod html;
pub mod measure;
pub mod node;
pub mod pinned;
pub mod pool;
pub mod table;

// Re-export commonly used types
pub use body::{BodyColumn, BodyProgress, BodyRenderer};
pub use buffer::{DoubleBuffer, DoubleBufferPolicy, Mount};
pub use cache::FormatterCache;
pub use format::Formatter;
pub use header::{HeaderColumn, HeaderCursor, HeaderRenderer};
pub use measure::{Measure, TextMeasure};
pub use node::{
    CellContent, CellMetadata, CellNode, CellTag, NodeId, RowNode, TableNode, Toggle,
    GROUP_HEADER_CLASS,
};
pub use pinned::PinnedWidths;
pub use pool::{ColumnTrim, NodePool};
pub use table::{DrawContext, TableRenderer};
