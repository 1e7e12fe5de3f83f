//! Owned display nodes: the headless stand-in for `<table>`, `<tr>` and
//! `<th>`/`<td>` elements. Metadata lives directly on the cell node.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{ColumnType, Value};

use super::pool::NodePool;

/// Class applied to group headers and tree row headers.
pub const GROUP_HEADER_CLASS: &str = "pd-group-header";
/// Class of the tree expand/collapse icon.
pub const ROW_TOGGLE_CLASS: &str = "pd-row-header-icon";
/// Class of the sort glyph span inside a column header.
pub const SORT_ICON_CLASS: &str = "pd-column-header-icon";

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a display node. Reused nodes keep their id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTag {
    Th,
    Td,
}

impl CellTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Th => "th",
            Self::Td => "td",
        }
    }
}

/// Open/closed state of a collapsible tree row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Open,
    Closed,
}

impl Toggle {
    /// Material icon ligature drawn in the toggle span.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Open => "remove",
            Self::Closed => "add",
        }
    }
}

/// Rendered content of a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    #[default]
    Empty,
    Text(String),
    /// Header label with zero or more sort glyphs
    Header {
        label: String,
        sort_glyphs: Vec<&'static str>,
    },
    /// Tree row header: one indentation guide per ancestor, then either a
    /// leaf label or a toggle icon and label
    Tree {
        depth: usize,
        label: String,
        toggle: Option<Toggle>,
    },
}

impl CellContent {
    /// Visible text of the cell, without glyphs or guides.
    pub fn label(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Text(t) => t,
            Self::Header { label, .. } | Self::Tree { label, .. } => label,
        }
    }
}

/// Per-cell metadata consumed by click handling and host inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMetadata {
    /// Resolved value; the last path segment for tree cells
    pub value: Option<Value>,
    pub column_path: Option<String>,
    pub column_name: Option<String>,
    pub column_type: Option<ColumnType>,
    pub row_path: Option<Vec<String>>,
    /// Absolute row index (local index + viewport row offset)
    pub ridx: Option<usize>,
    /// `Some(true)` open, `Some(false)` closed, `None` leaf or not a tree cell
    pub is_open: Option<bool>,
    pub is_column_header: bool,
}

/// What a body cell last rendered; equal keys skip the update.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderKey {
    pub(crate) value: Value,
    pub(crate) column_type: Option<ColumnType>,
    pub(crate) is_open: bool,
    /// Leaf path length; decides whether a tree cell has a toggle
    pub(crate) row_depth: usize,
}

#[derive(Debug, Clone)]
pub struct CellNode {
    id: NodeId,
    tag: CellTag,
    pub(crate) content: CellContent,
    pub(crate) classes: Vec<String>,
    pub(crate) colspan: usize,
    pub(crate) min_width: Option<f64>,
    pub(crate) metadata: CellMetadata,
    pub(crate) rendered: Option<RenderKey>,
}

impl CellNode {
    pub(crate) fn new(tag: CellTag) -> Self {
        Self {
            id: NodeId::next(),
            tag,
            content: CellContent::Empty,
            classes: Vec::new(),
            colspan: 1,
            min_width: None,
            metadata: CellMetadata::default(),
            rendered: None,
        }
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub const fn tag(&self) -> CellTag {
        self.tag
    }

    pub const fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub const fn colspan(&self) -> usize {
        self.colspan
    }

    pub const fn min_width(&self) -> Option<f64> {
        self.min_width
    }

    pub const fn metadata(&self) -> &CellMetadata {
        &self.metadata
    }

    /// Whether the cell shows a tree expand/collapse icon.
    pub const fn has_toggle(&self) -> bool {
        matches!(
            self.content,
            CellContent::Tree {
                toggle: Some(_),
                ..
            }
        )
    }
}

#[derive(Debug, Clone)]
pub struct RowNode {
    id: NodeId,
    pub(crate) cells: Vec<CellNode>,
}

impl RowNode {
    pub(crate) fn new() -> Self {
        Self {
            id: NodeId::next(),
            cells: Vec::new(),
        }
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub fn cells(&self) -> &[CellNode] {
        &self.cells
    }
}

/// Header and body node pools of one table.
#[derive(Debug, Clone)]
pub struct TableNode {
    id: NodeId,
    pub(crate) head: NodePool,
    pub(crate) body: NodePool,
}

impl Default for TableNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TableNode {
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            head: NodePool::new(CellTag::Th),
            body: NodePool::new(CellTag::Td),
        }
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub const fn head(&self) -> &NodePool {
        &self.head
    }

    pub const fn body(&self) -> &NodePool {
        &self.body
    }

    /// Deep copy with a fresh table identity, used as the on-screen stand-in
    /// while the real table is redrawn off-screen.
    pub fn snapshot(&self) -> Self {
        Self {
            id: NodeId::next(),
            ..self.clone()
        }
    }

    /// Number of content mutations since the last call.
    pub(crate) fn take_updates(&mut self) -> usize {
        self.head.take_updates() + self.body.take_updates()
    }
}
