//! Header renderer: a stack of header rows for column-pivoted data.
//!
//! Each column path is split on `|` into one label per header level. Above
//! the leaf level, a label equal to the previous column's label at the same
//! level extends that group cell's colspan instead of drawing a new cell.

use super::node::{CellContent, CellNode, GROUP_HEADER_CLASS};
use super::pinned::PinnedWidths;
use super::pool::{ColumnTrim, NodePool};
use crate::types::{ColumnType, SortEntry};

/// One column as seen by the header renderer.
#[derive(Debug, Clone, Copy)]
pub struct HeaderColumn<'a> {
    /// `|`-joined column path; empty for the row-path pseudo-column
    pub path: &'a str,
    /// Display name replacing the path in metadata and pinned-width keys
    pub alias: Option<&'a str>,
    pub column_type: Option<ColumnType>,
}

impl HeaderColumn<'_> {
    pub fn display_name(&self) -> &str {
        self.alias.unwrap_or(self.path)
    }
}

/// Per-draw state threaded through every header draw of one pass: the open
/// group cell and the next free cell offset at each header level.
#[derive(Debug, Clone, Default)]
pub struct HeaderCursor {
    groups: Vec<Option<(String, usize)>>,
    offsets: Vec<usize>,
}

impl HeaderCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free cell offset per header row.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    fn ensure(&mut self, depth: usize) {
        if self.offsets.len() < depth {
            self.offsets.resize(depth, 0);
            self.groups.resize(depth, None);
        }
    }

    fn take_offset(&mut self, level: usize) -> usize {
        match self.offsets.get_mut(level) {
            Some(offset) => {
                *offset += 1;
                *offset - 1
            }
            None => 0,
        }
    }

    fn offset(&self, level: usize) -> usize {
        self.offsets.get(level).copied().unwrap_or(0)
    }

    fn open_group(&self, level: usize, label: &str) -> Option<usize> {
        match self.groups.get(level) {
            Some(Some((open, idx))) if open == label => Some(*idx),
            _ => None,
        }
    }

    fn set_group(&mut self, level: usize, label: &str, idx: usize) {
        if let Some(slot) = self.groups.get_mut(level) {
            *slot = Some((label.to_string(), idx));
        }
    }
}

/// Draws header cells into the `<thead>` node pool.
pub struct HeaderRenderer<'a> {
    pool: &'a mut NodePool,
    pinned: &'a PinnedWidths,
}

impl<'a> HeaderRenderer<'a> {
    pub fn new(pool: &'a mut NodePool, pinned: &'a PinnedWidths) -> Self {
        Self { pool, pinned }
    }

    /// Draw one column across `depth` header levels. Returns the
    /// `(row, cell)` slot of the leaf header cell.
    pub fn draw(
        &mut self,
        depth: usize,
        column: &HeaderColumn<'_>,
        sort: &[SortEntry],
        cursor: &mut HeaderCursor,
    ) -> Option<(usize, usize)> {
        let parts: Vec<&str> = column.path.split('|').collect();
        cursor.ensure(depth);

        let mut is_new_group = false;
        let mut leaf = None;
        for level in 0..depth {
            let label = parts.get(level).copied().unwrap_or("");
            if level + 1 < depth {
                if let Some(idx) = cursor.open_group(level, label) {
                    if let Some(th) = self.pool.cell_mut(level, idx) {
                        th.colspan += 1;
                    }
                } else {
                    let idx = self.draw_th(cursor, level, label, Vec::new());
                    if let Some(th) = self.pool.cell_mut(level, idx) {
                        th.add_class(GROUP_HEADER_CLASS);
                        th.metadata.column_path = Some(column.path.to_string());
                        th.metadata.column_name = Some(label.to_string());
                        th.metadata.column_type = column.column_type;
                        th.metadata.is_column_header = false;
                    }
                    cursor.set_group(level, label, idx);
                    is_new_group = true;
                }
            } else {
                if is_new_group {
                    self.mark_group_boundary(level, cursor.offset(level));
                }
                let glyphs = sort
                    .iter()
                    .filter(|entry| entry.column() == label)
                    .filter_map(|entry| entry.direction().glyph())
                    .collect();
                let idx = self.draw_th(cursor, level, label, glyphs);
                let pinned = self.pinned;
                if let Some(th) = self.pool.cell_mut(level, idx) {
                    decorate_leaf(pinned, th, column, label);
                }
                leaf = Some((level, idx));
            }
        }

        if depth == 1 && column.column_type.is_none() {
            if let Some(th) = leaf.and_then(|(r, c)| self.pool.cell_mut(r, c)) {
                th.add_class(GROUP_HEADER_CLASS);
            }
        }
        self.pool.trim_rows(depth);
        leaf
    }

    /// Trim each header row to the offset the pass reached at that level.
    pub fn clean(&mut self, cursor: &HeaderCursor) {
        self.pool.trim_columns(ColumnTrim::PerRow(cursor.offsets()));
    }

    /// Claim the next cell at `level` and reset it to a plain header cell.
    fn draw_th(
        &mut self,
        cursor: &mut HeaderCursor,
        level: usize,
        label: &str,
        sort_glyphs: Vec<&'static str>,
    ) -> usize {
        let idx = cursor.take_offset(level);
        let content = CellContent::Header {
            label: label.to_string(),
            sort_glyphs,
        };
        let th = self.pool.get_or_create_cell(level, idx);
        th.classes.clear();
        th.colspan = 1;
        th.min_width = None;
        if th.content != content {
            th.content = content;
            self.pool.record_update();
        }
        idx
    }

    /// The first leaf of a new group marks the leaf before it as the end of
    /// the previous group.
    fn mark_group_boundary(&mut self, level: usize, offset: usize) {
        let Some(prev) = offset.checked_sub(1) else {
            return;
        };
        if let Some(th) = self.pool.cell_mut(level, prev) {
            th.add_class(GROUP_HEADER_CLASS);
        }
    }
}

fn decorate_leaf(pinned: &PinnedWidths, th: &mut CellNode, column: &HeaderColumn<'_>, label: &str) {
    let name = column.display_name();
    th.metadata.column_path = Some(name.to_string());
    th.metadata.column_name = Some(label.to_string());
    th.metadata.column_type = column.column_type;
    th.metadata.is_column_header = true;
    if let Some(ty) = column.column_type {
        th.add_class(ty.as_str());
    }
    th.min_width = pinned.get(name, column.column_type);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::render::node::CellTag;
    use crate::types::SortDirection;

    fn draw_all(pool: &mut NodePool, pinned: &PinnedWidths, depth: usize, paths: &[&str]) {
        let mut cursor = HeaderCursor::new();
        let mut renderer = HeaderRenderer::new(pool, pinned);
        for path in paths {
            renderer.draw(
                depth,
                &HeaderColumn {
                    path,
                    alias: None,
                    column_type: Some(ColumnType::Integer),
                },
                &[],
                &mut cursor,
            );
        }
        renderer.clean(&cursor);
    }

    #[test]
    fn test_colspan_merge() {
        let mut pool = NodePool::new(CellTag::Th);
        let pinned = PinnedWidths::new();
        draw_all(&mut pool, &pinned, 2, &["A|x", "A|y", "B|z"]);

        let groups = pool.row(0).unwrap().cells();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].content().label(), "A");
        assert_eq!(groups[0].colspan(), 2);
        assert_eq!(groups[1].content().label(), "B");
        assert_eq!(groups[1].colspan(), 1);
        assert!(!groups[0].metadata().is_column_header);
        assert!(groups.iter().all(|th| th.has_class(GROUP_HEADER_CLASS)));

        let leaves = pool.row(1).unwrap().cells();
        assert_eq!(leaves.len(), 3);
        assert!(leaves[2].metadata().is_column_header);
        assert_eq!(leaves[2].metadata().column_path.as_deref(), Some("B|z"));
        assert_eq!(leaves[2].metadata().column_name.as_deref(), Some("z"));
        // "y" closes group "A"
        assert!(leaves[1].has_class(GROUP_HEADER_CLASS));
        assert!(!leaves[0].has_class(GROUP_HEADER_CLASS));
    }

    #[test]
    fn test_redraw_shrinks_rows_and_cells() {
        let mut pool = NodePool::new(CellTag::Th);
        let pinned = PinnedWidths::new();
        draw_all(&mut pool, &pinned, 2, &["A|x", "A|y", "B|z"]);
        let leaf_id = pool.cell(1, 0).unwrap().id();

        draw_all(&mut pool, &pinned, 1, &["x"]);
        assert_eq!(pool.num_rows(), 1);
        assert_eq!(pool.row(0).unwrap().cells().len(), 1);
        assert_ne!(pool.cell(0, 0).unwrap().id(), leaf_id);
        assert_eq!(pool.cell(0, 0).unwrap().content().label(), "x");

        pool.take_updates();
        draw_all(&mut pool, &pinned, 1, &["x"]);
        assert_eq!(pool.take_updates(), 0);
    }

    #[test]
    fn test_sort_glyphs_and_pinned_width() {
        let mut pool = NodePool::new(CellTag::Th);
        let mut pinned = PinnedWidths::new();
        pinned.set("Sales", Some(ColumnType::Float), 90.0);
        let mut cursor = HeaderCursor::new();
        let sort = vec![
            SortEntry::new("Sales", SortDirection::Desc),
            SortEntry::new("Other", SortDirection::Asc),
        ];
        HeaderRenderer::new(&mut pool, &pinned).draw(
            1,
            &HeaderColumn {
                path: "Sales",
                alias: None,
                column_type: Some(ColumnType::Float),
            },
            &sort,
            &mut cursor,
        );
        let th = pool.cell(0, 0).unwrap();
        assert_eq!(
            th.content(),
            &CellContent::Header {
                label: "Sales".into(),
                sort_glyphs: vec!["arrow_downward"],
            }
        );
        assert_eq!(th.min_width(), Some(90.0));
        assert!(th.has_class("float"));
    }

    #[test]
    fn test_row_path_header_is_group_styled() {
        let mut pool = NodePool::new(CellTag::Th);
        let pinned = PinnedWidths::new();
        let mut cursor = HeaderCursor::new();
        HeaderRenderer::new(&mut pool, &pinned).draw(
            1,
            &HeaderColumn {
                path: "",
                alias: Some("Region,State"),
                column_type: None,
            },
            &[],
            &mut cursor,
        );
        let th = pool.cell(0, 0).unwrap();
        assert!(th.has_class(GROUP_HEADER_CLASS));
        assert_eq!(th.metadata().column_path.as_deref(), Some("Region,State"));
        assert_eq!(cursor.offsets(), &[1]);
    }
}
