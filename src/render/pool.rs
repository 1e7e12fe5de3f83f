//! Reusable grid of display nodes backing one table section.
//!
//! Nodes are addressed by their slot in the current window and are only
//! created when a slot is first used. A redraw that lands on an existing slot
//! gets the same node back, so attached metadata and the last rendered value
//! survive and unchanged cells cost nothing.

use super::node::{CellNode, CellTag, RowNode};

/// How many cells each row keeps when trimming columns.
#[derive(Debug, Clone, Copy)]
pub enum ColumnTrim<'a> {
    /// Same count for every row (body)
    Uniform(usize),
    /// One count per row index; rows without an entry are left alone (header,
    /// whose rows end at different offsets when colspans vary)
    PerRow(&'a [usize]),
}

#[derive(Debug, Clone)]
pub struct NodePool {
    tag: CellTag,
    rows: Vec<RowNode>,
    updates: usize,
}

impl NodePool {
    pub fn new(tag: CellTag) -> Self {
        Self {
            tag,
            rows: Vec::new(),
            updates: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[RowNode] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RowNode> {
        self.rows.get(index)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellNode> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }

    pub(crate) fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut CellNode> {
        self.rows
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(column))
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &CellNode> {
        self.rows.iter().flat_map(|r| r.cells.iter())
    }

    /// Row container at `index`, appended (with any missing rows before it)
    /// if it does not exist yet.
    #[allow(clippy::indexing_slicing)]
    pub fn get_or_create_row(&mut self, index: usize) -> &mut RowNode {
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, RowNode::new);
        }
        // resized above
        &mut self.rows[index]
    }

    /// Cell at `(row, column)`, appended if new. An existing cell is returned
    /// untouched.
    #[allow(clippy::indexing_slicing)]
    pub fn get_or_create_cell(&mut self, row: usize, column: usize) -> &mut CellNode {
        let tag = self.tag;
        let row_node = self.get_or_create_row(row);
        if column >= row_node.cells.len() {
            row_node.cells.resize_with(column + 1, || CellNode::new(tag));
        }
        // resized above
        &mut row_node.cells[column]
    }

    /// Drop trailing rows beyond `keep`. No-op when already shorter.
    pub fn trim_rows(&mut self, keep: usize) {
        self.rows.truncate(keep);
    }

    /// Drop trailing cells of each row beyond the kept count.
    pub fn trim_columns(&mut self, trim: ColumnTrim<'_>) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            let keep = match trim {
                ColumnTrim::Uniform(count) => count,
                ColumnTrim::PerRow(counts) => match counts.get(index) {
                    Some(count) => *count,
                    None => continue,
                },
            };
            row.cells.truncate(keep);
        }
    }

    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    pub(crate) fn take_updates(&mut self) -> usize {
        std::mem::take(&mut self.updates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_reuses_nodes() {
        let mut pool = NodePool::new(CellTag::Td);
        let id = pool.get_or_create_cell(0, 0).id();
        assert_eq!(pool.get_or_create_cell(0, 0).id(), id);
        assert_eq!(pool.num_rows(), 1);
        assert_eq!(pool.get_or_create_cell(0, 0).tag(), CellTag::Td);
    }

    #[test]
    fn test_gap_rows_are_filled() {
        let mut pool = NodePool::new(CellTag::Th);
        pool.get_or_create_cell(2, 1);
        assert_eq!(pool.num_rows(), 3);
        assert_eq!(pool.row(2).unwrap().cells().len(), 2);
        assert!(pool.row(0).unwrap().cells().is_empty());
    }

    #[test]
    fn test_trim_rows_idempotent() {
        let mut pool = NodePool::new(CellTag::Td);
        for r in 0..5 {
            pool.get_or_create_cell(r, 0);
        }
        let kept = pool.row(1).unwrap().id();
        pool.trim_rows(2);
        pool.trim_rows(2);
        pool.trim_rows(10);
        assert_eq!(pool.num_rows(), 2);
        assert_eq!(pool.row(1).unwrap().id(), kept);
    }

    #[test]
    fn test_trim_columns_uniform_and_per_row() {
        let mut pool = NodePool::new(CellTag::Th);
        for r in 0..3 {
            for c in 0..4 {
                pool.get_or_create_cell(r, c);
            }
        }
        pool.trim_columns(ColumnTrim::PerRow(&[1, 3]));
        assert_eq!(pool.rows()[0].cells().len(), 1);
        assert_eq!(pool.rows()[1].cells().len(), 3);
        assert_eq!(pool.rows()[2].cells().len(), 4);

        pool.trim_columns(ColumnTrim::Uniform(2));
        pool.trim_columns(ColumnTrim::Uniform(9));
        let lens: Vec<usize> = pool.rows().iter().map(|r| r.cells().len()).collect();
        assert_eq!(lens, vec![1, 2, 2]);
    }
}
