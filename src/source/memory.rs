//! In-memory data source with an optional row-path tree.
//!
//! Rows are stored in display (pre-order) order. A row is visible while none
//! of its ancestors is collapsed; expand/collapse/set-depth only toggle that
//! visibility, no aggregation happens here.

use std::cell::RefCell;
use std::collections::HashSet;

use super::{ColumnPage, DataSource, Schema, ROW_PATH_COLUMN};
use crate::error::{DatagridError, Result};
use crate::layout::Viewport;
use crate::types::{ColumnType, SortEntry, Value, ViewConfig};

#[derive(Debug, Clone)]
struct MemoryRow {
    path: Vec<String>,
    values: Vec<Value>,
}

/// A [`DataSource`] backed by rows held in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    column_paths: Vec<String>,
    schema: Schema,
    rows: Vec<MemoryRow>,
    config: RefCell<ViewConfig>,
    collapsed: RefCell<HashSet<Vec<String>>>,
    visible: RefCell<Vec<usize>>,
}

impl MemorySource {
    /// Flat table whose column paths are the column names.
    pub fn new(columns: Vec<(String, ColumnType)>) -> Self {
        let column_paths = columns.iter().map(|(name, _)| name.clone()).collect();
        Self::with_column_paths(column_paths, columns.into_iter().collect())
    }

    /// Table with explicit (possibly `|`-joined, column-pivoted) paths; the
    /// schema is keyed by the leaf segment.
    pub fn with_column_paths(column_paths: Vec<String>, schema: Schema) -> Self {
        Self {
            column_paths,
            schema,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_row_pivots(self, row_pivots: Vec<String>) -> Self {
        self.config.borrow_mut().row_pivots = row_pivots;
        self
    }

    #[must_use]
    pub fn with_column_pivots(self, column_pivots: Vec<String>) -> Self {
        self.config.borrow_mut().column_pivots = column_pivots;
        self
    }

    /// Append a flat row; values align with the column paths.
    pub fn push_row(&mut self, values: Vec<Value>) {
        self.push_tree_row(Vec::new(), values);
    }

    /// Append a tree row at `path` (empty path is the grand total).
    pub fn push_tree_row(&mut self, path: Vec<String>, values: Vec<Value>) {
        let row = MemoryRow { path, values };
        let visible = self.is_visible(&row);
        self.rows.push(row);
        if visible {
            self.visible.get_mut().push(self.rows.len() - 1);
        }
    }

    /// Replace the sort spec reported by [`DataSource::config`]. Rows are not
    /// reordered.
    pub fn set_sort(&self, sort: Vec<SortEntry>) {
        self.config.borrow_mut().sort = sort;
    }

    pub fn data_columns(&self) -> &[String] {
        &self.column_paths
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    fn is_pivoted(&self) -> bool {
        !self.config.borrow().row_pivots.is_empty()
    }

    fn is_visible(&self, row: &MemoryRow) -> bool {
        let collapsed = self.collapsed.borrow();
        !(0..row.path.len()).any(|depth| {
            row.path
                .get(..depth)
                .is_some_and(|prefix| collapsed.contains(prefix))
        })
    }

    fn refresh_visible(&self) {
        let visible: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.is_visible(row))
            .map(|(i, _)| i)
            .collect();
        *self.visible.borrow_mut() = visible;
    }

    fn visible_path(&self, row: usize) -> Result<Vec<String>> {
        let visible = self.visible.borrow();
        visible
            .get(row)
            .and_then(|i| self.rows.get(*i))
            .map(|r| r.path.clone())
            .ok_or_else(|| DatagridError::Source(format!("row {row} out of range")))
    }
}

impl DataSource for MemorySource {
    async fn row_count(&self) -> Result<usize> {
        Ok(self.visible.borrow().len())
    }

    async fn column_paths(&self) -> Result<Vec<String>> {
        let mut paths = Vec::with_capacity(self.column_paths.len() + 1);
        if self.is_pivoted() {
            paths.push(ROW_PATH_COLUMN.to_string());
        }
        paths.extend(self.column_paths.iter().cloned());
        Ok(paths)
    }

    async fn schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn config(&self) -> Result<ViewConfig> {
        Ok(self.config.borrow().clone())
    }

    async fn fetch_page(&self, viewport: &Viewport) -> Result<ColumnPage> {
        let visible = self.visible.borrow();
        let end_row = viewport.end_row.min(visible.len());
        let start_row = viewport.start_row.min(end_row);
        let rows: Vec<&MemoryRow> = visible
            .get(start_row..end_row)
            .unwrap_or_default()
            .iter()
            .filter_map(|i| self.rows.get(*i))
            .collect();

        let mut page = ColumnPage::new();
        if self.is_pivoted() {
            let paths = rows.iter().map(|r| Value::Path(r.path.clone())).collect();
            page.insert(ROW_PATH_COLUMN, paths);
        }

        let end_col = viewport.end_col.min(self.column_paths.len());
        let start_col = viewport.start_col.min(end_col);
        for col in start_col..end_col {
            let Some(name) = self.column_paths.get(col) else {
                continue;
            };
            let values = rows
                .iter()
                .map(|r| r.values.get(col).cloned().unwrap_or(Value::Null))
                .collect();
            page.insert(name.clone(), values);
        }
        Ok(page)
    }

    async fn expand(&self, row: usize) -> Result<()> {
        let path = self.visible_path(row)?;
        self.collapsed.borrow_mut().remove(&path);
        self.refresh_visible();
        Ok(())
    }

    async fn collapse(&self, row: usize) -> Result<()> {
        let path = self.visible_path(row)?;
        self.collapsed.borrow_mut().insert(path);
        self.refresh_visible();
        Ok(())
    }

    async fn set_depth(&self, depth: usize) -> Result<()> {
        let collapsed: HashSet<Vec<String>> = self
            .rows
            .iter()
            .filter(|r| r.path.len() > depth)
            .map(|r| r.path.clone())
            .collect();
        *self.collapsed.borrow_mut() = collapsed;
        self.refresh_visible();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    fn tree() -> MemorySource {
        let mut src = MemorySource::new(vec![("Sales".to_string(), ColumnType::Integer)])
            .with_row_pivots(vec!["Region".to_string(), "State".to_string()]);
        src.push_tree_row(path(&[]), vec![Value::Int(60)]);
        src.push_tree_row(path(&["East"]), vec![Value::Int(30)]);
        src.push_tree_row(path(&["East", "NY"]), vec![Value::Int(20)]);
        src.push_tree_row(path(&["East", "MA"]), vec![Value::Int(10)]);
        src.push_tree_row(path(&["West"]), vec![Value::Int(30)]);
        src.push_tree_row(path(&["West", "CA"]), vec![Value::Int(30)]);
        src
    }

    fn viewport(rows: usize) -> Viewport {
        Viewport {
            start_row: 0,
            end_row: rows,
            start_col: 0,
            end_col: 1,
        }
    }

    #[tokio::test]
    async fn test_flat_page() {
        let mut src = MemorySource::new(vec![
            ("a".to_string(), ColumnType::Integer),
            ("b".to_string(), ColumnType::String),
        ]);
        for i in 0..5 {
            src.push_row(vec![Value::Int(i), Value::Text(format!("r{i}"))]);
        }
        let page = src
            .fetch_page(&Viewport {
                start_row: 1,
                end_row: 3,
                start_col: 1,
                end_col: 5,
            })
            .await
            .unwrap();
        assert!(!page.contains("a"));
        assert!(!page.contains(ROW_PATH_COLUMN));
        assert_eq!(
            page.get("b").unwrap(),
            &[Value::Text("r1".to_string()), Value::Text("r2".to_string())]
        );
        assert_eq!(src.column_paths().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_collapse_and_expand() {
        let src = tree();
        assert_eq!(src.row_count().await.unwrap(), 6);
        assert_eq!(src.column_paths().await.unwrap()[0], ROW_PATH_COLUMN);

        src.collapse(1).await.unwrap();
        assert_eq!(src.row_count().await.unwrap(), 4);
        let page = src.fetch_page(&viewport(10)).await.unwrap();
        let paths = page.get(ROW_PATH_COLUMN).unwrap();
        assert_eq!(paths[2], Value::Path(path(&["West"])));

        src.expand(1).await.unwrap();
        assert_eq!(src.row_count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_set_depth() {
        let src = tree();
        src.set_depth(0).await.unwrap();
        assert_eq!(src.row_count().await.unwrap(), 3);
        src.set_depth(1).await.unwrap();
        assert_eq!(src.row_count().await.unwrap(), 6);
        src.collapse(0).await.unwrap();
        assert_eq!(src.row_count().await.unwrap(), 1);
        src.set_depth(2).await.unwrap();
        assert_eq!(src.row_count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_expand_out_of_range() {
        let src = tree();
        assert!(src.expand(99).await.is_err());
    }
}
