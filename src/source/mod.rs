//! The data source boundary.
//!
//! The grid never owns data: row counts, column listings, schema, view
//! configuration and columnar pages are all fetched asynchronously from a
//! [`DataSource`], and tree expand/collapse is delegated back to it.

mod csv;
mod memory;

use std::collections::HashMap;

use crate::error::Result;
use crate::layout::Viewport;
use crate::types::{ColumnType, Value, ViewConfig};

#[cfg(not(target_arch = "wasm32"))]
pub use self::csv::read_delimited;
pub use self::csv::{parse_delimited, Delimiter};
pub use memory::MemorySource;

/// Identifier of the synthetic row-path pseudo-column.
pub const ROW_PATH_COLUMN: &str = "__ROW_PATH__";

/// Column name (leaf segment of a column path) to semantic type.
pub type Schema = HashMap<String, ColumnType>;

/// Resolve the type of a `|`-joined column path from its leaf segment.
pub fn column_path_type(schema: &Schema, column_path: &str) -> Option<ColumnType> {
    let leaf = column_path.rsplit('|').next().unwrap_or(column_path);
    schema.get(leaf).copied()
}

/// Columnar page: column path to the row values of one viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPage {
    columns: HashMap<String, Vec<Value>>,
}

impl ColumnPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&[Value]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, values: Vec<Value>) {
        self.columns.insert(column.into(), values);
    }

    pub fn remove(&mut self, column: &str) -> Option<Vec<Value>> {
        self.columns.remove(column)
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.columns.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, Vec<Value>)> for ColumnPage {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Value>)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Asynchronous, paginated, possibly hierarchical data source.
///
/// Calls are awaited on a single thread; implementations need not be `Send`.
/// Viewport column indices address data columns only: the row-path
/// pseudo-column, when present, is not counted and is included in every
/// page.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    /// Number of visible rows.
    async fn row_count(&self) -> Result<usize>;

    /// Ordered column paths, [`ROW_PATH_COLUMN`] first when rows are pivoted.
    async fn column_paths(&self) -> Result<Vec<String>>;

    async fn schema(&self) -> Result<Schema>;

    async fn config(&self) -> Result<ViewConfig>;

    /// Fetch the values of every column in the viewport.
    async fn fetch_page(&self, viewport: &Viewport) -> Result<ColumnPage>;

    /// Expand the tree node at an absolute row index.
    async fn expand(&self, row: usize) -> Result<()>;

    /// Collapse the tree node at an absolute row index.
    async fn collapse(&self, row: usize) -> Result<()>;

    /// Expand every node whose path is at most `depth` long, collapse the
    /// deeper ones.
    async fn set_depth(&self, depth: usize) -> Result<()>;
}

impl<T: DataSource> DataSource for std::rc::Rc<T> {
    async fn row_count(&self) -> Result<usize> {
        (**self).row_count().await
    }

    async fn column_paths(&self) -> Result<Vec<String>> {
        (**self).column_paths().await
    }

    async fn schema(&self) -> Result<Schema> {
        (**self).schema().await
    }

    async fn config(&self) -> Result<ViewConfig> {
        (**self).config().await
    }

    async fn fetch_page(&self, viewport: &Viewport) -> Result<ColumnPage> {
        (**self).fetch_page(viewport).await
    }

    async fn expand(&self, row: usize) -> Result<()> {
        (**self).expand(row).await
    }

    async fn collapse(&self, row: usize) -> Result<()> {
        (**self).collapse(row).await
    }

    async fn set_depth(&self, depth: usize) -> Result<()> {
        (**self).set_depth(depth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_path_type_uses_leaf() {
        let mut schema = Schema::new();
        schema.insert("Sales".to_string(), ColumnType::Float);
        assert_eq!(
            column_path_type(&schema, "East|2021|Sales"),
            Some(ColumnType::Float)
        );
        assert_eq!(column_path_type(&schema, "Sales"), Some(ColumnType::Float));
        assert_eq!(column_path_type(&schema, ROW_PATH_COLUMN), None);
    }

    #[test]
    fn test_page_names_sorted() {
        let page: ColumnPage = [
            ("b".to_string(), vec![Value::Int(1)]),
            ("a".to_string(), vec![]),
        ]
        .into_iter()
        .collect();
        assert_eq!(page.column_names(), vec!["a", "b"]);
        assert!(page.contains("a"));
        assert_eq!(page.get("b"), Some(&[Value::Int(1)][..]));
    }
}
