//! Common test utilities: scripted data sources and table builders.
//!
//! `ScriptedSource` wraps any [`DataSource`], records every call, yields to
//! the runtime before answering and can be told to fail or misbehave.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use std::cell::{Cell, RefCell};

use datagrid::{
    ColumnPage, ColumnType, DataSource, DatagridError, MemorySource, Result, Schema, Value,
    ViewConfig, Viewport,
};

/// One recorded call on a [`ScriptedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RowCount,
    ColumnPaths,
    Schema,
    Config,
    Fetch(Viewport),
    Expand(usize),
    Collapse(usize),
    SetDepth(usize),
}

#[derive(Debug, Default)]
pub struct ScriptedSource<D> {
    pub inner: D,
    calls: RefCell<Vec<Call>>,
    pub fail_row_count: Cell<bool>,
    pub fail_column_paths: Cell<bool>,
    pub fail_schema: Cell<bool>,
    /// Columns left out of every fetched page
    pub hidden_columns: RefCell<Vec<String>>,
    /// Never answer page fetches
    pub stall_fetch: Cell<bool>,
    /// Answer this many page fetches, then stall
    pub fetch_limit: Cell<Option<usize>>,
}

impl<D> ScriptedSource<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
            fail_row_count: Cell::new(false),
            fail_column_paths: Cell::new(false),
            fail_schema: Cell::new(false),
            hidden_columns: RefCell::new(Vec::new()),
            stall_fetch: Cell::new(false),
            fetch_limit: Cell::new(None),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.take()
    }

    /// Page fetches recorded so far.
    pub fn fetches(&self) -> Vec<Viewport> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Fetch(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Expand, collapse and set-depth calls recorded so far.
    pub fn tree_calls(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Expand(_) | Call::Collapse(_) | Call::SetDepth(_)))
            .cloned()
            .collect()
    }

    pub fn hide_column(&self, column: &str) {
        self.hidden_columns.borrow_mut().push(column.to_string());
    }

    async fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
        tokio::task::yield_now().await;
    }
}

fn scripted_failure(what: &str) -> DatagridError {
    DatagridError::Source(format!("scripted {what} failure"))
}

impl<D: DataSource> DataSource for ScriptedSource<D> {
    async fn row_count(&self) -> Result<usize> {
        self.record(Call::RowCount).await;
        if self.fail_row_count.get() {
            return Err(scripted_failure("row count"));
        }
        self.inner.row_count().await
    }

    async fn column_paths(&self) -> Result<Vec<String>> {
        self.record(Call::ColumnPaths).await;
        if self.fail_column_paths.get() {
            return Err(scripted_failure("column paths"));
        }
        self.inner.column_paths().await
    }

    async fn schema(&self) -> Result<Schema> {
        self.record(Call::Schema).await;
        if self.fail_schema.get() {
            return Err(scripted_failure("schema"));
        }
        self.inner.schema().await
    }

    async fn config(&self) -> Result<ViewConfig> {
        self.record(Call::Config).await;
        self.inner.config().await
    }

    async fn fetch_page(&self, viewport: &Viewport) -> Result<ColumnPage> {
        self.record(Call::Fetch(*viewport)).await;
        let over_limit = self
            .fetch_limit
            .get()
            .is_some_and(|limit| self.fetches().len() > limit);
        if self.stall_fetch.get() || over_limit {
            std::future::pending::<()>().await;
        }
        let mut page = self.inner.fetch_page(viewport).await?;
        for column in self.hidden_columns.borrow().iter() {
            page.remove(column);
        }
        Ok(page)
    }

    async fn expand(&self, row: usize) -> Result<()> {
        self.record(Call::Expand(row)).await;
        self.inner.expand(row).await
    }

    async fn collapse(&self, row: usize) -> Result<()> {
        self.record(Call::Collapse(row)).await;
        self.inner.collapse(row).await
    }

    async fn set_depth(&self, depth: usize) -> Result<()> {
        self.record(Call::SetDepth(depth)).await;
        self.inner.set_depth(depth).await
    }
}

/// Integer table that computes its values on demand, for row counts too
/// large to hold in memory. Cell `(r, c)` is `r * 1000 + c`.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rows: usize,
    columns: Vec<String>,
}

impl SyntheticSource {
    /// Columns named `c0`, `c1`, ...
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_columns(rows, (0..columns).map(|c| format!("c{c}")).collect())
    }

    pub fn with_columns(rows: usize, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    pub fn value(row: usize, column: usize) -> Value {
        Value::Int((row * 1000 + column) as i64)
    }
}

impl DataSource for SyntheticSource {
    async fn row_count(&self) -> Result<usize> {
        Ok(self.rows)
    }

    async fn column_paths(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn schema(&self) -> Result<Schema> {
        Ok(self
            .columns
            .iter()
            .map(|c| (c.clone(), ColumnType::Integer))
            .collect())
    }

    async fn config(&self) -> Result<ViewConfig> {
        Ok(ViewConfig::default())
    }

    async fn fetch_page(&self, viewport: &Viewport) -> Result<ColumnPage> {
        let end_row = viewport.end_row.min(self.rows);
        let end_col = viewport.end_col.min(self.columns.len());
        Ok((viewport.start_col..end_col)
            .map(|c| {
                let values = (viewport.start_row..end_row)
                    .map(|r| Self::value(r, c))
                    .collect();
                (self.columns[c].clone(), values)
            })
            .collect())
    }

    async fn expand(&self, _row: usize) -> Result<()> {
        Ok(())
    }

    async fn collapse(&self, _row: usize) -> Result<()> {
        Ok(())
    }

    async fn set_depth(&self, _depth: usize) -> Result<()> {
        Ok(())
    }
}

pub fn path(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// Flat table with an integer column `a` and a text column `b`.
pub fn flat_source(rows: usize) -> MemorySource {
    let mut source = MemorySource::new(vec![
        ("a".to_string(), ColumnType::Integer),
        ("b".to_string(), ColumnType::String),
    ]);
    for i in 0..rows {
        source.push_row(vec![Value::Int(i as i64), Value::Text(format!("row {i}"))]);
    }
    source
}

/// Two-level Region/State tree over a `Sales` column:
///
/// ```text
/// TOTAL        60
///   East       30
///     NY       20
///     MA       10
///   West       30
///     CA       30
/// ```
pub fn tree_source() -> MemorySource {
    let mut source = MemorySource::new(vec![("Sales".to_string(), ColumnType::Integer)])
        .with_row_pivots(path(&["Region", "State"]));
    for (parts, sales) in [
        (&[][..], 60),
        (&["East"][..], 30),
        (&["East", "NY"][..], 20),
        (&["East", "MA"][..], 10),
        (&["West"][..], 30),
        (&["West", "CA"][..], 30),
    ] {
        source.push_tree_row(path(parts), vec![Value::Int(sales)]);
    }
    source
}

/// Column-pivoted table: paths `A|x`, `A|y`, `B|z`.
pub fn pivoted_source(rows: usize) -> MemorySource {
    let schema: Schema = ["x", "y", "z"]
        .iter()
        .map(|c| ((*c).to_string(), ColumnType::Integer))
        .collect();
    let mut source =
        MemorySource::with_column_paths(path(&["A|x", "A|y", "B|z"]), schema)
            .with_column_pivots(path(&["Group"]));
    for i in 0..rows {
        let i = i as i64;
        source.push_row(vec![Value::Int(i), Value::Int(i * 2), Value::Int(i * 3)]);
    }
    source
}

/// Labels of one section row of `table`.
pub fn row_labels(table: &datagrid::TableNode, header: bool, row: usize) -> Vec<String> {
    let pool = if header { table.head() } else { table.body() };
    pool.row(row)
        .map(|r| {
            r.cells()
                .iter()
                .map(|c| c.content().label().to_string())
                .collect()
        })
        .unwrap_or_default()
}
