//! Table renderer: drives the header and body renderers across the visible
//! columns of one viewport.
//!
//! Column widths are unknown until a column has been drawn once, so the
//! column range handed in is an estimate. Columns the page is missing are
//! fetched one at a time past the end of the estimate, and the pass stops as
//! soon as the drawn width exceeds the container.

use tracing::{debug, trace};

use super::body::{BodyColumn, BodyRenderer};
use super::cache::FormatterCache;
use super::header::{HeaderColumn, HeaderCursor, HeaderRenderer};
use super::measure::Measure;
use super::node::TableNode;
use super::pinned::PinnedWidths;
use super::pool::ColumnTrim;
use crate::error::{DatagridError, Result};
use crate::layout::Viewport;
use crate::source::{column_path_type, ColumnPage, DataSource, Schema, ROW_PATH_COLUMN};
use crate::types::{NumberFormat, SortEntry, Value};

/// Everything one draw pass needs besides the data source.
#[derive(Clone, Copy)]
pub struct DrawContext<'a> {
    pub container_width: f64,
    pub container_height: f64,
    pub row_height: f64,
    /// Header rows: one per column pivot plus the leaf row
    pub header_depth: usize,
    /// Path length of a leaf row in the row tree
    pub row_depth: usize,
    pub column_paths: &'a [String],
    pub row_pivots: &'a [String],
    pub sort: &'a [SortEntry],
    pub schema: &'a Schema,
    pub viewport: Viewport,
    pub measure: &'a dyn Measure,
}

/// Owns the table node tree and the state that outlives a single draw.
#[derive(Debug, Default)]
pub struct TableRenderer {
    table: TableNode,
    pinned: PinnedWidths,
    formatters: FormatterCache,
    /// One entry per column the current pass has drawn so far
    column_widths: Vec<f64>,
    /// Header progress of the current pass
    cursor: HeaderCursor,
}

impl TableRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer writing numeric cells with `format`.
    pub fn with_number_format(format: NumberFormat) -> Self {
        Self {
            formatters: FormatterCache::new(format),
            ..Self::default()
        }
    }

    pub const fn table(&self) -> &TableNode {
        &self.table
    }

    pub const fn pinned(&self) -> &PinnedWidths {
        &self.pinned
    }

    /// Measured width of each column drawn by the last pass, left to right.
    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    /// Total measured width of the last pass.
    pub fn table_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    /// Cells in the leaf header row; the rendered column count.
    pub fn num_columns(&self) -> usize {
        let head = self.table.head();
        head.num_rows()
            .checked_sub(1)
            .and_then(|last| head.row(last))
            .map_or(0, |row| row.cells().len())
    }

    pub fn header_rows(&self) -> usize {
        self.table.head().num_rows()
    }

    /// Content mutations since the last call.
    pub fn take_updates(&mut self) -> usize {
        self.table.take_updates()
    }

    /// Draw one viewport. Whatever happens after the page fetch, rows and
    /// cells past the progress made are trimmed before returning.
    ///
    /// If the future is dropped part way, [`TableRenderer::clean`] trims to
    /// the progress recorded so far.
    pub async fn draw<D: DataSource>(&mut self, source: &D, ctx: &DrawContext<'_>) -> Result<()> {
        let mut page = source.fetch_page(&ctx.viewport).await?;
        trace!(viewport = ?ctx.viewport, columns = page.len(), "fetched page");

        self.column_widths.clear();
        self.cursor = HeaderCursor::new();
        let result = self.draw_columns(source, ctx, &mut page).await;
        self.clean();
        result
    }

    /// Trim header and body cells past the progress of the last pass.
    /// Idempotent.
    pub fn clean(&mut self) {
        self.table
            .body
            .trim_columns(ColumnTrim::Uniform(self.column_widths.len()));
        HeaderRenderer::new(&mut self.table.head, &self.pinned).clean(&self.cursor);
    }

    async fn draw_columns<D: DataSource>(
        &mut self,
        source: &D,
        ctx: &DrawContext<'_>,
        page: &mut ColumnPage,
    ) -> Result<()> {
        let mut width = 0.0;
        let pivoted = ctx
            .column_paths
            .first()
            .is_some_and(|path| path == ROW_PATH_COLUMN);

        if pivoted {
            let alias = ctx.row_pivots.join(",");
            let data = page
                .get(ROW_PATH_COLUMN)
                .ok_or_else(|| missing_column(ROW_PATH_COLUMN, page))?;
            let header = HeaderColumn {
                path: "",
                alias: Some(&alias),
                column_type: None,
            };
            width += self.draw_column(ctx, &header, data);
        }

        let data_columns = if pivoted {
            ctx.column_paths.get(1..).unwrap_or_default()
        } else {
            ctx.column_paths
        };
        let mut fetch = ctx.viewport;
        for path in data_columns.iter().skip(ctx.viewport.start_col) {
            if !page.contains(path) {
                fetch.start_col = fetch.end_col;
                fetch.end_col = fetch.start_col + 1;
                debug!(column = %path, viewport = ?fetch, "fetching missing column");
                let mut extra = source.fetch_page(&fetch).await?;
                let values = extra
                    .remove(path)
                    .ok_or_else(|| missing_column(path, &extra))?;
                page.insert(path.clone(), values);
            }
            let data = page.get(path).unwrap_or_default();
            let header = HeaderColumn {
                path,
                alias: None,
                column_type: column_path_type(ctx.schema, path),
            };
            width += self.draw_column(ctx, &header, data);
            if width > ctx.container_width {
                break;
            }
        }
        Ok(())
    }

    /// Draw header and body for the next column; returns its measured width.
    fn draw_column(
        &mut self,
        ctx: &DrawContext<'_>,
        header: &HeaderColumn<'_>,
        data: &[Value],
    ) -> f64 {
        let cidx = self.column_widths.len();
        let leaf = HeaderRenderer::new(&mut self.table.head, &self.pinned).draw(
            ctx.header_depth,
            header,
            ctx.sort,
            &mut self.cursor,
        );
        let header_width = leaf
            .and_then(|(row, cell)| self.table.head().cell(row, cell))
            .map_or(0.0, |th| ctx.measure.cell_width(th));

        let progress = BodyRenderer::new(
            &mut self.table.body,
            &mut self.pinned,
            &mut self.formatters,
            ctx.measure,
        )
        .draw(
            ctx.container_height,
            ctx.row_height,
            cidx,
            &BodyColumn {
                name: header.display_name(),
                column_type: header.column_type,
                data,
                row_depth: ctx.row_depth,
                header_width,
            },
            ctx.viewport.start_row,
        );
        self.column_widths.push(progress.width);
        progress.width
    }
}

fn missing_column(column: &str, page: &ColumnPage) -> DatagridError {
    DatagridError::MissingColumn {
        column: column.to_string(),
        available: page.column_names(),
    }
}
