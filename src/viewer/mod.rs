//! Main `Datagrid` struct - the controller hosts drive.
//!
//! This module provides the `Datagrid` controller that handles:
//! - Computing the viewport from the scroll container on every draw
//! - Single-flight draw scheduling with latest-request-wins coalescing
//! - Double buffering and lifecycle notifications around each draw
//! - Click routing to tree toggles and header sorting
//!
//! A grid is single-threaded: every entry point takes `&self` and draws are
//! futures awaited on one thread. State touched by a draw is checked out for
//! its duration, so no `RefCell` borrow is held across a suspension point.

mod events;
#[cfg(target_arch = "wasm32")]
mod js;
mod scheduler;
mod scroll;

use std::cell::{Cell, RefCell};

use serde::Serialize;
use tracing::{debug, trace, warn};

pub use events::{CellPart, ClickAction, ClickTarget, Section};
#[cfg(target_arch = "wasm32")]
pub use js::DatagridView;
pub use scheduler::{DrawRequest, DrawScheduler};
pub use scroll::ScrollContainer;

use crate::error::{DatagridError, Result};
use crate::layout::{
    column_range, row_range, to_f64, ColumnRangeInput, RowRangeInput, Viewport, ViewportTracker,
};
use crate::render::{
    CellMetadata, DoubleBuffer, DrawContext, Measure, Mount, TableNode, TableRenderer,
};
use crate::source::{DataSource, ROW_PATH_COLUMN};
use crate::types::{GridOptions, SortEntry};
use scheduler::IdleOnDrop;

/// Notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A draw is about to mutate the table; `staged` when it runs off-screen
    BeforeUpdate { staged: bool },
    /// The redrawn table is visible again
    AfterUpdate { staged: bool },
    /// A scroll-triggered draw finished
    Scroll,
    /// A header click produced a new sort spec for the host to apply
    SortChanged(Vec<SortEntry>),
}

/// What a call to [`Datagrid::draw`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawOutcome {
    /// The table was redrawn
    Drawn,
    /// Nothing to do: viewport unchanged and not forced, or no rows
    Unchanged,
    /// The data source could not describe the data; previous content kept
    Skipped,
    /// Another draw was in flight; this request was folded into it
    Coalesced,
    /// The grid is detached
    Detached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawStats {
    /// Draw passes that reached the table renderer
    pub draws: u64,
    pub coalesced: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Cell content mutations across all passes
    pub cell_updates: u64,
}

type Listener = Box<dyn FnMut(&GridEvent)>;

#[derive(Debug, Default)]
struct ViewState {
    tracker: ViewportTracker,
    /// Row count of the previous draw
    nrows: Option<usize>,
}

/// Renderer taken out of its slot for the duration of a draw. On drop, also
/// when the draw future is abandoned, the renderer is returned and a staged
/// draw is swapped back in. A pass that never finished is trimmed to its
/// progress and its viewport forgotten.
struct Checkout<'a> {
    slot: &'a RefCell<Option<TableRenderer>>,
    buffer: &'a RefCell<DoubleBuffer>,
    view: &'a RefCell<ViewState>,
    renderer: TableRenderer,
    finished: bool,
}

impl<'a> Checkout<'a> {
    fn take(
        slot: &'a RefCell<Option<TableRenderer>>,
        buffer: &'a RefCell<DoubleBuffer>,
        view: &'a RefCell<ViewState>,
    ) -> Option<Self> {
        let renderer = slot.borrow_mut().take()?;
        Some(Self {
            slot,
            buffer,
            view,
            renderer,
            finished: false,
        })
    }
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("draw abandoned, trimming to its progress");
            self.renderer.clean();
            self.view.borrow_mut().tracker.reset();
        }
        *self.slot.borrow_mut() = Some(std::mem::take(&mut self.renderer));
        self.buffer.borrow_mut().swap_out();
    }
}

/// Virtual-scroll datagrid over a [`DataSource`].
pub struct Datagrid<D> {
    source: D,
    options: GridOptions,
    measure: Box<dyn Measure>,
    scroll: RefCell<ScrollContainer>,
    view: RefCell<ViewState>,
    /// `None` while a draw has the renderer checked out
    renderer: RefCell<Option<TableRenderer>>,
    buffer: RefCell<DoubleBuffer>,
    scheduler: DrawScheduler,
    listeners: RefCell<Vec<Listener>>,
    stats: Cell<DrawStats>,
}

impl<D: DataSource> Datagrid<D> {
    /// Create an attached grid with a zero-sized container; call
    /// [`Datagrid::resize`] before the first draw.
    pub fn new(source: D, options: GridOptions) -> Self {
        let mut buffer = DoubleBuffer::new(options.double_buffer);
        buffer.attach();
        let renderer = TableRenderer::with_number_format(options.number_format);
        Self {
            source,
            measure: Box::new(options.measure),
            options,
            scroll: RefCell::new(ScrollContainer::default()),
            view: RefCell::new(ViewState::default()),
            renderer: RefCell::new(Some(renderer)),
            buffer: RefCell::new(buffer),
            scheduler: DrawScheduler::new(),
            listeners: RefCell::new(Vec::new()),
            stats: Cell::new(DrawStats::default()),
        }
    }

    /// Replace the text-based width estimate, e.g. with real layout
    /// measurements from a browser host.
    #[must_use]
    pub fn with_measure(mut self, measure: impl Measure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Set the container size without drawing.
    #[must_use]
    pub fn with_size(self, width: f64, height: f64) -> Self {
        self.scroll.borrow_mut().resize(width, height);
        self
    }

    pub const fn source(&self) -> &D {
        &self.source
    }

    pub const fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn stats(&self) -> DrawStats {
        self.stats.get()
    }

    pub fn is_drawing(&self) -> bool {
        self.scheduler.is_drawing()
    }

    /// Register a listener for [`GridEvent`]s.
    pub fn subscribe(&self, listener: impl FnMut(&GridEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub(crate) fn emit(&self, event: &GridEvent) {
        // Listeners may subscribe more listeners while being called
        let mut listeners = self.listeners.take();
        for listener in &mut listeners {
            listener(event);
        }
        let mut slot = self.listeners.borrow_mut();
        listeners.append(&mut *slot);
        *slot = listeners;
    }

    fn bump(&self, f: impl FnOnce(&mut DrawStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn with_renderer<R>(&self, f: impl FnOnce(&TableRenderer) -> R) -> Option<R> {
        self.renderer.borrow().as_ref().map(f)
    }

    /// Draw the current viewport.
    ///
    /// `force` redraws even when the viewport is unchanged; `preserve_scroll`
    /// keeps the previous row count as the scroll anchor. While a draw is in
    /// flight, further calls return [`DrawOutcome::Coalesced`] immediately and
    /// the latest of them runs once the current draw finishes.
    pub async fn draw(&self, force: bool, preserve_scroll: bool) -> Result<DrawOutcome> {
        let Some(mut request) = self
            .scheduler
            .begin(DrawRequest::new(force, preserve_scroll))
        else {
            self.bump(|s| s.coalesced += 1);
            debug!(force, "draw coalesced into the running draw");
            return Ok(DrawOutcome::Coalesced);
        };
        let _idle = IdleOnDrop(&self.scheduler);
        loop {
            let result = self.draw_pass(request).await;
            let Some(next) = self.scheduler.finish() else {
                return result;
            };
            if let Err(e) = &result {
                warn!(error = %e, "draw failed, running the pending draw");
            }
            request = next;
        }
    }

    fn skip(&self, what: &str, error: &DatagridError) -> DrawOutcome {
        warn!(error = %error, "{what} unavailable, skipping draw");
        self.bump(|s| s.skipped += 1);
        DrawOutcome::Skipped
    }

    async fn draw_pass(&self, request: DrawRequest) -> Result<DrawOutcome> {
        if !self.is_attached() {
            debug!("grid detached, not drawing");
            return Ok(DrawOutcome::Detached);
        }
        let config = self.source.config().await?;
        let row_count = match self.source.row_count().await {
            Ok(n) => n,
            Err(e) => return Ok(self.skip("row count", &e)),
        };

        let row_height = self.options.row_height_px;
        let header_rows = self
            .with_renderer(TableRenderer::header_rows)
            .unwrap_or(0);
        let container = self.scroll_container();
        let anchor_rows = if request.preserve_scroll {
            self.view.borrow().nrows
        } else {
            None
        };
        let (start_row, end_row) = row_range(&RowRangeInput {
            container_height: container.height(),
            scroll_top: container.scroll_top(),
            virtual_height: container.virtual_height(),
            row_count,
            header_rows,
            row_height,
            anchor_rows,
        });
        self.view.borrow_mut().nrows = Some(row_count);
        let virtual_height = (to_f64(row_count + header_rows) * row_height)
            .min(self.options.max_virtual_height_px);
        self.scroll.borrow_mut().set_virtual_height(virtual_height);
        if row_count == 0 {
            return Ok(DrawOutcome::Unchanged);
        }

        let column_paths = match self.source.column_paths().await {
            Ok(paths) => paths,
            Err(e) => return Ok(self.skip("column paths", &e)),
        };
        let schema = match self.source.schema().await {
            Ok(schema) => schema,
            Err(e) => return Ok(self.skip("schema", &e)),
        };

        let pivoted = column_paths.first().is_some_and(|p| p == ROW_PATH_COLUMN);
        let rendered_columns = self
            .with_renderer(TableRenderer::num_columns)
            .unwrap_or(0);
        let (start_col, end_col) = column_range(&ColumnRangeInput {
            container_width: container.width(),
            scroll_left: container.scroll_left(),
            virtual_width: container.virtual_width().unwrap_or(container.width()),
            column_count: column_paths.len() - usize::from(pivoted),
            rendered_columns,
        });
        let viewport = Viewport {
            start_row,
            end_row,
            start_col,
            end_col,
        };
        let invalidation = self.view.borrow_mut().tracker.validate(viewport);
        if !(request.force || invalidation.any()) {
            trace!(?viewport, "viewport unchanged");
            return Ok(DrawOutcome::Unchanged);
        }

        let Some(mut checkout) = Checkout::take(&self.renderer, &self.buffer, &self.view) else {
            return Ok(self.skip("table", &DatagridError::Other("table in use".into())));
        };
        let renderer = &mut checkout.renderer;
        let staged =
            self.buffer
                .borrow_mut()
                .swap_in(renderer.table(), invalidation, request.force);
        self.emit(&GridEvent::BeforeUpdate { staged });
        debug!(?viewport, force = request.force, staged, "drawing");

        let ctx = DrawContext {
            container_width: container.width(),
            container_height: container.height(),
            row_height,
            header_depth: config.header_depth(),
            row_depth: config.row_depth(),
            column_paths: &column_paths,
            row_pivots: &config.row_pivots,
            sort: &config.sort,
            schema: &schema,
            viewport,
            measure: self.measure.as_ref(),
        };
        let result = renderer.draw(&self.source, &ctx).await;
        checkout.finished = true;
        let renderer = &mut checkout.renderer;
        let updates = renderer.take_updates();
        let num_columns = renderer.num_columns();
        let table_width = renderer.table_width();
        drop(checkout);
        self.emit(&GridEvent::AfterUpdate { staged });

        let updates = u64::try_from(updates).unwrap_or(u64::MAX);
        self.bump(|s| {
            s.draws += 1;
            s.cell_updates += updates;
        });
        match result {
            Ok(()) => {
                self.update_virtual_width(
                    request.force,
                    container.width(),
                    num_columns,
                    table_width,
                    column_paths.len(),
                );
                Ok(DrawOutcome::Drawn)
            }
            Err(e) => {
                self.view.borrow_mut().tracker.reset();
                self.bump(|s| s.failed += 1);
                Err(e)
            }
        }
    }

    /// Size the virtual panel horizontally from the average drawn column
    /// width, on forced draws or when it has never been sized.
    fn update_virtual_width(
        &self,
        force: bool,
        container_width: f64,
        num_columns: usize,
        table_width: f64,
        column_count: usize,
    ) {
        let mut scroll = self.scroll.borrow_mut();
        if (!force && scroll.virtual_width().is_some()) || num_columns == 0 {
            return;
        }
        let per_column = container_width / to_f64(num_columns);
        scroll.set_virtual_width(table_width.max(per_column * to_f64(column_count)));
    }

    /// New container size: cached dimensions and the drawn viewport are
    /// invalidated, then the grid redraws.
    pub async fn resize(&self, width: f64, height: f64) -> Result<DrawOutcome> {
        self.scroll.borrow_mut().resize(width, height);
        {
            let mut view = self.view.borrow_mut();
            view.nrows = None;
            view.tracker.reset();
        }
        self.draw(false, false).await
    }

    /// (Re)load the data source. An attached grid redraws from scratch; a
    /// detached one is cleared, reattached and drawn normally.
    pub async fn load(&self) -> Result<DrawOutcome> {
        let force = {
            let mut buffer = self.buffer.borrow_mut();
            if buffer.is_attached() {
                true
            } else {
                buffer.clear();
                false
            }
        };
        self.reset_scroll();
        self.draw(force, false).await
    }

    /// Forced redraw keeping the scroll anchor. Failures are logged, not
    /// returned.
    pub async fn update(&self) {
        if let Err(e) = self.draw(true, true).await {
            warn!(error = %e, "datagrid update failed");
        }
    }

    pub fn attach(&self) {
        self.buffer.borrow_mut().attach();
    }

    pub fn detach(&self) {
        self.buffer.borrow_mut().detach();
    }

    /// Show an empty placeholder until the next draw.
    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }

    pub fn is_attached(&self) -> bool {
        self.buffer.borrow().is_attached()
    }

    /// What the visible slot shows.
    pub fn mount(&self) -> Mount {
        self.buffer.borrow().mount().clone()
    }

    /// Viewport of the last draw, if it is still valid.
    pub fn viewport(&self) -> Option<Viewport> {
        self.view.borrow().tracker.last()
    }

    /// Run `f` on the live table. `None` while a draw is in flight.
    pub fn with_table<R>(&self, f: impl FnOnce(&TableNode) -> R) -> Option<R> {
        self.with_renderer(|r| f(r.table()))
    }

    /// Copy of what is on screen: the live table, or the snapshot standing
    /// in for it while a staged draw runs.
    pub fn visible_table(&self) -> Option<TableNode> {
        match self.buffer.borrow().mount() {
            Mount::Live => self.with_table(TableNode::clone),
            Mount::Snapshot(snapshot) => Some(TableNode::clone(snapshot)),
            Mount::Empty | Mount::Placeholder => None,
        }
    }

    pub fn cell_metadata(&self, section: Section, row: usize, column: usize) -> Option<CellMetadata> {
        self.with_table(|t| {
            section
                .pool(t)
                .cell(row, column)
                .map(|c| c.metadata().clone())
        })
        .flatten()
    }

    /// Metadata of every body cell, row by row.
    pub fn body_cells(&self) -> Vec<CellMetadata> {
        self.section_cells(Section::Body)
    }

    pub fn header_cells(&self) -> Vec<CellMetadata> {
        self.section_cells(Section::Header)
    }

    fn section_cells(&self, section: Section) -> Vec<CellMetadata> {
        self.with_table(|t| section.pool(t).cells().map(|c| c.metadata().clone()).collect())
            .unwrap_or_default()
    }

    /// Measured widths of the columns drawn by the last pass.
    pub fn column_widths(&self) -> Vec<f64> {
        self.with_renderer(|r| r.column_widths().to_vec())
            .unwrap_or_default()
    }

    /// HTML of the visible table.
    pub fn to_html(&self) -> Option<String> {
        self.visible_table().map(|t| t.to_html())
    }

    pub fn to_text(&self) -> Option<String> {
        self.visible_table().map(|t| t.to_text())
    }
}
