//! Scroll-related logic for `Datagrid`.
//!
//! Includes the scroll container model (container size, scroll offsets and
//! the virtual panel that gives the scrollbars their range) and the scroll
//! entry points of the grid.

use tracing::trace;

use super::{Datagrid, DrawOutcome, GridEvent};
use crate::error::Result;
use crate::source::DataSource;

/// Scrollable container around the virtual panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollContainer {
    width: f64,
    height: f64,
    scroll_top: f64,
    scroll_left: f64,
    virtual_width: Option<f64>,
    virtual_height: f64,
}

impl ScrollContainer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn height(&self) -> f64 {
        self.height
    }

    pub const fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub const fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Virtual panel width; `None` until the first successful draw sizes it.
    pub const fn virtual_width(&self) -> Option<f64> {
        self.virtual_width
    }

    pub const fn virtual_height(&self) -> f64 {
        self.virtual_height
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.virtual_height - self.height).max(0.0)
    }

    pub fn max_scroll_left(&self) -> f64 {
        (self.virtual_width.unwrap_or(self.width) - self.width).max(0.0)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    /// Set both offsets, clamped to the scrollable range. Returns whether
    /// either offset changed.
    #[allow(clippy::float_cmp)]
    pub fn set_scroll(&mut self, top: f64, left: f64) -> bool {
        let before = (self.scroll_top, self.scroll_left);
        self.scroll_top = top;
        self.scroll_left = left;
        self.clamp();
        before != (self.scroll_top, self.scroll_left)
    }

    /// Move by a delta, clamped. Returns the delta actually applied.
    pub fn scroll_by(&mut self, delta_x: f64, delta_y: f64) -> Option<(f64, f64)> {
        let (top, left) = (self.scroll_top, self.scroll_left);
        self.set_scroll(top + delta_y, left + delta_x)
            .then(|| (self.scroll_left - left, self.scroll_top - top))
    }

    pub fn reset(&mut self) {
        self.scroll_top = 0.0;
        self.scroll_left = 0.0;
    }

    pub fn set_virtual_height(&mut self, height: f64) {
        self.virtual_height = height;
        self.clamp();
    }

    pub fn set_virtual_width(&mut self, width: f64) {
        self.virtual_width = Some(width);
        self.clamp();
    }

    fn clamp(&mut self) {
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll_top());
        self.scroll_left = self.scroll_left.clamp(0.0, self.max_scroll_left());
    }
}

impl<D: DataSource> Datagrid<D> {
    /// Handle a native scroll event: redraw for the current offsets, then
    /// notify listeners.
    pub async fn on_scroll(&self) -> Result<DrawOutcome> {
        let outcome = self.draw(false, false).await;
        self.emit(&GridEvent::Scroll);
        outcome
    }

    /// Scroll to absolute offsets and redraw.
    pub async fn scroll_to(&self, top: f64, left: f64) -> Result<DrawOutcome> {
        self.scroll.borrow_mut().set_scroll(top, left);
        self.on_scroll().await
    }

    /// Handle a wheel event. The delta is applied to the scroll offsets
    /// before the draw starts, so the draw already sees the new position.
    pub async fn on_wheel(&self, delta_x: f64, delta_y: f64) -> Result<DrawOutcome> {
        let applied = self.scroll.borrow_mut().scroll_by(delta_x, delta_y);
        trace!(?applied, "wheel");
        self.on_scroll().await
    }

    /// Scroll back to the origin and forget the drawn viewport.
    pub fn reset_scroll(&self) {
        self.scroll.borrow_mut().reset();
        self.view.borrow_mut().tracker.reset();
    }

    /// Snapshot of the scroll container.
    pub fn scroll_container(&self) -> ScrollContainer {
        *self.scroll.borrow()
    }
}
