//! Click handling for `Datagrid`: hit testing, tree toggles and header sort
//! cycling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Datagrid, DrawOutcome, GridEvent};
use crate::error::Result;
use crate::layout::{floor_index, to_f64};
use crate::render::{CellMetadata, NodePool, TableNode};
use crate::source::DataSource;
use crate::types::{Modifiers, SortDirection, SortEntry};

/// Table section a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Header,
    Body,
}

impl Section {
    pub const fn pool(self, table: &TableNode) -> &NodePool {
        match self {
            Self::Header => table.head(),
            Self::Body => table.body(),
        }
    }
}

/// Part of a cell under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPart {
    Content,
    /// The tree expand/collapse icon
    ToggleIcon,
}

/// Result of a hit test: what a click at a point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickTarget {
    /// Outside every cell of the table
    Outside,
    Cell {
        section: Section,
        row: usize,
        /// Cell index within its row (group cells span several columns)
        column: usize,
        part: CellPart,
    },
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    Ignored,
    /// A tree node was expanded or collapsed and the grid redrawn
    Toggled(DrawOutcome),
    /// A new sort spec was published
    Sorted(Vec<SortEntry>),
}

impl<D: DataSource> Datagrid<D> {
    /// Map a point in container pixels to the cell under it.
    pub fn hit_test(&self, x: f64, y: f64) -> ClickTarget {
        let guard = self.renderer.borrow();
        let Some(renderer) = guard.as_ref() else {
            return ClickTarget::Outside;
        };
        if x < 0.0 || y < 0.0 {
            return ClickTarget::Outside;
        }
        let table = renderer.table();
        let row_height = self.options.row_height_px;

        let mut left = 0.0;
        let mut hit = None;
        for (column, width) in renderer.column_widths().iter().enumerate() {
            if x < left + width {
                hit = Some((column, x - left));
                break;
            }
            left += width;
        }
        let Some((leaf, offset)) = hit else {
            return ClickTarget::Outside;
        };

        let header_height = to_f64(table.head().num_rows()) * row_height;
        if y < header_height {
            let row = floor_index(y / row_height);
            let Some(cells) = table.head().row(row).map(|r| r.cells()) else {
                return ClickTarget::Outside;
            };
            let mut span_start = 0;
            for (column, cell) in cells.iter().enumerate() {
                span_start += cell.colspan();
                if leaf < span_start {
                    return ClickTarget::Cell {
                        section: Section::Header,
                        row,
                        column,
                        part: CellPart::Content,
                    };
                }
            }
            return ClickTarget::Outside;
        }

        let row = floor_index((y - header_height) / row_height);
        let Some(cell) = table.body().cell(row, leaf) else {
            return ClickTarget::Outside;
        };
        let on_icon = self
            .measure
            .toggle_bounds(cell)
            .is_some_and(|(start, end)| offset >= start && offset < end);
        ClickTarget::Cell {
            section: Section::Body,
            row,
            column: leaf,
            part: if on_icon {
                CellPart::ToggleIcon
            } else {
                CellPart::Content
            },
        }
    }

    /// Route a click. The toggle icon of a tree cell expands or collapses
    /// its node; a leaf column header cycles that column's sort.
    pub async fn on_click(&self, target: ClickTarget, modifiers: Modifiers) -> Result<ClickAction> {
        let ClickTarget::Cell {
            section,
            row,
            column,
            part,
        } = target
        else {
            return Ok(ClickAction::Ignored);
        };
        let cell = self
            .with_table(|t| {
                section
                    .pool(t)
                    .cell(row, column)
                    .map(|c| (c.metadata().clone(), c.has_toggle()))
            })
            .flatten();
        let Some((metadata, has_toggle)) = cell else {
            debug!(?target, "click ignored, no cell (or a draw is in flight)");
            return Ok(ClickAction::Ignored);
        };

        if section == Section::Body && part == CellPart::ToggleIcon && has_toggle {
            let outcome = self.on_toggle(&metadata, modifiers).await?;
            return Ok(ClickAction::Toggled(outcome));
        }
        if metadata.is_column_header {
            let sorted = self.on_sort(&metadata, modifiers).await?;
            return Ok(sorted.map_or(ClickAction::Ignored, ClickAction::Sorted));
        }
        Ok(ClickAction::Ignored)
    }

    /// Expand or collapse the tree node of a row header cell, then redraw
    /// keeping the scroll anchor. With shift the whole tree is set to the
    /// node's depth instead.
    pub async fn on_toggle(&self, metadata: &CellMetadata, modifiers: Modifiers) -> Result<DrawOutcome> {
        let depth = metadata.row_path.as_ref().map_or(0, Vec::len);
        match (metadata.is_open, metadata.ridx) {
            (Some(true), Some(ridx)) => {
                if modifiers.shift {
                    self.source.set_depth(depth.saturating_sub(1)).await?;
                } else {
                    self.source.collapse(ridx).await?;
                }
            }
            (Some(false), Some(ridx)) => {
                if modifiers.shift {
                    self.source.set_depth(depth).await?;
                } else {
                    self.source.expand(ridx).await?;
                }
            }
            _ => {}
        }
        self.draw(true, true).await
    }

    /// Compute the sort spec after clicking a column header and publish it
    /// as [`GridEvent::SortChanged`]. The host applies it to the data source.
    ///
    /// A sorted column cycles to its next direction (alt for absolute
    /// values) and drops out at `none`. An unsorted column becomes the only
    /// sort, or is appended with shift. Returns `None` for the row-path
    /// header, which is not sortable.
    pub async fn on_sort(
        &self,
        metadata: &CellMetadata,
        modifiers: Modifiers,
    ) -> Result<Option<Vec<SortEntry>>> {
        let (Some(name), Some(_)) = (metadata.column_name.as_deref(), metadata.column_type) else {
            return Ok(None);
        };
        let config = self.source.config().await?;
        let column_sorting = !config.column_pivots.is_empty();
        let mut sort = config.sort;

        if let Some(idx) = sort.iter().position(|entry| entry.column() == name) {
            let next = sort
                .get(idx)
                .map_or(SortDirection::None, |entry| {
                    entry.direction().increment(column_sorting, modifiers.alt)
                });
            if next == SortDirection::None {
                sort.remove(idx);
            } else if let Some(entry) = sort.get_mut(idx) {
                entry.1 = next;
            }
        } else {
            let direction = if modifiers.alt {
                SortDirection::AscAbs
            } else {
                SortDirection::Asc
            };
            let entry = SortEntry::new(name, direction);
            if modifiers.shift {
                sort.push(entry);
            } else {
                sort = vec![entry];
            }
        }

        debug!(?sort, "sort changed");
        self.emit(&GridEvent::SortChanged(sort.clone()));
        Ok(Some(sort))
    }
}
