//! datagrid - virtual-scroll datagrid engine
//!
//! Renders a window of a large, possibly hierarchical table into a small,
//! recycled tree of table nodes:
//! - Viewport math from scroll offsets and a virtual panel
//! - Header rows with merged group cells for column pivots
//! - Tree row headers with expand/collapse for row pivots
//! - Equality short-circuiting so unchanged cells are never touched
//! - Single-flight, latest-wins draw scheduling over an async data source
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use datagrid::{Datagrid, GridOptions, MemorySource, ColumnType, Value};
//!
//! # async fn run() -> datagrid::error::Result<()> {
//! let mut source = MemorySource::new(vec![("n".into(), ColumnType::Integer)]);
//! source.push_row(vec![Value::Int(1)]);
//! let grid = Datagrid::new(source, GridOptions::default()).with_size(400.0, 200.0);
//! grid.load().await?;
//! println!("{}", grid.to_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { DatagridView } from 'datagrid';
//! await init();
//! const grid = new DatagridView(view, undefined, 800, 600);
//! grid.set_event_callback(e => console.log(e.type));
//! await grid.load();
//! container.innerHTML = grid.html();
//! ```

pub mod error;
pub mod layout;
pub mod render;
pub mod source;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export the main controller
pub use viewer::{ClickAction, ClickTarget, Datagrid, DrawOutcome, DrawStats, GridEvent, Section};

pub use error::{DatagridError, Result};
pub use layout::Viewport;
pub use render::TableNode;
pub use source::{ColumnPage, DataSource, MemorySource, Schema};
pub use types::*;

/// Render delimited text (CSV, or TSV when `tsv` is set) through a grid of
/// the given size and return the HTML of the first page.
///
/// # Errors
/// Returns an error if the text cannot be parsed or the draw fails.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn render_delimited(
    data: Vec<u8>,
    tsv: bool,
    width: f64,
    height: f64,
) -> std::result::Result<String, JsValue> {
    let delim = if tsv {
        source::Delimiter::Tab
    } else {
        source::Delimiter::Comma
    };
    let source = source::parse_delimited(&data, delim)?;
    let grid = Datagrid::new(source, GridOptions::default()).with_size(width, height);
    grid.load().await?;
    Ok(grid.to_html().unwrap_or_default())
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
