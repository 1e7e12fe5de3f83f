//! Body renderer: leaf data cells for one column across the row window.

use super::cache::FormatterCache;
use super::format::Formatter;
use super::measure::Measure;
use super::node::{CellContent, CellNode, RenderKey, Toggle, GROUP_HEADER_CLASS};
use super::pinned::PinnedWidths;
use super::pool::NodePool;
use crate::types::{type_name, ColumnType, Value};

/// Placeholder text of a null cell.
pub const NULL_PLACEHOLDER: &str = "-";

/// Label of the root row of a row-path tree.
pub const TOTAL_LABEL: &str = "TOTAL";

/// One column of fetched data as seen by the body renderer.
#[derive(Debug, Clone, Copy)]
pub struct BodyColumn<'a> {
    /// Display name, used for metadata and the pinned-width key
    pub name: &'a str,
    pub column_type: Option<ColumnType>,
    pub data: &'a [Value],
    /// Path length of a leaf row in the row tree
    pub row_depth: usize,
    /// Measured width of the column's leaf header cell
    pub header_width: f64,
}

/// Result of drawing one body column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyProgress {
    /// Measured column width
    pub width: f64,
    pub column: usize,
    /// Rows drawn before the height cutoff
    pub rows: usize,
}

/// Draws data cells into the `<tbody>` node pool.
pub struct BodyRenderer<'a> {
    pool: &'a mut NodePool,
    pinned: &'a mut PinnedWidths,
    formatters: &'a mut FormatterCache,
    measure: &'a dyn Measure,
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(n: usize) -> f64 {
    n as f64
}

impl<'a> BodyRenderer<'a> {
    pub fn new(
        pool: &'a mut NodePool,
        pinned: &'a mut PinnedWidths,
        formatters: &'a mut FormatterCache,
        measure: &'a dyn Measure,
    ) -> Self {
        Self {
            pool,
            pinned,
            formatters,
            measure,
        }
    }

    /// Draw `column` into cell slot `column_index` of each row, stopping once
    /// the drawn rows exceed `container_height`. Rows past the cutoff are
    /// trimmed and the measured width is pinned for later draws.
    pub fn draw(
        &mut self,
        container_height: f64,
        row_height: f64,
        column_index: usize,
        column: &BodyColumn<'_>,
        row_offset: usize,
    ) -> BodyProgress {
        let formatter = self.formatters.get(column.column_type);
        let mut width = column.header_width;
        let mut rows = 0;
        for (ridx, value) in column.data.iter().enumerate() {
            let next = column.data.get(ridx + 1);
            let is_open = match (next.and_then(Value::path_len), value.path_len()) {
                (Some(next_len), Some(len)) => next_len > len,
                _ => false,
            };
            let cell_width = self.draw_td(
                ridx,
                column_index,
                value,
                is_open,
                formatter,
                column,
                row_offset,
            );
            width = width.max(cell_width);
            rows = ridx + 1;
            if to_f64(rows) * row_height > container_height {
                break;
            }
        }
        self.pool.trim_rows(rows);
        self.pinned.set(column.name, column.column_type, width);
        BodyProgress {
            width,
            column: column_index,
            rows,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_td(
        &mut self,
        ridx: usize,
        cidx: usize,
        value: &Value,
        is_open: bool,
        formatter: Formatter,
        column: &BodyColumn<'_>,
        row_offset: usize,
    ) -> f64 {
        let td = self.pool.get_or_create_cell(ridx, cidx);
        td.metadata.ridx = Some(ridx + row_offset);
        td.metadata.is_column_header = false;
        td.metadata.column_type = column.column_type;
        if td.metadata.column_path.as_deref() != Some(column.name) {
            td.metadata.column_path = Some(column.name.to_string());
            td.metadata.column_name = column.name.rsplit('|').next().map(str::to_string);
        }

        let unchanged = td.rendered.as_ref().is_some_and(|key| {
            key.value == *value
                && key.column_type == column.column_type
                && key.is_open == is_open
                && key.row_depth == column.row_depth
        });
        if !unchanged {
            render_value(td, formatter, value, is_open, column);
            td.rendered = Some(RenderKey {
                value: value.clone(),
                column_type: column.column_type,
                is_open,
                row_depth: column.row_depth,
            });
        }
        let width = self.measure.cell_width(td);
        if !unchanged {
            self.pool.record_update();
        }
        width
    }
}

fn render_value(
    td: &mut CellNode,
    formatter: Formatter,
    value: &Value,
    is_open: bool,
    column: &BodyColumn<'_>,
) {
    td.classes.clear();
    td.min_width = None;
    match (value, formatter) {
        (Value::Null, _) => {
            td.add_class(type_name(column.column_type));
            td.content = CellContent::Text(NULL_PLACEHOLDER.to_string());
            td.metadata.value = None;
            td.metadata.row_path = None;
            td.metadata.is_open = None;
        }
        (Value::Path(path), Formatter::Tree) => {
            let is_leaf = path.len() == column.row_depth;
            let label = path.last().map_or(TOTAL_LABEL, String::as_str);
            td.add_class(GROUP_HEADER_CLASS);
            td.content = CellContent::Tree {
                depth: path.len(),
                label: label.to_string(),
                toggle: match (is_leaf, is_open) {
                    (true, _) => None,
                    (false, true) => Some(Toggle::Open),
                    (false, false) => Some(Toggle::Closed),
                },
            };
            td.metadata.value = path.last().map(|s| Value::Text(s.clone()));
            td.metadata.row_path = Some(path.clone());
            td.metadata.is_open = (!is_leaf).then_some(is_open);
        }
        (value, formatter) => {
            td.add_class(type_name(column.column_type));
            td.content = CellContent::Text(formatter.format(value));
            td.metadata.value = Some(value.clone());
            td.metadata.row_path = None;
            td.metadata.is_open = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::render::measure::TextMeasure;
    use crate::render::node::CellTag;

    struct Fixture {
        pool: NodePool,
        pinned: PinnedWidths,
        formatters: FormatterCache,
        measure: TextMeasure,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pool: NodePool::new(CellTag::Td),
                pinned: PinnedWidths::new(),
                formatters: FormatterCache::default(),
                measure: TextMeasure::default(),
            }
        }

        fn draw(&mut self, height: f64, column: &BodyColumn<'_>, offset: usize) -> BodyProgress {
            BodyRenderer::new(
                &mut self.pool,
                &mut self.pinned,
                &mut self.formatters,
                &self.measure,
            )
            .draw(height, 19.0, 0, column, offset)
        }
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Int(*v)).collect()
    }

    fn path(parts: &[&str]) -> Value {
        Value::Path(parts.iter().map(|s| (*s).to_string()).collect())
    }

    fn int_column(data: &[Value]) -> BodyColumn<'_> {
        BodyColumn {
            name: "n",
            column_type: Some(ColumnType::Integer),
            data,
            row_depth: 0,
            header_width: 0.0,
        }
    }

    #[test]
    fn test_height_cutoff() {
        let mut fx = Fixture::new();
        let data = ints(&(0..100).collect::<Vec<_>>());
        // 3 * 19 = 57 > 50 after the third row
        let progress = fx.draw(50.0, &int_column(&data), 0);
        assert_eq!(progress.rows, 3);
        assert_eq!(fx.pool.num_rows(), 3);
    }

    #[test]
    fn test_unchanged_values_skip_updates() {
        let mut fx = Fixture::new();
        let data = ints(&[1, 2, 3]);
        fx.draw(1000.0, &int_column(&data), 0);
        assert_eq!(fx.pool.take_updates(), 3);

        fx.draw(1000.0, &int_column(&data), 0);
        assert_eq!(fx.pool.take_updates(), 0);

        let changed = ints(&[1, 5, 3]);
        fx.draw(1000.0, &int_column(&changed), 10);
        assert_eq!(fx.pool.take_updates(), 1);
        // row index follows the viewport even without a content update
        assert_eq!(fx.pool.cell(2, 0).unwrap().metadata().ridx, Some(12));
    }

    #[test]
    fn test_formatting_and_null() {
        let mut fx = Fixture::new();
        let data = vec![Value::Int(12345), Value::Null];
        fx.draw(1000.0, &int_column(&data), 0);
        let first = fx.pool.cell(0, 0).unwrap();
        assert_eq!(first.content().label(), "12,345");
        assert!(first.has_class("integer"));
        let null = fx.pool.cell(1, 0).unwrap();
        assert_eq!(null.content().label(), NULL_PLACEHOLDER);
        assert_eq!(null.metadata().value, None);
        assert_eq!(null.metadata().row_path, None);
    }

    #[test]
    fn test_tree_cells() {
        let mut fx = Fixture::new();
        let data = vec![
            path(&[]),
            path(&["East"]),
            path(&["East", "NY"]),
            path(&["West"]),
        ];
        let column = BodyColumn {
            name: "Region,State",
            column_type: None,
            data: &data,
            row_depth: 2,
            header_width: 0.0,
        };
        fx.draw(1000.0, &column, 5);

        let root = fx.pool.cell(0, 0).unwrap();
        assert_eq!(
            root.content(),
            &CellContent::Tree {
                depth: 0,
                label: TOTAL_LABEL.into(),
                toggle: Some(Toggle::Open),
            }
        );
        assert!(root.has_class(GROUP_HEADER_CLASS));

        let ny = fx.pool.cell(2, 0).unwrap();
        assert_eq!(ny.metadata().is_open, None);
        assert!(!ny.has_toggle());

        // next row is shallower, so "West" shows as closed
        let west = fx.pool.cell(3, 0).unwrap();
        assert_eq!(west.metadata().is_open, Some(false));
        assert_eq!(west.metadata().ridx, Some(8));
        assert_eq!(west.metadata().value, Some(Value::Text("West".into())));
        assert_eq!(
            west.metadata().row_path.as_deref(),
            Some(&["West".to_string()][..])
        );
    }

    #[test]
    fn test_row_depth_change_redraws_toggle() {
        let mut fx = Fixture::new();
        let data = vec![path(&["East"]), path(&["West"])];
        let mut column = BodyColumn {
            name: "Region",
            column_type: None,
            data: &data,
            row_depth: 1,
            header_width: 0.0,
        };
        fx.draw(1000.0, &column, 0);
        assert!(!fx.pool.cell(0, 0).unwrap().has_toggle());
        fx.pool.take_updates();

        // Same paths under a deeper tree: the rows are now closed groups
        column.row_depth = 2;
        fx.draw(1000.0, &column, 0);
        assert_eq!(fx.pool.take_updates(), 2);
        let east = fx.pool.cell(0, 0).unwrap();
        assert!(east.has_toggle());
        assert_eq!(east.metadata().is_open, Some(false));
    }

    #[test]
    fn test_pins_measured_width() {
        let mut fx = Fixture::new();
        let data = ints(&[1_000_000]);
        let progress = fx.draw(1000.0, &int_column(&data), 0);
        // "1,000,000" = 9 chars * 7 + 12 padding
        assert_eq!(progress.width, 75.0);
        assert_eq!(fx.pinned.get("n", Some(ColumnType::Integer)), Some(75.0));
    }

    #[test]
    fn test_empty_column() {
        let mut fx = Fixture::new();
        let mut column = int_column(&[]);
        column.header_width = 40.0;
        let progress = fx.draw(1000.0, &column, 0);
        assert_eq!(progress.rows, 0);
        assert_eq!(progress.width, 40.0);
    }
}
