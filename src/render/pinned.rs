//! Remembered column widths.
//!
//! Every body draw records the measured width of the column it drew, keyed
//! by `"<column path>|<type>"`. Header cells use the remembered width as a
//! minimum width so the column keeps its size on the next draw, before its
//! data has been fetched. Entries accumulate for the lifetime of the table.

use std::collections::HashMap;

use crate::types::{type_name, ColumnType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinnedWidths {
    widths: HashMap<String, f64>,
}

impl PinnedWidths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(column: &str, column_type: Option<ColumnType>) -> String {
        format!("{column}|{}", type_name(column_type))
    }

    pub fn get(&self, column: &str, column_type: Option<ColumnType>) -> Option<f64> {
        self.widths.get(&Self::key(column, column_type)).copied()
    }

    pub fn set(&mut self, column: &str, column_type: Option<ColumnType>, width: f64) {
        self.widths.insert(Self::key(column, column_type), width);
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}
