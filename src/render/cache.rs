//! Per-type formatter cache.
//!
//! Formatter construction is resolved once per column type for the lifetime
//! of a table; body draws look formatters up by type on every cell.

use std::collections::HashMap;

use super::format::Formatter;
use crate::types::{ColumnType, NumberFormat};

#[derive(Debug, Default)]
pub struct FormatterCache {
    format: NumberFormat,
    entries: HashMap<Option<ColumnType>, Formatter>,
}

impl FormatterCache {
    pub fn new(format: NumberFormat) -> Self {
        Self {
            format,
            entries: HashMap::new(),
        }
    }

    /// Formatter for `column_type`, built on first use.
    pub fn get(&mut self, column_type: Option<ColumnType>) -> Formatter {
        let format = self.format;
        *self
            .entries
            .entry(column_type)
            .or_insert_with(|| Formatter::for_type(column_type, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memoized_per_type() {
        let format = NumberFormat {
            float_precision: 1,
            ..NumberFormat::default()
        };
        let mut cache = FormatterCache::new(format);
        assert!(cache.entries.is_empty());
        assert_eq!(
            cache.get(Some(ColumnType::Float)),
            Formatter::Number {
                decimals: 1,
                format
            }
        );
        cache.get(Some(ColumnType::Float));
        cache.get(None);
        assert_eq!(cache.entries.len(), 2);
    }
}
