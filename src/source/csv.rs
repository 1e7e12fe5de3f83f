//! Minimal CSV/TSV loader that produces a flat [`MemorySource`].
//!
//! The first line names the columns. Column types are inferred: a column
//! whose non-empty fields all parse as integers is `integer`, as numbers is
//! `float`, `true`/`false` is `boolean`, anything else is `string`.

use super::MemorySource;
use crate::error::{DatagridError, Result};
use crate::types::{ColumnType, Value};

/// Delimiter for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Pick a delimiter from a file name (`.tsv`/`.tab` use tabs).
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".tsv") || lower.ends_with(".tab") {
            Self::Tab
        } else {
            Self::Comma
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

/// Read a delimited file, picking the delimiter from its extension.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_delimited(path: impl AsRef<std::path::Path>) -> Result<MemorySource> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    parse_delimited(&data, Delimiter::from_path(&path.to_string_lossy()))
}

/// Parse delimited bytes into a [`MemorySource`].
pub fn parse_delimited(data: &[u8], delim: Delimiter) -> Result<MemorySource> {
    let text = String::from_utf8_lossy(data);
    let sep = delim.as_char();
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| DatagridError::Csv("missing header row".to_string()))?;
    let names: Vec<String> = split_csv_line(header, sep)
        .into_iter()
        .map(|f| f.trim().to_string())
        .collect();

    let records: Vec<Vec<String>> = lines.map(|l| split_csv_line(l, sep)).collect();
    if let Some((idx, _)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() > names.len())
    {
        return Err(DatagridError::Csv(format!(
            "record {} has more than {} fields",
            idx + 1,
            names.len()
        )));
    }

    let types: Vec<ColumnType> = (0..names.len())
        .map(|col| infer_type(records.iter().filter_map(|r| r.get(col))))
        .collect();

    let mut source = MemorySource::new(names.into_iter().zip(types.iter().copied()).collect());
    for record in &records {
        let values = types
            .iter()
            .enumerate()
            .map(|(col, ty)| {
                record
                    .get(col)
                    .map_or(Value::Null, |field| parse_field(field.trim(), *ty))
            })
            .collect();
        source.push_row(values);
    }
    Ok(source)
}

fn infer_type<'a>(fields: impl Iterator<Item = &'a String>) -> ColumnType {
    let mut ty: Option<ColumnType> = None;
    for field in fields.map(|f| f.trim()).filter(|f| !f.is_empty()) {
        let field_ty = if field.parse::<i64>().is_ok() {
            ColumnType::Integer
        } else if field.parse::<f64>().is_ok() {
            ColumnType::Float
        } else if field == "true" || field == "false" {
            ColumnType::Boolean
        } else {
            return ColumnType::String;
        };
        ty = Some(match (ty, field_ty) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(ColumnType::Integer), ColumnType::Float)
            | (Some(ColumnType::Float), ColumnType::Integer) => ColumnType::Float,
            _ => return ColumnType::String,
        });
    }
    ty.unwrap_or(ColumnType::String)
}

fn parse_field(field: &str, ty: ColumnType) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    let parsed = match ty {
        ColumnType::Integer => field.parse().ok().map(Value::Int),
        ColumnType::Float => field.parse().ok().map(Value::Float),
        ColumnType::Boolean => field.parse().ok().map(Value::Bool),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::Text(field.to_string()))
}

/// Split a CSV line respecting quoted fields.
fn split_csv_line(line: &str, sep: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == sep {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
}
