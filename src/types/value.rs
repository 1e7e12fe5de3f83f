use serde::{Deserialize, Serialize};

/// Semantic type of a column, as reported by the data source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
    Date,
    Datetime,
}

impl ColumnType {
    /// Name used for CSS classes and pinned-width keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Date => "date",
            Self::Datetime => "datetime",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Datetime)
    }
}

/// Name of an optional column type; the row-path pseudo-column has none.
pub fn type_name(column_type: Option<ColumnType>) -> &'static str {
    column_type.map_or("undefined", ColumnType::as_str)
}

/// A single cell value delivered by a page fetch.
///
/// Dates and datetimes travel as milliseconds since the Unix epoch. Row-path
/// cells carry the full path of group labels from the root to the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Path(Vec<String>),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Row path segments, if this is a row-path value.
    pub fn as_path(&self) -> Option<&[String]> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Length of the row path, used for tree depth and look-ahead.
    pub fn path_len(&self) -> Option<usize> {
        self.as_path().map(<[String]>::len)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Raw text of the value, without type-aware formatting.
    pub fn label(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Path(p) => p.join(","),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "x", ["a", "b"]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::Text("x".to_string()),
                Value::Path(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn test_path_len() {
        let v = Value::Path(vec!["East".to_string()]);
        assert_eq!(v.path_len(), Some(1));
        assert_eq!(Value::Int(1).path_len(), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(Some(ColumnType::Float)), "float");
        assert_eq!(type_name(None), "undefined");
    }
}
