//! Structured error types for the datagrid engine.

/// All errors that can surface from a draw pass or a host interaction.
#[derive(Debug, thiserror::Error)]
pub enum DatagridError {
    /// A column requested by the draw loop was absent from a page fetch,
    /// even after a targeted single-column follow-up fetch.
    #[error("Missing column {column}; contains {}", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// The data source failed to answer a call.
    #[error("Data source: {0}")]
    Source(String),

    /// JSON (de)serialization of options, configs or sort specs.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed delimited text handed to the CSV loader.
    #[error("CSV: {0}")]
    Csv(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DatagridError>;

impl From<String> for DatagridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for DatagridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<DatagridError> for wasm_bindgen::JsValue {
    fn from(e: DatagridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_lists_available() {
        let err = DatagridError::MissingColumn {
            column: "Sales".to_string(),
            available: vec!["Profit".to_string(), "Region".to_string()],
        };
        assert_eq!(err.to_string(), "Missing column Sales; contains Profit, Region");
    }

    #[test]
    fn test_from_str() {
        let err: DatagridError = "boom".into();
        assert!(matches!(err, DatagridError::Other(ref s) if s == "boom"));
    }
}
