use serde::{Deserialize, Serialize};

/// Sort direction, serialized with the string names the host uses
/// (`"asc"`, `"desc abs"`, `"col asc"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
    #[serde(rename = "asc abs")]
    AscAbs,
    #[serde(rename = "desc abs")]
    DescAbs,
    #[serde(rename = "col asc")]
    ColAsc,
    #[serde(rename = "col desc")]
    ColDesc,
    #[serde(rename = "col asc abs")]
    ColAscAbs,
    #[serde(rename = "col desc abs")]
    ColDescAbs,
    #[serde(rename = "none")]
    None,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::AscAbs => "asc abs",
            Self::DescAbs => "desc abs",
            Self::ColAsc => "col asc",
            Self::ColDesc => "col desc",
            Self::ColAscAbs => "col asc abs",
            Self::ColDescAbs => "col desc abs",
            Self::None => "none",
        }
    }

    /// Header glyph for this direction. Material icon ligature names for the
    /// plain directions, arrows for the absolute-value variants.
    pub const fn glyph(self) -> Option<&'static str> {
        match self {
            Self::Asc => Some("arrow_upward"),
            Self::Desc => Some("arrow_downward"),
            Self::AscAbs => Some("\u{21E7}"),
            Self::DescAbs => Some("\u{21E9}"),
            Self::ColAsc => Some("arrow_back"),
            Self::ColDesc => Some("arrow_forward"),
            Self::ColAscAbs => Some("\u{21E8}"),
            Self::ColDescAbs => Some("\u{21E6}"),
            Self::None => None,
        }
    }

    /// Next direction when a sorted header is clicked again.
    ///
    /// Cycles `asc -> desc -> none`, with `col asc -> col desc` inserted
    /// before `none` when column sorting is enabled. With `abs` every
    /// direction except `none` takes its absolute-value form. A current
    /// direction that is not part of the chosen cycle restarts it.
    pub fn increment(self, column_sorting: bool, abs: bool) -> Self {
        let mut orders = vec![Self::Asc, Self::Desc];
        if column_sorting {
            orders.push(Self::ColAsc);
            orders.push(Self::ColDesc);
        }
        orders.push(Self::None);
        if abs {
            orders = orders.into_iter().map(Self::to_abs).collect();
        }
        let next = orders
            .iter()
            .position(|d| *d == self)
            .map_or(0, |i| (i + 1) % orders.len());
        orders.get(next).copied().unwrap_or(Self::None)
    }

    const fn to_abs(self) -> Self {
        match self {
            Self::Asc => Self::AscAbs,
            Self::Desc => Self::DescAbs,
            Self::ColAsc => Self::ColAscAbs,
            Self::ColDesc => Self::ColDescAbs,
            other => other,
        }
    }
}

/// One sort clause, serialized as a `[column, direction]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry(pub String, pub SortDirection);

impl SortEntry {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self(column.into(), direction)
    }

    pub fn column(&self) -> &str {
        &self.0
    }

    pub const fn direction(&self) -> SortDirection {
        self.1
    }
}

/// View configuration snapshot fetched from the data source each draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub row_pivots: Vec<String>,
    pub column_pivots: Vec<String>,
    pub sort: Vec<SortEntry>,
}

impl ViewConfig {
    /// Number of header rows: one per column pivot plus the leaf row.
    pub fn header_depth(&self) -> usize {
        self.column_pivots.len() + 1
    }

    /// Depth of a leaf row path in the row tree.
    pub fn row_depth(&self) -> usize {
        self.row_pivots.len()
    }

    /// Sort spec as JSON (`[["col","asc"], ...]`).
    pub fn sort_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(&self.sort)?)
    }
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        alt: false,
    };
    pub const ALT: Self = Self {
        shift: false,
        alt: true,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(SortDirection::Asc, false, false => SortDirection::Desc)]
    #[test_case(SortDirection::Desc, false, false => SortDirection::None)]
    #[test_case(SortDirection::None, false, false => SortDirection::Asc)]
    #[test_case(SortDirection::Desc, true, false => SortDirection::ColAsc)]
    #[test_case(SortDirection::ColDesc, true, false => SortDirection::None)]
    #[test_case(SortDirection::AscAbs, false, true => SortDirection::DescAbs)]
    #[test_case(SortDirection::AscAbs, false, false => SortDirection::Asc)]
    fn test_increment(current: SortDirection, column_sorting: bool, abs: bool) -> SortDirection {
        current.increment(column_sorting, abs)
    }

    #[test]
    fn test_sort_entry_json_shape() {
        let config = ViewConfig {
            sort: vec![
                SortEntry::new("Sales", SortDirection::Asc),
                SortEntry::new("Profit", SortDirection::ColDescAbs),
            ],
            ..ViewConfig::default()
        };
        assert_eq!(
            config.sort_json().unwrap(),
            r#"[["Sales","asc"],["Profit","col desc abs"]]"#
        );
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ViewConfig = serde_json::from_str(r#"{"row_pivots": ["State"]}"#).unwrap();
        assert_eq!(config.row_depth(), 1);
        assert_eq!(config.header_depth(), 1);
        assert!(config.sort.is_empty());
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(SortDirection::Asc.glyph(), Some("arrow_upward"));
        assert_eq!(SortDirection::ColAscAbs.glyph(), Some("\u{21E8}"));
        assert_eq!(SortDirection::None.glyph(), None);
    }
}
