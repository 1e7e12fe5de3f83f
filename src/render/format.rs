//! Type-aware value formatting for body cells.
//!
//! Numbers are grouped in thousands with the separators of the grid's
//! [`NumberFormat`] (en-US by default); dates and datetimes are milliseconds
//! since the Unix epoch rendered in UTC as `M/D/YYYY` and
//! `M/D/YYYY, h:mm:ss AM`.

use crate::types::{ColumnType, NumberFormat, Value};

const MS_PER_DAY: i64 = 86_400_000;

/// Formatting strategy selected by column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Number {
        decimals: usize,
        format: NumberFormat,
    },
    Date {
        with_time: bool,
    },
    /// Row-path column: rendered structurally, not as text
    Tree,
    Raw,
}

impl Formatter {
    pub const fn for_type(column_type: Option<ColumnType>, format: NumberFormat) -> Self {
        match column_type {
            Some(ColumnType::Float) => Self::Number {
                decimals: format.float_precision,
                format,
            },
            Some(ColumnType::Integer) => Self::Number {
                decimals: 0,
                format,
            },
            Some(ColumnType::Date) => Self::Date { with_time: false },
            Some(ColumnType::Datetime) => Self::Date { with_time: true },
            Some(ColumnType::Boolean | ColumnType::String) => Self::Raw,
            None => Self::Tree,
        }
    }

    /// Text for a non-null value. Values that do not fit the formatter fall
    /// back to their raw text.
    #[allow(clippy::cast_possible_truncation)]
    pub fn format(self, value: &Value) -> String {
        match (self, value) {
            (Self::Number { decimals: 0, format }, Value::Int(i)) => {
                group(*i < 0, &i.unsigned_abs().to_string(), None, format)
            }
            (Self::Number { decimals, format }, v) => v
                .as_f64()
                .map_or_else(|| v.label(), |f| format_float(f, decimals, format)),
            (Self::Date { with_time }, Value::Int(ms)) => format_date(*ms, with_time),
            (Self::Date { with_time }, Value::Float(ms)) if ms.is_finite() => {
                format_date(ms.round() as i64, with_time)
            }
            (_, v) => v.label(),
        }
    }
}

fn format_float(value: f64, decimals: usize, format: NumberFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.*}", decimals.min(10), value.abs());
    let (digits, fraction) = match fixed.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (fixed.as_str(), None),
    };
    // No sign on values that round to zero
    let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    group(negative, digits, fraction, format)
}

/// Assemble `digits` (ASCII, no sign) into groups of three, then append the
/// fraction.
fn group(negative: bool, digits: &str, fraction: Option<&str>, format: NumberFormat) -> String {
    let mut out = String::with_capacity(digits.len() * 4 / 3 + 8);
    if negative {
        out.push('-');
    }
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let (head, tail) = digits.split_at(lead.min(digits.len()));
    out.push_str(head);
    for chunk in tail.as_bytes().chunks(3) {
        if let Some(sep) = format.thousands_separator {
            out.push(sep);
        }
        out.extend(chunk.iter().map(|b| char::from(*b)));
    }
    if let Some(fraction) = fraction {
        out.push(format.decimal_separator);
        out.push_str(fraction);
    }
    out
}

/// Format epoch milliseconds as an en-US date (UTC).
pub fn format_date(ms: i64, with_time: bool) -> String {
    let (year, month, day) = civil_from_days(ms.div_euclid(MS_PER_DAY));
    if !with_time {
        return format!("{month}/{day}/{year}");
    }
    let secs = ms.rem_euclid(MS_PER_DAY) / 1000;
    let (hour, minute, second) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{month}/{day}/{year}, {hour12}:{minute:02}:{second:02} {meridiem}")
}

/// Days since 1970-01-01 to a proleptic Gregorian `(year, month, day)`,
/// counting in 400-year eras that start on March 1st.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    // Months counted from March
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
