//! Report Structure
//!
//! The `(headers, rows)` structure every benchmark produces. Renderers and
//! persistence only ever see this type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display formatting applied when shaping report rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Decimal places for integral values
    #[serde(default = "default_integral_decimals")]
    pub integral_decimals: usize,
    /// Group integer columns with `,` thousands separators
    #[serde(default = "default_show_thousands_sep")]
    pub show_thousands_sep: bool,
    /// Decimal places renderers use for timings
    #[serde(default = "default_time_decimals")]
    pub time_decimals: usize,
}

fn default_integral_decimals() -> usize {
    4
}
fn default_show_thousands_sep() -> bool {
    true
}
fn default_time_decimals() -> usize {
    6
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            integral_decimals: default_integral_decimals(),
            show_thousands_sep: default_show_thousands_sep(),
            time_decimals: default_time_decimals(),
        }
    }
}

impl FormatOptions {
    /// Format an integer count, with thousands separators if enabled
    pub fn format_count(&self, value: u64) -> String {
        if self.show_thousands_sep {
            group_thousands(value)
        } else {
            value.to_string()
        }
    }

    /// Format an integral value with the configured precision
    pub fn format_integral(&self, value: f64) -> String {
        format!("{:.*}", self.integral_decimals, value)
    }
}

/// Insert `,` every three digits: `1234567` → `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One report cell
///
/// Serializes untagged. A NaN number becomes JSON `null` and reads back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Preformatted text (inputs, derived metrics)
    Text(String),
    /// Raw number (timings in seconds; NaN marks a missing value)
    Number(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Text(String),
    Number(f64),
    Missing(()),
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match CellRepr::deserialize(deserializer)? {
            CellRepr::Text(s) => Cell::Text(s),
            CellRepr::Number(v) => Cell::Number(v),
            CellRepr::Missing(()) => Cell::Number(f64::NAN),
        })
    }
}

impl Cell {
    /// Numeric value, if this is a number cell
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    /// Whether this is a missing-value placeholder
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Number(v) if v.is_nan())
    }
}

/// Suffix of every timing column header
pub const TIME_COLUMN_SUFFIX: &str = " Time (s)";

/// Timing column header for an implementation label
pub fn time_column(label: &str) -> String {
    format!("{label}{TIME_COLUMN_SUFFIX}")
}

/// Tabular report for one benchmark
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportTable {
    /// Benchmark name
    pub title: String,
    /// Column names in display order
    pub headers: Vec<String>,
    /// One mapping per recorded input
    pub rows: Vec<BTreeMap<String, Cell>>,
}

impl ReportTable {
    /// Implementation labels that have a timing column, in column order
    pub fn implementation_labels(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter_map(|h| h.strip_suffix(TIME_COLUMN_SUFFIX))
            .collect()
    }

    /// Whether no rows were recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Turns report tables into output text
pub trait Reporter {
    /// Render one benchmark's table
    fn render(&self, table: &ReportTable) -> String;
}
