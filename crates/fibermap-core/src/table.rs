//! Named-column table produced by the loaders in `fibermap-backend`.

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Blank cell
    #[default]
    Empty,
    /// Textual cell (trimmed by the loaders)
    Text(String),
    /// Numeric cell
    Number(f64),
}

impl Cell {
    /// Text content of the cell, `None` when blank.
    ///
    /// Numbers are rendered the way a spreadsheet shows them: integral values
    /// without a fractional part (`"12"`, not `"12.0"`).
    #[must_use = "returns the cell text"]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(n) => Some(format_number(*n)),
        }
    }

    /// Numeric value of the cell.
    ///
    /// Text is parsed leniently: surrounding whitespace is ignored and a single
    /// comma is accepted as decimal separator (`"-6,2001"`). Blank or
    /// unparseable cells yield NaN so the geometry step can reject them with
    /// row context.
    #[must_use = "returns the numeric cell value"]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Empty => f64::NAN,
            Self::Number(n) => *n,
            Self::Text(s) => parse_decimal(s).unwrap_or(f64::NAN),
        }
    }

    /// Whether the cell holds nothing but whitespace
    #[inline]
    #[must_use = "returns whether the cell is blank"]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // guarded by the fract/abs checks
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }
    if s.matches(',').count() == 1 && !s.contains('.') {
        return s.replace(',', ".").parse::<f64>().ok();
    }
    None
}

/// An in-memory table with a header row.
///
/// Rows may be shorter than the header; missing trailing cells read as
/// [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table from header names and data rows
    #[must_use = "creates a table that should be converted"]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Header names in input order
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in input order
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact (trimmed) header name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Cell at `(row, col)`; out-of-range cells read as empty
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}
