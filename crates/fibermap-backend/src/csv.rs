//! CSV backend
//!
//! Reads delimited text into a [`Table`]. The delimiter is sniffed from the
//! header line among `,`, `;`, tab and `|`; rows may be ragged.

use crate::error::{BackendError, Result};
use crate::format::TableFormat;
use crate::traits::TableBackend;
use fibermap_core::{Cell, Table};

/// Delimiters tried by the sniffer, in tie-breaking order
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// CSV table backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CsvBackend;

impl CsvBackend {
    /// Create a new CSV backend instance
    #[inline]
    #[must_use = "creates a backend instance that should be used for parsing"]
    pub const fn new() -> Self {
        Self
    }

    /// Pick the candidate delimiter occurring most often in the first line.
    ///
    /// Falls back to `,` when none occurs.
    #[inline]
    fn detect_delimiter(content: &str) -> char {
        let first_line = content.lines().next().unwrap_or_default();

        let mut best_delimiter = ',';
        let mut max_count = 0;
        for &delim in &DELIMITERS {
            let count = first_line.matches(delim).count();
            if count > max_count {
                max_count = count;
                best_delimiter = delim;
            }
        }
        best_delimiter
    }

    /// Read CSV records as raw strings
    fn read_records(content: &str, delimiter: char) -> Result<Vec<Vec<String>>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(true)
            .has_headers(false)
            .from_reader(content.as_bytes());

        reader
            .records()
            .map(|result| {
                result
                    .map(|record| record.iter().map(ToString::to_string).collect())
                    .map_err(|e| BackendError::Csv(format!("Failed to read CSV record: {e}")))
            })
            .collect()
    }
}

fn to_cell(raw: String) -> Cell {
    if raw.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(raw)
    }
}

impl TableBackend for CsvBackend {
    #[inline]
    fn format(&self) -> TableFormat {
        TableFormat::Csv
    }

    fn parse_bytes(&self, data: &[u8]) -> Result<Table> {
        let content = std::str::from_utf8(data)
            .map_err(|e| BackendError::Csv(format!("CSV content must be valid UTF-8: {e}")))?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let delimiter = Self::detect_delimiter(content);
        log::debug!("Parsing CSV with delimiter: {delimiter:?}");

        let mut records = Self::read_records(content, delimiter)?.into_iter();
        let columns = records.next().unwrap_or_default();
        let rows: Vec<Vec<Cell>> = records
            .map(|record| record.into_iter().map(to_cell).collect())
            .collect();
        Ok(Table::new(columns, rows))
    }
}
