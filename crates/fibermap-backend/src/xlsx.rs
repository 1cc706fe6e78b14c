//! Excel workbook backends (.xlsx and legacy .xls) using calamine
//!
//! Only the first worksheet is read. Its first non-empty row is the header;
//! calamine trims leading empty rows and columns from the used range.

use crate::error::{BackendError, Result};
use crate::format::TableFormat;
use crate::traits::TableBackend;
use calamine::{Data, Range, Reader, Xls, Xlsx};
use fibermap_core::{Cell, Table};
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

/// Workbook backend for both Excel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpreadsheetBackend {
    format: TableFormat,
}

impl SpreadsheetBackend {
    /// Backend for Office Open XML workbooks
    #[inline]
    #[must_use]
    pub const fn xlsx() -> Self {
        Self {
            format: TableFormat::Xlsx,
        }
    }

    /// Backend for Excel 97-2003 workbooks
    #[inline]
    #[must_use]
    pub const fn xls() -> Self {
        Self {
            format: TableFormat::Xls,
        }
    }
}

/// Map a calamine cell onto a table cell
fn to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        #[allow(clippy::cast_precision_loss)] // coordinates never reach 2^53
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        other => Cell::Text(other.to_string()),
    }
}

/// Convert a worksheet range into a table; the first range row is the header
pub(crate) fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let columns = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|value| to_cell(value).as_text().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let data = rows.map(|row| row.iter().map(to_cell).collect()).collect();
    Table::new(columns, data)
}

/// Read the first worksheet of any calamine workbook
fn first_sheet<R, RS>(mut workbook: R) -> Result<Table>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let sheet_names = workbook.sheet_names();
    let Some(name) = sheet_names.first() else {
        return Err(BackendError::Spreadsheet(
            "workbook contains no worksheets".to_string(),
        ));
    };
    log::debug!(
        "reading worksheet '{name}' ({} sheet(s) in workbook)",
        sheet_names.len()
    );

    let range = workbook
        .worksheet_range(name)
        .map_err(|e| BackendError::Spreadsheet(format!("Failed to read sheet '{name}': {e}")))?;
    Ok(range_to_table(&range))
}

impl TableBackend for SpreadsheetBackend {
    #[inline]
    fn format(&self) -> TableFormat {
        self.format
    }

    fn parse_bytes(&self, data: &[u8]) -> Result<Table> {
        let cursor = Cursor::new(data);
        match self.format {
            TableFormat::Xls => {
                let workbook: Xls<_> = Xls::new(cursor).map_err(|e| {
                    BackendError::Spreadsheet(format!("Failed to open XLS workbook: {e}"))
                })?;
                first_sheet(workbook)
            }
            TableFormat::Xlsx => {
                let workbook: Xlsx<_> = Xlsx::new(cursor).map_err(|e| {
                    BackendError::Spreadsheet(format!("Failed to open XLSX workbook: {e}"))
                })?;
                first_sheet(workbook)
            }
            TableFormat::Csv => Err(BackendError::UnsupportedFormat(
                "CSV is not a workbook format".to_string(),
            )),
        }
    }
}
