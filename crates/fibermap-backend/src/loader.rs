//! Format dispatch for input tables

use crate::csv::CsvBackend;
use crate::error::{BackendError, Result};
use crate::format::TableFormat;
use crate::traits::TableBackend;
use crate::xlsx::SpreadsheetBackend;
use fibermap_core::Table;
use std::path::Path;

/// Parse `data` as a table of the given format
///
/// # Errors
/// Returns an error if the bytes are not a readable table of that format.
pub fn load_table_bytes(format: TableFormat, data: &[u8]) -> Result<Table> {
    let table = match format {
        TableFormat::Csv => CsvBackend::new().parse_bytes(data)?,
        TableFormat::Xlsx => SpreadsheetBackend::xlsx().parse_bytes(data)?,
        TableFormat::Xls => SpreadsheetBackend::xls().parse_bytes(data)?,
    };
    log::debug!(
        "loaded {format} table: {} column(s), {} row(s)",
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

/// Load a table from a file.
///
/// The format comes from the file extension. Files without one are sniffed
/// from their leading bytes.
///
/// # Errors
/// Returns [`BackendError::UnsupportedFormat`] for extensions that are not
/// table formats, or an error if reading or parsing fails.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;

    let format = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => TableFormat::from_extension(ext)
            .ok_or_else(|| BackendError::UnsupportedFormat(format!("{}", path.display())))?,
        None => TableFormat::sniff(&data),
    };
    load_table_bytes(format, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "NAMA PROJECT,ODP").unwrap();
        writeln!(file, "P1,ODP-1").unwrap();
        let table = load_table(file.path()).unwrap();
        assert_eq!(table.columns(), &["NAMA PROJECT", "ODP"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_extensionless_file_is_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export");
        std::fs::write(&path, "a;b\n1;2\n").unwrap();
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns(), &["a", "b"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        assert!(matches!(
            load_table(file.path()),
            Err(BackendError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_table("/nonexistent/odp.csv"),
            Err(BackendError::Io(_))
        ));
    }
}
