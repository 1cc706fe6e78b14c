//! Input table formats

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// ZIP local file header; XLSX workbooks are ZIP containers
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// OLE2 compound document header used by legacy XLS
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Supported input table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Delimited text (comma, semicolon, tab or pipe)
    Csv,
    /// Office Open XML workbook
    Xlsx,
    /// Legacy Excel 97-2003 workbook
    Xls,
}

impl TableFormat {
    /// Format for a file extension (case-insensitive)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Format from the extension of `path`
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Format from leading bytes; anything that is not a workbook is CSV
    #[must_use]
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(&ZIP_MAGIC) {
            Self::Xlsx
        } else if data.starts_with(&OLE_MAGIC) {
            Self::Xls
        } else {
            Self::Csv
        }
    }

    /// Canonical lowercase name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
