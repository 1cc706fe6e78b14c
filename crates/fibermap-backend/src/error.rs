//! Error types for table loading

use fibermap_core::FibermapError;
use std::io;
use thiserror::Error;

/// Errors raised while reading an input table
#[derive(Debug, Error)]
pub enum BackendError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file type is not a supported table format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// CSV content could not be parsed
    #[error("CSV error: {0}")]
    Csv(String),

    /// Workbook could not be opened or read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl From<BackendError> for FibermapError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => Self::Io(e),
            other => Self::Input(other.to_string()),
        }
    }
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
