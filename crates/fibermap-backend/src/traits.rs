//! Core trait definitions for table backends

use crate::error::Result;
use crate::format::TableFormat;
use fibermap_core::Table;
use std::path::Path;

/// Reads one input format into a [`Table`].
///
/// The first row of the source is the header; every later row is data.
pub trait TableBackend: Send + Sync {
    /// Get the format this backend handles
    fn format(&self) -> TableFormat;

    /// Parse a table from bytes
    ///
    /// # Errors
    /// Returns an error if parsing fails.
    fn parse_bytes(&self, data: &[u8]) -> Result<Table>;

    /// Parse a table from a file path
    ///
    /// # Errors
    /// Returns an error if file reading or parsing fails.
    fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let data = std::fs::read(path.as_ref())?;
        self.parse_bytes(&data)
    }

    /// Check if this backend can handle the given format
    fn can_handle(&self, format: TableFormat) -> bool {
        self.format() == format
    }
}
