//! Error types for KML serialization and inspection

use std::io;
use thiserror::Error;

/// Errors raised while writing or reading KML
#[derive(Debug, Error)]
pub enum KmlError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// XML writer error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error while inspecting an archive
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Text that is not valid KML
    #[error("KML parsing error: {0}")]
    Parse(String),
}

impl From<KmlError> for fibermap_core::FibermapError {
    fn from(err: KmlError) -> Self {
        match err {
            KmlError::Io(e) => Self::Io(e),
            other => Self::Serialize(other.to_string()),
        }
    }
}

/// Result type for KML operations
pub type Result<T> = std::result::Result<T, KmlError>;
