//! Error types for archive operations

use fibermap_core::FibermapError;
use thiserror::Error;

/// Errors that can occur while building or reading an output archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// IO error during archive operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid ZIP archive or ZIP writer failure
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Two projects map to the same entry name
    #[error("projects '{first}' and '{second}' both map to archive entry '{entry}'")]
    NameCollision {
        /// The shared entry name
        entry: String,
        /// Project that claimed the entry first
        first: String,
        /// Project that collided with it
        second: String,
    },

    /// An auxiliary asset name is unusable or already taken
    #[error("invalid asset '{0}'")]
    InvalidAsset(String),
}

impl From<ArchiveError> for FibermapError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Io(e) => Self::Io(e),
            ArchiveError::NameCollision {
                entry,
                first,
                second,
            } => Self::NameCollision {
                entry,
                first,
                second,
            },
            other => Self::Serialize(other.to_string()),
        }
    }
}

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;
