//! Error types for the transformation engine.
//!
//! Job-level errors (`Schema`, `NameCollision`, `Cancelled`) abort the whole
//! run. Row-level errors (`Geometry`, `MissingValue`) carry enough context to
//! locate the offending input and are routed through
//! [`InvalidRowPolicy`](crate::config::InvalidRowPolicy).

use serde::Serialize;
use thiserror::Error;

/// Errors raised while turning a table into project documents.
///
/// # Examples
///
/// ```
/// use fibermap_core::{validate_columns, FibermapError, Table};
///
/// let table = Table::new(vec!["ODP".to_string()], Vec::new());
/// match validate_columns(&table, &["ODP", "name"]) {
///     Err(FibermapError::Schema { missing }) => assert_eq!(missing, vec!["name"]),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum FibermapError {
    /// Required columns are absent from the input table.
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema {
        /// Names of the missing columns, in required order
        missing: Vec<String>,
    },

    /// A row carries a coordinate that cannot be placed on the map.
    #[error("invalid geometry in row {row} (project '{project}'): {message}")]
    Geometry {
        /// 0-based data row index in the input table
        row: usize,
        /// Project identifier of the row
        project: String,
        /// What was wrong with the coordinate
        message: String,
    },

    /// A row leaves a required text field blank.
    #[error("row {row} (project '{project}'): column '{column}' is empty")]
    MissingValue {
        /// 0-based data row index in the input table
        row: usize,
        /// Project identifier of the row (may be empty)
        project: String,
        /// Name of the empty column
        column: String,
    },

    /// Two distinct projects map onto the same archive entry.
    #[error("projects '{first}' and '{second}' both map to archive entry '{entry}'")]
    NameCollision {
        /// The shared entry name
        entry: String,
        /// Project that claimed the entry first
        first: String,
        /// Project that collided with it
        second: String,
    },

    /// The caller cancelled the job.
    #[error("job cancelled")]
    Cancelled,

    /// The input table could not be read.
    #[error("cannot read input table: {0}")]
    Input(String),

    /// Configuration is inconsistent or unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization of a project document failed.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FibermapError {
    /// Whether this error concerns a single row rather than the whole job.
    #[inline]
    #[must_use = "returns whether the error is row-scoped"]
    pub const fn is_row_level(&self) -> bool {
        matches!(self, Self::Geometry { .. } | Self::MissingValue { .. })
    }

    /// Row index for row-level errors.
    #[inline]
    #[must_use = "returns the offending row index, if any"]
    pub const fn row(&self) -> Option<usize> {
        match self {
            Self::Geometry { row, .. } | Self::MissingValue { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// A row the job dropped, kept for the job report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// 0-based data row index
    pub row: usize,
    /// Project the row belongs to (may be empty)
    pub project: String,
    /// Human-readable reason
    pub message: String,
}

impl RowIssue {
    /// Capture a row-level error; `None` for job-level errors
    #[must_use]
    pub fn from_error(err: &FibermapError) -> Option<Self> {
        match err {
            FibermapError::Geometry { row, project, .. }
            | FibermapError::MissingValue { row, project, .. } => Some(Self {
                row: *row,
                project: project.clone(),
                message: err.to_string(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result type for fibermap operations.
pub type Result<T> = std::result::Result<T, FibermapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_lists_columns() {
        let err = FibermapError::Schema {
            missing: vec!["name".to_string(), "LAT ODP".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required column(s): name, LAT ODP"
        );
    }

    #[test]
    fn test_row_level_classification() {
        let geometry = FibermapError::Geometry {
            row: 4,
            project: "P1".to_string(),
            message: "latitude is NaN".to_string(),
        };
        assert!(geometry.is_row_level());
        assert_eq!(geometry.row(), Some(4));
        assert!(geometry.to_string().contains("row 4"));
        assert!(geometry.to_string().contains("'P1'"));

        assert!(!FibermapError::Cancelled.is_row_level());
        assert_eq!(FibermapError::Cancelled.row(), None);

        let issue = RowIssue::from_error(&geometry).unwrap();
        assert_eq!(issue.row, 4);
        assert_eq!(issue.project, "P1");
        assert_eq!(issue.to_string(), geometry.to_string());
        assert!(RowIssue::from_error(&FibermapError::Cancelled).is_none());
    }
}
