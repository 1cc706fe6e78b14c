//! Grouping rows by project.

use crate::config::{ColumnMapping, InvalidRowPolicy};
use crate::error::{Result, RowIssue};
use crate::row::InputRow;
use std::collections::HashMap;

/// All rows of one project, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGroup {
    /// Project identifier
    pub project: String,
    /// Rows sharing the identifier
    pub rows: Vec<InputRow>,
}

/// Group `rows` by project identifier.
///
/// Groups come out in the order their project first appears; rows within a
/// group keep their input order. No row is dropped or duplicated.
///
/// ```
/// use fibermap_core::partition::partition;
/// assert!(partition(Vec::new()).is_empty());
/// ```
#[must_use]
pub fn partition(rows: Vec<InputRow>) -> Vec<ProjectGroup> {
    let mut groups: Vec<ProjectGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if let Some(&i) = index.get(&row.project) {
            groups[i].rows.push(row);
        } else {
            index.insert(row.project.clone(), groups.len());
            groups.push(ProjectGroup {
                project: row.project.clone(),
                rows: vec![row],
            });
        }
    }

    log::debug!("partitioned into {} project(s)", groups.len());
    groups
}

/// Remove rows without a project identifier before partitioning.
///
/// Such rows cannot belong to any document, so both skip policies drop just
/// the row and record an issue; `abort` fails on the first one.
///
/// # Errors
///
/// Returns [`FibermapError::MissingValue`](crate::FibermapError::MissingValue)
/// under [`InvalidRowPolicy::Abort`].
pub fn screen_projects(
    rows: Vec<InputRow>,
    columns: &ColumnMapping,
    policy: InvalidRowPolicy,
) -> Result<(Vec<InputRow>, Vec<RowIssue>)> {
    let mut kept = Vec::with_capacity(rows.len());
    let mut issues = Vec::new();
    for row in rows {
        match row.check_project(columns) {
            Ok(()) => kept.push(row),
            Err(err) if policy == InvalidRowPolicy::Abort => return Err(err),
            Err(err) => {
                log::warn!("skipping row: {err}");
                issues.extend(RowIssue::from_error(&err));
            }
        }
    }
    Ok((kept, issues))
}
