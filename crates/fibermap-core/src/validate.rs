//! Column presence check, run once before any project is built.

use crate::error::{FibermapError, Result};
use crate::table::Table;

/// Fail with [`FibermapError::Schema`] listing every name in `required` that
/// is not a column of `table`.
///
/// Header names are compared after trimming surrounding whitespace; case is
/// significant (`name` and `Name` are different columns).
///
/// # Errors
///
/// Returns [`FibermapError::Schema`] when at least one column is missing.
pub fn validate_columns(table: &Table, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .map(|name| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        log::debug!("table columns: {:?}", table.columns());
        Err(FibermapError::Schema { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[&str]) -> Table {
        Table::new(cols.iter().map(ToString::to_string).collect(), Vec::new())
    }

    #[test]
    fn test_all_present() {
        let t = table(&["ODP", " name ", "extra"]);
        validate_columns(&t, &["ODP", "name"]).unwrap();
    }

    #[test]
    fn test_reports_every_missing_column_in_order() {
        let t = table(&["ODP"]);
        match validate_columns(&t, &["NAMA PROJECT", "ODP", "name"]) {
            Err(FibermapError::Schema { missing }) => {
                assert_eq!(missing, vec!["NAMA PROJECT", "name"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_case_sensitive() {
        let t = table(&["Name"]);
        assert!(validate_columns(&t, &["name"]).is_err());
    }

    #[test]
    fn test_empty_requirement() {
        validate_columns(&table(&[]), &[]).unwrap();
    }
}
