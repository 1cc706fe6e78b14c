//! Typed input rows.

use crate::config::ColumnMapping;
use crate::error::{FibermapError, Result};
use crate::geometry::Coordinate;
use crate::table::Table;

/// One asset record: a distribution point and the customer it serves
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// 0-based data row index in the source table
    pub index: usize,
    /// Project identifier
    pub project: String,
    /// Free-text description
    pub description: Option<String>,
    /// Distribution point identifier
    pub odp: String,
    /// Distribution point latitude
    pub odp_lat: f64,
    /// Distribution point longitude
    pub odp_lon: f64,
    /// Customer name
    pub customer: String,
    /// Customer latitude
    pub customer_lat: f64,
    /// Customer longitude
    pub customer_lon: f64,
}

impl InputRow {
    fn geometry_error(&self, what: &str, issue: impl std::fmt::Display) -> FibermapError {
        FibermapError::Geometry {
            row: self.index,
            project: self.project.clone(),
            message: format!("{what} {issue}"),
        }
    }

    fn missing(&self, column: &str) -> FibermapError {
        FibermapError::MissingValue {
            row: self.index,
            project: self.project.clone(),
            column: column.to_string(),
        }
    }

    /// Position of the distribution point, `(LONG ODP, LAT ODP)`.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Geometry`] if either value is not finite.
    pub fn odp_coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(self.odp_lon, self.odp_lat).map_err(|e| self.geometry_error("ODP", e))
    }

    /// Position of the customer, `(LONG PELANGGAN, LAT PELANGGAN)`.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Geometry`] if either value is not finite.
    pub fn customer_coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(self.customer_lon, self.customer_lat)
            .map_err(|e| self.geometry_error("customer", e))
    }

    /// Check the project identifier is present.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::MissingValue`] naming the project column.
    pub fn check_project(&self, columns: &ColumnMapping) -> Result<()> {
        if self.project.is_empty() {
            return Err(self.missing(&columns.project));
        }
        Ok(())
    }

    /// Check the marker labels are present.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::MissingValue`] naming the first blank column.
    pub fn check_labels(&self, columns: &ColumnMapping) -> Result<()> {
        if self.odp.is_empty() {
            return Err(self.missing(&columns.odp));
        }
        if self.customer.is_empty() {
            return Err(self.missing(&columns.customer));
        }
        Ok(())
    }
}

/// Read every data row of `table` through `columns`.
///
/// The description column is optional here (its presence is the validator's
/// business); when absent every row gets `None`. Rows whose mapped cells are
/// all blank are dropped, which removes the trailing empty rows spreadsheets
/// tend to carry.
///
/// # Errors
///
/// Returns [`FibermapError::Schema`] if a mandatory column is missing.
pub fn extract_rows(table: &Table, columns: &ColumnMapping) -> Result<Vec<InputRow>> {
    let index_of = |name: &str| {
        table.column_index(name).ok_or_else(|| FibermapError::Schema {
            missing: vec![name.to_string()],
        })
    };
    let project = index_of(&columns.project)?;
    let description = table.column_index(&columns.description);
    let odp = index_of(&columns.odp)?;
    let odp_lat = index_of(&columns.odp_lat)?;
    let odp_lon = index_of(&columns.odp_lon)?;
    let customer = index_of(&columns.customer)?;
    let customer_lat = index_of(&columns.customer_lat)?;
    let customer_lon = index_of(&columns.customer_lon)?;

    let mapped: Vec<usize> = [project, odp, odp_lat, odp_lon, customer, customer_lat, customer_lon]
        .into_iter()
        .chain(description)
        .collect();

    let mut rows = Vec::with_capacity(table.len());
    for index in 0..table.len() {
        if mapped.iter().all(|&col| table.cell(index, col).is_blank()) {
            log::debug!("skipping blank row {index}");
            continue;
        }
        let text = |col: usize| table.cell(index, col).as_text().unwrap_or_default();
        rows.push(InputRow {
            index,
            project: text(project),
            description: description.and_then(|col| table.cell(index, col).as_text()),
            odp: text(odp),
            odp_lat: table.cell(index, odp_lat).as_f64(),
            odp_lon: table.cell(index, odp_lon).as_f64(),
            customer: text(customer),
            customer_lat: table.cell(index, customer_lat).as_f64(),
            customer_lon: table.cell(index, customer_lon).as_f64(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn header() -> Vec<String> {
        ColumnMapping::default().all().into_iter().map(String::from).collect()
    }

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_extract_typed_values() {
        let table = Table::new(
            header(),
            vec![vec![
                t("P1"),
                t("Ruko blok A"),
                t("ODP-JKT-01"),
                Cell::Number(-6.2),
                Cell::Number(106.8),
                t("Budi"),
                t("-6,21"),
                t("106.81"),
            ]],
        );
        let rows = extract_rows(&table, &ColumnMapping::default()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.index, 0);
        assert_eq!(r.project, "P1");
        assert_eq!(r.description.as_deref(), Some("Ruko blok A"));
        assert_eq!(r.odp, "ODP-JKT-01");
        assert_eq!(r.customer, "Budi");
        let odp = r.odp_coordinate().unwrap();
        assert!((odp.longitude - 106.8).abs() < f64::EPSILON);
        assert!((odp.latitude - -6.2).abs() < f64::EPSILON);
        let cust = r.customer_coordinate().unwrap();
        assert!((cust.latitude - -6.21).abs() < 1e-12);
    }

    #[test]
    fn test_description_column_optional() {
        let cols = ColumnMapping::default();
        let header: Vec<String> = header().into_iter().filter(|c| c != "Deskripsi").collect();
        let table = Table::new(
            header,
            vec![vec![t("P"), t("O"), t("1"), t("2"), t("C"), t("3"), t("4")]],
        );
        let rows = extract_rows(&table, &cols).unwrap();
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[0].customer, "C");
    }

    #[test]
    fn test_blank_rows_dropped_indices_kept() {
        let blank = vec![Cell::Empty; 8];
        let table = Table::new(
            header(),
            vec![
                blank.clone(),
                vec![t("P"), Cell::Empty, t("O"), t("1"), t("2"), t("C"), t("3"), t("4")],
                blank,
            ],
        );
        let rows = extract_rows(&table, &ColumnMapping::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].description, None);
    }

    #[test]
    fn test_bad_coordinates_surface_as_geometry_errors() {
        let table = Table::new(
            header(),
            vec![vec![t("P"), t("d"), t("O"), t("north"), t("2"), t("C"), Cell::Empty, t("4")]],
        );
        let rows = extract_rows(&table, &ColumnMapping::default()).unwrap();
        let err = rows[0].odp_coordinate().unwrap_err();
        assert!(matches!(err, FibermapError::Geometry { row: 0, .. }));
        assert!(err.to_string().contains("ODP latitude"));
        let err = rows[0].customer_coordinate().unwrap_err();
        assert!(err.to_string().contains("customer latitude"));
    }

    #[test]
    fn test_missing_labels() {
        let cols = ColumnMapping::default();
        let mut row = InputRow {
            index: 3,
            project: String::new(),
            description: None,
            odp: "O".to_string(),
            odp_lat: 0.0,
            odp_lon: 0.0,
            customer: String::new(),
            customer_lat: 0.0,
            customer_lon: 0.0,
        };
        assert!(matches!(
            row.check_project(&cols),
            Err(FibermapError::MissingValue { ref column, .. }) if column == "NAMA PROJECT"
        ));
        assert!(matches!(
            row.check_labels(&cols),
            Err(FibermapError::MissingValue { ref column, row: 3, .. }) if column == "name"
        ));
        row.customer = "C".to_string();
        row.project = "P".to_string();
        row.check_project(&cols).unwrap();
        row.check_labels(&cols).unwrap();
    }

    #[test]
    fn test_missing_mandatory_column() {
        let table = Table::new(vec!["ODP".to_string()], Vec::new());
        assert!(matches!(
            extract_rows(&table, &ColumnMapping::default()),
            Err(FibermapError::Schema { .. })
        ));
    }
}
