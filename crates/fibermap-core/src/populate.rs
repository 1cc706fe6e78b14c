//! Filling a taxonomy skeleton with one project's features.

use crate::config::{ColumnMapping, GeometryConfig, InvalidRowPolicy, JobConfig, StyleMode};
use crate::document::{BoundaryPolygon, Feature, LineEntry, PlacemarkEntry, ProjectDocument};
use crate::error::{FibermapError, Result, RowIssue};
use crate::geometry::{boundary_ring, connect};
use crate::partition::ProjectGroup;
use crate::row::InputRow;
use crate::style::{StyleDescriptor, StyleSheet};
use crate::taxonomy::{Slots, Taxonomy, TaxonomyVariant};
use std::sync::Arc;

/// What became of one project
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectOutcome {
    /// The document was built; `issues` lists the rows left out of it
    Built {
        /// Populated document
        document: ProjectDocument,
        /// Rows skipped under [`InvalidRowPolicy::SkipRow`]
        issues: Vec<RowIssue>,
    },
    /// The project was dropped under [`InvalidRowPolicy::SkipProject`]
    Skipped {
        /// Project identifier
        project: String,
        /// The row issue that caused the drop
        issues: Vec<RowIssue>,
    },
}

/// Builds project documents for one job
#[derive(Debug, Clone)]
pub struct Populator {
    variant: TaxonomyVariant,
    columns: ColumnMapping,
    geometry: GeometryConfig,
    policy: InvalidRowPolicy,
    styles: StyleSheet,
}

impl Populator {
    /// Create a populator from a job configuration and its resolved styles
    #[must_use]
    pub fn new(config: &JobConfig, styles: StyleSheet) -> Self {
        Self {
            variant: config.variant,
            columns: config.columns.clone(),
            geometry: config.geometry,
            policy: config.policy.invalid_rows,
            styles,
        }
    }

    /// Taxonomy variant documents are built with
    #[must_use]
    pub const fn variant(&self) -> TaxonomyVariant {
        self.variant
    }

    /// Build the document for `group`.
    ///
    /// Every row adds an ODP marker and a customer marker, plus a line or a
    /// coverage polygon when the variant has them. A row is validated as a
    /// whole before anything is inserted, so a skipped row leaves no partial
    /// features behind.
    ///
    /// # Errors
    ///
    /// Returns the first row-level error under [`InvalidRowPolicy::Abort`],
    /// and [`FibermapError::Config`] if a slot does not resolve.
    pub fn build(&self, group: &ProjectGroup) -> Result<ProjectOutcome> {
        let (mut document, slots) =
            Taxonomy::build(self.variant, &group.project).into_document(&group.project);
        document.style_mode = self.styles.mode;
        if self.styles.mode == StyleMode::Shared {
            for style in self.shared_styles() {
                document.declare_style(style);
            }
        }

        let mut issues = Vec::new();
        for row in &group.rows {
            let features = match self.row_features(row) {
                Ok(features) => features,
                Err(err) if !err.is_row_level() => return Err(err),
                Err(err) => match self.policy {
                    InvalidRowPolicy::Abort => return Err(err),
                    InvalidRowPolicy::SkipRow => {
                        log::warn!("skipping row: {err}");
                        issues.extend(RowIssue::from_error(&err));
                        continue;
                    }
                    InvalidRowPolicy::SkipProject => {
                        log::warn!("skipping project '{}': {err}", group.project);
                        issues.extend(RowIssue::from_error(&err));
                        return Ok(ProjectOutcome::Skipped {
                            project: group.project.clone(),
                            issues,
                        });
                    }
                },
            };
            insert_row(&mut document, &slots, features)?;
        }

        log::debug!(
            "project '{}': {} feature(s) from {} row(s)",
            group.project,
            document.feature_count(),
            group.rows.len()
        );
        Ok(ProjectOutcome::Built { document, issues })
    }

    fn shared_styles(&self) -> Vec<&Arc<StyleDescriptor>> {
        let mut styles = vec![&self.styles.odp, &self.styles.household];
        if self.variant.has_connectivity() {
            styles.push(&self.styles.line);
        }
        if self.variant.has_coverage() {
            styles.push(&self.styles.polygon);
        }
        styles
    }

    fn row_features(&self, row: &InputRow) -> Result<RowFeatures> {
        row.check_labels(&self.columns)?;
        let odp_at = row.odp_coordinate()?;
        let customer_at = row.customer_coordinate()?;

        let description = row.description.clone().unwrap_or_default();
        let odp = PlacemarkEntry {
            name: row.odp.clone(),
            description: Some(format!("Deskripsi: {description}\nProject: {}", row.project)),
            coordinate: odp_at,
            style: Arc::clone(&self.styles.odp),
        };
        let customer = PlacemarkEntry {
            name: row.customer.clone(),
            description: None,
            coordinate: customer_at,
            style: Arc::clone(&self.styles.household),
        };

        let line = self.variant.has_connectivity().then(|| LineEntry {
            name: format!("{} - {}", row.odp, row.customer),
            description: Some(format!("ODP: {}\nPelanggan: {}", row.odp, row.customer)),
            coordinates: connect(odp_at, customer_at),
            style: Arc::clone(&self.styles.line),
        });

        let polygon = if self.variant.has_coverage() {
            let ring = boundary_ring(odp_at, self.geometry.radius_m, self.geometry.step_deg)
                .map_err(|issue| FibermapError::Geometry {
                    row: row.index,
                    project: row.project.clone(),
                    message: format!("coverage {issue}"),
                })?;
            Some(BoundaryPolygon {
                name: format!("BOUNDARY {}", row.odp),
                description: None,
                ring,
                style: Arc::clone(&self.styles.polygon),
            })
        } else {
            None
        };

        Ok(RowFeatures {
            odp,
            customer,
            line,
            polygon,
        })
    }
}

struct RowFeatures {
    odp: PlacemarkEntry,
    customer: PlacemarkEntry,
    line: Option<LineEntry>,
    polygon: Option<BoundaryPolygon>,
}

fn insert_row(document: &mut ProjectDocument, slots: &Slots, features: RowFeatures) -> Result<()> {
    document.insert(&slots.odp, Feature::Placemark(features.odp))?;
    document.insert(&slots.household, Feature::Placemark(features.customer))?;
    if let (Some(path), Some(line)) = (&slots.lines, features.line) {
        document.insert(path, Feature::Line(line))?;
    }
    if let (Some(path), Some(polygon)) = (&slots.coverage, features.polygon) {
        document.insert(path, Feature::Polygon(polygon))?;
    }
    Ok(())
}
