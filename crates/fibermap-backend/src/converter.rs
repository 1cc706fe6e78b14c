//! Table-to-archive conversion pipeline
//!
//! [`Converter`] runs one job: column validation, row extraction,
//! partitioning, per-project build and serialization (on the rayon pool),
//! then sequential archiving in project discovery order.

use crate::loader::load_table;
use fibermap_archive::OutputArchive;
use fibermap_core::{
    extract_rows, partition, screen_projects, validate_columns, CancellationToken, FibermapError,
    JobConfig, Populator, ProjectGroup, ProjectOutcome, Result, RowIssue, StyleSheet, Table,
    TaxonomyVariant,
};
use fibermap_kml::KmlSerializer;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback invoked with each archive entry name as it is written
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// One document written to the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Project identifier
    pub project: String,
    /// Archive entry holding the document
    pub entry: String,
    /// Rows of the project that made it into the document
    pub rows: usize,
    /// Placemarks, lines and polygons in the document
    pub features: usize,
}

/// What a job did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    /// Taxonomy every document follows
    pub variant: TaxonomyVariant,
    /// Non-blank data rows read from the table
    pub rows: usize,
    /// Documents in archive order
    pub projects: Vec<ProjectSummary>,
    /// Projects left out under the skip-project policy
    pub skipped_projects: Vec<String>,
    /// Rows left out, with the reason
    pub issues: Vec<RowIssue>,
    /// Auxiliary entries under `assets/`
    pub assets: Vec<String>,
    /// Wall-clock time of the job
    pub latency: Duration,
}

impl JobReport {
    /// Total features over all documents
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.projects.iter().map(|p| p.features).sum()
    }
}

/// Archive bytes plus the report of the job that produced them
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Finished ZIP archive
    pub archive: Vec<u8>,
    /// Job report
    pub report: JobReport,
}

impl ConversionOutput {
    /// Write the archive to `path`
    ///
    /// # Errors
    /// Returns [`FibermapError::Io`] if the file cannot be written.
    pub fn save_archive<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.archive)?;
        Ok(())
    }
}

/// Per-project result before archiving
enum Rendered {
    Document {
        project: String,
        rows: usize,
        features: usize,
        bytes: Vec<u8>,
        issues: Vec<RowIssue>,
    },
    Skipped {
        project: String,
        issues: Vec<RowIssue>,
    },
}

/// Converts ODP/customer tables into zipped KML documents
pub struct Converter {
    config: JobConfig,
    populator: Populator,
    serializer: KmlSerializer,
    cancel: CancellationToken,
    assets: Vec<(String, Vec<u8>)>,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("assets", &self.assets.len())
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Create a converter for `config`.
    ///
    /// # Errors
    /// Returns [`FibermapError::Config`] if the configuration is invalid or an
    /// icon source cannot be resolved.
    #[must_use = "creating a converter that is not used is a waste of resources"]
    pub fn new(config: JobConfig) -> Result<Self> {
        config.validate()?;
        let styles = StyleSheet::from_config(&config.styles)?;
        let populator = Populator::new(&config, styles);
        Ok(Self {
            config,
            populator,
            serializer: KmlSerializer::new(),
            cancel: CancellationToken::new(),
            assets: Vec::new(),
            progress: None,
        })
    }

    /// Stop the job once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Bundle an auxiliary file under `assets/`
    #[must_use]
    pub fn with_asset(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.push((name.into(), bytes));
        self
    }

    /// Report every archive entry as it is written
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The job configuration
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Load the table at `path` and convert it
    ///
    /// # Errors
    /// Returns [`FibermapError::Input`] or [`FibermapError::Io`] if the table
    /// cannot be loaded, otherwise as [`Converter::convert_table`].
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConversionOutput> {
        let table = load_table(path)?;
        self.convert_table(&table)
    }

    /// Convert a loaded table into an archive.
    ///
    /// # Errors
    /// Returns the first fatal error in project order: a schema error, a row
    /// error under the abort policy, a name collision, cancellation, or a
    /// serialization failure. No archive is produced in that case.
    pub fn convert_table(&self, table: &Table) -> Result<ConversionOutput> {
        let start = Instant::now();
        let config = &self.config;

        validate_columns(table, &config.columns.required(config.variant))?;
        let rows = extract_rows(table, &config.columns)?;
        let row_count = rows.len();
        let (rows, mut issues) = screen_projects(rows, &config.columns, config.policy.invalid_rows)?;
        let groups = partition(rows);
        log::debug!(
            "{row_count} row(s) in {} project(s), variant {}",
            groups.len(),
            config.variant
        );

        let rendered: Vec<Result<Rendered>> = if config.output.parallel {
            groups.par_iter().map(|g| self.render(g)).collect()
        } else {
            groups.iter().map(|g| self.render(g)).collect()
        };
        let rendered = rendered.into_iter().collect::<Result<Vec<_>>>()?;
        self.cancel.check()?;

        let mut archive = OutputArchive::new(&config.output.extension, config.policy.collisions);
        let mut projects = Vec::with_capacity(rendered.len());
        let mut skipped_projects = Vec::new();
        for item in rendered {
            match item {
                Rendered::Document {
                    project,
                    rows,
                    features,
                    bytes,
                    issues: row_issues,
                } => {
                    let entry = archive.add_document(&project, &bytes)?;
                    if let Some(progress) = &self.progress {
                        progress(&entry);
                    }
                    issues.extend(row_issues);
                    projects.push(ProjectSummary {
                        project,
                        entry,
                        rows,
                        features,
                    });
                }
                Rendered::Skipped {
                    project,
                    issues: row_issues,
                } => {
                    issues.extend(row_issues);
                    skipped_projects.push(project);
                }
            }
        }

        let mut assets = Vec::with_capacity(self.assets.len());
        for (name, bytes) in &self.assets {
            assets.push(archive.add_asset(name, bytes)?);
        }
        let bytes = archive.finish()?;

        let report = JobReport {
            variant: config.variant,
            rows: row_count,
            projects,
            skipped_projects,
            issues,
            assets,
            latency: start.elapsed(),
        };
        log::info!(
            "converted {} row(s) into {} document(s) ({} skipped project(s), {} row issue(s)) in {:.2?}",
            report.rows,
            report.projects.len(),
            report.skipped_projects.len(),
            report.issues.len(),
            report.latency
        );
        Ok(ConversionOutput {
            archive: bytes,
            report,
        })
    }

    /// Build and serialize one project
    fn render(&self, group: &ProjectGroup) -> Result<Rendered> {
        self.cancel.check()?;
        match self.populator.build(group)? {
            ProjectOutcome::Built { document, issues } => {
                let bytes = self
                    .serializer
                    .serialize_document(&document)
                    .map_err(FibermapError::from)?;
                log::debug!(
                    "project '{}': {} feature(s), {} bytes",
                    document.project,
                    document.feature_count(),
                    bytes.len()
                );
                Ok(Rendered::Document {
                    project: group.project.clone(),
                    rows: group.rows.len() - issues.len(),
                    features: document.feature_count(),
                    bytes,
                    issues,
                })
            }
            ProjectOutcome::Skipped { project, issues } => {
                log::warn!("project '{project}' skipped");
                Ok(Rendered::Skipped { project, issues })
            }
        }
    }
}
