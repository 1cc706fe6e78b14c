//! # fibermap-core
//!
//! The transformation engine behind fibermap: it turns rows of fiber-network
//! assets (distribution points "ODP", customers and their coordinates) into
//! one hierarchical map document per project.
//!
//! The pipeline runs leaves first:
//!
//! 1. [`validate_columns`] rejects tables missing a required column.
//! 2. [`extract_rows`] reads typed [`InputRow`]s through a [`ColumnMapping`].
//! 3. [`partition`] groups rows by project, in discovery order.
//! 4. [`Taxonomy::build`] lays out the empty folder skeleton of a
//!    [`TaxonomyVariant`].
//! 5. [`Populator::build`] inserts markers, lines and coverage polygons
//!    into the skeleton's slots.
//!
//! Serialization and archiving live in `fibermap-kml` and `fibermap-archive`.
//!
//! ## Example
//!
//! ```
//! use fibermap_core::{
//!     extract_rows, partition, validate_columns, Cell, JobConfig, Populator, ProjectOutcome,
//!     StyleSheet, Table, TaxonomyVariant,
//! };
//!
//! let config = JobConfig::for_variant(TaxonomyVariant::FlatDual);
//! let columns = config.columns.all().into_iter().map(String::from).collect();
//! let text = |s: &str| Cell::Text(s.to_string());
//! let table = Table::new(
//!     columns,
//!     vec![vec![
//!         text("Cluster A"),
//!         text("Ruko"),
//!         text("ODP-01"),
//!         Cell::Number(-6.2),
//!         Cell::Number(106.8),
//!         text("Budi"),
//!         Cell::Number(-6.201),
//!         Cell::Number(106.801),
//!     ]],
//! );
//!
//! validate_columns(&table, &config.columns.required(config.variant))?;
//! let groups = partition(extract_rows(&table, &config.columns)?);
//! let populator = Populator::new(&config, StyleSheet::from_config(&config.styles)?);
//! match populator.build(&groups[0])? {
//!     ProjectOutcome::Built { document, .. } => assert_eq!(document.feature_count(), 2),
//!     ProjectOutcome::Skipped { .. } => unreachable!(),
//! }
//! # Ok::<(), fibermap_core::FibermapError>(())
//! ```

pub mod cancel;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod partition;
pub mod populate;
pub mod row;
pub mod style;
pub mod table;
pub mod taxonomy;
pub mod validate;

pub use cancel::CancellationToken;
pub use config::{
    CollisionPolicy, ColumnMapping, GeometryConfig, InvalidRowPolicy, JobConfig, OutputConfig,
    PolicyConfig, StyleConfig, StyleMode,
};
pub use document::{
    BoundaryPolygon, Feature, FolderNode, FolderPath, LineEntry, PlacemarkEntry, ProjectDocument,
};
pub use error::{FibermapError, Result, RowIssue};
pub use geometry::{boundary_ring, connect, Coordinate, GeometryIssue};
pub use partition::{partition, screen_projects, ProjectGroup};
pub use populate::{Populator, ProjectOutcome};
pub use row::{extract_rows, InputRow};
pub use style::{IconSource, StyleDescriptor, StyleKind, StyleSheet};
pub use table::{Cell, Table};
pub use taxonomy::{Slots, Taxonomy, TaxonomyVariant};
pub use validate::validate_columns;
