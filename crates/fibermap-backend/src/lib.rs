//! Table loaders and the conversion pipeline for fibermap
//!
//! This crate turns an input file into the finished archive:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────────┐
//! │ CsvBackend   │   │              │   │ Converter                    │
//! │ Spreadsheet- │──▶│    Table     │──▶│  validate → partition →      │
//! │ Backend      │   │              │   │  populate ∥ serialize → zip  │
//! └──────────────┘   └──────────────┘   └──────────────────────────────┘
//! ```
//!
//! | Format | Backend | Notes |
//! |--------|---------|-------|
//! | CSV/TSV | [`CsvBackend`] | delimiter sniffed among `, ; \t \|` |
//! | XLSX/XLSM | [`SpreadsheetBackend`] | first worksheet |
//! | XLS | [`SpreadsheetBackend`] | first worksheet |
//!
//! ## Example
//!
//! ```
//! use fibermap_backend::{load_table_bytes, Converter, TableFormat};
//! use fibermap_core::{JobConfig, TaxonomyVariant};
//!
//! let csv = "NAMA PROJECT,ODP,LAT ODP,LONG ODP,name,LAT PELANGGAN,LONG PELANGGAN\n\
//!            Cluster A,ODP-01,-6.2,106.8,Budi,-6.201,106.801\n";
//! let table = load_table_bytes(TableFormat::Csv, csv.as_bytes())?;
//!
//! let converter = Converter::new(JobConfig::for_variant(TaxonomyVariant::FlatDual))?;
//! let output = converter.convert_table(&table)?;
//! assert_eq!(output.report.projects[0].entry, "Cluster A.kml");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod converter;
pub mod csv;
pub mod error;
pub mod format;
pub mod loader;
pub mod traits;
pub mod xlsx;

pub use crate::converter::{
    ConversionOutput, Converter, JobReport, ProgressCallback, ProjectSummary,
};
pub use crate::csv::CsvBackend;
pub use crate::error::{BackendError, Result};
pub use crate::format::TableFormat;
pub use crate::loader::{load_table, load_table_bytes};
pub use crate::traits::TableBackend;
pub use crate::xlsx::SpreadsheetBackend;
