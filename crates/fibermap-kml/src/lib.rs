//! # fibermap-kml
//!
//! KML output for fibermap project documents, and a reader that parses
//! produced documents and archives back into summary counts.
//!
//! ## Example
//!
//! ```
//! use fibermap_core::{Taxonomy, TaxonomyVariant};
//! use fibermap_kml::{summarize_kml, KmlSerializer};
//!
//! let (doc, _) = Taxonomy::build(TaxonomyVariant::FullStructure, "P1").into_document("P1");
//! let text = KmlSerializer::new().serialize_to_string(&doc)?;
//! assert!(text.contains("<name>NEW PLANNING</name>"));
//!
//! let summary = summarize_kml(&text)?;
//! assert_eq!(summary.folders, 17);
//! assert_eq!(summary.features(), 0);
//! # Ok::<(), fibermap_kml::KmlError>(())
//! ```

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{KmlError, Result};
pub use reader::{inspect_archive, summarize_kml, ArchiveResource, ArchiveSummary, KmlSummary};
pub use writer::{serialize, KmlOptions, KmlSerializer, KML_NAMESPACE};
