//! # fibermap-archive
//!
//! Packages serialized project documents into one ZIP archive.
//!
//! Each project becomes one entry named after its identifier (see
//! [`entry_name`]). Two projects that clean up to the same name (compared
//! case-insensitively) are rejected by default or suffixed with ` (2)`,
//! ` (3)` and so on under [`CollisionPolicy::Suffix`](fibermap_core::CollisionPolicy::Suffix).
//!
//! ## Example
//!
//! ```
//! use fibermap_archive::{list_zip_contents, OutputArchive};
//! use fibermap_core::CollisionPolicy;
//!
//! let mut archive = OutputArchive::new("kml", CollisionPolicy::Reject);
//! archive.add_document("Cluster A", b"<kml/>")?;
//! let bytes = archive.finish()?;
//! assert_eq!(list_zip_contents(&bytes)?[0].name, "Cluster A.kml");
//! # Ok::<(), fibermap_archive::ArchiveError>(())
//! ```

pub mod error;
pub mod naming;
pub mod zip;

pub use crate::zip::{list_zip_contents, FileInfo, OutputArchive, ASSET_DIR};
pub use error::{ArchiveError, Result};
pub use naming::{entry_name, entry_stem, EntryNamer, UNNAMED};
