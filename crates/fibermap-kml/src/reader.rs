//! Reading produced KML back for inspection.
//!
//! Parsing goes through the `kml` crate, independent of the writer, so a
//! summary doubles as a check that the output is well-formed KML.

use crate::error::{KmlError, Result};
use serde::Serialize;
use std::io::{Cursor, Read};
use std::str::FromStr;

/// Counts gathered from one KML document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KmlSummary {
    /// Document name
    pub name: Option<String>,
    /// Folders at any depth
    pub folders: usize,
    /// Point placemarks
    pub points: usize,
    /// Line placemarks
    pub lines: usize,
    /// Polygon placemarks
    pub polygons: usize,
    /// Placemark names in document order
    pub placemarks: Vec<String>,
}

impl KmlSummary {
    /// Placemarks of any geometry
    #[must_use]
    pub const fn features(&self) -> usize {
        self.points + self.lines + self.polygons
    }
}

/// A non-KML archive entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveResource {
    /// Entry path inside the archive
    pub path: String,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Resource type (image, document, other)
    pub resource_type: String,
}

/// Everything found in an output archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// `.kml` entries with their summaries, in archive order
    pub documents: Vec<(String, KmlSummary)>,
    /// Every other file entry
    pub resources: Vec<ArchiveResource>,
}

/// Parse `text` and count its folders and placemarks.
///
/// # Errors
///
/// Returns [`KmlError::Parse`] if `text` is not valid KML.
pub fn summarize_kml(text: &str) -> Result<KmlSummary> {
    let kml = kml::Kml::<f64>::from_str(text)
        .map_err(|e| KmlError::Parse(format!("Failed to parse KML: {e}")))?;
    let mut summary = KmlSummary::default();
    collect(&kml, &mut summary);
    Ok(summary)
}

/// Summarize every entry of a ZIP archive held in memory.
///
/// # Errors
///
/// Returns [`KmlError::Zip`] for unreadable archives and [`KmlError::Parse`]
/// naming the entry for invalid KML.
pub fn inspect_archive(bytes: &[u8]) -> Result<ArchiveSummary> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut summary = ArchiveSummary::default();

    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let name = file.name().to_string();
        if file.is_dir() {
            continue;
        }
        let is_kml = std::path::Path::new(&name)
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("kml"));
        if is_kml {
            let mut text = String::new();
            file.read_to_string(&mut text)?;
            let kml = summarize_kml(&text).map_err(|e| KmlError::Parse(format!("{name}: {e}")))?;
            summary.documents.push((name, kml));
        } else {
            summary.resources.push(ArchiveResource {
                resource_type: classify_resource(&name).to_string(),
                size: file.size(),
                path: name,
            });
        }
    }

    log::debug!(
        "inspected archive: {} document(s), {} resource(s)",
        summary.documents.len(),
        summary.resources.len()
    );
    Ok(summary)
}

#[inline]
fn classify_resource(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" => "image",
        "xml" | "txt" | "html" | "htm" | "md" | "csv" | "xlsx" | "xls" => "document",
        _ => "other",
    }
}

fn element_text(elements: &[kml::Kml], tag: &str) -> Option<String> {
    elements.iter().find_map(|e| match e {
        kml::Kml::Element(element) if element.name == tag => element.content.clone(),
        _ => None,
    })
}

fn collect(kml: &kml::Kml, summary: &mut KmlSummary) {
    use kml::types::Geometry;

    match kml {
        kml::Kml::KmlDocument(doc) => {
            for element in &doc.elements {
                collect(element, summary);
            }
        }
        kml::Kml::Document { attrs, elements } => {
            if summary.name.is_none() {
                summary.name = attrs.get("name").cloned().or_else(|| element_text(elements, "name"));
            }
            for element in elements {
                collect(element, summary);
            }
        }
        kml::Kml::Folder(folder) => {
            summary.folders += 1;
            for element in &folder.elements {
                collect(element, summary);
            }
        }
        kml::Kml::Placemark(placemark) => {
            match &placemark.geometry {
                Some(Geometry::Point(_)) => summary.points += 1,
                Some(Geometry::LineString(_)) => summary.lines += 1,
                Some(Geometry::Polygon(_)) => summary.polygons += 1,
                _ => {}
            }
            summary.placemarks.push(placemark.name.clone().unwrap_or_default());
        }
        _ => {}
    }
}
