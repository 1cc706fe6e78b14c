//! KML 2.2 serialization of project documents.
//!
//! Output is a pure function of the document: the same document always
//! yields the same bytes. Coordinates are written longitude first with a
//! fixed altitude of `0`, using the shortest representation that round-trips
//! the `f64`.

use crate::error::Result;
use fibermap_core::{
    Coordinate, Feature, FolderNode, ProjectDocument, StyleDescriptor, StyleKind, StyleMode,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Write;

/// KML 2.2 namespace
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Options for KML serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KmlOptions {
    /// Spaces per nesting level; 0 writes everything on one line
    pub indent: usize,
}

impl Default for KmlOptions {
    #[inline]
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// KML serializer for [`ProjectDocument`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KmlSerializer {
    options: KmlOptions,
}

impl KmlSerializer {
    /// Create a serializer with default options (2-space indentation)
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer with custom options
    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: KmlOptions) -> Self {
        Self { options }
    }

    /// Serialize `doc` to UTF-8 KML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Xml`](crate::KmlError::Xml) if the XML writer fails.
    pub fn serialize_document(&self, doc: &ProjectDocument) -> Result<Vec<u8>> {
        let mut writer = if self.options.indent == 0 {
            Writer::new(Vec::new())
        } else {
            Writer::new_with_indent(Vec::new(), b' ', self.options.indent)
        };
        write_document(&mut writer, doc)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        log::debug!("serialized '{}' to {} bytes of KML", doc.project, bytes.len());
        Ok(bytes)
    }

    /// Serialize `doc` to a KML string.
    ///
    /// # Errors
    ///
    /// See [`KmlSerializer::serialize_document`].
    pub fn serialize_to_string(&self, doc: &ProjectDocument) -> Result<String> {
        let bytes = self.serialize_document(doc)?;
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }
}

/// Serialize `doc` with default options.
///
/// # Errors
///
/// See [`KmlSerializer::serialize_document`].
pub fn serialize(doc: &ProjectDocument) -> Result<Vec<u8>> {
    KmlSerializer::new().serialize_document(doc)
}

fn start<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    start(writer, tag)?;
    writer.write_event(Event::Text(BytesText::new(&xml_text(text))))?;
    end(writer, tag)
}

/// Characters allowed by the XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Replace characters XML 1.0 cannot carry (control codes from spreadsheet
/// cells, mostly) with a space.
fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if is_xml_char(c) { c } else { ' ' })
                .collect(),
        )
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn coordinate_text(coords: impl IntoIterator<Item = Coordinate>) -> String {
    coords
        .into_iter()
        .map(|c| format!("{},{},0", c.longitude, c.latitude))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_document<W: Write>(writer: &mut Writer<W>, doc: &ProjectDocument) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    start(writer, "Document")?;
    text_element(writer, "name", &doc.project)?;

    if doc.style_mode == StyleMode::Shared {
        for style in &doc.styles {
            write_style(writer, style, true)?;
        }
    }
    for folder in &doc.folders {
        write_folder(writer, folder, doc.style_mode)?;
    }

    end(writer, "Document")?;
    end(writer, "kml")
}

fn write_style<W: Write>(writer: &mut Writer<W>, style: &StyleDescriptor, with_id: bool) -> Result<()> {
    let open = if with_id {
        BytesStart::new("Style").with_attributes([("id", style.id.as_str())])
    } else {
        BytesStart::new("Style")
    };
    writer.write_event(Event::Start(open))?;
    match &style.kind {
        StyleKind::Icon { href, scale } => {
            start(writer, "IconStyle")?;
            text_element(writer, "scale", &scale.to_string())?;
            start(writer, "Icon")?;
            text_element(writer, "href", href)?;
            end(writer, "Icon")?;
            end(writer, "IconStyle")?;
        }
        StyleKind::Line { color, width } => {
            start(writer, "LineStyle")?;
            text_element(writer, "color", color)?;
            text_element(writer, "width", &width.to_string())?;
            end(writer, "LineStyle")?;
        }
        StyleKind::Polygon {
            fill,
            outline,
            width,
        } => {
            start(writer, "LineStyle")?;
            text_element(writer, "color", outline)?;
            text_element(writer, "width", &width.to_string())?;
            end(writer, "LineStyle")?;
            start(writer, "PolyStyle")?;
            text_element(writer, "color", fill)?;
            end(writer, "PolyStyle")?;
        }
    }
    end(writer, "Style")
}

fn write_folder<W: Write>(writer: &mut Writer<W>, folder: &FolderNode, mode: StyleMode) -> Result<()> {
    start(writer, "Folder")?;
    text_element(writer, "name", &folder.name)?;
    text_element(writer, "visibility", flag(folder.visible))?;
    text_element(writer, "open", flag(folder.open))?;
    for child in &folder.folders {
        write_folder(writer, child, mode)?;
    }
    for feature in &folder.features {
        write_placemark(writer, feature, mode)?;
    }
    end(writer, "Folder")
}

fn write_placemark<W: Write>(writer: &mut Writer<W>, feature: &Feature, mode: StyleMode) -> Result<()> {
    start(writer, "Placemark")?;
    text_element(writer, "name", feature.name())?;
    if let Some(description) = feature.description() {
        text_element(writer, "description", description)?;
    }
    match mode {
        StyleMode::Shared => text_element(writer, "styleUrl", &format!("#{}", feature.style().id))?,
        StyleMode::Inline => write_style(writer, feature.style(), false)?,
    }

    match feature {
        Feature::Placemark(p) => {
            start(writer, "Point")?;
            text_element(writer, "coordinates", &coordinate_text([p.coordinate]))?;
            end(writer, "Point")?;
        }
        Feature::Line(l) => {
            start(writer, "LineString")?;
            text_element(writer, "tessellate", "1")?;
            text_element(writer, "coordinates", &coordinate_text(l.coordinates))?;
            end(writer, "LineString")?;
        }
        Feature::Polygon(p) => {
            // rings are stored open; KML wants the first vertex repeated
            let closed = p.ring.iter().chain(p.ring.first()).copied();
            start(writer, "Polygon")?;
            start(writer, "outerBoundaryIs")?;
            start(writer, "LinearRing")?;
            text_element(writer, "coordinates", &coordinate_text(closed))?;
            end(writer, "LinearRing")?;
            end(writer, "outerBoundaryIs")?;
            end(writer, "Polygon")?;
        }
    }
    end(writer, "Placemark")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibermap_core::{
        FolderPath, JobConfig, LineEntry, PlacemarkEntry, Populator, ProjectGroup, ProjectOutcome,
        StyleSheet, Taxonomy, TaxonomyVariant,
    };
    use std::sync::Arc;

    fn sheet() -> StyleSheet {
        StyleSheet::from_config(&JobConfig::default().styles).unwrap()
    }

    fn flat_doc() -> ProjectDocument {
        let (mut doc, slots) = Taxonomy::build(TaxonomyVariant::FlatDual, "P1").into_document("P1");
        let styles = sheet();
        doc.declare_style(&styles.odp);
        doc.insert(
            &slots.odp,
            Feature::Placemark(PlacemarkEntry {
                name: "ODP <1> & co".to_string(),
                description: Some("Deskripsi: x\nProject: P1".to_string()),
                coordinate: Coordinate::new(106.8, -6.2).unwrap(),
                style: Arc::clone(&styles.odp),
            }),
        )
        .unwrap();
        doc
    }

    #[test]
    fn test_document_layout() {
        let kml = KmlSerializer::new().serialize_to_string(&flat_doc()).unwrap();
        assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(kml.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(kml.contains("<name>P1</name>"));
        assert!(kml.contains("<Style id=\"odp\">"));
        assert!(kml.contains("<styleUrl>#odp</styleUrl>"));
        assert!(kml.contains("<coordinates>106.8,-6.2,0</coordinates>"));
        assert!(kml.contains("<visibility>1</visibility>"));
        assert!(kml.contains("<open>0</open>"));
        assert!(kml.trim_end().ends_with("</kml>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let kml = serialize(&flat_doc()).unwrap();
        let kml = String::from_utf8(kml).unwrap();
        assert!(kml.contains("<name>ODP &lt;1&gt; &amp; co</name>"));
        assert!(!kml.contains("ODP <1>"));
    }

    #[test]
    fn test_control_characters_replaced() {
        assert_eq!(xml_text("plain"), Cow::Borrowed("plain"));
        assert_eq!(xml_text("a\u{b}b\u{1}"), "a b ");
        assert_eq!(xml_text("tab\there\r\n"), "tab\there\r\n");
        assert_eq!(xml_text("\u{FFFE}\u{1F600}"), " \u{1F600}");
    }

    #[test]
    fn test_control_characters_from_rows_stay_well_formed() {
        let config = JobConfig::for_variant(TaxonomyVariant::FlatDual);
        let populator = Populator::new(&config, sheet());
        let group = ProjectGroup {
            project: "P".to_string(),
            rows: vec![fibermap_core::InputRow {
                index: 0,
                project: "P".to_string(),
                description: Some("Ruko\u{b}blok A".to_string()),
                odp: "ODP-1".to_string(),
                odp_lat: -6.2,
                odp_lon: 106.8,
                customer: "Budi\u{1}".to_string(),
                customer_lat: -6.2005,
                customer_lon: 106.8005,
            }],
        };
        let ProjectOutcome::Built { document, .. } = populator.build(&group).unwrap() else {
            panic!("project skipped");
        };
        let kml = KmlSerializer::new().serialize_to_string(&document).unwrap();
        assert!(!kml.contains('\u{b}'));
        assert!(!kml.contains('\u{1}'));
        assert!(kml.contains("Ruko blok A"));
        assert!(kml.contains("<name>Budi </name>"));

        let parsed = roxmltree::Document::parse(&kml).unwrap();
        let placemarks = parsed
            .descendants()
            .filter(|n| n.has_tag_name("Placemark"))
            .count();
        assert_eq!(placemarks, 2);
        assert_eq!(crate::summarize_kml(&kml).unwrap().points, 2);
    }

    #[test]
    fn test_deterministic() {
        let doc = flat_doc();
        assert_eq!(serialize(&doc).unwrap(), serialize(&doc).unwrap());
    }

    #[test]
    fn test_hidden_folder_flags() {
        let (doc, _) = Taxonomy::build(TaxonomyVariant::Precise, "P").into_document("P");
        let kml = KmlSerializer::with_options(KmlOptions { indent: 0 })
            .serialize_to_string(&doc)
            .unwrap();
        assert!(kml.contains(
            "<Folder><name>NEW PLANNING</name><visibility>0</visibility><open>0</open>"
        ));
        assert!(kml.contains("<Folder><name>P</name><visibility>1</visibility><open>1</open>"));
        assert!(kml.contains("<name>HOUSHOLD</name>"));
    }

    #[test]
    fn test_line_and_inline_style() {
        let (mut doc, _) = Taxonomy::build(TaxonomyVariant::WithConnectivity, "P").into_document("P");
        doc.style_mode = StyleMode::Inline;
        let styles = sheet();
        doc.insert(
            &FolderPath::new(["EXISTING", "DISTRIBUSI"]),
            Feature::Line(LineEntry {
                name: "A - B".to_string(),
                description: None,
                coordinates: [
                    Coordinate::new(1.5, 2.0).unwrap(),
                    Coordinate::new(1.25, 2.5).unwrap(),
                ],
                style: Arc::clone(&styles.line),
            }),
        )
        .unwrap();
        let kml = KmlSerializer::with_options(KmlOptions { indent: 0 })
            .serialize_to_string(&doc)
            .unwrap();
        assert!(kml.contains("<tessellate>1</tessellate><coordinates>1.5,2,0 1.25,2.5,0</coordinates>"));
        assert!(kml.contains("<Style><LineStyle><color>ff0000ff</color><width>2</width></LineStyle></Style>"));
        assert!(!kml.contains("styleUrl"));
        assert!(!kml.contains("<Style id="));
    }

    #[test]
    fn test_polygon_ring_closed() {
        let config = JobConfig::for_variant(TaxonomyVariant::WithCoverage);
        let populator = Populator::new(&config, sheet());
        let group = ProjectGroup {
            project: "P".to_string(),
            rows: vec![fibermap_core::InputRow {
                index: 0,
                project: "P".to_string(),
                description: None,
                odp: "O".to_string(),
                odp_lat: 0.0,
                odp_lon: 0.0,
                customer: "C".to_string(),
                customer_lat: 0.0,
                customer_lon: 0.0,
            }],
        };
        let ProjectOutcome::Built { document, .. } = populator.build(&group).unwrap() else {
            panic!("project skipped");
        };
        let kml = serialize(&document).unwrap();
        let kml = String::from_utf8(kml).unwrap();
        let ring = kml
            .split("<LinearRing>")
            .nth(1)
            .and_then(|rest| rest.split("<coordinates>").nth(1))
            .and_then(|rest| rest.split("</coordinates>").next())
            .unwrap();
        let points: Vec<&str> = ring.split_whitespace().collect();
        assert_eq!(points.len(), 37);
        assert_eq!(points.first(), points.last());
        assert!(kml.contains("<styleUrl>#boundary</styleUrl>"));
        assert!(kml.contains("<color>4d00ff00</color>"));
    }
}
