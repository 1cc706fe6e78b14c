//! Serialized documents parse back with the `kml` crate and keep their counts.

use fibermap_core::{
    InputRow, JobConfig, Populator, ProjectDocument, ProjectGroup, ProjectOutcome, StyleSheet,
    TaxonomyVariant,
};
use fibermap_kml::{serialize, summarize_kml};

fn rows(project: &str, n: usize) -> Vec<InputRow> {
    (0..n)
        .map(|i| InputRow {
            index: i,
            project: project.to_string(),
            description: Some(format!("Tiang {i}")),
            odp: format!("ODP-{i:02}"),
            odp_lat: -6.2 + i as f64 * 0.001,
            odp_lon: 106.8,
            customer: format!("Pelanggan {i}"),
            customer_lat: -6.2005,
            customer_lon: 106.8005,
        })
        .collect()
}

fn build(variant: TaxonomyVariant, n: usize) -> ProjectDocument {
    let config = JobConfig::for_variant(variant);
    let populator = Populator::new(&config, StyleSheet::from_config(&config.styles).unwrap());
    let group = ProjectGroup {
        project: "Cluster A".to_string(),
        rows: rows("Cluster A", n),
    };
    match populator.build(&group).unwrap() {
        ProjectOutcome::Built { document, .. } => document,
        ProjectOutcome::Skipped { .. } => panic!("valid rows skipped"),
    }
}

#[test]
fn test_every_variant_reads_back() {
    let expected_folders = [
        (TaxonomyVariant::FlatDual, 2),
        (TaxonomyVariant::FullStructure, 17),
        (TaxonomyVariant::Precise, 19),
        (TaxonomyVariant::WithConnectivity, 17),
        (TaxonomyVariant::WithCoverage, 19),
    ];
    for (variant, folders) in expected_folders {
        let doc = build(variant, 3);
        let text = String::from_utf8(serialize(&doc).unwrap()).unwrap();
        let summary = summarize_kml(&text).unwrap();

        assert_eq!(summary.folders, folders, "{variant}: folders");
        assert_eq!(summary.points, 6, "{variant}: points");
        let lines = if variant.has_connectivity() { 3 } else { 0 };
        let polygons = if variant.has_coverage() { 3 } else { 0 };
        assert_eq!(summary.lines, lines, "{variant}: lines");
        assert_eq!(summary.polygons, polygons, "{variant}: polygons");
        assert_eq!(summary.features(), doc.feature_count(), "{variant}: features");
    }
}

#[test]
fn test_placemark_names_in_document_order() {
    let doc = build(TaxonomyVariant::FlatDual, 2);
    let text = String::from_utf8(serialize(&doc).unwrap()).unwrap();
    let summary = summarize_kml(&text).unwrap();
    // EXISTING precedes HOUSEHOLD
    assert_eq!(
        summary.placemarks,
        vec!["ODP-00", "ODP-01", "Pelanggan 0", "Pelanggan 1"]
    );
}

#[test]
fn test_odp_coordinate_is_longitude_first() {
    let doc = build(TaxonomyVariant::FullStructure, 1);
    let text = String::from_utf8(serialize(&doc).unwrap()).unwrap();
    assert!(text.contains("<coordinates>106.8,-6.2,0</coordinates>"));
    assert!(text.contains("<coordinates>106.8005,-6.2005,0</coordinates>"));
}
