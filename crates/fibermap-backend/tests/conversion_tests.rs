//! End-to-end conversions from files on disk to inspected archives.

use fibermap_backend::{Converter, JobReport};
use fibermap_core::{CollisionPolicy, FibermapError, JobConfig, StyleMode, TaxonomyVariant};
use fibermap_kml::inspect_archive;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str =
    "NAMA PROJECT,Deskripsi,ODP,LAT ODP,LONG ODP,name,LAT PELANGGAN,LONG PELANGGAN";

fn write_csv(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

fn sample(dir: &TempDir) -> PathBuf {
    write_csv(
        dir,
        "odp.csv",
        &[
            HEADER,
            "Cluster A,Ruko,ODP-A1,-6.2,106.8,Budi,-6.2005,106.8005",
            "Cluster B,,ODP-B1,-6.3,106.9,Sari,-6.3005,106.9005",
            "Cluster A,Ruko,ODP-A2,-6.21,106.81,Andi,-6.2105,106.8105",
            ",,,,,,,",
        ],
    )
}

fn convert(config: JobConfig, path: &Path) -> (Vec<u8>, JobReport) {
    let output = Converter::new(config).unwrap().convert_file(path).unwrap();
    (output.archive, output.report)
}

#[test]
fn test_entry_per_project_in_discovery_order() {
    let dir = TempDir::new().unwrap();
    let (archive, report) = convert(JobConfig::default(), &sample(&dir));

    assert_eq!(report.rows, 3);
    let summary = inspect_archive(&archive).unwrap();
    let names: Vec<&str> = summary.documents.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Cluster A.kml", "Cluster B.kml"]);

    let (_, a) = &summary.documents[0];
    assert_eq!(a.name.as_deref(), Some("Cluster A"));
    assert_eq!(a.folders, 17);
    assert_eq!(a.points, 4);
    assert_eq!(a.lines, 0);
    assert_eq!(a.polygons, 0);
}

#[test]
fn test_coverage_and_connectivity_counts() {
    let dir = TempDir::new().unwrap();
    let path = sample(&dir);

    let (archive, _) = convert(JobConfig::for_variant(TaxonomyVariant::WithConnectivity), &path);
    let summary = inspect_archive(&archive).unwrap();
    assert_eq!(summary.documents[0].1.lines, 2);

    let (archive, report) = convert(JobConfig::for_variant(TaxonomyVariant::WithCoverage), &path);
    let summary = inspect_archive(&archive).unwrap();
    assert_eq!(summary.documents[0].1.polygons, 2);
    assert_eq!(summary.documents[1].1.polygons, 1);
    assert_eq!(report.feature_count(), 9);
}

#[test]
fn test_missing_name_column() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "broken.csv",
        &[
            "NAMA PROJECT,Deskripsi,ODP,LAT ODP,LONG ODP,LAT PELANGGAN,LONG PELANGGAN",
            "Cluster A,Ruko,ODP-A1,-6.2,106.8,-6.2005,106.8005",
        ],
    );
    let err = Converter::new(JobConfig::default())
        .unwrap()
        .convert_file(&path)
        .unwrap_err();
    assert!(err.to_string().contains("name"));
    match err {
        FibermapError::Schema { missing } => assert_eq!(missing, vec!["name".to_string()]),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn test_collision_policies() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "clash.csv",
        &[
            HEADER,
            "A/B,x,ODP-1,-6.2,106.8,Budi,-6.2,106.8",
            "a:b,x,ODP-2,-6.2,106.8,Sari,-6.2,106.8",
        ],
    );

    let err = Converter::new(JobConfig::default())
        .unwrap()
        .convert_file(&path)
        .unwrap_err();
    assert!(matches!(err, FibermapError::NameCollision { .. }));

    let mut config = JobConfig::default();
    config.policy.collisions = CollisionPolicy::Suffix;
    let (_, report) = convert(config, &path);
    let entries: Vec<&str> = report.projects.iter().map(|p| p.entry.as_str()).collect();
    assert_eq!(entries, vec!["A_B.kml", "a_b (2).kml"]);
}

#[test]
fn test_archive_bytes_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = sample(&dir);
    let (first, _) = convert(JobConfig::for_variant(TaxonomyVariant::Precise), &path);
    let (second, _) = convert(JobConfig::for_variant(TaxonomyVariant::Precise), &path);
    assert_eq!(first, second);
}

#[test]
fn test_inline_style_mode_reads_back() {
    let dir = TempDir::new().unwrap();
    let mut config = JobConfig::default();
    config.styles.mode = StyleMode::Inline;
    let (archive, _) = convert(config, &sample(&dir));
    let summary = inspect_archive(&archive).unwrap();
    assert_eq!(summary.documents.len(), 2);
    assert_eq!(summary.documents[1].1.points, 2);
}

#[test]
fn test_empty_table_gives_empty_archive() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "empty.csv", &[HEADER]);
    let (archive, report) = convert(JobConfig::default(), &path);
    assert!(report.projects.is_empty());
    assert!(inspect_archive(&archive).unwrap().documents.is_empty());
}

#[test]
fn test_unsupported_input_file() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "notes.docx", &["hello"]);
    let err = Converter::new(JobConfig::default())
        .unwrap()
        .convert_file(&path)
        .unwrap_err();
    assert!(matches!(err, FibermapError::Input(_)));
}
