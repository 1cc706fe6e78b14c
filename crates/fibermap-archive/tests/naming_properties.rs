//! Entry naming properties over arbitrary project identifiers.

use fibermap_archive::{entry_name, list_zip_contents, OutputArchive};
use fibermap_core::CollisionPolicy;
use proptest::prelude::*;
use std::collections::HashSet;

/// Property: entry names are never blank and never carry unsafe characters
#[test]
fn proptest_entry_name_is_safe() {
    proptest!(|(project in "\\PC{0,40}")| {
        let name = entry_name(&project, "kml");
        let stem = name.strip_suffix(".kml").unwrap();
        prop_assert!(!stem.is_empty());
        prop_assert!(!stem.chars().any(|c| "/\\:*?\"<>|".contains(c) || c.is_control()));
        prop_assert_eq!(stem.trim(), stem);
    });
}

/// Property: with suffixing, every project gets its own entry
#[test]
fn proptest_suffix_policy_keeps_every_project() {
    proptest!(ProptestConfig::with_cases(64), |(projects in prop::collection::hash_set("[aA/:]{1,3}", 1..12))| {
        let mut archive = OutputArchive::new("kml", CollisionPolicy::Suffix);
        for project in &projects {
            archive.add_document(project, b"<kml/>").unwrap();
        }
        let bytes = archive.finish().unwrap();
        let files = list_zip_contents(&bytes).unwrap();
        prop_assert_eq!(files.len(), projects.len());

        let lowered: HashSet<String> = files.iter().map(|f| f.name.to_lowercase()).collect();
        prop_assert_eq!(lowered.len(), files.len());
    });
}
