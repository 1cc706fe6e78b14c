//! Folder taxonomies.
//!
//! Each [`TaxonomyVariant`] fixes the complete folder skeleton of a project
//! document before any feature is inserted. Many folders stay empty on
//! purpose: downstream planners expect the full layer list to exist so they
//! can draw new infrastructure into it.
//!
//! | Variant | Top level | Lines | Polygons |
//! |---------|-----------|-------|----------|
//! | `flat-dual` | `EXISTING`, `HOUSEHOLD` | - | - |
//! | `full-structure` | `EXISTING/*`, `NEW PLANNING/*`, `HOUSEHOLD` | - | - |
//! | `precise` | `<project>/{EXISTING/*, NEW PLANNING/*, BOUNDARY, HOUSHOLD}` | - | - |
//! | `with-connectivity` | as `full-structure` | `EXISTING/DISTRIBUSI` | - |
//! | `with-coverage` | as `precise` | - | `<project>/BOUNDARY` |
//!
//! `HOUSHOLD` (sic) is the label existing consumers of the precise layout
//! match on and must not be corrected.

use crate::document::{FolderNode, FolderPath, ProjectDocument};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Existing-infrastructure branch
pub const EXISTING: &str = "EXISTING";
/// Planned-infrastructure branch
pub const NEW_PLANNING: &str = "NEW PLANNING";
/// Customer premises folder
pub const HOUSEHOLD: &str = "HOUSEHOLD";
/// Customer premises folder label of the precise layouts (misspelling kept)
pub const LEGACY_HOUSEHOLD: &str = "HOUSHOLD";
/// Distribution point layer
pub const ODP: &str = "ODP";
/// Distribution cable layer
pub const DISTRIBUSI: &str = "DISTRIBUSI";
/// Coverage boundary layer
pub const BOUNDARY: &str = "BOUNDARY";

/// Layers under `EXISTING`, in display order
pub const EXISTING_LAYERS: [&str; 7] = [ODP, "TIANG", DISTRIBUSI, BOUNDARY, "ODC", "CLOSURE", "FEEDER"];

/// Layers under `NEW PLANNING`, in display order (FEEDER before CLOSURE)
pub const PLANNING_LAYERS: [&str; 7] = [ODP, "TIANG", DISTRIBUSI, BOUNDARY, "ODC", "FEEDER", "CLOSURE"];

/// Selectable folder layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxonomyVariant {
    /// `EXISTING` holding ODP markers directly, plus `HOUSEHOLD`
    FlatDual,
    /// `EXISTING` and `NEW PLANNING` with seven layers each, plus `HOUSEHOLD`
    #[default]
    FullStructure,
    /// Project root folder with legacy labels and a hidden planning branch
    Precise,
    /// Full structure plus ODP-to-customer lines in `EXISTING/DISTRIBUSI`
    WithConnectivity,
    /// Precise layout plus coverage circles in the top-level `BOUNDARY`
    WithCoverage,
}

impl TaxonomyVariant {
    /// Every variant, in documentation order
    pub const ALL: [Self; 5] = [
        Self::FlatDual,
        Self::FullStructure,
        Self::Precise,
        Self::WithConnectivity,
        Self::WithCoverage,
    ];

    /// Kebab-case name used in configuration and on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FlatDual => "flat-dual",
            Self::FullStructure => "full-structure",
            Self::Precise => "precise",
            Self::WithConnectivity => "with-connectivity",
            Self::WithCoverage => "with-coverage",
        }
    }

    /// One-line summary
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::FlatDual => "ODP markers in EXISTING, customers in HOUSEHOLD",
            Self::FullStructure => "EXISTING and NEW PLANNING layer trees plus HOUSEHOLD",
            Self::Precise => "per-project root with legacy HOUSHOLD label and hidden planning branch",
            Self::WithConnectivity => "full structure plus ODP-to-customer distribution lines",
            Self::WithCoverage => "precise layout plus 250 m coverage circles around each ODP",
        }
    }

    /// Whether documents get a line per row
    #[inline]
    #[must_use]
    pub const fn has_connectivity(self) -> bool {
        matches!(self, Self::WithConnectivity)
    }

    /// Whether documents get a coverage polygon per row
    #[inline]
    #[must_use]
    pub const fn has_coverage(self) -> bool {
        matches!(self, Self::WithCoverage)
    }
}

impl fmt::Display for TaxonomyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaxonomyVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|v| v.name()).collect();
                format!("unknown taxonomy '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Where the populator puts each kind of feature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slots {
    /// Distribution-point markers
    pub odp: FolderPath,
    /// Customer markers
    pub household: FolderPath,
    /// Connecting lines, for variants with connectivity
    pub lines: Option<FolderPath>,
    /// Coverage polygons, for variants with coverage
    pub coverage: Option<FolderPath>,
}

/// A fully built, still empty folder skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    /// Variant the skeleton was built for
    pub variant: TaxonomyVariant,
    /// Top-level folders
    pub folders: Vec<FolderNode>,
    /// Insertion points
    pub slots: Slots,
}

fn layer_folders(names: &[&str]) -> Vec<FolderNode> {
    names.iter().map(|n| FolderNode::new(*n)).collect()
}

impl Taxonomy {
    /// Build the skeleton of `variant`.
    ///
    /// `project` only names the root folder of the precise layouts; the
    /// shape never depends on row data.
    #[must_use = "returns the folder skeleton"]
    pub fn build(variant: TaxonomyVariant, project: &str) -> Self {
        match variant {
            TaxonomyVariant::FlatDual => Self {
                variant,
                folders: vec![FolderNode::new(EXISTING), FolderNode::new(HOUSEHOLD)],
                slots: Slots {
                    odp: FolderPath::new([EXISTING]),
                    household: FolderPath::new([HOUSEHOLD]),
                    lines: None,
                    coverage: None,
                },
            },
            TaxonomyVariant::FullStructure | TaxonomyVariant::WithConnectivity => {
                let mut existing =
                    FolderNode::new(EXISTING).with_folders(layer_folders(&EXISTING_LAYERS));
                let mut lines = None;
                if variant.has_connectivity() {
                    existing.open = true;
                    if let Some(distribusi) = existing.child_mut(DISTRIBUSI) {
                        distribusi.open = true;
                    }
                    lines = Some(FolderPath::new([EXISTING, DISTRIBUSI]));
                }
                Self {
                    variant,
                    folders: vec![
                        existing,
                        FolderNode::new(NEW_PLANNING).with_folders(layer_folders(&PLANNING_LAYERS)),
                        FolderNode::new(HOUSEHOLD),
                    ],
                    slots: Slots {
                        odp: FolderPath::new([EXISTING, ODP]),
                        household: FolderPath::new([HOUSEHOLD]),
                        lines,
                        coverage: None,
                    },
                }
            }
            TaxonomyVariant::Precise | TaxonomyVariant::WithCoverage => {
                let planning = FolderNode::new(NEW_PLANNING).visible(false).with_folders(
                    // only the planning BOUNDARY layer is visible (collapsed)
                    PLANNING_LAYERS
                        .iter()
                        .map(|name| FolderNode::new(*name).visible(*name == BOUNDARY)),
                );
                let root = FolderNode::new(project).open(true).with_folders([
                    FolderNode::new(EXISTING)
                        .open(true)
                        .with_folders(layer_folders(&EXISTING_LAYERS)),
                    planning,
                    FolderNode::new(BOUNDARY),
                    FolderNode::new(LEGACY_HOUSEHOLD),
                ]);
                let base = FolderPath::new([project]);
                Self {
                    variant,
                    folders: vec![root],
                    slots: Slots {
                        odp: base.child(EXISTING).child(ODP),
                        household: base.child(LEGACY_HOUSEHOLD),
                        lines: None,
                        coverage: variant.has_coverage().then(|| base.child(BOUNDARY)),
                    },
                }
            }
        }
    }

    /// Wrap the skeleton in an empty document for `project`
    #[must_use]
    pub fn into_document(self, project: &str) -> (ProjectDocument, Slots) {
        (ProjectDocument::new(project, self.folders), self.slots)
    }

    /// Render the skeleton as an indented tree, hidden folders marked
    #[must_use]
    pub fn render_tree(&self) -> String {
        fn render(out: &mut String, node: &FolderNode, depth: usize, slots: &Slots, path: &FolderPath) {
            let path = path.child(node.name.clone());
            let mut notes = Vec::new();
            if !node.visible {
                notes.push("hidden");
            }
            if node.open {
                notes.push("open");
            }
            if path == slots.odp {
                notes.push("ODP markers");
            }
            if path == slots.household {
                notes.push("customer markers");
            }
            if slots.lines.as_ref() == Some(&path) {
                notes.push("lines");
            }
            if slots.coverage.as_ref() == Some(&path) {
                notes.push("coverage");
            }
            let _ = write!(out, "{}{}/", "  ".repeat(depth), node.name);
            if !notes.is_empty() {
                let _ = write!(out, "  ({})", notes.join(", "));
            }
            out.push('\n');
            for child in &node.folders {
                render(out, child, depth + 1, slots, &path);
            }
        }

        let mut out = String::new();
        for folder in &self.folders {
            render(&mut out, folder, 0, &self.slots, &FolderPath::default());
        }
        out
    }
}
