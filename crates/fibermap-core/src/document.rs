//! Project document model: folders addressed by path, and their features.

use crate::config::StyleMode;
use crate::error::{FibermapError, Result};
use crate::geometry::Coordinate;
use crate::style::StyleDescriptor;
use std::fmt;
use std::sync::Arc;

/// Path of a folder from the document root, one segment per nesting level.
///
/// Segments are stored separately so folder names containing `/` (project
/// names used as root folders) still resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderPath(Vec<String>);

impl FolderPath {
    /// Build a path from its segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path segments, outermost first
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new path one level deeper
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Whether the path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// A point marker
#[derive(Debug, Clone, PartialEq)]
pub struct PlacemarkEntry {
    /// Marker label
    pub name: String,
    /// Balloon text
    pub description: Option<String>,
    /// Position
    pub coordinate: Coordinate,
    /// Icon style
    pub style: Arc<StyleDescriptor>,
}

/// A two-vertex connecting line
#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry {
    /// Line label
    pub name: String,
    /// Balloon text
    pub description: Option<String>,
    /// Source and destination, in that order
    pub coordinates: [Coordinate; 2],
    /// Line style
    pub style: Arc<StyleDescriptor>,
}

/// An approximate coverage circle
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    /// Polygon label
    pub name: String,
    /// Balloon text
    pub description: Option<String>,
    /// Open ring; the serializer repeats the first vertex to close it
    pub ring: Vec<Coordinate>,
    /// Fill and outline style
    pub style: Arc<StyleDescriptor>,
}

/// Anything that can be placed in a folder
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// Point marker
    Placemark(PlacemarkEntry),
    /// Connecting line
    Line(LineEntry),
    /// Coverage polygon
    Polygon(BoundaryPolygon),
}

impl Feature {
    /// Feature label
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Placemark(p) => &p.name,
            Self::Line(l) => &l.name,
            Self::Polygon(p) => &p.name,
        }
    }

    /// Balloon text, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Placemark(p) => p.description.as_deref(),
            Self::Line(l) => l.description.as_deref(),
            Self::Polygon(p) => p.description.as_deref(),
        }
    }

    /// Style referenced by the feature
    #[must_use]
    pub fn style(&self) -> &Arc<StyleDescriptor> {
        match self {
            Self::Placemark(p) => &p.style,
            Self::Line(l) => &l.style,
            Self::Polygon(p) => &p.style,
        }
    }
}

/// A named container of subfolders and features.
///
/// `visible` and `open` are presentation flags only; they are written to the
/// output unchanged and never influence where features go.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    /// Folder label
    pub name: String,
    /// Shown when the document is opened
    pub visible: bool,
    /// Expanded in the viewer's tree
    pub open: bool,
    /// Subfolders in display order
    pub folders: Vec<FolderNode>,
    /// Features in insertion order
    pub features: Vec<Feature>,
}

impl FolderNode {
    /// A visible, collapsed, empty folder
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            open: false,
            folders: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Set the visibility flag
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the expansion flag
    #[must_use]
    pub fn open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Append subfolders
    #[must_use]
    pub fn with_folders(mut self, folders: impl IntoIterator<Item = Self>) -> Self {
        self.folders.extend(folders);
        self
    }

    /// Direct subfolder by name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.folders.iter().find(|f| f.name == name)
    }

    /// Direct subfolder by name, mutable
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    /// Features in this folder and every descendant
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len() + self.folders.iter().map(Self::feature_count).sum::<usize>()
    }

    /// Visit this folder and every descendant depth-first, with their paths.
    ///
    /// `parent` is the path of the folder containing `self`.
    pub fn walk<'a>(&'a self, parent: &FolderPath, visit: &mut impl FnMut(&FolderPath, &'a Self)) {
        let path = parent.child(self.name.clone());
        visit(&path, self);
        for folder in &self.folders {
            folder.walk(&path, visit);
        }
    }
}

fn resolve<'a>(roots: &'a [FolderNode], path: &FolderPath) -> Option<&'a FolderNode> {
    let (first, rest) = path.segments().split_first()?;
    let mut node = roots.iter().find(|f| &f.name == first)?;
    for segment in rest {
        node = node.child(segment)?;
    }
    Some(node)
}

fn resolve_mut<'a>(roots: &'a mut [FolderNode], path: &FolderPath) -> Option<&'a mut FolderNode> {
    let (first, rest) = path.segments().split_first()?;
    let mut node = roots.iter_mut().find(|f| &f.name == first)?;
    for segment in rest {
        node = node.child_mut(segment)?;
    }
    Some(node)
}

/// One project's map document
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDocument {
    /// Project identifier the document was built from
    pub project: String,
    /// Top-level folders in display order
    pub folders: Vec<FolderNode>,
    /// Styles declared at document level, in declaration order
    pub styles: Vec<Arc<StyleDescriptor>>,
    /// Whether features reference declared styles or carry their own copy
    pub style_mode: StyleMode,
}

impl ProjectDocument {
    /// An empty document over a pre-built folder tree
    #[must_use]
    pub fn new(project: impl Into<String>, folders: Vec<FolderNode>) -> Self {
        Self {
            project: project.into(),
            folders,
            styles: Vec::new(),
            style_mode: StyleMode::Shared,
        }
    }

    /// Declare a style at document level; declaring the same id twice is a no-op
    pub fn declare_style(&mut self, style: &Arc<StyleDescriptor>) {
        if !self.styles.iter().any(|s| s.id == style.id) {
            self.styles.push(Arc::clone(style));
        }
    }

    /// Folder at `path`
    #[must_use]
    pub fn folder(&self, path: &FolderPath) -> Option<&FolderNode> {
        resolve(&self.folders, path)
    }

    /// Folder at `path`, mutable
    pub fn folder_mut(&mut self, path: &FolderPath) -> Option<&mut FolderNode> {
        resolve_mut(&mut self.folders, path)
    }

    /// Append `feature` to the folder at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Config`] if no folder lives at `path`; the
    /// taxonomies never produce such slots, so this signals a programming
    /// error in a custom taxonomy.
    pub fn insert(&mut self, path: &FolderPath, feature: Feature) -> Result<()> {
        let folder = resolve_mut(&mut self.folders, path).ok_or_else(|| {
            FibermapError::Config(format!("no folder at '{path}' in document '{}'", self.project))
        })?;
        folder.features.push(feature);
        Ok(())
    }

    /// Features anywhere in the document
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.folders.iter().map(FolderNode::feature_count).sum()
    }

    /// Every folder path in depth-first display order
    #[must_use]
    pub fn folder_paths(&self) -> Vec<FolderPath> {
        let mut paths = Vec::new();
        let root = FolderPath::default();
        for folder in &self.folders {
            folder.walk(&root, &mut |path, _| paths.push(path.clone()));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleKind;

    fn style() -> Arc<StyleDescriptor> {
        Arc::new(StyleDescriptor {
            id: "odp".to_string(),
            kind: StyleKind::Icon {
                href: "x.png".to_string(),
                scale: 1.0,
            },
        })
    }

    fn marker(name: &str) -> Feature {
        Feature::Placemark(PlacemarkEntry {
            name: name.to_string(),
            description: None,
            coordinate: Coordinate::new(1.0, 2.0).unwrap(),
            style: style(),
        })
    }

    fn doc() -> ProjectDocument {
        ProjectDocument::new(
            "P",
            vec![
                FolderNode::new("EXISTING")
                    .with_folders([FolderNode::new("ODP"), FolderNode::new("TIANG")]),
                FolderNode::new("HOUSEHOLD"),
            ],
        )
    }

    #[test]
    fn test_path_display() {
        let path = FolderPath::new(["EXISTING", "ODP"]);
        assert_eq!(path.to_string(), "EXISTING/ODP");
        assert_eq!(path.child("X").segments().len(), 3);
    }

    #[test]
    fn test_insert_by_path() {
        let mut d = doc();
        d.insert(&FolderPath::new(["EXISTING", "ODP"]), marker("ODP-1")).unwrap();
        d.insert(&FolderPath::new(["HOUSEHOLD"]), marker("Budi")).unwrap();

        let odp = d.folder(&FolderPath::new(["EXISTING", "ODP"])).unwrap();
        assert_eq!(odp.features.len(), 1);
        assert_eq!(odp.features[0].name(), "ODP-1");
        assert_eq!(d.feature_count(), 2);
        assert_eq!(d.folder(&FolderPath::new(["EXISTING"])).unwrap().feature_count(), 1);
    }

    #[test]
    fn test_insert_unknown_path_fails() {
        let mut d = doc();
        let err = d
            .insert(&FolderPath::new(["EXISTING", "NOPE"]), marker("x"))
            .unwrap_err();
        assert!(err.to_string().contains("EXISTING/NOPE"));
        assert!(err.to_string().contains("document 'P'"));
        assert!(d.insert(&FolderPath::default(), marker("x")).is_err());
    }

    #[test]
    fn test_folder_paths_depth_first() {
        let paths: Vec<String> = doc().folder_paths().iter().map(ToString::to_string).collect();
        assert_eq!(
            paths,
            vec!["EXISTING", "EXISTING/ODP", "EXISTING/TIANG", "HOUSEHOLD"]
        );
    }

    #[test]
    fn test_declare_style_once() {
        let mut d = doc();
        let s = style();
        d.declare_style(&s);
        d.declare_style(&s);
        assert_eq!(d.styles.len(), 1);
        assert!(Arc::ptr_eq(&d.styles[0], &s));
    }
}
