//! Job configuration.
//!
//! Every section is optional when deserialized; missing fields fall back to
//! the defaults of the ODP upload template (Indonesian column headers,
//! Google paddle icons, 250 m coverage rings).

use crate::error::{FibermapError, Result};
use crate::geometry::{DEFAULT_RADIUS_M, DEFAULT_STEP_DEG};
use crate::style::IconSource;
use crate::taxonomy::TaxonomyVariant;
use serde::{Deserialize, Serialize};

/// Default icon for distribution points
pub const DEFAULT_ODP_ICON: &str = "http://maps.google.com/mapfiles/kml/paddle/ltblu-stars.png";

/// Default icon for customer premises
pub const DEFAULT_HOUSEHOLD_ICON: &str =
    "http://maps.google.com/mapfiles/kml/shapes/homegardenbusiness.png";

/// Complete configuration of one conversion job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Folder taxonomy of every produced document
    pub variant: TaxonomyVariant,
    /// Input column names
    pub columns: ColumnMapping,
    /// Marker, line and polygon appearance
    pub styles: StyleConfig,
    /// Coverage ring parameters
    pub geometry: GeometryConfig,
    /// Row-error and name-collision handling
    pub policy: PolicyConfig,
    /// Archive entry settings
    pub output: OutputConfig,
}

impl JobConfig {
    /// Configuration for `variant` with every other setting at its default
    #[must_use = "returns a configuration for the given variant"]
    pub fn for_variant(variant: TaxonomyVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Check the configuration for values that would fail later.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let ext = &self.output.extension;
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            return Err(FibermapError::Config(format!(
                "output extension must be a bare name like 'kml', got '{ext}'"
            )));
        }
        let g = &self.geometry;
        if !g.radius_m.is_finite() || g.radius_m <= 0.0 {
            return Err(FibermapError::Config(format!(
                "geometry.radius_m must be positive, got {}",
                g.radius_m
            )));
        }
        if !g.step_deg.is_finite() || g.step_deg <= 0.0 || g.step_deg > 360.0 {
            return Err(FibermapError::Config(format!(
                "geometry.step_deg must be within (0, 360], got {}",
                g.step_deg
            )));
        }
        for (field, value) in [
            ("styles.odp_scale", self.styles.odp_scale),
            ("styles.household_scale", self.styles.household_scale),
            ("styles.line_width", self.styles.line_width),
            ("styles.polygon_width", self.styles.polygon_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FibermapError::Config(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        for (field, color) in [
            ("styles.line_color", &self.styles.line_color),
            ("styles.polygon_fill", &self.styles.polygon_fill),
            ("styles.polygon_outline", &self.styles.polygon_outline),
        ] {
            if !is_kml_color(color) {
                return Err(FibermapError::Config(format!(
                    "{field} must be 8 hex digits (aabbggrr), got '{color}'"
                )));
            }
        }
        let names = self.columns.all();
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(FibermapError::Config("column names must not be blank".to_string()));
            }
            if names[..i].contains(name) {
                return Err(FibermapError::Config(format!(
                    "column '{name}' is mapped to more than one field"
                )));
            }
        }
        Ok(())
    }
}

/// KML colors are `aabbggrr` hex strings
fn is_kml_color(s: &str) -> bool {
    s.len() == 8 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Names of the input columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Project identifier
    pub project: String,
    /// Free-text description
    pub description: String,
    /// Distribution point identifier
    pub odp: String,
    /// Distribution point latitude
    pub odp_lat: String,
    /// Distribution point longitude
    pub odp_lon: String,
    /// Customer name
    pub customer: String,
    /// Customer latitude
    pub customer_lat: String,
    /// Customer longitude
    pub customer_lon: String,
    /// Whether the description column must be present.
    ///
    /// `None` uses the variant default: optional for flat-dual, required
    /// everywhere else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_description: Option<bool>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            project: "NAMA PROJECT".to_string(),
            description: "Deskripsi".to_string(),
            odp: "ODP".to_string(),
            odp_lat: "LAT ODP".to_string(),
            odp_lon: "LONG ODP".to_string(),
            customer: "name".to_string(),
            customer_lat: "LAT PELANGGAN".to_string(),
            customer_lon: "LONG PELANGGAN".to_string(),
            require_description: None,
        }
    }
}

impl ColumnMapping {
    /// Every mapped column name, description included
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        vec![
            self.project.as_str(),
            self.description.as_str(),
            self.odp.as_str(),
            self.odp_lat.as_str(),
            self.odp_lon.as_str(),
            self.customer.as_str(),
            self.customer_lat.as_str(),
            self.customer_lon.as_str(),
        ]
    }

    /// Whether the description column is mandatory for `variant`
    #[must_use]
    pub fn description_required(&self, variant: TaxonomyVariant) -> bool {
        self.require_description
            .unwrap_or(!matches!(variant, TaxonomyVariant::FlatDual))
    }

    /// Columns the validator must find, in the order they are reported
    #[must_use = "returns the required column names"]
    pub fn required(&self, variant: TaxonomyVariant) -> Vec<&str> {
        let mut cols = vec![self.project.as_str()];
        if self.description_required(variant) {
            cols.push(self.description.as_str());
        }
        cols.extend([
            self.odp.as_str(),
            self.odp_lat.as_str(),
            self.odp_lon.as_str(),
            self.customer.as_str(),
            self.customer_lat.as_str(),
            self.customer_lon.as_str(),
        ]);
        cols
    }
}

/// How styles are written into documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleMode {
    /// One `<Style id>` per descriptor at document level, referenced by `<styleUrl>`
    #[default]
    Shared,
    /// A full `<Style>` copied into every feature
    Inline,
}

/// Appearance of generated features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Shared or inline emission
    pub mode: StyleMode,
    /// Icon of distribution-point markers
    pub odp_icon: IconSource,
    /// Icon scale of distribution-point markers
    pub odp_scale: f64,
    /// Icon of customer markers
    pub household_icon: IconSource,
    /// Icon scale of customer markers
    pub household_scale: f64,
    /// Connecting line color (`aabbggrr`)
    pub line_color: String,
    /// Connecting line width (pixels)
    pub line_width: f64,
    /// Coverage polygon fill (`aabbggrr`)
    pub polygon_fill: String,
    /// Coverage polygon outline (`aabbggrr`)
    pub polygon_outline: String,
    /// Coverage polygon outline width (pixels)
    pub polygon_width: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            mode: StyleMode::Shared,
            odp_icon: IconSource::Url {
                href: DEFAULT_ODP_ICON.to_string(),
            },
            odp_scale: 1.0,
            household_icon: IconSource::Url {
                href: DEFAULT_HOUSEHOLD_ICON.to_string(),
            },
            household_scale: 1.0,
            line_color: "ff0000ff".to_string(),
            line_width: 2.0,
            polygon_fill: "4d00ff00".to_string(),
            polygon_outline: "ff00aa00".to_string(),
            polygon_width: 1.5,
        }
    }
}

/// Coverage ring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Ring radius in meters
    pub radius_m: f64,
    /// Angular step between ring vertices, in degrees
    pub step_deg: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            step_deg: DEFAULT_STEP_DEG,
        }
    }
}

/// What happens to a row with unusable values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidRowPolicy {
    /// Drop the row, keep the rest of its project
    #[default]
    SkipRow,
    /// Drop the whole project the row belongs to
    SkipProject,
    /// Fail the job
    Abort,
}

/// What happens when two projects map to the same archive entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Fail the job with `NameCollision`
    #[default]
    Reject,
    /// Disambiguate with ` (2)`, ` (3)`, … before the extension
    Suffix,
}

/// Error-handling policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Rows with non-finite coordinates or blank identifiers
    pub invalid_rows: InvalidRowPolicy,
    /// Archive entry name collisions
    pub collisions: CollisionPolicy,
}

/// Archive output settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of document entries (without the dot)
    pub extension: String,
    /// Build projects on the rayon pool
    pub parallel: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: "kml".to_string(),
            parallel: true,
        }
    }
}
