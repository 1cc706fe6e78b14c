//! Immutable style descriptors shared by document features.
//!
//! A [`StyleSheet`] is resolved once per job from [`StyleConfig`] and handed
//! to every project as `Arc` clones. Features only hold references, so no
//! feature can alter a style another feature is using.

use crate::config::{StyleConfig, StyleMode};
use crate::error::{FibermapError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn default_icon_size() -> u32 {
    32
}

/// Where a marker icon comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IconSource {
    /// Remote image referenced by URL
    Url {
        /// Image URL
        href: String,
    },
    /// Local image file embedded as a `data:` URI
    Embedded {
        /// Path of the image file
        path: PathBuf,
    },
    /// Filled circle rendered as SVG and embedded as a `data:` URI
    Generated {
        /// CSS hex color, `#rrggbb`
        color: String,
        /// Edge length in pixels
        #[serde(default = "default_icon_size")]
        size: u32,
    },
}

impl IconSource {
    /// Turn the source into the `href` written into `<Icon>`.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Config`] if an embedded file cannot be read or
    /// a generated icon color is not `#rrggbb`.
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::Url { href } => Ok(href.clone()),
            Self::Embedded { path } => {
                let bytes = std::fs::read(path).map_err(|e| {
                    FibermapError::Config(format!("cannot read icon {}: {e}", path.display()))
                })?;
                Ok(format!("data:{};base64,{}", image_mime(path), STANDARD.encode(bytes)))
            }
            Self::Generated { color, size } => {
                let svg = generated_svg(color, *size)?;
                Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)))
            }
        }
    }
}

/// MIME type from the image extension; unknown extensions fall back to PNG
fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

fn generated_svg(color: &str, size: u32) -> Result<String> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FibermapError::Config(format!(
            "generated icon color must be #rrggbb, got '{color}'"
        )));
    }
    if size == 0 {
        return Err(FibermapError::Config("generated icon size must be positive".to_string()));
    }
    let half = f64::from(size) / 2.0;
    let radius = half - 1.0;
    Ok(format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" \
         viewBox=\"0 0 {size} {size}\"><circle cx=\"{half}\" cy=\"{half}\" r=\"{radius}\" \
         fill=\"#{hex}\" stroke=\"#ffffff\" stroke-width=\"2\"/></svg>",
        hex = hex.to_ascii_lowercase()
    ))
}

/// Appearance carried by a style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleKind {
    /// Point marker icon
    Icon {
        /// Resolved icon href (URL or `data:` URI)
        href: String,
        /// Icon scale factor
        scale: f64,
    },
    /// Line appearance
    Line {
        /// `aabbggrr` color
        color: String,
        /// Width in pixels
        width: f64,
    },
    /// Polygon appearance
    Polygon {
        /// `aabbggrr` fill color
        fill: String,
        /// `aabbggrr` outline color
        outline: String,
        /// Outline width in pixels
        width: f64,
    },
}

/// A named style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    /// Document-unique id used by `<styleUrl>#id`
    pub id: String,
    /// Appearance
    pub kind: StyleKind,
}

/// The four styles a job uses, resolved once
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    /// Shared or inline emission
    pub mode: StyleMode,
    /// Distribution-point markers
    pub odp: Arc<StyleDescriptor>,
    /// Customer markers
    pub household: Arc<StyleDescriptor>,
    /// Connecting lines
    pub line: Arc<StyleDescriptor>,
    /// Coverage polygons
    pub polygon: Arc<StyleDescriptor>,
}

impl StyleSheet {
    /// Resolve icon sources and build the descriptors.
    ///
    /// # Errors
    ///
    /// Propagates [`IconSource::resolve`] failures.
    pub fn from_config(config: &StyleConfig) -> Result<Self> {
        let odp = StyleDescriptor {
            id: "odp".to_string(),
            kind: StyleKind::Icon {
                href: config.odp_icon.resolve()?,
                scale: config.odp_scale,
            },
        };
        let household = StyleDescriptor {
            id: "household".to_string(),
            kind: StyleKind::Icon {
                href: config.household_icon.resolve()?,
                scale: config.household_scale,
            },
        };
        let line = StyleDescriptor {
            id: "distribution".to_string(),
            kind: StyleKind::Line {
                color: config.line_color.clone(),
                width: config.line_width,
            },
        };
        let polygon = StyleDescriptor {
            id: "boundary".to_string(),
            kind: StyleKind::Polygon {
                fill: config.polygon_fill.clone(),
                outline: config.polygon_outline.clone(),
                width: config.polygon_width,
            },
        };
        Ok(Self {
            mode: config.mode,
            odp: Arc::new(odp),
            household: Arc::new(household),
            line: Arc::new(line),
            polygon: Arc::new(polygon),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_icon_passes_through() {
        let src = IconSource::Url {
            href: "http://example.com/a.png".to_string(),
        };
        assert_eq!(src.resolve().unwrap(), "http://example.com/a.png");
    }

    #[test]
    fn test_generated_icon_is_svg_data_uri() {
        let src = IconSource::Generated {
            color: "#1E90FF".to_string(),
            size: 24,
        };
        let href = src.resolve().unwrap();
        let encoded = href.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fill=\"#1e90ff\""));
        assert!(svg.contains("width=\"24\""));
    }

    #[test]
    fn test_generated_icon_rejects_bad_color() {
        let src = IconSource::Generated {
            color: "blue".to_string(),
            size: 24,
        };
        assert!(matches!(src.resolve(), Err(FibermapError::Config(_))));
    }

    #[test]
    fn test_embedded_icon_missing_file() {
        let src = IconSource::Embedded {
            path: PathBuf::from("/nonexistent/icon.png"),
        };
        let msg = src.resolve().unwrap_err().to_string();
        assert!(msg.contains("/nonexistent/icon.png"));
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(image_mime(Path::new("a")), "image/png");
    }

    #[test]
    fn test_stylesheet_ids_are_distinct() {
        let sheet = StyleSheet::from_config(&StyleConfig::default()).unwrap();
        let ids = [&sheet.odp.id, &sheet.household.id, &sheet.line.id, &sheet.polygon.id];
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[..i].contains(id), "duplicate style id {id}");
        }
        assert!(matches!(sheet.odp.kind, StyleKind::Icon { .. }));
        assert!(matches!(sheet.polygon.kind, StyleKind::Polygon { .. }));
    }
}
