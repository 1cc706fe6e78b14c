//! Command-line interface for fibermap
//!
//! This crate provides the `fibermap` tool, which converts ODP/customer
//! tables (CSV, XLSX, XLS) into one KML document per project, zipped into a
//! single archive.
//!
//! # Quick Start
//!
//! ```bash
//! # Convert with the default full-structure taxonomy (writes odp_kml.zip)
//! fibermap convert odp.xlsx
//!
//! # Pick a taxonomy and an output path
//! fibermap convert odp.csv --variant with-coverage -o coverage.zip
//!
//! # Look inside a produced archive
//! fibermap inspect coverage.zip
//!
//! # Show every taxonomy with its folder tree
//! fibermap variants
//! ```
//!
//! # Configuration
//!
//! Job settings are read from TOML files, later files overriding earlier ones
//! key by key:
//!
//! 1. **User config**: `~/.fibermap.toml`
//! 2. **Project config**: `./.fibermap.toml`
//! 3. **Explicit config**: `--config FILE`
//! 4. **Command-line flags**
//!
//! Example `.fibermap.toml`:
//!
//! ```toml
//! variant = "with-coverage"
//!
//! [columns]
//! customer = "NAMA PELANGGAN"
//!
//! [styles.odp_icon]
//! kind = "generated"
//! color = "#1e90ff"
//!
//! [geometry]
//! radius_m = 300.0
//!
//! [policy]
//! invalid_rows = "skip-project"
//! collisions = "suffix"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Any error (missing columns, name collision, unreadable input, ...)
//! - `2` - Invalid arguments

use anyhow::{Context, Result};
use fibermap_core::JobConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of user and project configuration files
pub const CONFIG_FILE_NAME: &str = ".fibermap.toml";

/// Suffix appended to the input stem for the default archive name
pub const OUTPUT_SUFFIX: &str = "_kml.zip";

/// Configuration files that exist, lowest precedence first
#[must_use]
pub fn discover_config_files(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Some(home) = dirs::home_dir() {
        let user = home.join(CONFIG_FILE_NAME);
        if user.is_file() {
            files.push(user);
        }
    }
    let project = PathBuf::from(CONFIG_FILE_NAME);
    if project.is_file() && !files.iter().any(|f| same_file(f, &project)) {
        files.push(project);
    }
    if let Some(path) = explicit {
        files.push(path.to_path_buf());
    }
    files
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Deep-merge `overlay` into `base`.
///
/// Tables merge key by key; any other value replaces. A table carrying a
/// `kind` key (an icon source) replaces wholesale, since its fields depend on
/// the kind.
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let tagged = value.as_table().is_some_and(|t| t.contains_key("kind"));
                match base.get_mut(&key) {
                    Some(existing) if !tagged => merge_toml(existing, value),
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Load and merge the given TOML files into a job configuration.
///
/// # Errors
///
/// Returns an error naming the file if one cannot be read or parsed, or if
/// the merged settings do not form a valid configuration.
pub fn load_job_config(files: &[PathBuf]) -> Result<JobConfig> {
    let mut merged = toml::Value::Table(toml::Table::new());
    for path in files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("loaded config {}", path.display());
        merge_toml(&mut merged, value);
    }
    let config: JobConfig = merged
        .try_into()
        .context("Configuration files do not form a valid job configuration")?;
    Ok(config)
}

/// Default archive path for `input`: `<dir>/<stem>_kml.zip`
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Configuration template written by `fibermap config init`
///
/// # Errors
///
/// Returns an error if the default configuration cannot be rendered as TOML.
pub fn config_template() -> Result<String> {
    let body = toml::to_string_pretty(&JobConfig::default())
        .context("Failed to render default configuration")?;
    Ok(format!(
        "# fibermap job configuration\n\
         # Later files override earlier ones: ~/.fibermap.toml, ./.fibermap.toml, --config\n\n\
         {body}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibermap_core::{CollisionPolicy, IconSource, TaxonomyVariant};

    fn value(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_merge_overrides_key_by_key() {
        let mut base = value("variant = \"precise\"\n[geometry]\nradius_m = 100.0\nstep_deg = 5.0\n");
        merge_toml(&mut base, value("[geometry]\nradius_m = 300.0\n"));
        let config: JobConfig = base.try_into().unwrap();
        assert_eq!(config.variant, TaxonomyVariant::Precise);
        assert!((config.geometry.radius_m - 300.0).abs() < f64::EPSILON);
        assert!((config.geometry.step_deg - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_icon_source_replaced_wholesale() {
        let mut base = value("[styles.odp_icon]\nkind = \"url\"\nhref = \"http://a/b.png\"\n");
        merge_toml(
            &mut base,
            value("[styles.odp_icon]\nkind = \"generated\"\ncolor = \"#ff0000\"\n"),
        );
        let icon = &base["styles"]["odp_icon"];
        assert!(icon.get("href").is_none());
        let config: JobConfig = base.try_into().unwrap();
        assert!(matches!(config.styles.odp_icon, IconSource::Generated { .. }));
    }

    #[test]
    fn test_load_job_config_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.toml");
        let explicit = dir.path().join("job.toml");
        fs::write(&user, "variant = \"flat-dual\"\n[policy]\ncollisions = \"suffix\"\n").unwrap();
        fs::write(&explicit, "variant = \"with-coverage\"\n").unwrap();

        let config = load_job_config(&[user, explicit]).unwrap();
        assert_eq!(config.variant, TaxonomyVariant::WithCoverage);
        assert_eq!(config.policy.collisions, CollisionPolicy::Suffix);
    }

    #[test]
    fn test_load_job_config_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "variant = [").unwrap();
        let err = load_job_config(&[broken]).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn test_no_files_gives_defaults() {
        assert_eq!(load_job_config(&[]).unwrap(), JobConfig::default());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("data/odp.xlsx")),
            PathBuf::from("data/odp_kml.zip")
        );
        assert_eq!(default_output_path(Path::new("odp")), PathBuf::from("odp_kml.zip"));
    }

    #[test]
    fn test_template_parses_back() {
        let template = config_template().unwrap();
        let config: JobConfig = toml::from_str(&template).unwrap();
        assert_eq!(config, JobConfig::default());
    }
}
