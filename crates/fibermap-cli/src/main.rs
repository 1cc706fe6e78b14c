#![allow(
    clippy::needless_pass_by_value,    // clap hands over owned values
    clippy::fn_params_excessive_bools, // CLI commands have many boolean flags
)]

//! fibermap CLI - ODP/customer tables to zipped KML documents

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use colored::Colorize;
use fibermap_backend::{Converter, JobReport};
use fibermap_cli::{
    config_template, default_output_path, discover_config_files, load_job_config,
    CONFIG_FILE_NAME,
};
use fibermap_core::{
    CollisionPolicy, InvalidRowPolicy, JobConfig, StyleMode, Taxonomy, TaxonomyVariant,
};
use fibermap_kml::{inspect_archive, ArchiveSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Log filter used unless `RUST_LOG` is set
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    /// EXISTING (ODP markers) and HOUSEHOLD
    FlatDual,
    /// EXISTING and NEW PLANNING layer trees plus HOUSEHOLD
    FullStructure,
    /// Per-project root with legacy labels
    Precise,
    /// Full structure plus ODP-to-customer lines
    WithConnectivity,
    /// Precise layout plus coverage circles
    WithCoverage,
}

impl From<VariantArg> for TaxonomyVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::FlatDual => Self::FlatDual,
            VariantArg::FullStructure => Self::FullStructure,
            VariantArg::Precise => Self::Precise,
            VariantArg::WithConnectivity => Self::WithConnectivity,
            VariantArg::WithCoverage => Self::WithCoverage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleModeArg {
    /// Document-level styles referenced by id
    Shared,
    /// A style copied into every placemark
    Inline,
}

impl From<StyleModeArg> for StyleMode {
    fn from(arg: StyleModeArg) -> Self {
        match arg {
            StyleModeArg::Shared => Self::Shared,
            StyleModeArg::Inline => Self::Inline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InvalidRowsArg {
    /// Leave the row out, keep its project
    SkipRow,
    /// Leave the whole project out
    SkipProject,
    /// Stop with an error
    Abort,
}

impl From<InvalidRowsArg> for InvalidRowPolicy {
    fn from(arg: InvalidRowsArg) -> Self {
        match arg {
            InvalidRowsArg::SkipRow => Self::SkipRow,
            InvalidRowsArg::SkipProject => Self::SkipProject,
            InvalidRowsArg::Abort => Self::Abort,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CollisionsArg {
    /// Stop with an error
    Reject,
    /// Append " (2)", " (3)", ... to later entries
    Suffix,
}

impl From<CollisionsArg> for CollisionPolicy {
    fn from(arg: CollisionsArg) -> Self {
        match arg {
            CollisionsArg::Reject => Self::Reject,
            CollisionsArg::Suffix => Self::Suffix,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "fibermap",
    about = "Convert ODP/customer tables into zipped KML documents",
    long_about = "Convert tables of fiber distribution points (ODP) and customers into one\n\
                  KML document per project, following a fixed folder taxonomy, bundled\n\
                  into a single ZIP archive.",
    version
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Job configuration file, applied after ~/.fibermap.toml and ./.fibermap.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a table into a ZIP of KML documents
    #[command(long_about = "Convert a CSV, XLSX or XLS table into a ZIP of KML documents,\n\
                      one per distinct project.\n\
                      \n\
                      Examples:\n\
                        fibermap convert odp.xlsx\n\
                        fibermap convert odp.csv --variant with-coverage -o coverage.zip\n\
                        fibermap convert odp.csv --invalid-rows abort")]
    Convert {
        /// Input table (CSV, XLSX, XLS)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output archive [default: <INPUT stem>_kml.zip]
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Folder taxonomy of the documents
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// How styles are written
        #[arg(long, value_enum)]
        style_mode: Option<StyleModeArg>,

        /// What to do with rows holding unusable values
        #[arg(long, value_enum)]
        invalid_rows: Option<InvalidRowsArg>,

        /// What to do when two projects map to the same entry name
        #[arg(long, value_enum)]
        collisions: Option<CollisionsArg>,

        /// Coverage circle radius in meters
        #[arg(long, value_name = "METERS")]
        radius: Option<f64>,

        /// Build projects one at a time instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Extra file to bundle under assets/ (repeatable)
        #[arg(long, value_name = "FILE")]
        asset: Vec<PathBuf>,

        /// Write the job report as JSON to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Overwrite the output archive if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Summarize the documents inside a produced archive
    Inspect {
        /// Archive to inspect
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the folder taxonomies with their folder trees
    Variants {
        /// Project name shown in the precise layouts
        #[arg(long, default_value = "<project>")]
        project: String,
    },

    /// Manage fibermap configuration files
    #[command(long_about = "Manage fibermap configuration files.\n\
                      \n\
                      Configuration files are loaded in this order (later overrides earlier):\n\
                        1. User config: ~/.fibermap.toml\n\
                        2. Project config: ./.fibermap.toml\n\
                        3. --config FILE\n\
                        4. Command-line arguments")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Display the effective configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Create a .fibermap.toml with the default settings
    Init {
        /// Create in the home directory instead of the current directory
        #[arg(long)]
        global: bool,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .format_timestamp(None)
        .init();

    match args.command {
        Commands::Convert {
            input,
            output,
            variant,
            style_mode,
            invalid_rows,
            collisions,
            radius,
            sequential,
            asset,
            report,
            force,
        } => {
            let mut config = effective_config(args.config.as_deref())?;
            if let Some(variant) = variant {
                config.variant = variant.into();
            }
            if let Some(mode) = style_mode {
                config.styles.mode = mode.into();
            }
            if let Some(policy) = invalid_rows {
                config.policy.invalid_rows = policy.into();
            }
            if let Some(policy) = collisions {
                config.policy.collisions = policy.into();
            }
            if let Some(radius) = radius {
                config.geometry.radius_m = radius;
            }
            if sequential {
                config.output.parallel = false;
            }
            let output = output.unwrap_or_else(|| default_output_path(&input));
            convert_command(&input, &output, config, &asset, report.as_deref(), force, verbosity)
        }
        Commands::Inspect { archive, json } => inspect_command(&archive, json),
        Commands::Variants { project } => {
            variants_command(&project);
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                let config = effective_config(args.config.as_deref())?;
                let text = if json {
                    serde_json::to_string_pretty(&config).context("Failed to render configuration")?
                } else {
                    toml::to_string_pretty(&config).context("Failed to render configuration")?
                };
                println!("{text}");
                Ok(())
            }
            ConfigAction::Init { global, force } => config_init_command(global, force, verbosity),
        },
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            generate(shell, &mut cmd, "fibermap", &mut io::stdout());
            Ok(())
        }
    }
}

/// Merged configuration from every discovered file
fn effective_config(explicit: Option<&Path>) -> Result<JobConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }
    }
    let files = discover_config_files(explicit);
    load_job_config(&files)
}

fn convert_command(
    input: &Path,
    output: &Path,
    config: JobConfig,
    assets: &[PathBuf],
    report_path: Option<&Path>,
    force: bool,
    verbosity: Verbosity,
) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }
    if output.exists() && !force {
        bail!(
            "Output file already exists: {} (use --force to overwrite)",
            output.display()
        );
    }

    let variant = config.variant;
    let mut converter = Converter::new(config).context("Invalid job configuration")?;
    for path in assets {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read asset: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Asset path has no file name: {}", path.display()))?;
        converter = converter.with_asset(name, bytes);
    }

    let spinner = if verbosity.should_show_output() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("template is compile-time constant")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        s.set_message(format!(
            "Converting {} ({})...",
            input.file_name().unwrap_or_default().to_string_lossy(),
            variant.name().cyan()
        ));
        s.enable_steady_tick(std::time::Duration::from_millis(80));
        Some(s)
    } else {
        None
    };
    if let Some(s) = &spinner {
        let s = s.clone();
        converter = converter.with_progress(Arc::new(move |entry: &str| {
            s.set_message(format!("Archived {entry}"));
        }));
    }

    let result = converter.convert_file(input);
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    let conversion =
        result.with_context(|| format!("Failed to convert {}", input.display()))?;

    conversion
        .save_archive(output)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&conversion.report)
            .context("Failed to serialize job report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }

    if verbosity.should_show_output() {
        print_report(&conversion.report, output, conversion.archive.len(), verbosity);
    }
    Ok(())
}

fn print_report(report: &JobReport, output: &Path, size: usize, verbosity: Verbosity) {
    eprintln!(
        "{} {} document(s) from {} row(s) written to: {}",
        "✓".green().bold(),
        report.projects.len(),
        report.rows,
        output.display().to_string().bright_white()
    );
    if verbosity.is_verbose() {
        for project in &report.projects {
            eprintln!(
                "  {} {} row(s), {} feature(s)",
                project.entry.bold(),
                project.rows,
                project.features
            );
        }
        for asset in &report.assets {
            eprintln!("  {asset}");
        }
        eprintln!(
            "{} {} bytes in {:.2}s",
            "Info:".blue().bold(),
            size,
            report.latency.as_secs_f64()
        );
    }
    for project in &report.skipped_projects {
        eprintln!("{} project '{project}' left out", "Warning:".yellow().bold());
    }
    for issue in &report.issues {
        eprintln!("{} {issue}", "Warning:".yellow().bold());
    }
}

fn inspect_command(archive: &Path, json: bool) -> Result<()> {
    let bytes =
        fs::read(archive).with_context(|| format!("Failed to read archive: {}", archive.display()))?;
    let summary = inspect_archive(&bytes)
        .with_context(|| format!("Failed to inspect archive: {}", archive.display()))?;

    if json {
        let text = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{text}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &ArchiveSummary) {
    println!(
        "{:<40} {:>8} {:>8} {:>8} {:>8}",
        "ENTRY".bold(),
        "FOLDERS".bold(),
        "POINTS".bold(),
        "LINES".bold(),
        "POLYGONS".bold()
    );
    for (entry, doc) in &summary.documents {
        println!(
            "{entry:<40} {:>8} {:>8} {:>8} {:>8}",
            doc.folders, doc.points, doc.lines, doc.polygons
        );
    }
    for resource in &summary.resources {
        println!(
            "{:<40} {} ({} bytes)",
            resource.path, resource.resource_type, resource.size
        );
    }
    println!("{} document(s)", summary.documents.len());
}

fn variants_command(project: &str) {
    for variant in TaxonomyVariant::ALL {
        println!("{} - {}", variant.name().bold(), variant.summary());
        for line in Taxonomy::build(variant, project).render_tree().lines() {
            println!("    {line}");
        }
        println!();
    }
}

fn config_init_command(global: bool, force: bool, verbosity: Verbosity) -> Result<()> {
    let path = if global {
        dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(CONFIG_FILE_NAME)
    } else {
        PathBuf::from(CONFIG_FILE_NAME)
    };
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    fs::write(&path, config_template()?)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    if verbosity.should_show_output() {
        eprintln!("{} Created {}", "✓".green().bold(), path.display());
    }
    Ok(())
}
