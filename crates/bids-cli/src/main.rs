//! CLI entry point for the BIDS dataset catalog.
//!
//! Indexes a dataset directory and answers the queries a file picker needs:
//! which subjects exist, which files match a selection, which files a
//! processing tool would be offered.
//!
//! # Usage
//!
//! ```bash
//! bids-nav [OPTIONS] <COMMAND>
//!
//! # Scan and show summary
//! bids-nav scan --path /mnt/data
//!
//! # All T1-weighted NIfTI files of one subject
//! bids-nav query --subject sub-01 --scan T1w --format nifti
//!
//! # Files the dcm2nii tool would be offered, as CSV
//! bids-nav query --preset dcm2nii --output-format csv --output picks.csv
//!
//! # Fill the named inputs of the co-registration tool
//! bids-nav inputs --preset coregistration --subject sub-01
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use bids_catalog::{Catalog, Filter, FilterKey, Preset, RecordSet, resolve_inputs};
use bids_core::Config;
use bids_scanner::ScanStats;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Index a BIDS neuroimaging dataset and query it.
///
/// Walks the dataset root, collapses DICOM series, classifies every file by
/// subject, session, source, modality and options, and prints the files that
/// match a selection.
#[derive(Parser)]
#[command(name = "bids-nav", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Dataset root directory.
    ///
    /// Overrides `catalog.data_dir` from the configuration file.
    #[arg(short, long, global = true, env = "BIDS_NAV_PATH")]
    path: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "BIDS_NAV_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Accept every DICOM candidate without parsing its header.
    #[arg(long, global = true)]
    no_validate_dicom: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan the dataset and display a summary.
    Scan {
        /// List every catalogued file.
        #[arg(short, long)]
        detailed: bool,
    },

    /// List distinct subjects.
    Subjects,

    /// List distinct sessions.
    Sessions {
        /// Only sessions of this subject.
        #[arg(short, long)]
        subject: Option<String>,
    },

    /// Print the files matching a selection.
    Query {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print all template files.
    Templates {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Pick a file for every named input of a tool.
    Inputs {
        /// Tool whose inputs are filled.
        #[arg(long)]
        preset: Preset,

        /// Subject to draw the inputs from.
        #[arg(short, long)]
        subject: Option<String>,

        /// Sessions to draw the inputs from.
        #[arg(long)]
        session: Vec<String>,
    },
}

/// Filter flags of the `query` command.
///
/// Flags are applied on top of `--filter-json`, after `--preset`.
#[derive(Args)]
struct SelectionArgs {
    /// Subject id (`sub-01`), repeatable.
    #[arg(long)]
    subject: Vec<String>,

    /// Session id (`ses-01`), repeatable.
    #[arg(long)]
    session: Vec<String>,

    /// Scan label (`T1w`, `dwi`, `ct`), repeatable.
    #[arg(long)]
    scan: Vec<String>,

    /// Data source (`raw`, `sourcedata`, `derivatives`, `templates`), repeatable.
    #[arg(long)]
    source: Vec<String>,

    /// Data type (`anat`, `dwi`, `ct`), repeatable.
    #[arg(long = "type")]
    data_type: Vec<String>,

    /// File format (`dicom`, `nifti`, `json`), repeatable.
    #[arg(long)]
    format: Vec<String>,

    /// Option tag (`acq-gad`), repeatable; any tag matches.
    #[arg(long)]
    option: Vec<String>,

    /// Base filter as a JSON object keyed by filter name.
    #[arg(long)]
    filter_json: Option<String>,

    /// Start from the filter of a processing tool.
    #[arg(long)]
    preset: Option<Preset>,
}

/// Where and how record sets are written.
#[derive(Args)]
struct OutputArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output_format: OutputFormat,

    /// Output file (defaults to stdout).
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,
}

/// Record output format.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// JSON object of eight columns.
    Json,
    /// CSV, one row per file.
    Csv,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. Logs go
/// to stderr so record output on stdout stays machine-readable.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},dicom_object=warn,globset=warn,ignore=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the configuration file and CLI arguments.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be loaded.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    if let Some(path) = &cli.path {
        config.catalog.data_dir.clone_from(path);
    }
    if cli.no_validate_dicom {
        config.scan.validate_dicom = false;
    }

    Ok(config)
}

/// Builds the catalog and performs the first scan.
///
/// # Errors
///
/// Returns an error if the data directory is invalid or the scan fails.
fn open_catalog(config: Config) -> color_eyre::Result<Catalog> {
    let data_dir = config.catalog.data_dir.clone();
    Catalog::new(config).wrap_err_with(|| format!("Failed to index {data_dir}"))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a one-shot scan with summary output.
///
/// # Errors
///
/// Returns an error if scanning fails.
fn run_scan(config: Config, detailed: bool) -> color_eyre::Result<()> {
    info!(data_dir = %config.catalog.data_dir, "Starting scan");

    let catalog = open_catalog(config)?;
    let snapshot = catalog.snapshot();

    print_summary(&catalog, &snapshot)?;

    if detailed {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle)?;
        writeln!(handle, "Files ({}):", snapshot.len())?;
        for record in snapshot.iter() {
            writeln!(
                handle,
                "  {} [{} {} {} {}]",
                record.file_name,
                record.data_source,
                record.format,
                record.subject,
                record.data_scan
            )?;
        }
    }

    Ok(())
}

/// Prints one distinct value per line.
fn run_list(values: &[String]) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for value in values {
        writeln!(handle, "{value}")?;
    }
    Ok(())
}

/// Lists sessions, optionally for a single subject.
fn run_sessions(config: Config, subject: Option<&str>) -> color_eyre::Result<()> {
    let catalog = open_catalog(config)?;
    let sessions = match subject {
        Some(subject) => {
            let mut filter = Filter::new();
            filter.select_subject(subject);
            catalog.query(&filter).distinct_sessions()
        }
        None => catalog.sessions(),
    };
    run_list(&sessions)
}

/// Runs a query and writes the matching records.
///
/// # Errors
///
/// Returns an error if the filter is invalid, or scanning or writing fails.
fn run_query(
    config: Config,
    selection: &SelectionArgs,
    output: &OutputArgs,
) -> color_eyre::Result<()> {
    let filter = build_filter(selection)?;
    info!(filter = %filter, "Running query");

    let catalog = open_catalog(config)?;
    let records = catalog.query(&filter);
    info!(matched = records.len(), total = catalog.len(), "Query finished");

    write_records(&records, output)
}

/// Combines `--filter-json`, `--preset` and the per-key flags.
fn build_filter(selection: &SelectionArgs) -> color_eyre::Result<Filter> {
    let mut filter = match &selection.filter_json {
        Some(json) => Filter::from_json(json).wrap_err("Invalid --filter-json")?,
        None => Filter::new(),
    };

    if let Some(preset) = selection.preset {
        preset.apply(&mut filter);
    }

    let flags = [
        (FilterKey::Subjects, &selection.subject),
        (FilterKey::Sessions, &selection.session),
        (FilterKey::DataScans, &selection.scan),
        (FilterKey::DataSources, &selection.source),
        (FilterKey::DataTypes, &selection.data_type),
        (FilterKey::Formats, &selection.format),
        (FilterKey::Options, &selection.option),
    ];
    for (key, values) in flags {
        if !values.is_empty() {
            filter.set_values(key, values)?;
        }
    }

    Ok(filter)
}

/// Writes all template files.
fn run_templates(config: Config, output: &OutputArgs) -> color_eyre::Result<()> {
    let catalog = open_catalog(config)?;
    write_records(&catalog.templates(), output)
}

/// Resolves the named inputs of a tool and prints one line per slot.
///
/// # Errors
///
/// Returns an error if scanning fails or a required input stays empty.
fn run_inputs(
    config: Config,
    preset: Preset,
    subject: Option<&str>,
    sessions: &[String],
) -> color_eyre::Result<()> {
    if preset.inputs().is_empty() {
        return Err(eyre!("Tool '{preset}' has no named inputs"));
    }

    let catalog = open_catalog(config)?;

    let mut filter = preset.filter();
    if let Some(subject) = subject {
        filter.select_subject(subject);
    }
    filter.select_sessions(sessions);
    let selection = catalog.query(&filter);
    let templates = catalog.templates();

    let resolved = resolve_inputs(preset, &selection, &templates)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for slot in &resolved {
        let file = slot.file.map_or("-", |path| path.as_str());
        let marker = if slot.input.required { "" } else { " (optional)" };
        writeln!(handle, "{}{marker}: {file}", slot.input.name)?;
    }

    let missing: Vec<_> = resolved
        .iter()
        .filter(|slot| slot.is_missing())
        .map(|slot| slot.input.name)
        .collect();
    if !missing.is_empty() {
        return Err(eyre!("Missing required inputs: {}", missing.join(", ")));
    }

    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints a summary of the catalog.
fn print_summary(catalog: &Catalog, records: &RecordSet) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    writeln!(handle, "Catalog Summary")?;
    writeln!(handle, "===============")?;
    writeln!(handle)?;
    if let Some(root) = catalog.root() {
        writeln!(handle, "Root: {root}")?;
    }
    if let Some(stats) = catalog.stats() {
        print_scan_stats(&mut handle, stats)?;
    }
    writeln!(handle)?;

    writeln!(handle, "By source:")?;
    for source in bids_core::DataSource::ALL {
        let count = records.data_sources().iter().filter(|&&s| s == source).count();
        writeln!(handle, "  {:<12} {count}", source.as_str())?;
    }
    writeln!(handle, "By type:")?;
    for data_type in bids_core::DataType::ALL {
        let count = records.data_types().iter().filter(|&&t| t == data_type).count();
        writeln!(handle, "  {:<12} {count}", data_type.as_str())?;
    }
    writeln!(handle)?;
    writeln!(handle, "Subjects: {}", catalog.subjects().len())?;
    writeln!(handle, "Sessions: {}", catalog.sessions().len())?;

    Ok(())
}

fn print_scan_stats(handle: &mut impl Write, stats: &ScanStats) -> color_eyre::Result<()> {
    writeln!(handle, "Files seen: {}", stats.files_seen)?;
    writeln!(handle, "  DICOM:            {}", stats.dicom)?;
    writeln!(handle, "  NIfTI:            {}", stats.nifti)?;
    writeln!(handle, "  JSON:             {}", stats.json)?;
    writeln!(handle, "  Series collapsed: {}", stats.series_collapsed)?;
    writeln!(handle, "  Invalid DICOM:    {}", stats.rejected_dicom)?;
    writeln!(handle, "  Skipped:          {}", stats.skipped)?;
    writeln!(handle, "  Ignored:          {}", stats.ignored)?;
    Ok(())
}

/// Writes a record set to a file or stdout.
fn write_records(records: &RecordSet, output: &OutputArgs) -> color_eyre::Result<()> {
    let content = match output.output_format {
        OutputFormat::Json => generate_json_report(records)?,
        OutputFormat::Csv => generate_csv_report(records),
    };

    if let Some(path) = &output.output {
        std::fs::write(path.as_std_path(), &content)
            .wrap_err_with(|| format!("Failed to write {path}"))?;
        info!(path = %path, records = records.len(), "Report written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{content}")?;
    }

    Ok(())
}

/// Generates a JSON report of eight columns.
fn generate_json_report(records: &RecordSet) -> color_eyre::Result<String> {
    let mut json = serde_json::to_string_pretty(records)
        .map_err(|e| eyre!("Failed to serialize JSON: {}", e))?;
    json.push('\n');
    Ok(json)
}

/// Generates a CSV report, one row per record.
///
/// Option tags are joined with `;`.
fn generate_csv_report(records: &RecordSet) -> String {
    use std::fmt::Write;

    let mut output =
        String::from("file_name,format,data_type,data_source,data_scan,options,subject,session\n");

    for record in records.iter() {
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{},{}",
            escape_csv(record.file_name.as_str()),
            record.format,
            record.data_type,
            record.data_source,
            escape_csv(record.data_scan),
            escape_csv(&record.options.join(";")),
            escape_csv(record.subject),
            escape_csv(record.session),
        );
    }

    output
}

/// Escapes a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_owned()
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Resolve configuration
    let config = build_config(&cli)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Scan { detailed } => run_scan(config, *detailed),
        Commands::Subjects => run_list(&open_catalog(config)?.subjects()),
        Commands::Sessions { subject } => run_sessions(config, subject.as_deref()),
        Commands::Query { selection, output } => run_query(config, selection, output),
        Commands::Templates { output } => run_templates(config, output),
        Commands::Inputs {
            preset,
            subject,
            session,
        } => run_inputs(config, *preset, subject.as_deref(), session),
    }
}
