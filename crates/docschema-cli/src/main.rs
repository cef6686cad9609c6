//! Docschema CLI
//!
//! Profiles the schema of a document collection exported as JSON:
//! - `profile`: discover field paths and per-field statistics, write
//!   `schema_fields.txt` and `schema_profile.csv` (+ optional JSON report)
//! - `fields`: print the discovered field paths only

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;

use docschema_ingest_json::{collect_input_files, DocumentFiles};
use docschema_profile::{discover_with, profile_with, ProfileReportV1};

mod config;
mod logging;
mod output;

use config::{ProfilerConfig, ScanArgs};

#[derive(Parser)]
#[command(name = "docschema")]
#[command(
    author,
    version,
    about = "Docschema: field-path discovery and schema profiling for document collections"
)]
struct Cli {
    /// Debug-level logging (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover fields and profile usage, missingness and value types.
    ///
    /// Runs two passes over the inputs (discovery, then profiling), each
    /// bounded by `--scan-limit`.
    Profile {
        #[command(flatten)]
        scan: ScanArgs,
        /// Directory for schema_fields.txt / schema_profile.csv
        #[arg(long, default_value = "output", env = "DOCSCHEMA_OUTPUT_DIR")]
        output_dir: PathBuf,
        /// Also write schema_profile.json
        #[arg(long, env = "DOCSCHEMA_JSON_REPORT")]
        json_report: bool,
    },

    /// Print every discovered field path, one per line.
    Fields {
        #[command(flatten)]
        scan: ScanArgs,
        /// Write the list to a file instead of stdout
        #[arg(short, long, env = "DOCSCHEMA_FIELDS_OUT")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Profile {
            scan,
            output_dir,
            json_report,
        } => {
            let config = ProfilerConfig::from_args(&scan)?;
            cmd_profile(&config, &output_dir, json_report)?;
        }
        Commands::Fields { scan, out } => {
            let config = ProfilerConfig::from_args(&scan)?;
            cmd_fields(&config, out.as_deref())?;
        }
    }
    Ok(())
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn cmd_profile(config: &ProfilerConfig, output_dir: &Path, json_report: bool) -> Result<()> {
    let files = collect_input_files(&config.inputs)?;
    println!(
        "{} {} ({} file(s), scan limit: {})",
        "Profiling".green().bold(),
        config.source_label(),
        files.len(),
        config.scan.limit
    );
    info!(
        inputs = %config.source_label(),
        files = files.len(),
        scan_limit = %config.scan.limit,
        output_dir = %output_dir.display(),
        "starting schema profiling"
    );

    // 1) Field discovery
    let started = Instant::now();
    let fields = discover_with(
        DocumentFiles::from_files(files.clone(), config.source),
        &config.scan,
    )?;
    let fields_path = output::write_schema_fields(&fields, output_dir)?;
    info!(
        fields = fields.len(),
        path = %fields_path.display(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "field discovery completed"
    );
    println!(
        "  {} {} (fields={})",
        "→".cyan(),
        fields_path.display(),
        fields.len()
    );

    // 2) Profiling
    let started = Instant::now();
    let summary = profile_with(DocumentFiles::from_files(files, config.source), &config.scan)?;
    let csv_path = output::write_schema_profile(&summary.profiles, output_dir)?;
    info!(
        rows = summary.profiles.len(),
        documents = summary.total_docs,
        path = %csv_path.display(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "profiling completed"
    );
    println!(
        "  {} {} (rows={}, documents={})",
        "→".cyan(),
        csv_path.display(),
        summary.profiles.len(),
        summary.total_docs
    );

    if json_report {
        let report = ProfileReportV1::new(
            config.source_label(),
            config.scan.limit,
            &summary,
            now_unix_secs(),
        );
        let report_path = output::write_profile_report(&report, output_dir)?;
        println!("  {} {}", "→".cyan(), report_path.display());
    }

    info!("schema profiling workflow completed");
    Ok(())
}

fn cmd_fields(config: &ProfilerConfig, out: Option<&Path>) -> Result<()> {
    let files = collect_input_files(&config.inputs)?;
    let fields = discover_with(DocumentFiles::from_files(files, config.source), &config.scan)?;

    match out {
        Some(path) => {
            output::write_fields_to(&fields, path)?;
            println!(
                "{} {} field(s) to {}",
                "Wrote".green().bold(),
                fields.len(),
                path.display()
            );
        }
        None => {
            for field in &fields {
                println!("{field}");
            }
        }
    }
    Ok(())
}
