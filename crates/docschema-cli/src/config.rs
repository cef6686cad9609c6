//! Run configuration.
//!
//! Built once from the command line (and `DOCSCHEMA_*` environment
//! variables) and passed down by reference; nothing reads the environment
//! after this point.

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use std::num::NonZeroU64;
use std::path::PathBuf;

use docschema_ingest_json::{ExtendedJson, InputFormat, SourceOptions};
use docschema_profile::{NumberLabels, ScanLimit, ScanOptions};

pub const DEFAULT_SCAN_LIMIT: i64 = 100_000;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Auto,
    #[value(alias = "ndjson")]
    Jsonl,
    JsonArray,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberLabelsArg {
    /// `int` and `float`
    Split,
    /// a single `number` label
    Unified,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Input files or directories (`.json`, `.jsonl`, `.ndjson`)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Max documents to scan. 0 or negative scans everything.
    #[arg(
        long,
        default_value_t = DEFAULT_SCAN_LIMIT,
        allow_negative_numbers = true,
        env = "DOCSCHEMA_SCAN_LIMIT"
    )]
    pub scan_limit: i64,

    /// Input layout
    #[arg(long, value_enum, default_value_t = FormatArg::Auto, env = "DOCSCHEMA_FORMAT")]
    pub format: FormatArg,

    /// How numbers are labelled in type distributions
    #[arg(
        long,
        value_enum,
        default_value_t = NumberLabelsArg::Split,
        env = "DOCSCHEMA_NUMBER_LABELS"
    )]
    pub number_labels: NumberLabelsArg,

    /// Read `{"$oid": ..}` and other Extended JSON markers as plain objects
    #[arg(long, env = "DOCSCHEMA_NO_EXTENDED_JSON")]
    pub no_extended_json: bool,

    /// Log progress every N documents
    #[arg(long, env = "DOCSCHEMA_PROGRESS_EVERY")]
    pub progress_every: Option<u64>,
}

/// Everything a scan needs, resolved from [`ScanArgs`].
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    pub inputs: Vec<PathBuf>,
    pub scan: ScanOptions,
    pub source: SourceOptions,
}

impl ProfilerConfig {
    pub fn from_args(args: &ScanArgs) -> Result<Self> {
        let progress_interval = match args.progress_every {
            None => None,
            Some(n) => match NonZeroU64::new(n) {
                Some(n) => Some(n),
                None => bail!("--progress-every must be at least 1"),
            },
        };

        let scan = ScanOptions {
            limit: ScanLimit::from_signed(args.scan_limit),
            number_labels: match args.number_labels {
                NumberLabelsArg::Split => NumberLabels::Split,
                NumberLabelsArg::Unified => NumberLabels::Unified,
            },
            progress_interval,
        };
        let source = SourceOptions {
            format: match args.format {
                FormatArg::Auto => InputFormat::Auto,
                FormatArg::Jsonl => InputFormat::JsonLines,
                FormatArg::JsonArray => InputFormat::JsonArray,
            },
            extended_json: if args.no_extended_json {
                ExtendedJson::Ignore
            } else {
                ExtendedJson::Recognise
            },
        };

        Ok(Self {
            inputs: args.inputs.clone(),
            scan,
            source,
        })
    }

    /// Human-readable description of the inputs, for logs and reports.
    pub fn source_label(&self) -> String {
        self.inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
