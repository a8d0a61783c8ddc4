//! CLI argument definitions for the family reconciliation import.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "famrec",
    version,
    about = "Reconcile benefit-registry families against school enrollment",
    long_about = "Cross-reference a benefit-registry extract with a school-enrollment extract.\n\n\
                  Dependents recognised by the school registry under the same guardian are\n\
                  granted; every other row is written to a rejection audit with its reason."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow names and national IDs in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a reconciliation import for one tenant.
    Import(ImportArgs),

    /// List the columns each input file must provide.
    Columns,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Tenant (city) the import belongs to.
    #[arg(long = "tenant", value_name = "ID")]
    pub tenant: String,

    /// Benefit-registry CSV extract.
    #[arg(long = "benefits", value_name = "CSV")]
    pub benefits: PathBuf,

    /// School-enrollment CSV extract.
    #[arg(long = "enrollment", value_name = "CSV")]
    pub enrollment: PathBuf,

    /// Directory receiving grants.jsonl and rejections.csv.
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// TOML settings file with [import] and [input] tables.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Processing date (YYYY-MM-DD); ages are computed at the start of its month.
    #[arg(long = "as-of", value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Dependents must be younger than this many years.
    #[arg(long = "age-limit", value_name = "YEARS")]
    pub age_limit: Option<u32>,

    /// Grants written between progress updates.
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Column delimiter of both input files.
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Reconcile and audit without writing grants.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Also write the import summary as JSON.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
