//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - top-level arguments and the [`Command`] to run
//! - [`ArchiveArgs`] - options shared by `parse` and `search`
//! - [`OutputFormat`] - output format options
//!
//! ```rust
//! use clap::Parser;
//! use ichatpack::cli::{Args, Command};
//!
//! let args = Args::parse_from([
//!     "ichatpack", "parse", "converted", "--names", "names.json", "-f", "jsonl",
//! ]);
//! let Command::Parse(parse) = args.command else { unreachable!() };
//! assert_eq!(parse.archive.dir, "converted");
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Recover conversation records from Messages .ichat archives.
#[derive(Parser, Debug, Clone)]
#[command(name = "ichatpack")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    ichatpack copy --archive-dir ~/Library/Messages/Archive --out-dir converted --years 2013,2014
    ichatpack parse converted --names names.json -o corpus.csv
    ichatpack parse converted --names names.json --owner \"Mark Smith\" -f jsonl -t
    ichatpack search converted --names names.json lunch --context 2
    ichatpack search converted \"at (\\d+)\" --regex --group 1")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Find raw archives, drop duplicates and convert them with plutil
    Copy(CopyArgs),

    /// Parse converted archives and write the records
    Parse(ParseArgs),

    /// Search parsed records
    Search(SearchArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct CopyArgs {
    /// Root of the raw Messages archive
    #[arg(long, value_name = "DIR")]
    pub archive_dir: String,

    /// Directory for converted archives (created if missing)
    #[arg(long, value_name = "DIR")]
    pub out_dir: String,

    /// Years to copy, comma separated (default: start year to now)
    #[arg(long, value_delimiter = ',', value_name = "YEARS")]
    pub years: Vec<i32>,

    /// Archive configuration (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// plutil executable
    #[arg(long, default_value = "plutil", value_name = "PATH")]
    pub plutil: String,
}

/// Where converted archives live and how to read them.
#[derive(clap::Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Directory of converted archives
    pub dir: String,

    /// Name-group table (JSON); without it participants stay ungrouped under their file names
    #[arg(long, value_name = "FILE")]
    pub names: Option<String>,

    /// Archive configuration (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Years to parse, comma separated (default: all)
    #[arg(long, value_delimiter = ',', value_name = "YEARS")]
    pub years: Vec<i32>,

    /// Only this owner's records (any alias of the group)
    #[arg(long, value_name = "NAME")]
    pub owner: Option<String>,

    /// Show a progress line on stderr
    #[arg(long)]
    pub progress: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ParseArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Path to output file
    #[arg(short, long, default_value = "ichat_corpus.csv")]
    pub output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Filter messages after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// Filter messages before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub before: Option<String>,

    /// Filter messages from specific sender
    #[arg(long, value_name = "SENDER")]
    pub from: Option<String>,

    /// Include timestamps in output
    #[arg(short = 't', long)]
    pub timestamps: bool,

    /// Include the inferred-timestamp flag in output
    #[arg(long)]
    pub inferred: bool,

    /// Keep sender codes and source files on every record
    #[arg(long)]
    pub debug: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Text (or pattern, with --regex) to look for
    pub query: String,

    /// Treat the query as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Capture group to highlight (with --regex)
    #[arg(long, value_name = "N")]
    pub group: Option<usize>,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Rows to show around each hit
    #[arg(short = 'C', long, default_value_t = 0, value_name = "N")]
    pub context: usize,
}

/// Output format options.
///
/// - [`Csv`](OutputFormat::Csv) - semicolon-delimited, one row per record
/// - [`Json`](OutputFormat::Json) - structured array
/// - [`Jsonl`](OutputFormat::Jsonl) - one JSON object per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV with semicolon delimiter (default)
    #[default]
    Csv,

    /// JSON array of records
    Json,

    /// JSON Lines
    #[value(alias = "ndjson")]
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}
