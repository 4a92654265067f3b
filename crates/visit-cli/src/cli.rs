//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "visit-tracker",
    version,
    about = "Visit completeness reports for longitudinal trials",
    long_about = "Reconcile the data collected for each trial participant against the \
                  expected visit schedule.\n\n\
                  Rosters come from an export directory when one is given, falling back \
                  to the CSV roster cache written by the last complete load."
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

    /// Configuration file (default: the platform config directory).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report missing collections per participant and instrument.
    Missing(MissingArgs),

    /// Count participants by group and sex.
    Participants(RosterArgs),

    /// Show observed collection counts per participant.
    Collection(CollectionArgs),

    /// List the instrument schedule.
    Instruments,
}

/// Where the roster comes from.
#[derive(Args, Clone, Default)]
pub struct RosterArgs {
    /// Study (project) identifier.
    #[arg(long = "study", value_name = "ID")]
    pub study: Option<String>,

    /// Directory of per-datatype CSV exports used as the live source.
    #[arg(long = "exports", value_name = "DIR")]
    pub exports: Option<PathBuf>,

    /// Roster cache file, read when the live source fails.
    #[arg(long = "cache", value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Concurrent per-participant requests against the live source.
    #[arg(long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Report date, YYYY-MM-DD (default: today).
    #[arg(long = "as-of", value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args, Clone, Default)]
pub struct MissingArgs {
    #[command(flatten)]
    pub roster: RosterArgs,

    /// Show over-collected instruments as zero instead of negative.
    #[arg(long = "clamp")]
    pub clamp: bool,

    /// Leave an instrument column out of the table (repeatable).
    #[arg(long = "omit", value_name = "INSTRUMENT")]
    pub omit: Vec<String>,

    /// Fail on counts for instruments missing from the schedule.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Also write the table to a CSV file.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
pub struct CollectionArgs {
    #[command(flatten)]
    pub roster: RosterArgs,

    /// Also write the table to a CSV file.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
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
