//! CLI argument definitions for role-sift.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "role-sift",
    version,
    about = "Filter and annotate job-posting spreadsheets",
    long_about = "Filter and annotate job-posting spreadsheets.\n\n\
                  `filter` applies the configured drop rules, tags rows and merges prior\n\
                  actions. `locate` fills in My Location from the project location.\n\
                  `ledger` copies My Action labels from a filtered sheet into the Action ledger."
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

    /// Append logs, including every operator message, to a run log file.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply drop rules and filter tags, and merge the Action ledger.
    Filter(FilterArgs),

    /// Fill in the My Location column from project locations.
    Locate(LocateArgs),

    /// Add actions recorded in a filtered sheet to the Action ledger.
    Ledger(LedgerArgs),
}

#[derive(Parser)]
pub struct FilterArgs {
    /// JSON configuration file (option name to list of values).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Roles sheet (CSV).
    #[arg(value_name = "ROLES")]
    pub roles: PathBuf,

    /// Action ledger (CSV) with prior apply/pass decisions.
    #[arg(long = "actions", value_name = "CSV")]
    pub actions: PathBuf,

    /// Output path (default: <ROLES>_out.csv next to the input).
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LocateArgs {
    /// JSON configuration file (option name to list of values).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Roles sheet (CSV). Updated in place unless --output is given.
    #[arg(value_name = "ROLES")]
    pub roles: PathBuf,

    /// Location directory (CSV): raw location, then My Location category.
    #[arg(long = "locations", value_name = "CSV")]
    pub locations: PathBuf,

    /// Output path (default: overwrite <ROLES>).
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LedgerArgs {
    /// JSON configuration file (option name to list of values).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Previously filtered roles sheet (CSV) with a My Action column.
    #[arg(value_name = "ROLES")]
    pub roles: PathBuf,

    /// Action ledger (CSV). Updated in place unless --output is given.
    #[arg(long = "actions", value_name = "CSV")]
    pub actions: PathBuf,

    /// Action recorded for rows whose My Action cell is blank.
    #[arg(long = "default-action", value_name = "TEXT")]
    pub default_action: String,

    /// Date recorded for rows without a readable action date.
    #[arg(long = "default-date", value_name = "MM/DD/YYYY", value_parser = parse_label_date)]
    pub default_date: NaiveDate,

    /// Output path (default: overwrite the --actions file).
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

fn parse_label_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y")
        .map_err(|error| format!("expected MM/DD/YYYY: {error}"))
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
