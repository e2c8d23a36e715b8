//! CLI argument definitions for the tally editor.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tally_cli::edits::{CellAssignment, CompetitorSwap};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Inspect and edit sports result documents",
    long_about = "Inspect and edit sports result documents.\n\n\
                  Results are bound to a typed table (times, flags, attempts, counts),\n\
                  edited cell by cell, and written back with every unknown field kept."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: the platform config directory).
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the results of an event document as a table.
    Show(ShowArgs),

    /// Report duplicate competitors and unreadable values.
    Check(CheckArgs),

    /// Apply edits to an event document and write it back.
    Edit(EditArgs),
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Event document (JSON).
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Athlete directory used to show names instead of ids.
    #[arg(long = "athletes", value_name = "PATH")]
    pub athletes: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Event document (JSON).
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,
}

#[derive(Parser)]
pub struct EditArgs {
    /// Event document (JSON).
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Set one cell, e.g. `joe_biden.finish_time=21:30.5`.
    ///
    /// Flag columns take true/false; empty text clears the cell.
    #[arg(long = "set", value_name = "COMPETITOR.COLUMN=TEXT")]
    pub set: Vec<CellAssignment>,

    /// Add a row for a competitor.
    #[arg(long = "add", value_name = "ID")]
    pub add: Vec<String>,

    /// Let two competitors trade results, e.g. `joe_biden=al_gore`.
    #[arg(long = "swap", value_name = "FIRST=SECOND")]
    pub swap: Vec<CompetitorSwap>,

    /// Delete the row of a competitor.
    #[arg(long = "delete", value_name = "ID")]
    pub delete: Vec<String>,

    /// Add a bar height (high jump only).
    #[arg(long = "add-height", value_name = "HEIGHT")]
    pub add_height: Vec<String>,

    /// Accept attempt sequences that break jumping order.
    #[arg(long = "relaxed")]
    pub relaxed: bool,

    /// Write here instead of overwriting DOCUMENT.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
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
