//! CLI argument parsing for wlanalyze

use crate::model::Column;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for parsed messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "wlanalyze")]
#[command(version)]
#[command(about = "Analyze WAYLAND_DEBUG protocol traces", long_about = None)]
pub struct Cli {
    /// Trace files to analyze ("-" reads stdin)
    #[arg(value_name = "LOGFILE", required = true)]
    pub logfiles: Vec<PathBuf>,

    /// Filter messages (e.g., -e class=wl_surface -e method=commit,attach)
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub filters: Vec<String>,

    /// Sort messages by column
    #[arg(short = 's', long = "sort", value_enum, value_name = "COLUMN")]
    pub sort: Option<Column>,

    /// Sort in descending order
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,

    /// Output format (defaults to the config file, then text)
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Show per-message summary (counts per class.method) instead of individual messages
    #[arg(short = 'c', long = "summary")]
    pub summary: bool,

    /// Print smallest/median/biggest time delta of the visible messages
    #[arg(long = "stats")]
    pub stats: bool,

    /// Configuration file (TOML)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
