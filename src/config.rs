//! Analyzer configuration file
//!
//! Optional TOML file with defaults for filtering, sorting and output. Every
//! field can be omitted; command line flags take precedence.
//!
//! ```toml
//! filters = ["class=wl_surface", "dir=to"]
//! sort = "time-delta"
//! descending = true
//! format = "json"
//! parallel_filter_threshold = 100000
//! filter_workers = 4
//! ```

use crate::cli::OutputFormat;
use crate::filter::{FilterError, MessageFilter};
use crate::model::{Column, FilterParallelism, SortOrder};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Defaults applied to every analyzed trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Filter expressions always applied, ANDed with `-e` flags
    pub filters: Vec<String>,

    /// Initial sort column; trace order when absent
    pub sort: Option<Column>,

    /// Sort descending instead of ascending
    pub descending: bool,

    /// Output format when `--format` is not given
    pub format: OutputFormat,

    /// Message count above which filtering uses worker threads
    #[serde(default = "default_parallel_threshold")]
    pub parallel_filter_threshold: usize,

    /// Filter worker threads (0 = available parallelism)
    pub filter_workers: usize,
}

fn default_parallel_threshold() -> usize {
    FilterParallelism::default().threshold
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: None,
            descending: false,
            format: OutputFormat::Text,
            parallel_filter_threshold: default_parallel_threshold(),
            filter_workers: 0,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid configuration.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", path.as_ref().display())
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid analyzer configuration")?;
        // Reject bad expressions at load time rather than per trace
        config.base_filter()?;
        Ok(config)
    }

    /// Filter built from the configured expressions
    pub fn base_filter(&self) -> std::result::Result<MessageFilter, FilterError> {
        MessageFilter::from_exprs(&self.filters)
    }

    /// Configured sort, if any
    pub fn sort_key(&self) -> Option<(Column, SortOrder)> {
        let order = if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        self.sort.map(|column| (column, order))
    }

    pub fn parallelism(&self) -> FilterParallelism {
        FilterParallelism {
            threshold: self.parallel_filter_threshold,
            workers: self.filter_workers,
        }
    }
}
