//! Whole-trace parsing
//!
//! Drives [`LineParser`] over a stream and hands the resulting messages to a
//! [`Model`]. Every parse starts from empty connection registries, so a parser
//! can be reused for any number of traces.
//!
//! # Failure policy
//!
//! A registry failure on any line aborts the parse with the 1-based number of
//! the offending line. Lines that merely do not look like messages (banners,
//! blank lines, application output) are skipped and counted.

use crate::line_parser::LineParser;
use crate::model::{FilterParallelism, Model};
use crate::registry::{ConnectionRegistries, RegistryError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

/// Errors that abort a parse
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Wayland log is not readable: {0}")]
    StreamUnreadable(#[from] std::io::Error),

    #[error("Wayland log parse error at line {line}: {source}")]
    Line { line: usize, source: RegistryError },
}

/// Counters collected during one parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Total lines read
    pub lines: usize,
    /// Lines that produced a message
    pub messages: usize,
    /// Lines that were not messages
    pub skipped: usize,
    /// Connection labels seen, sorted
    pub connections: Vec<String>,
}

/// Parses complete WAYLAND_DEBUG traces into a [`Model`]
#[derive(Debug, Clone, Default)]
pub struct TraceParser {
    line_parser: LineParser,
    parallelism: FilterParallelism,
}

impl TraceParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter parallelism handed to every model this parser produces
    pub fn with_parallelism(mut self, parallelism: FilterParallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Open and parse a trace file
    ///
    /// # Errors
    /// `StreamUnreadable` if the file cannot be opened or read, before any
    /// line is parsed.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Model, ParseError> {
        let file = File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "parsing trace file");
        self.parse_reader(BufReader::new(file))
    }

    /// Parse trace text already in memory
    pub fn parse_str(&self, text: &str) -> Result<Model, ParseError> {
        self.parse_reader(Cursor::new(text.as_bytes()))
    }

    /// Parse a trace from any buffered reader
    ///
    /// Invalid UTF-8 is replaced rather than rejected; traces regularly
    /// contain raw bytes from string arguments.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Model, ParseError> {
        let mut registries = ConnectionRegistries::new();
        let mut messages = Vec::new();
        let mut stats = ParseStats::default();

        for (index, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let line_number = index + 1;
            let line = String::from_utf8_lossy(&bytes);
            stats.lines = line_number;

            match self.line_parser.parse_line(&line, line_number, &mut registries) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => stats.skipped += 1,
                Err(source) => {
                    return Err(ParseError::Line {
                        line: line_number,
                        source,
                    })
                }
            }
        }

        stats.messages = messages.len();
        stats.connections = registries.labels().into_iter().map(String::from).collect();

        tracing::info!(
            lines = stats.lines,
            messages = stats.messages,
            skipped = stats.skipped,
            connections = stats.connections.len(),
            "parsed Wayland trace"
        );

        Ok(Model::new(messages, stats, self.parallelism))
    }
}
