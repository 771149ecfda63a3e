//! JSON output format for Wayland traces
//!
//! `--format json`: one document holding the visible messages in row order,
//! their time deltas and the statistics of the view.

use crate::message::{Direction, Message};
use crate::model::Model;
use crate::registry::ObjectRef;
use crate::stats::{MethodStats, SummaryTracker, TimeDeltaStats};
use serde::{Deserialize, Serialize};

/// A single protocol message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonMessage {
    /// Source line in the trace (1-based)
    pub line: usize,
    /// Timestamp in microseconds
    pub time: u64,
    /// Time since the previous visible row in microseconds
    pub time_delta: i64,
    pub direction: Direction,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub connection: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub queue: String,
    pub object: ObjectRef,
    pub method: String,
    /// Raw argument strings
    pub arguments: Vec<String>,
    /// Objects created by this message
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub created: Vec<ObjectRef>,
    /// Objects destroyed by this message
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub destroyed: Vec<ObjectRef>,
}

impl JsonMessage {
    pub fn from_message(message: &Message, time_delta: i64) -> Self {
        Self {
            line: message.line,
            time: message.time,
            time_delta,
            direction: message.direction,
            connection: message.connection.clone(),
            queue: message.queue.clone(),
            object: message.object.clone(),
            method: message.method.clone(),
            arguments: message.arguments.clone(),
            created: message.created.clone(),
            destroyed: message.destroyed.clone(),
        }
    }
}

/// Summary statistics for the trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Lines read from the trace
    pub lines: usize,
    /// Lines that were not protocol messages
    pub skipped_lines: usize,
    /// Total number of messages parsed
    pub total_messages: usize,
    /// Messages passing the filter
    pub visible_messages: usize,
    /// Connection labels seen in the trace
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub connections: Vec<String>,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Visible messages in row order
    pub messages: Vec<JsonMessage>,
    /// Summary statistics
    pub summary: JsonSummary,
    /// Spread of the visible time deltas
    pub time_delta: TimeDeltaStats,
}

impl JsonOutput {
    /// Create an empty JSON output structure
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "wlanalyze-json-v1".to_string(),
            messages: Vec::new(),
            summary: JsonSummary {
                lines: 0,
                skipped_lines: 0,
                total_messages: 0,
                visible_messages: 0,
                connections: Vec::new(),
            },
            time_delta: TimeDeltaStats::default(),
        }
    }

    /// Snapshot the visible rows of a model
    pub fn from_model(model: &Model) -> Self {
        let mut output = Self::new();
        for (message, delta) in model.rows() {
            output.add_message(JsonMessage::from_message(message, delta));
        }

        let stats = model.parse_stats();
        output.summary.lines = stats.lines;
        output.summary.skipped_lines = stats.skipped;
        output.summary.total_messages = model.len();
        output.summary.connections = stats.connections.clone();
        output.time_delta = model.delta_stats();
        output
    }

    /// Add a message to the output
    pub fn add_message(&mut self, message: JsonMessage) {
        self.summary.visible_messages += 1;
        self.messages.push(message);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the -c summary in JSON form
#[derive(Debug, Clone, Serialize)]
pub struct JsonMethodStats<'a> {
    /// `class.method`
    pub message: &'a str,
    #[serde(flatten)]
    pub stats: &'a MethodStats,
}

/// Serialize the -c summary, most frequent first
pub fn summary_to_json(tracker: &SummaryTracker) -> anyhow::Result<String> {
    let rows: Vec<JsonMethodStats<'_>> = tracker
        .sorted()
        .into_iter()
        .map(|(message, stats)| JsonMethodStats { message, stats })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
