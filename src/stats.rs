//! Timing statistics and per-request summaries
//!
//! `TimeDeltaStats` drives the time-delta heat shading in the text output.
//! `SummaryTracker` backs -c mode: message counts per `class.method`.

use crate::message::{Direction, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};

/// Spread of absolute time deltas over the current view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDeltaStats {
    /// Smallest absolute delta (microseconds)
    pub smallest: u64,
    /// Middle element of the absolute deltas sorted ascending
    pub median: u64,
    /// Biggest absolute delta (microseconds)
    pub biggest: u64,
}

impl TimeDeltaStats {
    /// Compute statistics for a delta sequence
    ///
    /// For an even number of deltas the median is the element at `len / 2`
    /// of the sorted absolute values; no averaging takes place.
    pub fn from_deltas(deltas: &[i64]) -> Self {
        if deltas.is_empty() {
            return Self::default();
        }

        let mut magnitudes: Vec<u64> = deltas.iter().map(|d| d.unsigned_abs()).collect();
        magnitudes.sort_unstable();

        Self {
            smallest: magnitudes[0],
            median: magnitudes[magnitudes.len() / 2],
            biggest: magnitudes[magnitudes.len() - 1],
        }
    }

    /// Map a delta onto 0.0..=1.0 for shading
    ///
    /// 0.5 at the median, logarithmic towards 0.0 at the smallest and 1.0 at
    /// the biggest delta.
    pub fn heat(&self, delta: i64) -> f64 {
        let magnitude = delta.unsigned_abs();

        let scaled = |distance: u64, span: u64| -> f64 {
            if span == 0 {
                return 1.0;
            }
            ((distance + 1) as f64).ln() / ((span + 1) as f64).ln()
        };

        let heat = if magnitude < self.median {
            let span = self.median.saturating_sub(self.smallest);
            0.5 - 0.5 * scaled(self.median - magnitude, span)
        } else if magnitude > self.median {
            let span = self.biggest.saturating_sub(self.median);
            0.5 + 0.5 * scaled(magnitude - self.median, span)
        } else {
            0.5
        };
        heat.clamp(0.0, 1.0)
    }
}

/// Counters for one `class.method`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodStats {
    /// Number of messages
    pub count: u64,
    /// Messages sent to the compositor
    pub requests: u64,
    /// Messages received from the compositor
    pub events: u64,
    /// Objects created by these messages
    pub created: u64,
    /// Objects destroyed by these messages
    pub destroyed: u64,
}

/// Tracks message counts for summary mode
#[derive(Debug, Default)]
pub struct SummaryTracker {
    /// Map from "class.method" to counters
    stats: HashMap<String, MethodStats>,
}

impl SummaryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message
    pub fn record(&mut self, message: &Message) {
        let key = format!("{}.{}", message.object.class, message.method);
        let entry = self.stats.entry(key).or_default();
        entry.count += 1;
        match message.direction {
            Direction::ToCompositor => entry.requests += 1,
            Direction::FromCompositor => entry.events += 1,
            Direction::Unknown => {}
        }
        entry.created += message.created.len() as u64;
        entry.destroyed += message.destroyed.len() as u64;
    }

    /// Get access to the stats map
    pub fn stats_map(&self) -> &HashMap<String, MethodStats> {
        &self.stats
    }

    /// Entries sorted by count (descending), then name
    pub fn sorted(&self) -> Vec<(&str, &MethodStats)> {
        let mut sorted: Vec<_> = self.stats.iter().map(|(k, v)| (k.as_str(), v)).collect();
        sorted.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        sorted
    }

    /// Sum over all entries
    pub fn totals(&self) -> MethodStats {
        self.stats.values().fold(MethodStats::default(), |mut total, s| {
            total.count += s.count;
            total.requests += s.requests;
            total.events += s.events;
            total.created += s.created;
            total.destroyed += s.destroyed;
            total
        })
    }

    /// Write the summary table (strace -c layout)
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.stats.is_empty() {
            writeln!(out, "No messages traced.")?;
            return Ok(());
        }

        let totals = self.totals();

        writeln!(out, "% calls     calls  requests    events   created destroyed message")?;
        writeln!(out, "------- --------- --------- --------- --------- --------- ----------------")?;

        for (name, stats) in self.sorted() {
            let percent = stats.count as f64 / totals.count as f64 * 100.0;
            writeln!(
                out,
                "{:7.2} {:>9} {:>9} {:>9} {:>9} {:>9} {}",
                percent,
                stats.count,
                stats.requests,
                stats.events,
                stats.created,
                stats.destroyed,
                name
            )?;
        }

        writeln!(out, "------- --------- --------- --------- --------- --------- ----------------")?;
        writeln!(
            out,
            " 100.00 {:>9} {:>9} {:>9} {:>9} {:>9} total",
            totals.count, totals.requests, totals.events, totals.created, totals.destroyed
        )?;
        Ok(())
    }
}
