//! Sorted and filtered view over a parsed trace
//!
//! The model owns the full message sequence in trace order and derives from
//! it a sorted order, the filtered rows of that order, a message → row lookup
//! and per-row time deltas. Every sort or filter change rebuilds the lookup
//! and the deltas, since both depend on row order and membership.
//!
//! Messages are never mutated after parsing. Filter passes over large traces
//! run on scoped worker threads that only read the message slice.

use crate::filter::MessageFilter;
use crate::message::Message;
use crate::stats::TimeDeltaStats;
use crate::trace_parser::ParseStats;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Index of a message in trace order; stable across sorting and filtering
pub type MessageId = usize;

/// Columns a view can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Time,
    Connection,
    Queue,
    Direction,
    Object,
    Method,
    Arguments,
    TimeDelta,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Column::Time => "Time",
            Column::Connection => "Connection",
            Column::Queue => "Queue",
            Column::Direction => "Direction",
            Column::Object => "Object",
            Column::Method => "Method",
            Column::Arguments => "Arguments",
            Column::TimeDelta => "Time Δ",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// When and how widely filter passes are split across threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParallelism {
    /// Minimum number of candidate messages before threads are used
    pub threshold: usize,
    /// Worker count; 0 uses the available parallelism
    pub workers: usize,
}

impl Default for FilterParallelism {
    fn default() -> Self {
        Self {
            threshold: 50_000,
            workers: 0,
        }
    }
}

impl FilterParallelism {
    fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }
}

/// Parsed trace plus its current presentation state
#[derive(Debug)]
pub struct Model {
    messages: Vec<Message>,
    /// All message ids in the current sort order
    sorted: Vec<MessageId>,
    /// Visible rows: `sorted` restricted to filter matches
    filtered: Vec<MessageId>,
    /// MessageId → visible row
    filtered_index: Vec<Option<usize>>,
    /// Time delta per visible row
    time_deltas: Vec<i64>,
    delta_stats: TimeDeltaStats,
    filter: Option<MessageFilter>,
    sort_key: Option<(Column, SortOrder)>,
    parse_stats: ParseStats,
    parallelism: FilterParallelism,
}

impl Model {
    /// Build a model over messages in trace order, unsorted and unfiltered
    pub fn new(messages: Vec<Message>, parse_stats: ParseStats, parallelism: FilterParallelism) -> Self {
        let sorted: Vec<MessageId> = (0..messages.len()).collect();
        let mut model = Self {
            filtered: sorted.clone(),
            filtered_index: Vec::new(),
            sorted,
            messages,
            time_deltas: Vec::new(),
            delta_stats: TimeDeltaStats::default(),
            filter: None,
            sort_key: None,
            parse_stats,
            parallelism,
        };
        model.rebuild_filtered_index();
        model.recalculate_time_deltas();
        model
    }

    /// All messages in trace order, indexed by [`MessageId`]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Total number of messages, visible or not
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn parse_stats(&self) -> &ParseStats {
        &self.parse_stats
    }

    /// Number of visible rows
    pub fn row_count(&self) -> usize {
        self.filtered.len()
    }

    /// Message id shown at `row`
    pub fn id_at(&self, row: usize) -> Option<MessageId> {
        self.filtered.get(row).copied()
    }

    /// Message shown at `row`
    pub fn message_at(&self, row: usize) -> Option<&Message> {
        self.id_at(row).map(|id| &self.messages[id])
    }

    /// Visible row of a message, `None` if it is filtered out
    pub fn row_of(&self, id: MessageId) -> Option<usize> {
        self.filtered_index.get(id).copied().flatten()
    }

    /// Time delta shown at `row`
    pub fn time_delta_at(&self, row: usize) -> Option<i64> {
        self.time_deltas.get(row).copied()
    }

    /// Time deltas of all visible rows
    pub fn time_deltas(&self) -> &[i64] {
        &self.time_deltas
    }

    pub fn delta_stats(&self) -> TimeDeltaStats {
        self.delta_stats
    }

    /// Visible messages with their time deltas, in row order
    pub fn rows(&self) -> impl Iterator<Item = (&Message, i64)> + '_ {
        self.filtered
            .iter()
            .zip(&self.time_deltas)
            .map(|(&id, &delta)| (&self.messages[id], delta))
    }

    pub fn filter(&self) -> Option<&MessageFilter> {
        self.filter.as_ref()
    }

    pub fn sort_key(&self) -> Option<(Column, SortOrder)> {
        self.sort_key
    }

    /// Filter matching the value shown at (`row`, `column`)
    pub fn filter_for_cell(&self, row: usize, column: Column) -> Option<MessageFilter> {
        MessageFilter::for_cell(self.message_at(row)?, column)
    }

    /// Replace the active filter
    ///
    /// An empty filter is the same as none. Predicates are evaluated over the
    /// current sort order, so surviving rows keep their relative order.
    pub fn set_filter(&mut self, filter: Option<MessageFilter>) {
        self.filter = filter.filter(|f| !f.is_empty());
        self.filtered = match &self.filter {
            Some(filter) => self.select(filter),
            None => self.sorted.clone(),
        };
        tracing::debug!(
            visible = self.filtered.len(),
            total = self.messages.len(),
            "filter applied"
        );
        self.rebuild_filtered_index();
        self.recalculate_time_deltas();
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(None);
    }

    /// Re-sort all messages by `column`
    ///
    /// Starts from trace order and sorts stably. The visible set is carried
    /// over by identity instead of re-running the filter, so sorting never
    /// changes which messages are shown.
    pub fn sort(&mut self, column: Column, order: SortOrder) {
        let mut delta_of = vec![0i64; self.messages.len()];
        for (&id, &delta) in self.filtered.iter().zip(&self.time_deltas) {
            delta_of[id] = delta;
        }

        let messages = &self.messages;
        let compare = |a: MessageId, b: MessageId| -> Ordering {
            let (ma, mb) = (&messages[a], &messages[b]);
            match column {
                Column::Time => ma.time.cmp(&mb.time),
                Column::Connection => ma.connection.cmp(&mb.connection),
                Column::Queue => ma.queue.cmp(&mb.queue),
                Column::Direction => ma.direction.cmp(&mb.direction),
                Column::Object => ma.object.cmp(&mb.object),
                Column::Method => ma.method.cmp(&mb.method),
                Column::Arguments => ma.arguments.cmp(&mb.arguments),
                Column::TimeDelta => delta_of[a].cmp(&delta_of[b]),
            }
        };

        let mut sorted: Vec<MessageId> = (0..messages.len()).collect();
        match order {
            SortOrder::Ascending => sorted.sort_by(|&a, &b| compare(a, b)),
            SortOrder::Descending => sorted.sort_by(|&a, &b| compare(b, a)),
        }

        self.filtered = if self.filter.is_some() {
            sorted
                .iter()
                .copied()
                .filter(|&id| self.filtered_index[id].is_some())
                .collect()
        } else {
            sorted.clone()
        };
        self.sorted = sorted;
        self.sort_key = Some((column, order));

        self.rebuild_filtered_index();
        self.recalculate_time_deltas();
    }

    /// Ids from `sorted` that pass `filter`, in order
    fn select(&self, filter: &MessageFilter) -> Vec<MessageId> {
        let messages = &self.messages;
        let candidates = &self.sorted;
        let select_chunk = |chunk: &[MessageId]| -> Vec<MessageId> {
            chunk
                .iter()
                .copied()
                .filter(|&id| filter.matches(&messages[id]))
                .collect()
        };

        let workers = self.parallelism.worker_count();
        if candidates.is_empty() || candidates.len() < self.parallelism.threshold || workers < 2 {
            return select_chunk(candidates);
        }

        let chunk_len = candidates.len().div_ceil(workers);
        let selected = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = candidates
                .chunks(chunk_len)
                .map(|chunk| scope.spawn(move |_| select_chunk(chunk)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<_>, _>>()
        });

        match selected {
            Ok(Ok(chunks)) => chunks.concat(),
            _ => {
                tracing::warn!("filter worker panicked, filtering sequentially");
                select_chunk(candidates)
            }
        }
    }

    fn rebuild_filtered_index(&mut self) {
        self.filtered_index = vec![None; self.messages.len()];
        for (row, &id) in self.filtered.iter().enumerate() {
            self.filtered_index[id] = Some(row);
        }
    }

    /// First row's delta is its own timestamp; every other row is relative
    /// to the row above it.
    fn recalculate_time_deltas(&mut self) {
        let mut last = 0i64;
        self.time_deltas = self
            .filtered
            .iter()
            .map(|&id| {
                let now = i64::try_from(self.messages[id].time).unwrap_or(i64::MAX);
                let delta = now.saturating_sub(last);
                last = now;
                delta
            })
            .collect();
        self.delta_stats = TimeDeltaStats::from_deltas(&self.time_deltas);
    }
}
