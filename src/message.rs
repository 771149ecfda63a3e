//! Parsed protocol message records

use crate::registry::ObjectRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a message travelled relative to the compositor
///
/// Declaration order is the sort order of the Direction column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Event received from the compositor
    FromCompositor,
    /// Request sent to the compositor (`->` marker)
    ToCompositor,
    Unknown,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::FromCompositor => "From Compositor",
            Direction::ToCompositor => "To Compositor",
            Direction::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// One protocol call recovered from a trace line
///
/// Built once by the line parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// 1-based line number in the source trace
    pub line: usize,
    pub direction: Direction,
    /// Connection label; empty for single-connection traces
    pub connection: String,
    /// Event queue label; empty when the trace does not print queues
    pub queue: String,
    /// Timestamp in microseconds, monotonic within one connection
    pub time: u64,
    /// Object the call targets
    pub object: ObjectRef,
    pub method: String,
    /// Argument tokens exactly as printed
    pub arguments: Vec<String>,
    /// Objects brought to life by `new id` arguments
    pub created: Vec<ObjectRef>,
    /// Objects torn down by `delete_id`
    pub destroyed: Vec<ObjectRef>,
}

impl Message {
    /// Arguments joined back the way the trace printed them
    pub fn arguments_text(&self) -> String {
        self.arguments.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sort_order() {
        let mut directions = vec![
            Direction::Unknown,
            Direction::ToCompositor,
            Direction::FromCompositor,
        ];
        directions.sort();
        assert_eq!(
            directions,
            vec![
                Direction::FromCompositor,
                Direction::ToCompositor,
                Direction::Unknown
            ]
        );
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::ToCompositor.to_string(), "To Compositor");
        assert_eq!(Direction::FromCompositor.to_string(), "From Compositor");
    }

    #[test]
    fn test_arguments_text_rejoins_tokens() {
        let message = Message {
            line: 1,
            direction: Direction::ToCompositor,
            connection: String::new(),
            queue: String::new(),
            time: 0,
            object: ObjectRef::new("wl_surface", 3, 1),
            method: "damage".to_string(),
            arguments: vec!["0".into(), "0".into(), "64".into(), "64".into()],
            created: Vec::new(),
            destroyed: Vec::new(),
        };
        assert_eq!(message.arguments_text(), "0, 0, 64, 64");
    }
}
