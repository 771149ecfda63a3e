//! CSV output format for Wayland traces
//!
//! `--format csv`: one row per visible message, or one row per
//! `class.method` in -c mode.

use crate::message::Message;
use crate::model::Model;
use crate::registry::ObjectRef;
use crate::stats::SummaryTracker;

const MESSAGE_HEADER: &str =
    "line,time,time_delta,direction,connection,queue,object,generation,method,arguments,created,destroyed";

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<String>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the visible rows of a model
    pub fn from_model(model: &Model) -> Self {
        let mut output = Self::new();
        for (message, delta) in model.rows() {
            output.add_message(message, delta);
        }
        output
    }

    /// Add a message to the output
    pub fn add_message(&mut self, message: &Message, time_delta: i64) {
        self.rows.push(Self::format_message(message, time_delta));
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn join_objects(objects: &[ObjectRef]) -> String {
        objects
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_message(message: &Message, time_delta: i64) -> String {
        let fields = [
            message.line.to_string(),
            message.time.to_string(),
            time_delta.to_string(),
            message.direction.to_string(),
            Self::escape_field(&message.connection),
            Self::escape_field(&message.queue),
            message.object.to_string(),
            message.object.generation.to_string(),
            Self::escape_field(&message.method),
            Self::escape_field(&message.arguments_text()),
            Self::join_objects(&message.created),
            Self::join_objects(&message.destroyed),
        ];
        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::from(MESSAGE_HEADER);
        output.push('\n');
        for row in &self.rows {
            output.push_str(row);
            output.push('\n');
        }
        output
    }
}

/// CSV form of the -c summary
pub fn summary_to_csv(tracker: &SummaryTracker) -> String {
    let mut output = String::from("message,calls,requests,events,created,destroyed\n");
    for (name, stats) in tracker.sorted() {
        output.push_str(&format!(
            "{},{},{},{},{},{}\n",
            CsvOutput::escape_field(name),
            stats.count,
            stats.requests,
            stats.events,
            stats.created,
            stats.destroyed
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Direction;
    use crate::trace_parser::TraceParser;

    fn message(arguments: &[&str]) -> Message {
        Message {
            line: 4,
            direction: Direction::ToCompositor,
            connection: String::new(),
            queue: String::new(),
            time: 1_500,
            object: ObjectRef::new("wl_surface", 3, 2),
            method: "attach".to_string(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
            created: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(CsvOutput::escape_field("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(CsvOutput::escape_field("hello,world"), "\"hello,world\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(CsvOutput::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_format_message() {
        let row = CsvOutput::format_message(&message(&["wl_buffer#7", "0", "0"]), 500);
        assert_eq!(
            row,
            "4,1500,500,To Compositor,,,wl_surface#3,2,attach,\"wl_buffer#7, 0, 0\",,"
        );
    }

    #[test]
    fn test_csv_format_message_quoted_argument() {
        let row = CsvOutput::format_message(&message(&["\"title\""]), 0);
        assert!(row.ends_with(",attach,\"\"\"title\"\"\",,"));
    }

    #[test]
    fn test_csv_from_model() {
        let model = TraceParser::new()
            .parse_str(
                "[1.000]  -> wl_display@1.get_registry(new id wl_registry@2)\n\
                 [1.200] wl_display@1.delete_id(2)\n",
            )
            .unwrap();

        let csv = CsvOutput::from_model(&model).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], MESSAGE_HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",wl_registry#2,"));
        assert!(lines[2].ends_with(",,wl_registry#2"));
    }

    #[test]
    fn test_summary_to_csv() {
        let mut tracker = SummaryTracker::new();
        tracker.record(&message(&[]));
        tracker.record(&message(&[]));

        let csv = summary_to_csv(&tracker);
        assert!(csv.starts_with("message,calls,requests,events,created,destroyed\n"));
        assert!(csv.contains("wl_surface.attach,2,2,0,0,0"));
    }
}
