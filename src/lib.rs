//! wlanalyze - Wayland protocol trace analyzer
//!
//! This library parses `WAYLAND_DEBUG=1` output into structured messages,
//! tracking object lifetimes per connection so every message can name the
//! exact object generation it targets, and provides sorted and filtered
//! views over the result.
//!
//! ```
//! use wlanalyze::{MessageFilter, TraceParser};
//!
//! let mut model = TraceParser::new()
//!     .parse_str("[1.000]  -> wl_display@1.sync(new id wl_callback@5)\n")
//!     .unwrap();
//! assert_eq!(model.message(0).unwrap().created[0].to_string(), "wl_callback#5");
//!
//! model.set_filter(Some(MessageFilter::from_expr("class=wl_surface").unwrap()));
//! assert_eq!(model.row_count(), 0);
//! ```

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod filter;
pub mod json_output;
pub mod line_parser;
pub mod message;
pub mod model;
pub mod registry;
pub mod stats;
pub mod text_output;
pub mod trace_parser;

pub use filter::{FilterError, MessageFilter};
pub use line_parser::LineParser;
pub use message::{Direction, Message};
pub use model::{Column, MessageId, Model, SortOrder};
pub use registry::{ObjectRef, ObjectRegistry, RegistryError};
pub use trace_parser::{ParseError, TraceParser};
