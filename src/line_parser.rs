//! Single-line recognition of WAYLAND_DEBUG output
//!
//! Accepted shape:
//!
//! ```text
//! [<connection> ][ msec.usec] [{queue}] [->] class@id.method(args)
//! ```
//!
//! `#` is accepted in place of `@` (libwayland switched separators between
//! releases). Lines that do not have this shape are not messages and are
//! skipped by the caller without touching any registry.
//!
//! # Argument tokenization
//!
//! Arguments are split on the literal `", "`. A string or array argument that
//! itself contains `", "` will be split into several tokens; the tokens are
//! opaque text and no attempt is made to re-join them.

use crate::message::{Direction, Message};
use crate::registry::{ConnectionRegistries, ObjectRef, ObjectRegistry, RegistryError};
use regex::Regex;
use std::sync::LazyLock;

/// Ids at or above this value are allocated by the compositor
///
/// The compositor reuses them without ever emitting delete_id, so a stale
/// live entry is silently retired when the id shows up in a new `new id`.
pub const SERVER_ID_THRESHOLD: u32 = 0xff00_0000;

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(<(?P<connection>[^>]+)> )?\[ *(?P<msec>\d+)\.(?P<usec>\d+)\] +(\{(?P<queue>[^}]+)\})? *(?P<send>->)? *(?P<class>\w+)[#@](?P<instance>\d+)\.(?P<method>\w+)\((?P<args>.*)\)$",
    )
    .expect("trace line pattern is a valid regex")
});

/// Fields of a recognized line, before any registry lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub connection: &'a str,
    pub queue: &'a str,
    pub time: u64,
    pub send: bool,
    pub class: &'a str,
    pub instance: u32,
    pub method: &'a str,
    pub arguments: Vec<&'a str>,
}

impl<'a> RawLine<'a> {
    /// Match `line` against the trace grammar
    ///
    /// Returns `None` for anything that is not a message line, including
    /// numeric fields that overflow.
    pub fn recognize(line: &'a str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        // Cheap rejection before running the regex
        if !(line.starts_with('<') || line.starts_with('[')) || !line.ends_with(')') {
            return None;
        }

        let caps = LINE_PATTERN.captures(line)?;
        let text = |name: &str| caps.name(name).map_or("", |m| m.as_str());

        let msec: u64 = text("msec").parse().ok()?;
        let usec: u64 = text("usec").parse().ok()?;
        let time = msec.checked_mul(1000)?.checked_add(usec)?;
        // Time deltas are signed; a timestamp must fit in i64
        if i64::try_from(time).is_err() {
            return None;
        }

        let args = text("args");
        let arguments = if args.is_empty() {
            Vec::new()
        } else {
            args.split(", ").collect()
        };

        Some(Self {
            connection: text("connection"),
            queue: text("queue"),
            time,
            send: caps.name("send").is_some(),
            class: text("class"),
            instance: text("instance").parse().ok()?,
            method: text("method"),
            arguments,
        })
    }
}

/// Split a `new id class@instance` token into its parts
fn parse_new_id(argument: &str) -> Option<(&str, u32)> {
    let rest = argument.strip_prefix("new id ")?;
    let sep = rest.find('@').or_else(|| rest.find('#'))?;
    if sep == 0 {
        return None;
    }
    match rest[sep + 1..].parse() {
        Ok(instance) => Some((&rest[..sep], instance)),
        Err(_) => {
            tracing::debug!(argument, "new id without a numeric instance");
            None
        }
    }
}

/// Converts trace lines into [`Message`]s, updating object registries
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser;

impl LineParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one trace line
    ///
    /// Returns `Ok(None)` for lines that are not messages. On success the
    /// connection's registry reflects the objects the message created and
    /// destroyed.
    ///
    /// # Errors
    /// Any [`RegistryError`] raised while resolving the target object or
    /// recording lifetimes. The caller attaches the line number.
    pub fn parse_line(
        &self,
        line: &str,
        line_number: usize,
        registries: &mut ConnectionRegistries,
    ) -> Result<Option<Message>, RegistryError> {
        let Some(raw) = RawLine::recognize(line) else {
            return Ok(None);
        };

        // An unseen connection is only registered once its first line resolves
        let object = match registries.get(raw.connection) {
            Some(registry) => registry.resolve(raw.class, raw.instance)?,
            None => ObjectRegistry::with_display().resolve(raw.class, raw.instance)?,
        };
        let registry = registries.get_or_init(raw.connection);

        let mut created = Vec::new();
        for argument in raw.arguments.iter().copied() {
            let Some((declared, instance)) = parse_new_id(argument) else {
                continue;
            };
            let class = Self::created_class(&object, raw.method, &raw.arguments, declared);

            if instance >= SERVER_ID_THRESHOLD {
                if let Some(stale) = registry.destroy_if_exists(instance) {
                    tracing::trace!(object = %stale, "retired reused server id");
                }
            }
            created.push(registry.create(class, instance)?);
        }

        let mut destroyed = Vec::new();
        if raw.method == "delete_id" && raw.arguments.len() == 1 {
            let id = raw.arguments[0].parse::<u32>().unwrap_or(0);
            if id != 0 {
                destroyed.push(registry.destroy(id)?);
            }
        }

        Ok(Some(Message {
            line: line_number,
            direction: if raw.send {
                Direction::ToCompositor
            } else {
                Direction::FromCompositor
            },
            connection: raw.connection.to_string(),
            queue: raw.queue.to_string(),
            time: raw.time,
            object,
            method: raw.method.to_string(),
            arguments: raw.arguments.iter().map(|a| a.to_string()).collect(),
            created,
            destroyed,
        }))
    }

    /// Interface of an object created by a `new id` argument
    ///
    /// `wl_registry.bind` prints `new id [unknown]@N`; the real interface is
    /// the quoted name in its second argument.
    fn created_class<'a>(
        target: &ObjectRef,
        method: &str,
        arguments: &[&'a str],
        declared: &'a str,
    ) -> &'a str {
        if declared == "[unknown]"
            && target.class == "wl_registry"
            && method == "bind"
            && arguments.len() == 4
        {
            let interface = arguments[1].trim_matches('"');
            if !interface.is_empty() {
                tracing::debug!(interface, "recovered interface of registry bind");
                return interface;
            }
        }
        declared
    }
}
