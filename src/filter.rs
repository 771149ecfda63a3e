//! Message filtering for -e expressions
//!
//! A [`MessageFilter`] is a conjunction of optional field predicates. Empty
//! lists and `None` bounds impose no constraint; within one list any value
//! may match.
//!
//! Expression syntax (one predicate per expression, several `-e` flags AND
//! together, repeating a key extends its list):
//!
//! - `dir=to` / `dir=from`: requests sent to or events received from the compositor
//! - `time=MIN-MAX`: inclusive microsecond range, either side may be omitted
//! - `conn=`, `queue=`, `class=`, `method=`, `arg=`: substring match
//! - `id=3,7`: exact object id
//! - `object=wl_surface#3`: class and id together
//! - `created=`, `destroyed=`, `lifetime=`: exact interface of objects the
//!   message created, destroyed, or either
//!
//! Filters built from a table cell with [`MessageFilter::for_cell`] select
//! only messages sharing that exact value: text fields compare by equality and
//! an arguments cell matches the whole argument list.

use crate::message::{Direction, Message};
use crate::model::Column;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed filter expressions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid filter expression: {0}. Expected format: KEY=VALUE[,VALUE...]")]
    InvalidExpression(String),

    #[error("Unknown filter key '{0}'")]
    UnknownKey(String),

    #[error("Invalid number '{value}' for filter key '{key}'")]
    InvalidNumber { key: String, value: String },

    #[error("Invalid direction '{0}' (expected 'to' or 'from')")]
    InvalidDirection(String),

    #[error("Invalid time range: minimum {min} is greater than maximum {max}")]
    InvalidRange { min: u64, max: u64 },

    #[error("Invalid object '{0}' (expected CLASS#ID or CLASS@ID)")]
    InvalidObject(String),
}

/// Predicate over parsed messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageFilter {
    pub direction: Option<Direction>,
    pub time_min: Option<u64>,
    pub time_max: Option<u64>,
    pub connections: Vec<String>,
    pub queues: Vec<String>,
    pub classes: Vec<String>,
    pub instances: Vec<u32>,
    pub methods: Vec<String>,
    pub arguments: Vec<String>,
    pub created_classes: Vec<String>,
    pub destroyed_classes: Vec<String>,
    /// Interfaces the message created or destroyed
    pub lifetime_classes: Vec<String>,
    /// Compare text fields by equality instead of substring, and require the
    /// argument list to equal `arguments` as a whole
    pub exact: bool,
}

fn any_substring(patterns: &[String], value: &str) -> bool {
    patterns.iter().any(|p| value.contains(p.as_str()))
}

fn split_values(spec: &str) -> impl Iterator<Item = String> + '_ {
    spec.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, FilterError> {
    value.trim().parse().map_err(|_| FilterError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl MessageFilter {
    /// A filter that matches every message
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a single `key=value` expression
    pub fn from_expr(expr: &str) -> Result<Self, FilterError> {
        let mut filter = Self::all();
        filter.add_expr(expr)?;
        Ok(filter)
    }

    /// Parse several expressions into one conjunction
    pub fn from_exprs<I, S>(exprs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::all();
        for expr in exprs {
            filter.add_expr(expr.as_ref())?;
        }
        Ok(filter)
    }

    /// Narrow this filter by one more expression
    ///
    /// The filter is left unchanged when the expression is rejected.
    pub fn add_expr(&mut self, expr: &str) -> Result<(), FilterError> {
        let (key, spec) = expr
            .split_once('=')
            .ok_or_else(|| FilterError::InvalidExpression(expr.to_string()))?;
        let key = key.trim();

        match key {
            "dir" | "direction" => {
                self.direction = Some(Self::parse_direction(spec.trim())?);
            }
            "time" => {
                let (min, max) = Self::parse_time_range(spec)?;
                self.time_min = min;
                self.time_max = max;
            }
            "conn" | "connection" => self.connections.extend(split_values(spec)),
            "queue" => self.queues.extend(split_values(spec)),
            "class" => self.classes.extend(split_values(spec)),
            "id" | "instance" => {
                let ids = split_values(spec)
                    .map(|v| parse_number::<u32>(key, &v))
                    .collect::<Result<Vec<_>, _>>()?;
                self.instances.extend(ids);
            }
            "object" => {
                let mut classes = Vec::new();
                let mut ids = Vec::new();
                for value in split_values(spec) {
                    let (class, id) = value
                        .split_once(&['#', '@'][..])
                        .filter(|(class, _)| !class.is_empty())
                        .ok_or_else(|| FilterError::InvalidObject(value.clone()))?;
                    classes.push(class.to_string());
                    ids.push(parse_number::<u32>(key, id)?);
                }
                self.classes.extend(classes);
                self.instances.extend(ids);
            }
            "method" => self.methods.extend(split_values(spec)),
            "arg" | "argument" => self.arguments.extend(split_values(spec)),
            "created" => self.created_classes.extend(split_values(spec)),
            "destroyed" => self.destroyed_classes.extend(split_values(spec)),
            "lifetime" => self.lifetime_classes.extend(split_values(spec)),
            _ => return Err(FilterError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_direction(value: &str) -> Result<Direction, FilterError> {
        match value.to_ascii_lowercase().as_str() {
            "to" | "send" | "request" | "to-compositor" => Ok(Direction::ToCompositor),
            "from" | "recv" | "event" | "from-compositor" => Ok(Direction::FromCompositor),
            "unknown" => Ok(Direction::Unknown),
            _ => Err(FilterError::InvalidDirection(value.to_string())),
        }
    }

    fn parse_time_range(spec: &str) -> Result<(Option<u64>, Option<u64>), FilterError> {
        let bound = |value: &str| -> Result<Option<u64>, FilterError> {
            let value = value.trim();
            if value.is_empty() {
                Ok(None)
            } else {
                parse_number("time", value).map(Some)
            }
        };

        let (min, max) = match spec.split_once('-') {
            Some((min, max)) => (bound(min)?, bound(max)?),
            None => {
                // A single timestamp selects exactly that time
                let exact = bound(spec)?;
                (exact, exact)
            }
        };

        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(FilterError::InvalidRange { min, max });
            }
        }
        Ok((min, max))
    }

    /// Filter selecting messages that share `message`'s value in `column`
    ///
    /// Returns `None` for columns that cannot be filtered on (the time delta
    /// depends on the view, not the message) and for empty values.
    pub fn for_cell(message: &Message, column: Column) -> Option<Self> {
        let mut filter = Self {
            exact: true,
            ..Self::all()
        };
        match column {
            Column::Time => {
                filter.time_min = Some(message.time);
                filter.time_max = Some(message.time);
            }
            Column::Connection if !message.connection.is_empty() => {
                filter.connections = vec![message.connection.clone()];
            }
            Column::Queue if !message.queue.is_empty() => {
                filter.queues = vec![message.queue.clone()];
            }
            Column::Direction => filter.direction = Some(message.direction),
            Column::Object => {
                filter.classes = vec![message.object.class.clone()];
                filter.instances = vec![message.object.instance];
            }
            Column::Method => filter.methods = vec![message.method.clone()],
            Column::Arguments => filter.arguments = message.arguments.clone(),
            Column::Connection | Column::Queue | Column::TimeDelta => {}
        }
        (!filter.is_empty()).then_some(filter)
    }

    fn text_matches(&self, patterns: &[String], value: &str) -> bool {
        if self.exact {
            patterns.iter().any(|p| p == value)
        } else {
            any_substring(patterns, value)
        }
    }

    /// True if no predicate is active
    pub fn is_empty(&self) -> bool {
        self.direction.is_none()
            && self.time_min.is_none()
            && self.time_max.is_none()
            && self.connections.is_empty()
            && self.queues.is_empty()
            && self.classes.is_empty()
            && self.instances.is_empty()
            && self.methods.is_empty()
            && self.arguments.is_empty()
            && self.created_classes.is_empty()
            && self.destroyed_classes.is_empty()
            && self.lifetime_classes.is_empty()
    }

    /// Check whether a message satisfies every active predicate
    pub fn matches(&self, message: &Message) -> bool {
        if let Some(direction) = self.direction {
            if message.direction != direction {
                return false;
            }
        }
        if self.time_min.is_some_and(|min| message.time < min)
            || self.time_max.is_some_and(|max| message.time > max)
        {
            return false;
        }
        if !self.connections.is_empty() && !self.text_matches(&self.connections, &message.connection) {
            return false;
        }
        if !self.queues.is_empty() && !self.text_matches(&self.queues, &message.queue) {
            return false;
        }
        if !self.classes.is_empty() && !self.text_matches(&self.classes, &message.object.class) {
            return false;
        }
        if !self.instances.is_empty() && !self.instances.contains(&message.object.instance) {
            return false;
        }
        if !self.methods.is_empty() && !self.text_matches(&self.methods, &message.method) {
            return false;
        }
        if !self.arguments.is_empty() {
            let matched = if self.exact {
                message.arguments == self.arguments
            } else {
                message
                    .arguments
                    .iter()
                    .any(|arg| any_substring(&self.arguments, arg))
            };
            if !matched {
                return false;
            }
        }
        if !self.created_classes.is_empty()
            && !message
                .created
                .iter()
                .any(|o| self.created_classes.contains(&o.class))
        {
            return false;
        }
        if !self.destroyed_classes.is_empty()
            && !message
                .destroyed
                .iter()
                .any(|o| self.destroyed_classes.contains(&o.class))
        {
            return false;
        }
        if !self.lifetime_classes.is_empty()
            && !message
                .created
                .iter()
                .chain(&message.destroyed)
                .any(|o| self.lifetime_classes.contains(&o.class))
        {
            return false;
        }
        true
    }
}
