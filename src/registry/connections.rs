use super::ObjectRegistry;
use std::collections::HashMap;

/// Interface of the object every connection starts with
pub const DISPLAY_CLASS: &str = "wl_display";

/// Id of the display object
pub const DISPLAY_ID: u32 = 1;

/// Object registries keyed by connection label
///
/// Traces captured from a compositor interleave many client connections, each
/// with its own id space. Single-connection client traces use the empty label.
/// A registry is created on first sight of its label and already contains the
/// implicit `wl_display#1`.
#[derive(Debug, Default)]
pub struct ConnectionRegistries {
    registries: HashMap<String, ObjectRegistry>,
}

impl ConnectionRegistries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `connection`, created with its display object if unseen
    pub fn get_or_init(&mut self, connection: &str) -> &mut ObjectRegistry {
        self.registries
            .entry(connection.to_string())
            .or_insert_with(|| {
                tracing::debug!(connection, "new connection");
                ObjectRegistry::with_display()
            })
    }

    /// Registry for `connection`, if it has been seen
    pub fn get(&self, connection: &str) -> Option<&ObjectRegistry> {
        self.registries.get(connection)
    }

    /// Number of distinct connections seen so far
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Labels of all seen connections, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.registries.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}
