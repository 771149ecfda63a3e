use serde::{Deserialize, Serialize};
use std::fmt;

/// A protocol object at a specific point in its id-reuse history
///
/// Equality requires class, instance and generation to match. Ordering is
/// lexicographic over the same fields, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Interface name (e.g., "wl_surface")
    pub class: String,
    /// Numeric object id as printed in the trace
    pub instance: u32,
    /// Creation count for this (class, instance) pair, starting at 1
    pub generation: u32,
}

impl ObjectRef {
    pub fn new(class: impl Into<String>, instance: u32, generation: u32) -> Self {
        Self {
            class: class.into(),
            instance,
            generation,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_omits_generation() {
        let object = ObjectRef::new("wl_surface", 12, 3);
        assert_eq!(object.to_string(), "wl_surface#12");
    }

    #[test]
    fn test_equality_includes_generation() {
        let first = ObjectRef::new("wl_buffer", 7, 1);
        let second = ObjectRef::new("wl_buffer", 7, 2);
        assert_ne!(first, second);
        assert_eq!(first, ObjectRef::new("wl_buffer", 7, 1));
    }

    #[test]
    fn test_ordering_class_then_instance_then_generation() {
        let mut objects = vec![
            ObjectRef::new("wl_surface", 3, 1),
            ObjectRef::new("wl_buffer", 9, 2),
            ObjectRef::new("wl_buffer", 9, 1),
            ObjectRef::new("wl_buffer", 10, 1),
        ];
        objects.sort();
        assert_eq!(
            objects,
            vec![
                ObjectRef::new("wl_buffer", 9, 1),
                ObjectRef::new("wl_buffer", 9, 2),
                ObjectRef::new("wl_buffer", 10, 1),
                ObjectRef::new("wl_surface", 3, 1),
            ]
        );
    }
}
