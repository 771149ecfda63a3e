use super::{ObjectRef, DISPLAY_CLASS, DISPLAY_ID};
use std::collections::HashMap;
use thiserror::Error;

/// Registry invariant violations
///
/// These signal a corrupt or truncated trace, never a routine line miss.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("trying to create an already existing object: {class}#{instance} (found: {existing})")]
    DuplicateObject {
        class: String,
        instance: u32,
        existing: ObjectRef,
    },

    #[error("destroy for unknown object #{instance}")]
    UnknownObject { instance: u32 },

    #[error("resolve failed to find an instance of {class}#{instance}")]
    UnresolvedObject { class: String, instance: u32 },

    #[error("resolve found object {found}, but it should have been of class {expected}")]
    ClassMismatch { found: ObjectRef, expected: String },
}

/// Per-connection object table
///
/// # Invariants
/// - an instance id is live at most once
/// - generations for a (class, instance) pair strictly increase per `create`
/// - failed operations leave all three tables untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRegistry {
    /// instance id → currently live object
    live: HashMap<u32, ObjectRef>,

    /// (class, instance) → last generation handed out; never shrinks
    generations: HashMap<(String, u32), u32>,

    /// Destroyed objects in destruction order, searched newest first
    graveyard: Vec<ObjectRef>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of a fresh connection, holding only `wl_display#1`
    pub fn with_display() -> Self {
        let mut registry = Self::new();
        registry
            .live
            .insert(DISPLAY_ID, ObjectRef::new(DISPLAY_CLASS, DISPLAY_ID, 1));
        registry
            .generations
            .insert((DISPLAY_CLASS.to_string(), DISPLAY_ID), 1);
        registry
    }

    /// Register a newly created object
    ///
    /// # Errors
    /// `DuplicateObject` if `instance` is already live.
    pub fn create(&mut self, class: &str, instance: u32) -> Result<ObjectRef, RegistryError> {
        if let Some(existing) = self.live.get(&instance) {
            return Err(RegistryError::DuplicateObject {
                class: class.to_string(),
                instance,
                existing: existing.clone(),
            });
        }

        let generation = self
            .generations
            .entry((class.to_string(), instance))
            .and_modify(|g| *g += 1)
            .or_insert(1);

        let object = ObjectRef::new(class, instance, *generation);
        self.live.insert(instance, object.clone());
        Ok(object)
    }

    /// Move a live object to the graveyard
    ///
    /// # Errors
    /// `UnknownObject` if `instance` is not live.
    pub fn destroy(&mut self, instance: u32) -> Result<ObjectRef, RegistryError> {
        self.destroy_if_exists(instance)
            .ok_or(RegistryError::UnknownObject { instance })
    }

    /// Like [`destroy`](Self::destroy), but a missing instance is not an error
    ///
    /// Used for server-allocated ids, which the compositor recycles without
    /// ever sending delete_id.
    pub fn destroy_if_exists(&mut self, instance: u32) -> Option<ObjectRef> {
        let object = self.live.remove(&instance)?;
        self.graveyard.push(object.clone());
        Some(object)
    }

    /// Find the object a trace line refers to
    ///
    /// Live objects win. On a miss the graveyard is scanned from the most
    /// recent destruction backwards, since a late line most likely names the
    /// object that died last. An empty `class` matches any class.
    ///
    /// # Errors
    /// - `UnresolvedObject` if neither table knows the instance
    /// - `ClassMismatch` if the live object has a different class
    pub fn resolve(&self, class: &str, instance: u32) -> Result<ObjectRef, RegistryError> {
        let object = match self.live.get(&instance) {
            Some(object) => object,
            None => {
                let dead = self
                    .graveyard
                    .iter()
                    .rev()
                    .find(|o| o.instance == instance && (class.is_empty() || o.class == class))
                    .ok_or_else(|| RegistryError::UnresolvedObject {
                        class: class.to_string(),
                        instance,
                    })?;
                tracing::warn!(
                    object = %dead,
                    generation = dead.generation,
                    "found object in the graveyard"
                );
                dead
            }
        };

        if !class.is_empty() && object.class != class {
            return Err(RegistryError::ClassMismatch {
                found: object.clone(),
                expected: class.to_string(),
            });
        }

        Ok(object.clone())
    }

    /// Currently live object for `instance`, if any
    pub fn live_object(&self, instance: u32) -> Option<&ObjectRef> {
        self.live.get(&instance)
    }

    /// Number of live objects
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Destroyed objects, oldest first
    pub fn graveyard(&self) -> &[ObjectRef] {
        &self.graveyard
    }

    /// Last generation handed out for a (class, instance) pair
    pub fn last_generation(&self, class: &str, instance: u32) -> Option<u32> {
        self.generations
            .get(&(class.to_string(), instance))
            .copied()
    }
}
