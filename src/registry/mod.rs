// Wayland object registry
//
// Tracks protocol object identity over the lifetime of one client connection.
// Instance ids are recycled by libwayland, so every (class, instance) pair
// carries a generation counter that increments on each re-creation. Destroyed
// objects are kept in an append-only graveyard: a delete_id event can be
// printed before in-flight messages that still name the old object, and those
// lines must resolve to the object they actually referred to.

mod connections;
mod object_ref;
mod object_registry;

pub use connections::{ConnectionRegistries, DISPLAY_CLASS, DISPLAY_ID};
pub use object_ref::ObjectRef;
pub use object_registry::{ObjectRegistry, RegistryError};
