//! Entity Component System core types.
//!
//! Storage is sparse-set based: each component type lives in its own pool
//! with a paged sparse index over entity ids and densely packed value
//! arrays for cache-friendly iteration. Multi-component queries are
//! snapshot views that intersect pool membership at construction time;
//! structural changes made after a view is built are intentionally not
//! visible through it.

mod entity;
mod registry;
mod sparse_set;
mod view;

pub use entity::{EntityAllocator, EntityError, EntityId, INVALID_ENTITY};
pub use registry::{
    Component, ComponentId, ComponentPool, ComponentRegistry, RegistryError, MAX_COMPONENT_TYPES,
};
pub use sparse_set::SparseSet;
pub use view::{View, ViewQuery};
