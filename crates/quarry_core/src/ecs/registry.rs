//! Component registry: one sparse-set pool per registered component type.
//!
//! Types are assigned small stable ids on first registration, capped at
//! `MAX_COMPONENT_TYPES`. The registry is an explicit value owned by the
//! application and passed into systems and views; there is no hidden
//! global instance.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ecs::entity::EntityId;
use crate::ecs::sparse_set::SparseSet;

/// Small per-registry component type id.
pub type ComponentId = u32;

/// Upper bound on distinct component types per registry.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Marker for types storable in component pools.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component type limit of {limit} exceeded")]
    TypeLimitExceeded { limit: usize },
}

/// Object-safe access to a pool, used where the component type is erased:
/// view intersection, the destroy-entity sweep, and save enumeration.
pub trait ComponentPool: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn contains(&self, entity: EntityId) -> bool;
    fn entity_ids(&self) -> &[EntityId];
    fn remove_erased(&mut self, entity: EntityId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentPool for SparseSet<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.contains(entity)
    }

    fn entity_ids(&self) -> &[EntityId] {
        self.entities()
    }

    fn remove_erased(&mut self, entity: EntityId) -> bool {
        self.remove(entity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns every component pool. Component ids index the pool table directly.
pub struct ComponentRegistry {
    ids: HashMap<TypeId, ComponentId>,
    pools: Vec<Box<dyn ComponentPool>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            pools: Vec::new(),
        }
    }

    /// Register `T`, creating its pool. Idempotent; returns the existing id
    /// if `T` is already registered.
    pub fn register<T: Component>(&mut self) -> Result<ComponentId, RegistryError> {
        if let Some(&id) = self.ids.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        if self.pools.len() >= MAX_COMPONENT_TYPES {
            return Err(RegistryError::TypeLimitExceeded {
                limit: MAX_COMPONENT_TYPES,
            });
        }
        let id = self.pools.len() as ComponentId;
        self.ids.insert(TypeId::of::<T>(), id);
        self.pools.push(Box::new(SparseSet::<T>::new()));
        debug!(
            component = std::any::type_name::<T>(),
            id, "registered component pool"
        );
        Ok(id)
    }

    /// Id assigned to `T`, if registered.
    pub fn component_id_of<T: Component>(&self) -> Option<ComponentId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Number of registered component types.
    pub fn type_count(&self) -> usize {
        self.pools.len()
    }

    /// Typed pool for `T`, if registered.
    pub fn pool<T: Component>(&self) -> Option<&SparseSet<T>> {
        let id = self.component_id_of::<T>()?;
        Some(
            self.pools[id as usize]
                .as_any()
                .downcast_ref::<SparseSet<T>>()
                .expect("pool type mismatch"),
        )
    }

    /// Typed pool for `T`, registering it on first use.
    ///
    /// Panics if the type limit is exceeded: running out of component slots
    /// is a configuration error that must surface at startup, not be
    /// silently truncated.
    pub fn pool_mut<T: Component>(&mut self) -> &mut SparseSet<T> {
        let id = match self.component_id_of::<T>() {
            Some(id) => id,
            None => self
                .register::<T>()
                .unwrap_or_else(|err| panic!("{err}")),
        };
        self.pools[id as usize]
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("pool type mismatch")
    }

    /// Add (or overwrite) `entity`'s `T` component.
    pub fn add<T: Component>(&mut self, entity: EntityId, value: T) {
        self.pool_mut::<T>().insert(entity, value);
    }

    /// Remove `entity`'s `T` component. False if it had none.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> bool {
        match self.component_id_of::<T>() {
            Some(id) => self.pools[id as usize].remove_erased(entity),
            None => false,
        }
    }

    /// Membership test; an unregistered type simply contains nothing.
    pub fn contains<T: Component>(&self, entity: EntityId) -> bool {
        self.pool::<T>().is_some_and(|pool| pool.contains(entity))
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.pool::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let id = self.component_id_of::<T>()?;
        self.pools[id as usize]
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("pool type mismatch")
            .get_mut(entity)
    }

    /// Destroy sweep: remove `entity` from every registered pool. Called by
    /// the scene layer when an entity is destroyed, before its id is
    /// released back to the allocator.
    pub fn remove_entity(&mut self, entity: EntityId) {
        let mut removed = 0usize;
        for pool in &mut self.pools {
            if pool.remove_erased(entity) {
                removed += 1;
            }
        }
        trace!(entity, removed, "destroy sweep");
    }

    /// Type-erased pool table, in component-id order. This is the
    /// enumeration surface the save layer reads from.
    pub fn pools(&self) -> impl Iterator<Item = &dyn ComponentPool> {
        self.pools.iter().map(|pool| pool.as_ref())
    }

    pub(crate) fn erased_pool<T: Component>(&self) -> Option<&dyn ComponentPool> {
        let id = self.component_id_of::<T>()?;
        Some(self.pools[id as usize].as_ref())
    }

    /// Mutable access to several pools at once, by component id. Used by
    /// view write passes; the ids must be distinct.
    pub(crate) fn pools_disjoint_mut<const N: usize>(
        &mut self,
        ids: [usize; N],
    ) -> [&mut Box<dyn ComponentPool>; N] {
        self.pools
            .get_disjoint_mut(ids)
            .unwrap_or_else(|_| panic!("view requested the same component type more than once"))
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Debug, PartialEq)]
    struct Health(u32);

    #[test]
    fn pools_are_created_once_per_type() {
        let mut registry = ComponentRegistry::new();
        let a = registry.register::<Position>().unwrap();
        let b = registry.register::<Position>().unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.type_count(), 1);

        registry.add(0, Health(10));
        assert_eq!(registry.type_count(), 2);
        assert_eq!(registry.component_id_of::<Health>(), Some(1));
    }

    #[test]
    fn add_get_remove_roundtrip() {
        let mut registry = ComponentRegistry::new();
        registry.add(5, Position { x: 1, y: 2 });
        assert!(registry.contains::<Position>(5));
        assert_eq!(registry.get::<Position>(5), Some(&Position { x: 1, y: 2 }));

        registry.get_mut::<Position>(5).unwrap().x = 9;
        assert_eq!(registry.get::<Position>(5), Some(&Position { x: 9, y: 2 }));

        assert!(registry.remove::<Position>(5));
        assert!(!registry.contains::<Position>(5));
        assert!(!registry.remove::<Position>(5));
    }

    #[test]
    fn unregistered_type_contains_nothing() {
        let registry = ComponentRegistry::new();
        assert!(!registry.contains::<Health>(0));
        assert_eq!(registry.get::<Health>(0), None);
        assert!(registry.pool::<Health>().is_none());
    }

    #[test]
    fn remove_entity_sweeps_every_pool() {
        let mut registry = ComponentRegistry::new();
        registry.add(1, Position { x: 0, y: 0 });
        registry.add(1, Health(100));
        registry.add(2, Health(50));

        registry.remove_entity(1);
        assert!(!registry.contains::<Position>(1));
        assert!(!registry.contains::<Health>(1));
        assert!(registry.contains::<Health>(2));
    }

    #[test]
    fn pool_enumeration_exposes_names_and_members() {
        let mut registry = ComponentRegistry::new();
        registry.add(1, Position { x: 0, y: 0 });
        registry.add(2, Position { x: 1, y: 1 });
        registry.add(1, Health(3));

        let pools: Vec<_> = registry.pools().collect();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].len(), 2);
        assert_eq!(pools[0].entity_ids(), &[1, 2]);
        assert!(pools[0].type_name().contains("Position"));
        assert_eq!(pools[1].entity_ids(), &[1]);
    }

    #[test]
    fn type_limit_is_enforced() {
        // Use a macro-generated family of zero-sized types to exhaust the
        // 64-slot table without 64 hand-written structs.
        macro_rules! fill {
            ($registry:expr, $($name:ident),+) => {
                $(
                    struct $name;
                    $registry.register::<$name>().unwrap();
                )+
            };
        }

        let mut registry = ComponentRegistry::new();
        fill!(
            registry, C00, C01, C02, C03, C04, C05, C06, C07, C08, C09, C10, C11, C12, C13, C14,
            C15, C16, C17, C18, C19, C20, C21, C22, C23, C24, C25, C26, C27, C28, C29, C30, C31,
            C32, C33, C34, C35, C36, C37, C38, C39, C40, C41, C42, C43, C44, C45, C46, C47, C48,
            C49, C50, C51, C52, C53, C54, C55, C56, C57, C58, C59, C60, C61, C62, C63
        );
        assert_eq!(registry.type_count(), MAX_COMPONENT_TYPES);

        struct OneTooMany;
        assert_eq!(
            registry.register::<OneTooMany>(),
            Err(RegistryError::TypeLimitExceeded {
                limit: MAX_COMPONENT_TYPES
            })
        );
    }
}
