//! Snapshot views over component pool intersections.
//!
//! A view captures, at construction, the ids of every entity present in all
//! requested pools. It is a snapshot: entities added or removed afterwards
//! are invisible to an already-built view, and systems rely on that when
//! they mutate structure mid-pass. Per-entity component access inside a
//! view is trusted (panics on absence) because the view already proved
//! membership when it was built; cheap `contains` checks belong in the
//! construction scan, not in the per-frame access path.

use std::marker::PhantomData;

use crate::ecs::entity::EntityId;
use crate::ecs::registry::{Component, ComponentPool, ComponentRegistry};
use crate::ecs::sparse_set::SparseSet;

/// Component tuples a view can be built over, `(A,)` up to eight types.
pub trait ViewQuery {
    /// Shared references to each component, in declared order.
    type Refs<'a>;
    /// Mutable references to each component, in declared order.
    type RefsMut<'a>;

    /// Entity ids present in every requested pool, in the smallest pool's
    /// dense order.
    fn collect(registry: &ComponentRegistry) -> Vec<EntityId>;

    /// Fetch `entity`'s components. Panics if any is absent.
    fn fetch(registry: &ComponentRegistry, entity: EntityId) -> Self::Refs<'_>;

    /// Fetch `entity`'s components mutably. Panics if any is absent or if
    /// the tuple names the same component type twice.
    fn fetch_mut(registry: &mut ComponentRegistry, entity: EntityId) -> Self::RefsMut<'_>;
}

/// Asymmetric intersection over type-erased pools.
///
/// A single pool is copied wholesale. Otherwise the smallest pool drives
/// the scan and every other pool is membership-tested per candidate, so
/// cost is O(smallest pool × (n−1)). A `None` slot is a component type
/// nobody registered; it holds no entities, so the intersection is empty.
fn intersect(lookups: &[Option<&dyn ComponentPool>]) -> Vec<EntityId> {
    let mut pools = Vec::with_capacity(lookups.len());
    for lookup in lookups {
        match lookup {
            Some(pool) => pools.push(*pool),
            None => return Vec::new(),
        }
    }

    if pools.len() == 1 {
        return pools[0].entity_ids().to_vec();
    }

    let mut smallest = 0;
    for (i, pool) in pools.iter().enumerate() {
        if pool.len() < pools[smallest].len() {
            smallest = i;
        }
    }

    let mut entities = Vec::with_capacity(pools[smallest].len());
    'candidates: for &entity in pools[smallest].entity_ids() {
        for (i, pool) in pools.iter().enumerate() {
            if i != smallest && !pool.contains(entity) {
                continue 'candidates;
            }
        }
        entities.push(entity);
    }
    entities
}

macro_rules! impl_view_query {
    ($($ty:ident $pool:ident),+) => {
        impl<$($ty: Component),+> ViewQuery for ($($ty,)+) {
            type Refs<'a> = ($(&'a $ty,)+);
            type RefsMut<'a> = ($(&'a mut $ty,)+);

            fn collect(registry: &ComponentRegistry) -> Vec<EntityId> {
                intersect(&[$(registry.erased_pool::<$ty>()),+])
            }

            fn fetch(registry: &ComponentRegistry, entity: EntityId) -> Self::Refs<'_> {
                ($(
                    registry
                        .pool::<$ty>()
                        .and_then(|pool| pool.get(entity))
                        .unwrap_or_else(|| {
                            panic!(
                                "entity {} has no {} component",
                                entity,
                                std::any::type_name::<$ty>()
                            )
                        }),
                )+)
            }

            fn fetch_mut(registry: &mut ComponentRegistry, entity: EntityId) -> Self::RefsMut<'_> {
                let ids = [$(
                    registry
                        .component_id_of::<$ty>()
                        .unwrap_or_else(|| {
                            panic!(
                                "component {} is not registered",
                                std::any::type_name::<$ty>()
                            )
                        }) as usize,
                )+];
                let [$($pool),+] = registry.pools_disjoint_mut(ids);
                ($(
                    $pool
                        .as_any_mut()
                        .downcast_mut::<SparseSet<$ty>>()
                        .expect("pool type mismatch")
                        .get_mut(entity)
                        .unwrap_or_else(|| {
                            panic!(
                                "entity {} has no {} component",
                                entity,
                                std::any::type_name::<$ty>()
                            )
                        }),
                )+)
            }
        }
    };
}

impl_view_query!(A pa);
impl_view_query!(A pa, B pb);
impl_view_query!(A pa, B pb, C pc);
impl_view_query!(A pa, B pb, C pc, D pd);
impl_view_query!(A pa, B pb, C pc, D pd, E pe);
impl_view_query!(A pa, B pb, C pc, D pd, E pe, F pf);
impl_view_query!(A pa, B pb, C pc, D pd, E pe, F pf, G pg);
impl_view_query!(A pa, B pb, C pc, D pd, E pe, F pf, G pg, H ph);

/// Iterable snapshot of the entities matching a component tuple.
///
/// The entity list is owned by the view, so concurrent pool mutation after
/// construction cannot disturb iteration. Membership order follows the
/// smallest pool's dense order at construction time.
pub struct View<Q: ViewQuery> {
    entities: Vec<EntityId>,
    _query: PhantomData<fn() -> Q>,
}

impl<Q: ViewQuery> View<Q> {
    /// Build the snapshot. For a single component type this copies the
    /// pool's dense entity list; for several it walks the smallest pool and
    /// membership-tests the rest, so cost is proportional to the smallest
    /// pool, not the product of all pools.
    pub fn new(registry: &ComponentRegistry) -> Self {
        Self {
            entities: Q::collect(registry),
            _query: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The snapshot's entity ids.
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Whether `entity` was a member when the view was built.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Iterate the snapshot's entity ids.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// "each" shape (a): entity id only. Needs no registry access.
    pub fn for_each_id<F>(&self, mut f: F)
    where
        F: FnMut(EntityId),
    {
        for &entity in &self.entities {
            f(entity);
        }
    }

    /// "each" shape (b): entity id plus component references in declared
    /// order.
    pub fn for_each<'r, F>(&self, registry: &'r ComponentRegistry, mut f: F)
    where
        F: FnMut(EntityId, Q::Refs<'r>),
    {
        for &entity in &self.entities {
            f(entity, Q::fetch(registry, entity));
        }
    }

    /// "each" shape (c): component references only.
    pub fn for_each_components<'r, F>(&self, registry: &'r ComponentRegistry, mut f: F)
    where
        F: FnMut(Q::Refs<'r>),
    {
        for &entity in &self.entities {
            f(Q::fetch(registry, entity));
        }
    }

    /// Write pass: entity id plus mutable component references.
    pub fn for_each_mut<F>(&self, registry: &mut ComponentRegistry, mut f: F)
    where
        F: for<'a> FnMut(EntityId, Q::RefsMut<'a>),
    {
        for &entity in &self.entities {
            f(entity, Q::fetch_mut(registry, entity));
        }
    }

    /// Indexed tuple access: `(entity, components)` for the `index`-th
    /// member. Supports random access and reverse walks; panics if `index`
    /// is out of bounds.
    pub fn at<'r>(&self, registry: &'r ComponentRegistry, index: usize) -> (EntityId, Q::Refs<'r>) {
        let entity = self.entities[index];
        (entity, Q::fetch(registry, entity))
    }

    /// Direct fetch for a known member, bypassing any membership scan. `P`
    /// may be the full view tuple or any other tuple of component types.
    /// Panics if the entity lacks one of the components; callers are
    /// expected to pass entities this view yielded.
    pub fn get<'r, P: ViewQuery>(
        &self,
        registry: &'r ComponentRegistry,
        entity: EntityId,
    ) -> P::Refs<'r> {
        P::fetch(registry, entity)
    }

    /// Mutable counterpart of [`View::get`].
    pub fn get_mut<'r, P: ViewQuery>(
        &self,
        registry: &'r mut ComponentRegistry,
        entity: EntityId,
    ) -> P::RefsMut<'r> {
        P::fetch_mut(registry, entity)
    }
}

impl<'v, Q: ViewQuery> IntoIterator for &'v View<Q> {
    type Item = EntityId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, EntityId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter().copied()
    }
}
