//! Generic sparse-set component pool.
//!
//! Each pool keeps a paged sparse index (entity id -> dense position) next
//! to two densely packed, index-aligned arrays: the entity ids in insertion
//! order and their component values. Add, remove and contains are O(1);
//! iteration walks the dense arrays. Removal is swap-with-last-and-pop, so
//! dense order is stable only between structural mutations.

use crate::ecs::entity::{EntityId, INVALID_ENTITY};

/// Entries per sparse page. Power of two for shift/mask addressing.
const PAGE_SIZE: usize = 1024;
const PAGE_SHIFT: u32 = PAGE_SIZE.trailing_zeros();
const PAGE_MASK: usize = PAGE_SIZE - 1;

/// Slot sentinel for "entity not present".
const EMPTY: usize = usize::MAX;

/// Paged sparse index. Pages are allocated on demand, so a handful of
/// high-valued entity ids does not force the whole index into memory.
struct SparsePages {
    pages: Vec<Option<Box<[usize; PAGE_SIZE]>>>,
}

impl SparsePages {
    fn new() -> Self {
        Self { pages: Vec::new() }
    }

    #[inline]
    fn page_of(entity: EntityId) -> usize {
        (entity as usize) >> PAGE_SHIFT
    }

    #[inline]
    fn slot_of(entity: EntityId) -> usize {
        (entity as usize) & PAGE_MASK
    }

    fn get(&self, entity: EntityId) -> Option<usize> {
        let page = self.pages.get(Self::page_of(entity))?.as_ref()?;
        let dense = page[Self::slot_of(entity)];
        if dense == EMPTY {
            None
        } else {
            Some(dense)
        }
    }

    fn set(&mut self, entity: EntityId, dense: usize) {
        let page_index = Self::page_of(entity);
        if page_index >= self.pages.len() {
            self.pages.resize_with(page_index + 1, || None);
        }
        let page = self.pages[page_index].get_or_insert_with(|| Box::new([EMPTY; PAGE_SIZE]));
        page[Self::slot_of(entity)] = dense;
    }

    fn unset(&mut self, entity: EntityId) {
        if let Some(Some(page)) = self.pages.get_mut(Self::page_of(entity)) {
            page[Self::slot_of(entity)] = EMPTY;
        }
    }

    fn clear(&mut self) {
        self.pages.clear();
    }
}

/// Associative container mapping entity id -> component value.
///
/// Invariant: for every present entity `e`, `entities[sparse(e)] == e` and
/// `values[sparse(e)]` holds its component data.
pub struct SparseSet<T> {
    index: SparsePages,
    entities: Vec<EntityId>,
    values: Vec<T>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            index: SparsePages::new(),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Insert a component for `entity`, overwriting in place if one is
    /// already present (no dense growth on overwrite).
    pub fn insert(&mut self, entity: EntityId, value: T) {
        debug_assert_ne!(
            entity, INVALID_ENTITY,
            "sentinel entity id cannot hold components"
        );
        match self.index.get(entity) {
            Some(dense) => self.values[dense] = value,
            None => {
                self.index.set(entity, self.entities.len());
                self.entities.push(entity);
                self.values.push(value);
            }
        }
    }

    /// Remove `entity`'s component. Returns false (and does nothing) if the
    /// entity has none, so a second remove is a no-op.
    ///
    /// Swap-pop: the last dense element moves into the vacated slot and its
    /// sparse entry is patched. Iteration order changes as a result.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(dense) = self.index.get(entity) else {
            return false;
        };
        self.entities.swap_remove(dense);
        self.values.swap_remove(dense);
        if dense < self.entities.len() {
            // Patch the moved element's sparse slot.
            self.index.set(self.entities[dense], dense);
        }
        self.index.unset(entity);
        true
    }

    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.index.get(entity).is_some()
    }

    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.index.get(entity).map(|dense| &self.values[dense])
    }

    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.index.get(entity).map(|dense| &mut self.values[dense])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity ids in current dense order.
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Component values in current dense order, aligned with `entities`.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Iterate `(entity, &value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    /// Iterate `(entity, &mut value)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }

    /// Drop every component and release the sparse pages.
    pub fn clear(&mut self) {
        self.index.clear();
        self.entities.clear();
        self.values.clear();
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
