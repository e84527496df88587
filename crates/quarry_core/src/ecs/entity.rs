//! Entity identifiers and the allocator that issues them.
//!
//! An entity is an opaque `u64` handle with no payload. The allocator
//! hands out identifiers monotonically and recycles released ones so the
//! id space stays compact across long sessions.

use std::collections::{HashSet, VecDeque};

use thiserror::Error;

/// Opaque entity handle.
pub type EntityId = u64;

/// Reserved sentinel id. Never issued by the allocator.
pub const INVALID_ENTITY: EntityId = EntityId::MAX;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity {0} released twice without an intervening acquire")]
    DoubleRelease(EntityId),
    #[error("entity {0} was never issued by this allocator")]
    NotIssued(EntityId),
}

/// Issues unique entity identifiers and tracks their liveness.
///
/// Released ids are kept both in a deque (for ordered, most-recently-released
/// reuse) and in a hash set shadow so `valid` stays O(1) no matter how many
/// entities have been released.
pub struct EntityAllocator {
    next: EntityId,
    released: VecDeque<EntityId>,
    released_set: HashSet<EntityId>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            next: 0,
            released: VecDeque::new(),
            released_set: HashSet::new(),
        }
    }

    /// Acquire a fresh or recycled entity id.
    ///
    /// Reuse is LIFO: the most recently released id comes back first, which
    /// keeps sparse pages warm. Panics if the id space is exhausted; with
    /// 64-bit ids that implies billions of live entities and is treated as
    /// unrecoverable.
    #[must_use]
    pub fn acquire(&mut self) -> EntityId {
        if let Some(id) = self.released.pop_back() {
            self.released_set.remove(&id);
            return id;
        }
        assert!(
            self.next < INVALID_ENTITY,
            "entity identifier space exhausted"
        );
        let id = self.next;
        self.next += 1;
        id
    }

    /// Return an id to the allocator for reuse.
    ///
    /// Rejects ids that were never issued and ids that are already sitting
    /// in the released pool; accepting either would leave the allocator with
    /// duplicate entries and break the validity invariant.
    pub fn release(&mut self, entity: EntityId) -> Result<(), EntityError> {
        if entity >= self.next {
            return Err(EntityError::NotIssued(entity));
        }
        if !self.released_set.insert(entity) {
            return Err(EntityError::DoubleRelease(entity));
        }
        self.released.push_back(entity);
        Ok(())
    }

    /// Number of currently live entities.
    #[inline]
    pub fn count(&self) -> usize {
        self.next as usize - self.released.len()
    }

    /// An id is valid iff it has been issued and not since released.
    #[inline]
    pub fn valid(&self, entity: EntityId) -> bool {
        entity < self.next && !self.released_set.contains(&entity)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_monotonic_from_zero() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.acquire(), 0);
        assert_eq!(alloc.acquire(), 1);
        assert_eq!(alloc.acquire(), 2);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn released_ids_are_reused_before_new_ones() {
        let mut alloc = EntityAllocator::new();
        let _e0 = alloc.acquire();
        let e1 = alloc.acquire();
        let _e2 = alloc.acquire();

        alloc.release(e1).unwrap();
        assert_eq!(alloc.count(), 2);
        assert!(!alloc.valid(e1));

        // Recycled id comes back first, then allocation resumes at 3.
        assert_eq!(alloc.acquire(), 1);
        assert_eq!(alloc.acquire(), 3);
        assert_eq!(alloc.count(), 4);
    }

    #[test]
    fn reuse_order_is_most_recently_released() {
        let mut alloc = EntityAllocator::new();
        for _ in 0..4 {
            let _ = alloc.acquire();
        }
        alloc.release(0).unwrap();
        alloc.release(2).unwrap();
        assert_eq!(alloc.acquire(), 2);
        assert_eq!(alloc.acquire(), 0);
    }

    #[test]
    fn valid_tracks_acquire_and_release() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.acquire();
        assert!(alloc.valid(e));
        assert!(!alloc.valid(e + 1));

        alloc.release(e).unwrap();
        assert!(!alloc.valid(e));

        let e2 = alloc.acquire();
        assert_eq!(e, e2);
        assert!(alloc.valid(e2));
    }

    #[test]
    fn count_is_acquires_minus_releases() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<_> = (0..10).map(|_| alloc.acquire()).collect();
        for id in ids.iter().take(4) {
            alloc.release(*id).unwrap();
        }
        assert_eq!(alloc.count(), 6);
    }

    #[test]
    fn double_release_is_rejected() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.acquire();
        alloc.release(e).unwrap();
        assert_eq!(alloc.release(e), Err(EntityError::DoubleRelease(e)));
        // Allocator state is unchanged by the failed release.
        assert_eq!(alloc.count(), 0);
        assert_eq!(alloc.acquire(), e);
    }

    #[test]
    fn releasing_unissued_id_is_rejected() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.release(7), Err(EntityError::NotIssued(7)));
        assert_eq!(
            alloc.release(INVALID_ENTITY),
            Err(EntityError::NotIssued(INVALID_ENTITY))
        );
    }
}
