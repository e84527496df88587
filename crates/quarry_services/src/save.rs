//! Save snapshots built on the core's pool-enumeration contract.
//!
//! A snapshot stores `(entity, value)` pairs for one pool. The stored ids
//! exist only so entities shared between pools can be stitched back
//! together on load: restore never forges identifiers, it re-creates every
//! entity through the allocator and remaps old ids to the freshly issued
//! ones, preserving the allocator's validity invariant.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use quarry_core::ecs::{Component, ComponentRegistry, EntityAllocator, EntityId};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistable image of one component pool.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolSnapshot<T> {
    entries: Vec<(EntityId, T)>,
}

impl<T> PoolSnapshot<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(EntityId, T)] {
        &self.entries
    }
}

/// Capture the current `(entity, value)` pairs of `T`'s pool. An
/// unregistered type yields an empty snapshot.
pub fn snapshot_pool<T: Component + Clone>(registry: &ComponentRegistry) -> PoolSnapshot<T> {
    let entries = registry
        .pool::<T>()
        .map(|pool| pool.iter().map(|(e, v)| (e, v.clone())).collect())
        .unwrap_or_default();
    PoolSnapshot { entries }
}

pub fn snapshot_to_json<T: Serialize>(snapshot: &PoolSnapshot<T>) -> Result<String, SaveError> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn snapshot_from_json<T: DeserializeOwned>(json: &str) -> Result<PoolSnapshot<T>, SaveError> {
    Ok(serde_json::from_str(json)?)
}

/// Old-id to new-id mapping shared by all pool restores of one load pass,
/// so an entity appearing in several pools is re-created exactly once.
pub struct RestoreMap {
    remapped: HashMap<EntityId, EntityId>,
}

impl RestoreMap {
    pub fn new() -> Self {
        Self {
            remapped: HashMap::new(),
        }
    }

    /// Re-insert a snapshot's components, acquiring a fresh entity for each
    /// id not seen earlier in this pass.
    pub fn restore_pool<T: Component>(
        &mut self,
        snapshot: PoolSnapshot<T>,
        allocator: &mut EntityAllocator,
        registry: &mut ComponentRegistry,
    ) {
        let count = snapshot.entries.len();
        for (old, value) in snapshot.entries {
            let entity = *self
                .remapped
                .entry(old)
                .or_insert_with(|| allocator.acquire());
            registry.add(entity, value);
        }
        debug!(
            component = std::any::type_name::<T>(),
            count, "restored pool"
        );
    }

    /// The fresh id assigned to a persisted one, if seen this pass.
    pub fn remapped(&self, old: EntityId) -> Option<EntityId> {
        self.remapped.get(&old).copied()
    }
}

impl Default for RestoreMap {
    fn default() -> Self {
        Self::new()
    }
}
