//! Singleton instance cache

use std::any::TypeId;

use dashmap::DashMap;
use tracing::trace;

use crate::implementation::Instance;
use crate::service::TypeKey;

/// Singleton instances keyed by implementation type.
///
/// Keyed by implementation, not by contract: one implementation registered
/// under several contracts as a singleton yields the same object through each.
#[derive(Default)]
pub struct SingletonCache {
    instances: DashMap<TypeId, Instance>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, implementation: &TypeKey) -> Option<Instance> {
        let instance = self
            .instances
            .get(&implementation.id())
            .map(|entry| entry.value().clone());
        if instance.is_some() {
            trace!(implementation = %implementation, "Singleton cache hit");
        }
        instance
    }

    /// Store `instance` unless one is already cached; returns the retained one
    pub fn get_or_insert(&self, implementation: &TypeKey, instance: Instance) -> Instance {
        self.instances
            .entry(implementation.id())
            .or_insert(instance)
            .value()
            .clone()
    }

    pub fn contains(&self, implementation: &TypeKey) -> bool {
        self.instances.contains_key(&implementation.id())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl std::fmt::Debug for SingletonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCache")
            .field("instances", &self.instances.len())
            .finish()
    }
}
