//! In-memory trace store backed by DashMap.
//!
//! Used to explain straight from a JSON export without building a database,
//! and as the fixture store in tests. All data is lost on process exit.

use dashmap::DashMap;

use crate::class::{ClassId, RelationKey};
use crate::store::{StoreResult, TraceStore};
use crate::trace::StoredRelation;

/// Concurrent in-memory store using sharded hashmaps.
#[derive(Debug)]
pub struct MemStore {
    relations: DashMap<RelationKey, StoredRelation>,
    names: DashMap<ClassId, String>,
}

impl MemStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            relations: DashMap::new(),
            names: DashMap::new(),
        }
    }

    /// Create a store with pre-allocated capacity for relation records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            relations: DashMap::with_capacity(capacity),
            names: DashMap::new(),
        }
    }

    /// Insert or replace a relation record.
    pub fn insert_relation(&self, key: RelationKey, relation: StoredRelation) {
        self.relations.insert(key, relation);
    }

    /// Insert or replace a class name.
    pub fn insert_name(&self, id: ClassId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Number of relation records.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether the store holds no relation records.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Number of class names.
    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceStore for MemStore {
    fn lookup_relation(&self, key: RelationKey) -> StoreResult<Option<StoredRelation>> {
        Ok(self.relations.get(&key).map(|r| r.value().clone()))
    }

    fn lookup_name(&self, id: ClassId) -> StoreResult<Option<String>> {
        Ok(self.names.get(&id).map(|n| n.value().clone()))
    }
}
