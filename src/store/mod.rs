//! Trace store access.
//!
//! Two backends serve the same read-only lookups:
//!
//! - [`MemStore`]: relation and name maps held in concurrent hashmaps (DashMap)
//! - [`DurableStore`]: an embedded redb database populated by `why import`
//!
//! Both implement [`TraceStore`]; the explainer only ever sees the trait.

pub mod durable;
pub mod mem;

use std::sync::Arc;

use crate::class::{ClassId, RelationKey};
use crate::error::StoreError;
use crate::trace::{RelationRecord, StoredRelation};

pub use durable::DurableStore;
pub use mem::MemStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read-only lookups against a populated trace database.
///
/// A missing record or name is `Ok(None)`, never an error. Errors are reserved
/// for a store that cannot answer at all.
pub trait TraceStore: Send + Sync {
    /// Look up the relation record stored under `key`.
    fn lookup_relation(&self, key: RelationKey) -> StoreResult<Option<StoredRelation>>;

    /// Look up the display name of a graph class.
    fn lookup_name(&self, id: ClassId) -> StoreResult<Option<String>>;

    /// Fetch the full record for `key`, resolving class names when asked.
    fn fetch(&self, key: RelationKey, with_names: bool) -> StoreResult<Option<RelationRecord>> {
        let Some(stored) = self.lookup_relation(key)? else {
            tracing::debug!(%key, "no trace record");
            return Ok(None);
        };
        let mut record = RelationRecord::from_stored(key, stored);
        if with_names {
            record.sub_name = self.lookup_name(key.sub)?;
            record.super_name = self.lookup_name(key.sup)?;
        }
        tracing::debug!(%key, deps = record.dependencies.len(), "fetched trace record");
        Ok(Some(record))
    }
}

impl<T: TraceStore + ?Sized> TraceStore for Arc<T> {
    fn lookup_relation(&self, key: RelationKey) -> StoreResult<Option<StoredRelation>> {
        (**self).lookup_relation(key)
    }

    fn lookup_name(&self, id: ClassId) -> StoreResult<Option<String>> {
        (**self).lookup_name(id)
    }
}

impl<T: TraceStore + ?Sized> TraceStore for &T {
    fn lookup_relation(&self, key: RelationKey) -> StoreResult<Option<StoredRelation>> {
        (**self).lookup_relation(key)
    }

    fn lookup_name(&self, id: ClassId) -> StoreResult<Option<String>> {
        (**self).lookup_name(id)
    }
}
