//! Durable trace store backed by redb.
//!
//! Relation records live in the `trace` table keyed by `(sub, super)`, with the
//! record body (type label and dependency list) stored as JSON. Class names
//! live in the `names` table. Reads use MVCC snapshots, so any number of
//! requests can look up records concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, DatabaseError, ReadableTableMetadata, TableDefinition, TableError};

use crate::class::{ClassId, RelationKey};
use crate::error::StoreError;
use crate::store::{StoreResult, TraceStore};
use crate::trace::StoredRelation;

/// `(sub, super)` → JSON-encoded [`StoredRelation`].
const TRACE_TABLE: TableDefinition<(u32, u32), &[u8]> = TableDefinition::new("trace");

/// Class id → display name.
const NAME_TABLE: TableDefinition<u32, &str> = TableDefinition::new("names");

/// Trace store using redb.
pub struct DurableStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl DurableStore {
    /// Open an existing trace database for lookups.
    ///
    /// Fails with [`StoreError::Unavailable`] if the file does not exist or
    /// cannot be opened.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if !path.is_file() {
            return Err(StoreError::Unavailable {
                path: path.display().to_string(),
                message: "no such database file".into(),
            });
        }
        let db = Database::open(path).map_err(|e| StoreError::Unavailable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "opened trace store");
        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Open or create a trace database, creating parent directories as needed.
    pub fn create(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
            }
        }
        let db = Database::create(path).map_err(|e| match e {
            DatabaseError::DatabaseAlreadyOpen => StoreError::Unavailable {
                path: path.display().to_string(),
                message: e.to_string(),
            },
            e => StoreError::Redb {
                message: format!("failed to open redb at {}: {e}", path.display()),
            },
        })?;
        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write relation records and class names in one ACID transaction.
    ///
    /// Existing entries with the same key are replaced.
    pub fn write_batch(
        &self,
        relations: &[(RelationKey, StoredRelation)],
        names: &[(ClassId, String)],
    ) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(|e| StoreError::Redb {
            message: format!("begin_write failed: {e}"),
        })?;
        {
            let mut table = txn.open_table(TRACE_TABLE).map_err(|e| StoreError::Redb {
                message: format!("open_table failed: {e}"),
            })?;
            for (key, relation) in relations {
                let encoded = serde_json::to_vec(relation).map_err(|e| {
                    StoreError::Serialization {
                        message: format!("failed to encode trace record {key}: {e}"),
                    }
                })?;
                table
                    .insert((key.sub.get(), key.sup.get()), encoded.as_slice())
                    .map_err(|e| StoreError::Redb {
                        message: format!("insert failed: {e}"),
                    })?;
            }
        }
        {
            let mut table = txn.open_table(NAME_TABLE).map_err(|e| StoreError::Redb {
                message: format!("open_table failed: {e}"),
            })?;
            for (id, name) in names {
                table
                    .insert(id.get(), name.as_str())
                    .map_err(|e| StoreError::Redb {
                        message: format!("insert failed: {e}"),
                    })?;
            }
        }
        txn.commit().map_err(|e| StoreError::Redb {
            message: format!("commit failed: {e}"),
        })?;
        Ok(())
    }

    /// Number of relation records and class names currently stored.
    pub fn counts(&self) -> StoreResult<(u64, u64)> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        let relations = match txn.open_table(TRACE_TABLE) {
            Ok(table) => table.len().map_err(|e| StoreError::Redb {
                message: format!("len failed: {e}"),
            })?,
            Err(TableError::TableDoesNotExist(_)) => 0,
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let names = match txn.open_table(NAME_TABLE) {
            Ok(table) => table.len().map_err(|e| StoreError::Redb {
                message: format!("len failed: {e}"),
            })?,
            Err(TableError::TableDoesNotExist(_)) => 0,
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        Ok((relations, names))
    }
}

impl TraceStore for DurableStore {
    fn lookup_relation(&self, key: RelationKey) -> StoreResult<Option<StoredRelation>> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(TRACE_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let result = table
            .get((key.sub.get(), key.sup.get()))
            .map_err(|e| StoreError::Redb {
                message: format!("get failed: {e}"),
            })?;
        let Some(guard) = result else {
            return Ok(None);
        };
        let stored = serde_json::from_slice(guard.value()).map_err(|e| {
            StoreError::Serialization {
                message: format!("corrupt trace record {key}: {e}"),
            }
        })?;
        Ok(Some(stored))
    }

    fn lookup_name(&self, id: ClassId) -> StoreResult<Option<String>> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(NAME_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let result = table.get(id.get()).map_err(|e| StoreError::Redb {
            message: format!("get failed: {e}"),
        })?;
        Ok(result.map(|guard| guard.value().to_string()))
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("path", &self.path)
            .finish()
    }
}
