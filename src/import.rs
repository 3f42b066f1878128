//! Loading deducer trace exports.
//!
//! The deducer writes one row per derived relation into its `TraceData`
//! table: `sub`, `super`, `type` and a `dependencies` column holding a JSON
//! array of `{"sub", "sup"}` pairs. An export of that table (a JSON array of
//! rows) plus an optional export of class names (`{"id", "name"}` rows) can be
//! loaded into a [`MemStore`] or written into a [`DurableStore`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::class::{ClassId, RelationKey};
use crate::error::ImportError;
use crate::store::{DurableStore, MemStore};
use crate::trace::{StoredRelation, parse_dependencies};

pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// One row of the `TraceData` export.
#[derive(Debug, Deserialize)]
struct TraceRow {
    sub: ClassId,
    #[serde(rename = "super", alias = "sup")]
    sup: ClassId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    dependencies: serde_json::Value,
}

/// One row of the class name export.
#[derive(Debug, Deserialize)]
struct NameRow {
    id: ClassId,
    name: String,
}

/// Summary of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub relations: usize,
    pub names: usize,
    /// Rows whose `(sub, super)` key appeared earlier in the export.
    pub duplicates: usize,
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} trace records, {} class names ({} duplicate rows replaced)",
            self.relations, self.names, self.duplicates
        )
    }
}

/// A parsed trace export, ready to be loaded into a store.
#[derive(Debug, Clone, Default)]
pub struct TraceExport {
    pub relations: Vec<(RelationKey, StoredRelation)>,
    pub names: Vec<(ClassId, String)>,
    duplicates: usize,
}

impl TraceExport {
    /// Read a trace export and an optional name export from disk.
    pub fn load(traces: &Path, names: Option<&Path>) -> ImportResult<Self> {
        let content = read(traces)?;
        let mut export = Self::from_traces_json(&content, &traces.display().to_string())?;
        if let Some(names) = names {
            let content = read(names)?;
            export.names = parse_names(&content, &names.display().to_string())?;
        }
        Ok(export)
    }

    /// Parse the `TraceData` export. `origin` names the source in errors.
    pub fn from_traces_json(content: &str, origin: &str) -> ImportResult<Self> {
        let rows: Vec<TraceRow> = serde_json::from_str(content).map_err(|e| ImportError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let mut index: HashMap<RelationKey, usize> = HashMap::with_capacity(rows.len());
        let mut duplicates = 0;
        let mut relations = Vec::with_capacity(rows.len());
        for row in rows {
            let dependencies = parse_dependencies(&row.dependencies).map_err(|e| {
                ImportError::InvalidDependencies {
                    sub: row.sub.get(),
                    sup: row.sup.get(),
                    message: e.to_string(),
                }
            })?;
            let key = RelationKey {
                sub: row.sub,
                sup: row.sup,
            };
            let relation = StoredRelation::new(row.kind, dependencies);
            match index.get(&key) {
                Some(&at) => {
                    tracing::warn!(%key, "duplicate trace row, keeping the last one");
                    duplicates += 1;
                    relations[at] = (key, relation);
                }
                None => {
                    index.insert(key, relations.len());
                    relations.push((key, relation));
                }
            }
        }

        Ok(Self {
            relations,
            names: Vec::new(),
            duplicates,
        })
    }

    /// Attach names parsed from a name export.
    pub fn with_names_json(mut self, content: &str, origin: &str) -> ImportResult<Self> {
        self.names = parse_names(content, origin)?;
        Ok(self)
    }

    pub fn report(&self) -> ImportReport {
        ImportReport {
            relations: self.relations.len(),
            names: self.names.len(),
            duplicates: self.duplicates,
        }
    }

    /// Build an in-memory store from the export.
    pub fn into_mem_store(self) -> MemStore {
        let store = MemStore::with_capacity(self.relations.len());
        for (key, relation) in self.relations {
            store.insert_relation(key, relation);
        }
        for (id, name) in self.names {
            store.insert_name(id, name);
        }
        store
    }

    /// Write the export into a durable store in one transaction.
    pub fn write_to(&self, store: &DurableStore) -> ImportResult<ImportReport> {
        store.write_batch(&self.relations, &self.names)?;
        let report = self.report();
        tracing::info!(
            path = %store.path().display(),
            relations = report.relations,
            names = report.names,
            duplicates = report.duplicates,
            "imported trace export"
        );
        Ok(report)
    }
}

fn read(path: &Path) -> ImportResult<String> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn parse_names(content: &str, origin: &str) -> ImportResult<Vec<(ClassId, String)>> {
    let rows: Vec<NameRow> = serde_json::from_str(content).map_err(|e| ImportError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })?;
    Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
}
