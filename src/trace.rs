//! Trace records: why a relation between two graph classes was derived.
//!
//! The deducer attaches to every derived relation a type label (the rule that
//! produced it, e.g. `"Transitivity"` or `"direct"`) and the list of relations
//! it was derived from. Those prerequisite lists are stored as JSON arrays of
//! `{"sub": .., "sup": ..}` objects.

use serde::{Deserialize, Serialize};

use crate::class::{ClassId, RelationKey};

/// One prerequisite relation of a trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub sub: ClassId,
    #[serde(alias = "super")]
    pub sup: ClassId,
}

impl Dependency {
    pub fn new(sub: impl Into<ClassId>, sup: impl Into<ClassId>) -> Self {
        Self {
            sub: sub.into(),
            sup: sup.into(),
        }
    }

    /// The key under which this prerequisite's own trace record is stored.
    pub fn key(&self) -> RelationKey {
        RelationKey {
            sub: self.sub,
            sup: self.sup,
        }
    }
}

/// A relation record as persisted, without its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRelation {
    /// Rule label describing how the relation was derived.
    #[serde(rename = "type")]
    pub kind: String,
    /// Prerequisite relations, in the order the rule listed them.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl StoredRelation {
    pub fn new(kind: impl Into<String>, dependencies: Vec<Dependency>) -> Self {
        Self {
            kind: kind.into(),
            dependencies,
        }
    }

    /// A relation with no prerequisites (an axiom of the trace).
    pub fn leaf(kind: impl Into<String>) -> Self {
        Self::new(kind, Vec::new())
    }
}

/// A fetched relation record, optionally joined with class names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRecord {
    pub sub: ClassId,
    #[serde(rename = "super")]
    pub sup: ClassId,
    #[serde(rename = "type")]
    pub kind: String,
    pub dependencies: Vec<Dependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_name: Option<String>,
}

impl RelationRecord {
    /// Attach a key to a stored body. Names are left unresolved.
    pub fn from_stored(key: RelationKey, stored: StoredRelation) -> Self {
        Self {
            sub: key.sub,
            sup: key.sup,
            kind: stored.kind,
            dependencies: stored.dependencies,
            sub_name: None,
            super_name: None,
        }
    }

    pub fn key(&self) -> RelationKey {
        RelationKey {
            sub: self.sub,
            sup: self.sup,
        }
    }

    /// Whether this record is a base case of the trace.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Decode a dependency column.
///
/// The SQL export stores the list as a string holding a JSON array; hand-made
/// exports may inline the array directly. `null` and empty strings mean no
/// dependencies.
pub fn parse_dependencies(raw: &serde_json::Value) -> Result<Vec<Dependency>, serde_json::Error> {
    match raw {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "null" {
                Ok(Vec::new())
            } else {
                serde_json::from_str(s)
            }
        }
        other => serde_json::from_value(other.clone()),
    }
}
