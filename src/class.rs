//! Graph-class identifiers.
//!
//! Every graph class in the classification database is identified by a
//! [`ClassId`]. The same number is the lookup key for trace records and the
//! text shown to the user, so `Display` prints the bare number.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a graph class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    /// Wrap a raw class number.
    pub const fn new(raw: u32) -> Self {
        ClassId(raw)
    }

    /// Get the underlying `u32` value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ClassId {
    fn from(raw: u32) -> Self {
        ClassId(raw)
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClassId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(ClassId)
    }
}

/// Ordered `(sub, super)` pair: the key of a relation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationKey {
    pub sub: ClassId,
    pub sup: ClassId,
}

impl RelationKey {
    pub fn new(sub: impl Into<ClassId>, sup: impl Into<ClassId>) -> Self {
        Self {
            sub: sub.into(),
            sup: sup.into(),
        }
    }
}

impl std::fmt::Display for RelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.sub, self.sup)
    }
}
