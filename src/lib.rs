// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # isgci-why
//!
//! Explains graph-class inclusion deductions. The deducer records, for every
//! relation `sub -> super` it derives, the rule that produced it and the
//! relations it was derived from. This crate looks those trace records up and
//! expands them into indented proof traces.
//!
//! ## Architecture
//!
//! - **Trace store** (`store`): read-only lookups of trace records and class
//!   names, in memory (DashMap) or in an embedded redb database
//! - **Explainer** (`explain`): depth-first expansion into a proof trace, with
//!   cycle and depth guards
//! - **Deducer log** (`logfile`): classification of the consistency-check log
//! - **Import** (`import`): loading `TraceData` exports into a store
//! - **Server** (`server`, feature `server`): the log viewer and "why?" endpoint
//!
//! ## Library usage
//!
//! ```
//! use isgci_why::class::{ClassId, RelationKey};
//! use isgci_why::explain::Explainer;
//! use isgci_why::store::MemStore;
//! use isgci_why::trace::{Dependency, StoredRelation};
//!
//! let store = MemStore::new();
//! store.insert_relation(
//!     RelationKey::new(1, 16),
//!     StoredRelation::new("VB", vec![Dependency::new(1, 5), Dependency::new(5, 16)]),
//! );
//! store.insert_relation(RelationKey::new(1, 5), StoredRelation::leaf("direct"));
//! store.insert_relation(RelationKey::new(5, 16), StoredRelation::leaf("direct"));
//!
//! let explainer = Explainer::new(store);
//! let trace = explainer.explain(ClassId::new(1), ClassId::new(16), false).unwrap();
//! assert_eq!(trace, "1 -> 16    VB\n    1 -> 5    direct\n    5 -> 16    direct\n");
//! ```

pub mod class;
pub mod config;
pub mod error;
pub mod explain;
pub mod import;
pub mod logfile;
pub mod paths;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod trace;
