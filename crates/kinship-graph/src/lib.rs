//! Kinship Graph - Family relationship resolution
//!
//! This crate turns parsed survey records into a family forest. It resolves
//! free-text parent names to people, wires parent, child and spouse links,
//! checks the result for anomalies and exports the nested tree consumed by
//! rendering layers.
//!
//! # Architecture
//!
//! ```text
//! PersonRecord[] ─► Roster ─► ParentResolver ─► GraphBuilder ─► IntegrityChecker ─► TreeExporter
//!                   (ids,      (parent links,     (ResolvedForest)  (cycles, namesakes)  (FamilyDocument)
//!                   name index) unmatched refs)
//! ```
//!
//! The forest keeps a petgraph `DiGraph` of parent → child edges with
//! indexes for id and name lookups.
//!
//! # Example
//!
//! ```
//! use kinship_core::ColumnMarkers;
//! use kinship_graph::{resolve_csv, TreeExporter};
//!
//! let csv = "Who are you,When were you born,Who are your parents\n\
//!            Alice,1950,-\n\
//!            Bob,1980,Alice og Erik\n";
//!
//! let forest = resolve_csv(csv, &ColumnMarkers::default()).unwrap();
//! assert_eq!(forest.diagnostics.unmatched_references.len(), 1);
//!
//! let document = TreeExporter::new().export(&forest);
//! assert_eq!(document.roots[0].children[0].name, "Bob");
//! ```

mod builder;
mod diagnostics;
mod export;
mod forest;
mod integrity;
mod person;
mod pipeline;
mod query;
mod resolver;
mod roster;

pub use builder::GraphBuilder;
pub use diagnostics::{
    AmbiguousMatch, ChronologyWarning, Diagnostics, DuplicateNameGroup, SelfReference,
    UnmatchedReason, UnmatchedReference,
};
pub use export::{FamilyDocument, PersonNode, TreeExporter, SCHEMA_VERSION};
pub use forest::{ForestStats, NodeId, ResolvedForest};
pub use integrity::IntegrityChecker;
pub use person::{Person, PersonId, MAX_PARENTS};
pub use pipeline::{csv_to_document, resolve_csv, resolve_rows};
pub use query::{QueryError, QueryResult};
pub use resolver::{ParentResolver, Resolution};
pub use roster::{Roster, RosterEntry};
