//! Kinship Core - Survey ingestion for family trees
//!
//! This crate turns loosely structured survey CSV exports into typed
//! [`PersonRecord`] values. It knows nothing about graphs; resolving
//! parents and building the family forest lives in `kinship-graph`.
//!
//! # Pipeline position
//!
//! ```text
//! CSV text ──► RowParser ──► PersonRecord[] ──► (kinship-graph)
//!                  ▲
//!            ColumnMarkers
//! ```
//!
//! The name normalizer in [`normalize`] is shared by both crates: every
//! name comparison in the system goes through [`normalize()`].
//!
//! # Example
//!
//! ```
//! use kinship_core::{ColumnMarkers, RowParser};
//!
//! let csv = "Who are you,When were you born,Who are your parents\n\
//!            Alice,1950,-\n\
//!            Bob,1980,Alice\n";
//!
//! let parsed = RowParser::new(ColumnMarkers::default()).parse(csv).unwrap();
//! assert_eq!(parsed.records.len(), 2);
//! assert_eq!(parsed.records[1].raw_parents, "Alice");
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod record;

pub use config::{ColumnMarkers, ConfigError, KinshipConfig};
pub use date::{BirthDate, InvalidBirthDate};
pub use error::{ColumnField, ParseError, Result};
pub use normalize::{normalize, parent_candidates, person_id_slug, split_multi_name, NameKey};
pub use parser::{ColumnLayout, ParsedRows, RowParser};
pub use record::{PersonRecord, RowWarning, RowWarningKind};
