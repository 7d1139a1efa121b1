//! Error types for survey parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The three columns a survey export must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    Name,
    Birth,
    Parents,
}

impl fmt::Display for ColumnField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Birth => "birth",
            Self::Parents => "parents",
        };
        write!(f, "{}", s)
    }
}

/// Errors that stop a CSV document from being parsed at all.
///
/// Row-level problems are not errors; they are reported as
/// [`RowWarning`](crate::RowWarning)s and the row is skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No header column contains the configured marker.
    #[error("no {field} column found: header has no column containing \"{marker}\"")]
    HeaderNotFound { field: ColumnField, marker: String },
}

impl ParseError {
    pub fn header_not_found(field: ColumnField, marker: impl Into<String>) -> Self {
        Self::HeaderNotFound {
            field,
            marker: marker.into(),
        }
    }
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
