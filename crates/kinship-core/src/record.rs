//! Typed survey rows.

use crate::date::BirthDate;
use crate::normalize::{parent_candidates, split_multi_name};
use serde::Serialize;
use std::fmt;

/// One data row of the survey, as typed text.
///
/// A record may describe a couple ("Karen og Tomas"); it is still one record.
/// Splitting it into people is the graph builder's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    /// 1-based line number in the source document.
    pub line: usize,
    pub raw_name: String,
    /// `None` when the field was empty or `-`.
    pub raw_birth: Option<String>,
    pub raw_parents: String,
}

impl PersonRecord {
    pub fn new(
        line: usize,
        raw_name: impl Into<String>,
        raw_birth: Option<String>,
        raw_parents: impl Into<String>,
    ) -> Self {
        Self {
            line,
            raw_name: raw_name.into(),
            raw_birth,
            raw_parents: raw_parents.into(),
        }
    }

    /// The people this row describes (one, or two for a couple).
    pub fn names(&self) -> Vec<String> {
        split_multi_name(&self.raw_name)
    }

    /// Parent names in the order they were listed.
    pub fn parent_names(&self) -> Vec<String> {
        parent_candidates(&self.raw_parents)
    }

    pub fn birth_date(&self) -> Option<BirthDate> {
        self.raw_birth.as_deref().and_then(BirthDate::parse)
    }
}

/// Why a row was skipped or partially read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarningKind {
    /// The row ends before one of the required columns.
    TooFewFields { expected: usize, found: usize },
    /// The name column is empty; the row is skipped.
    EmptyName,
    /// The birth field could not be read as a date; the row is kept without one.
    UnparsedBirthDate { raw: String },
}

/// A recovered, row-level parsing problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub line: usize,
    #[serde(flatten)]
    pub kind: RowWarningKind,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RowWarningKind::TooFewFields { expected, found } => write!(
                f,
                "line {}: expected at least {} fields, found {}",
                self.line, expected, found
            ),
            RowWarningKind::EmptyName => write!(f, "line {}: empty name", self.line),
            RowWarningKind::UnparsedBirthDate { raw } => {
                write!(f, "line {}: unrecognized birth date \"{}\"", self.line, raw)
            }
        }
    }
}
