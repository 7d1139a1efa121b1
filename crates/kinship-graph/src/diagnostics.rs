//! Diagnostics report.
//!
//! Messy survey data never aborts resolution. Every anomaly the pipeline
//! recovers from ends up here so that callers can show it to people who can
//! fix the source data.

use crate::person::PersonId;
use kinship_core::{NameKey, RowWarning};
use serde::{Serialize, Serializer};
use std::fmt;

/// Why a listed parent produced no link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// Nobody in the survey has this name.
    NotFound,
    /// Listed after the second parent; never linked, even when it resolves.
    ExcessParent,
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::ExcessParent => "more than two parents listed",
        };
        write!(f, "{}", s)
    }
}

/// A listed parent that did not become a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedReference {
    pub child_id: PersonId,
    pub raw_parent_text: String,
    pub reason: UnmatchedReason,
}

/// A parent name that matched several people.
///
/// The first person in input order was linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousMatch {
    pub child_id: PersonId,
    pub raw_parent_text: String,
    pub chosen_id: PersonId,
    pub candidate_ids: Vec<PersonId>,
}

/// A person listed as their own parent. No link is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfReference {
    pub person_id: PersonId,
    pub raw_parent_text: String,
}

/// People sharing one normalized name.
///
/// Serializes as the bare id list; the key is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateNameGroup {
    pub key: NameKey,
    pub person_ids: Vec<PersonId>,
}

impl Serialize for DuplicateNameGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.person_ids)
    }
}

/// A child recorded as born before one of its parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronologyWarning {
    pub child_id: PersonId,
    pub parent_id: PersonId,
    pub child_birth_year: i32,
    pub parent_birth_year: i32,
}

/// Everything the pipeline recovered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub unmatched_references: Vec<UnmatchedReference>,
    /// Each cycle as the path of ids from its first member back to the revisit.
    pub cycles_detected: Vec<Vec<PersonId>>,
    pub duplicate_name_groups: Vec<DuplicateNameGroup>,
    /// Set when nobody was a root and every person was promoted to one.
    pub root_fallback_triggered: bool,
    pub ambiguous_matches: Vec<AmbiguousMatch>,
    pub self_references: Vec<SelfReference>,
    pub chronology_warnings: Vec<ChronologyWarning>,
    pub row_warnings: Vec<RowWarning>,
}

impl Diagnostics {
    /// Total number of reported anomalies.
    pub fn anomaly_count(&self) -> usize {
        self.unmatched_references.len()
            + self.cycles_detected.len()
            + self.duplicate_name_groups.len()
            + usize::from(self.root_fallback_triggered)
            + self.ambiguous_matches.len()
            + self.self_references.len()
            + self.chronology_warnings.len()
            + self.row_warnings.len()
    }

    pub fn is_clean(&self) -> bool {
        self.anomaly_count() == 0
    }

    /// Returns a one-line summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} anomalies (unmatched: {}, ambiguous: {}, duplicates: {}, cycles: {}, row warnings: {})",
            self.anomaly_count(),
            self.unmatched_references.len(),
            self.ambiguous_matches.len(),
            self.duplicate_name_groups.len(),
            self.cycles_detected.len(),
            self.row_warnings.len()
        )
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagnostics_are_clean() {
        let diagnostics = Diagnostics::default();
        assert!(diagnostics.is_clean());
        assert!(!diagnostics.root_fallback_triggered);
    }

    #[test]
    fn test_anomaly_count_includes_fallback() {
        let diagnostics = Diagnostics {
            root_fallback_triggered: true,
            cycles_detected: vec![vec!["a".into(), "b".into()]],
            ..Default::default()
        };
        assert_eq!(diagnostics.anomaly_count(), 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let diagnostics = Diagnostics {
            unmatched_references: vec![UnmatchedReference {
                child_id: "bob".into(),
                raw_parent_text: "Erik".into(),
                reason: UnmatchedReason::NotFound,
            }],
            ..Default::default()
        };

        let json: serde_json::Value = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["rootFallbackTriggered"], false);
        assert_eq!(json["unmatchedReferences"][0]["childId"], "bob");
        assert_eq!(json["unmatchedReferences"][0]["rawParentText"], "Erik");
        assert_eq!(json["unmatchedReferences"][0]["reason"], "not_found");
    }

    #[test]
    fn test_duplicate_groups_serialize_as_id_lists() {
        let diagnostics = Diagnostics {
            duplicate_name_groups: vec![DuplicateNameGroup {
                key: kinship_core::normalize("Jens"),
                person_ids: vec!["jens".into(), "jens-2".into()],
            }],
            ..Default::default()
        };

        let json: serde_json::Value = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(
            json["duplicateNameGroups"],
            serde_json::json!([["jens", "jens-2"]])
        );
    }
}
