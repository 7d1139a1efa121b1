//! Parent reference resolution.
//!
//! Turns each person's free-text parents field into links to roster
//! entries. Resolution is deterministic: every ambiguous case has exactly
//! one policy and leaves a diagnostic behind.
//!
//! | listed parent                | outcome                                  |
//! |------------------------------|------------------------------------------|
//! | third or later in the list   | `UnmatchedReference` (`excess_parent`)   |
//! | same name as the child       | `SelfReference`, no link                 |
//! | no roster match              | `UnmatchedReference` (`not_found`)       |
//! | exactly one match            | link                                     |
//! | several matches (namesakes)  | link the first in input order, `AmbiguousMatch` |

use crate::diagnostics::{AmbiguousMatch, SelfReference, UnmatchedReason, UnmatchedReference};
use crate::person::{PersonId, MAX_PARENTS};
use crate::roster::{Roster, RosterEntry};
use kinship_core::{normalize, PersonRecord};
use std::collections::HashMap;
use tracing::debug;

/// Output of parent resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Child id → resolved parent ids, in listed order, at most two.
    /// Children without any resolved parent have no entry.
    pub parent_links: HashMap<PersonId, Vec<PersonId>>,
    pub unmatched: Vec<UnmatchedReference>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub self_references: Vec<SelfReference>,
}

impl Resolution {
    pub fn parents_of(&self, child: &str) -> &[PersonId] {
        self.parent_links
            .get(child)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Resolves parent names against a [`Roster`].
pub struct ParentResolver<'a> {
    roster: &'a Roster,
}

impl<'a> ParentResolver<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    /// Resolves the parents field of every roster entry.
    ///
    /// `records` must be the slice the roster was built from. Couple members
    /// share their record's parents field and are resolved independently.
    pub fn resolve(&self, records: &[PersonRecord]) -> Resolution {
        let mut resolution = Resolution::default();

        for entry in self.roster.entries() {
            let Some(record) = records.get(entry.record) else {
                continue;
            };

            let links = self.resolve_entry(entry, record, &mut resolution);
            if !links.is_empty() {
                resolution.parent_links.insert(entry.id.clone(), links);
            }
        }

        debug!(
            "resolved {} children ({} unmatched, {} ambiguous, {} self references)",
            resolution.parent_links.len(),
            resolution.unmatched.len(),
            resolution.ambiguous.len(),
            resolution.self_references.len()
        );

        resolution
    }

    fn resolve_entry(
        &self,
        entry: &RosterEntry,
        record: &PersonRecord,
        resolution: &mut Resolution,
    ) -> Vec<PersonId> {
        let mut links: Vec<PersonId> = Vec::with_capacity(MAX_PARENTS);

        for (position, raw) in record.parent_names().into_iter().enumerate() {
            if position >= MAX_PARENTS {
                resolution.unmatched.push(UnmatchedReference {
                    child_id: entry.id.clone(),
                    raw_parent_text: raw,
                    reason: UnmatchedReason::ExcessParent,
                });
                continue;
            }

            let key = normalize(&raw);
            if key == entry.key {
                debug!("{} lists itself as a parent", entry.id);
                resolution.self_references.push(SelfReference {
                    person_id: entry.id.clone(),
                    raw_parent_text: raw,
                });
                continue;
            }

            let matches = self.roster.lookup(&key);
            let chosen = match matches.as_slice() {
                [] => {
                    resolution.unmatched.push(UnmatchedReference {
                        child_id: entry.id.clone(),
                        raw_parent_text: raw,
                        reason: UnmatchedReason::NotFound,
                    });
                    continue;
                }
                [only] => only.id.clone(),
                [first, ..] => {
                    resolution.ambiguous.push(AmbiguousMatch {
                        child_id: entry.id.clone(),
                        raw_parent_text: raw,
                        chosen_id: first.id.clone(),
                        candidate_ids: matches.iter().map(|m| m.id.clone()).collect(),
                    });
                    first.id.clone()
                }
            };

            if !links.contains(&chosen) {
                links.push(chosen);
            }
        }

        links
    }
}
