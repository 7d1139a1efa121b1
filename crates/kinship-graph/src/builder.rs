//! Graph builder for constructing the family forest from survey records.
//!
//! The builder materializes people from the roster, then turns the
//! resolver's parent links into edges in both directions.

use crate::forest::{NodeId, ResolvedForest};
use crate::person::Person;
use crate::resolver::{ParentResolver, Resolution};
use crate::roster::Roster;
use kinship_core::{PersonRecord, RowWarning, RowWarningKind};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds a [`ResolvedForest`] from parsed records.
///
/// The builder handles the two-pass process:
/// 1. Add one person per name (couple rows yield two spouses)
/// 2. Resolve parent names into parent/child links and pick the roots
///
/// The result has not been integrity-checked yet.
#[derive(Default)]
pub struct GraphBuilder {
    forest: ResolvedForest,
    /// Roster position → graph index.
    nodes: Vec<NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves parents and builds the forest in one go.
    pub fn build(self, records: &[PersonRecord]) -> ResolvedForest {
        let roster = Roster::from_records(records);
        let resolution = ParentResolver::new(&roster).resolve(records);
        self.build_resolved(records, &roster, resolution)
    }

    /// Builds the forest from an existing resolution of `roster`.
    pub fn build_resolved(
        mut self,
        records: &[PersonRecord],
        roster: &Roster,
        resolution: Resolution,
    ) -> ResolvedForest {
        self.add_people(records, roster);
        self.attach_parents(roster, &resolution);
        self.select_roots();

        let diagnostics = &mut self.forest.diagnostics;
        diagnostics.unmatched_references = resolution.unmatched;
        diagnostics.ambiguous_matches = resolution.ambiguous;
        diagnostics.self_references = resolution.self_references;
        diagnostics.row_warnings = unnamed_warnings(records, roster);

        debug!(
            "built forest: {} people, {} links, {} roots",
            self.forest.len(),
            self.forest.link_count(),
            self.forest.root_indexes().len()
        );

        self.forest
    }

    fn add_people(&mut self, records: &[PersonRecord], roster: &Roster) {
        for entry in roster.entries() {
            let birth_date = records.get(entry.record).and_then(PersonRecord::birth_date);
            let line = records.get(entry.record).map_or(0, |r| r.line);

            let person = Person::new(entry.id.clone(), entry.name.clone(), entry.key.clone(), line)
                .with_birth_date(birth_date);
            let index = self.forest.add_person(person);
            self.nodes.push(index);

            let spouses: Vec<_> = roster.partners_of(entry).map(|p| p.id.clone()).collect();
            if !spouses.is_empty() {
                self.forest.set_spouses(index, spouses);
            }
        }
    }

    /// Links children to parents in roster order, so every parent's
    /// `child_ids` follow the order children were encountered.
    fn attach_parents(&mut self, roster: &Roster, resolution: &Resolution) {
        let by_id: HashMap<&str, NodeId> = roster
            .entries()
            .iter()
            .zip(&self.nodes)
            .map(|(entry, &node)| (entry.id.as_str(), node))
            .collect();

        for (entry, &child) in roster.entries().iter().zip(&self.nodes) {
            for parent_id in resolution.parents_of(&entry.id) {
                if let Some(&parent) = by_id.get(parent_id.as_str()) {
                    self.forest.link_parent(parent, child);
                }
            }
        }
    }

    fn select_roots(&mut self) {
        let roots: Vec<NodeId> = self
            .forest
            .node_indexes()
            .filter(|&idx| self.forest.person(idx).is_some_and(Person::is_root))
            .collect();

        if roots.is_empty() && !self.forest.is_empty() {
            warn!(
                "no person without parents among {}; treating everyone as a root",
                self.forest.len()
            );
            self.forest.diagnostics.root_fallback_triggered = true;
            let everyone = self.forest.node_indexes().collect();
            self.forest.set_roots(everyone);
        } else {
            self.forest.set_roots(roots);
        }
    }
}

fn unnamed_warnings(records: &[PersonRecord], roster: &Roster) -> Vec<RowWarning> {
    roster
        .unnamed_records()
        .iter()
        .filter_map(|&idx| records.get(idx))
        .map(|record| RowWarning {
            line: record.line,
            kind: RowWarningKind::EmptyName,
        })
        .collect()
}
