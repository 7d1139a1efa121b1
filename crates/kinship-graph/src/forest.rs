//! Core forest data structure.
//!
//! `ResolvedForest` wraps a petgraph `DiGraph` whose edges point from parent
//! to child, and keeps indexes for id and name lookups. The explicit
//! `parent_ids` / `child_ids` lists on each [`Person`] are the ordered view;
//! the graph edges mirror them for traversals.

use crate::diagnostics::Diagnostics;
use crate::person::{Person, PersonId};
use kinship_core::NameKey;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;

/// Index of a person inside the forest graph.
pub type NodeId = NodeIndex;

/// The resolved family forest plus its diagnostics report.
#[derive(Debug, Clone, Default)]
pub struct ResolvedForest {
    /// Parent → child descent edges.
    pub(crate) graph: DiGraph<Person, ()>,

    /// Maps person ids to graph node indexes.
    id_index: HashMap<PersonId, NodeId>,

    /// Maps normalized names to every person sharing them, in input order.
    name_index: HashMap<NameKey, Vec<NodeId>>,

    /// Root people in input order.
    roots: Vec<NodeId>,

    pub diagnostics: Diagnostics,
}

impl ResolvedForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a person. Ids must be unique; the roster guarantees that.
    pub(crate) fn add_person(&mut self, person: Person) -> NodeId {
        let id = person.id.clone();
        let key = person.key.clone();

        let index = self.graph.add_node(person);

        self.id_index.insert(id, index);
        self.name_index.entry(key).or_default().push(index);

        index
    }

    /// Records `parent` as a parent of `child`.
    ///
    /// Both sides are deduplicated by id, so linking twice is a no-op.
    pub(crate) fn link_parent(&mut self, parent: NodeId, child: NodeId) {
        let parent_id = self.graph[parent].id.clone();
        let child_id = self.graph[child].id.clone();

        let child_person = &mut self.graph[child];
        if !child_person.parent_ids.contains(&parent_id) {
            child_person.parent_ids.push(parent_id);
        }

        let parent_person = &mut self.graph[parent];
        if !parent_person.child_ids.contains(&child_id) {
            parent_person.child_ids.push(child_id);
            self.graph.add_edge(parent, child, ());
        }
    }

    pub(crate) fn set_spouses(&mut self, index: NodeId, spouse_ids: Vec<PersonId>) {
        self.graph[index].spouse_ids = spouse_ids;
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<NodeId>) {
        self.roots = roots;
    }

    /// Gets a person by id.
    pub fn get(&self, id: &str) -> Option<&Person> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a person by graph index.
    pub fn person(&self, index: NodeId) -> Option<&Person> {
        self.graph.node_weight(index)
    }

    /// Gets the graph index for an id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Everyone sharing a normalized name, in input order.
    pub fn find_by_key(&self, key: &NameKey) -> Vec<&Person> {
        self.name_index
            .get(key)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Name groups in order of first appearance.
    pub(crate) fn name_groups(&self) -> Vec<(&NameKey, &[NodeId])> {
        let mut groups: Vec<(&NameKey, &[NodeId])> = self
            .name_index
            .iter()
            .map(|(key, nodes)| (key, nodes.as_slice()))
            .collect();
        groups.sort_by_key(|(_, nodes)| nodes.first().copied());
        groups
    }

    /// Root people in input order.
    pub fn roots(&self) -> impl Iterator<Item = &Person> {
        self.roots.iter().filter_map(|idx| self.graph.node_weight(*idx))
    }

    pub fn root_indexes(&self) -> &[NodeId] {
        &self.roots
    }

    /// Iterates over all people in input order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.graph.node_weights()
    }

    /// Iterates over all node indexes in input order.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Resolves a list of ids to graph indexes, skipping unknown ids.
    pub(crate) fn indexes_of<'a>(
        &'a self,
        ids: &'a [PersonId],
    ) -> impl Iterator<Item = NodeId> + 'a {
        ids.iter().filter_map(|id| self.get_index(id))
    }

    /// Number of people.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of parent → child links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns forest statistics.
    pub fn stats(&self) -> ForestStats {
        let couples = self
            .people()
            .map(|p| p.spouse_ids.len())
            .sum::<usize>()
            / 2;

        ForestStats {
            people: self.len(),
            roots: self.roots.len(),
            parent_links: self.link_count(),
            couples,
            anomalies: self.diagnostics.anomaly_count(),
        }
    }
}

impl PartialEq for ResolvedForest {
    fn eq(&self, other: &Self) -> bool {
        self.roots == other.roots
            && self.diagnostics == other.diagnostics
            && self.people().eq(other.people())
    }
}

/// Forest statistics for the `stats` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestStats {
    pub people: usize,
    pub roots: usize,
    pub parent_links: usize,
    pub couples: usize,
    pub anomalies: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::normalize;

    fn person(id: &str) -> Person {
        Person::new(id, id, normalize(id), 0)
    }

    #[test]
    fn test_link_parent_is_deduplicated() {
        let mut forest = ResolvedForest::new();
        let alice = forest.add_person(person("alice"));
        let bob = forest.add_person(person("bob"));

        forest.link_parent(alice, bob);
        forest.link_parent(alice, bob);

        assert_eq!(forest.link_count(), 1);
        assert_eq!(forest.get("alice").unwrap().child_ids, vec!["bob"]);
        assert_eq!(forest.get("bob").unwrap().parent_ids, vec!["alice"]);
    }

    #[test]
    fn test_find_by_key_returns_all_namesakes() {
        let mut forest = ResolvedForest::new();
        forest.add_person(Person::new("jens", "Jens", normalize("Jens"), 2));
        forest.add_person(Person::new("jens-2", "Jens", normalize("Jens"), 3));

        let found = forest.find_by_key(&normalize("JENS"));
        let ids: Vec<_> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["jens", "jens-2"]);
    }

    #[test]
    fn test_name_groups_follow_input_order() {
        let mut forest = ResolvedForest::new();
        for name in ["Bo", "Anna", "Bo"] {
            let id = format!("{}-{}", name, forest.len());
            forest.add_person(Person::new(id, name, normalize(name), 0));
        }

        let groups = forest.name_groups();
        let keys: Vec<_> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["bo", "anna"]);
        assert_eq!(groups[0].1.len(), 2);
    }
}
