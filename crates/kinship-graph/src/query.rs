//! Relationship queries over a resolved forest.
//!
//! All traversals are cycle-safe: a person is visited at most once, so a
//! forest with reported cycles can still be queried.

use crate::forest::{NodeId, ResolvedForest};
use crate::person::Person;
use kinship_core::normalize;
use petgraph::visit::{Bfs, Reversed};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("no person with id \"{0}\"")]
    UnknownPerson(String),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

impl ResolvedForest {
    fn require(&self, id: &str) -> QueryResult<NodeId> {
        self.get_index(id)
            .ok_or_else(|| QueryError::UnknownPerson(id.to_string()))
    }

    fn lookup_all<'a>(&'a self, ids: &'a [String]) -> Vec<&'a Person> {
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Resolved parents, in listed order.
    pub fn parents(&self, id: &str) -> QueryResult<Vec<&Person>> {
        let index = self.require(id)?;
        Ok(self
            .person(index)
            .map(|p| self.lookup_all(&p.parent_ids))
            .unwrap_or_default())
    }

    /// Children, in resolution order.
    pub fn children(&self, id: &str) -> QueryResult<Vec<&Person>> {
        let index = self.require(id)?;
        Ok(self
            .person(index)
            .map(|p| self.lookup_all(&p.child_ids))
            .unwrap_or_default())
    }

    pub fn spouses(&self, id: &str) -> QueryResult<Vec<&Person>> {
        let index = self.require(id)?;
        Ok(self
            .person(index)
            .map(|p| self.lookup_all(&p.spouse_ids))
            .unwrap_or_default())
    }

    /// People sharing at least one resolved parent, in input order.
    pub fn siblings(&self, id: &str) -> QueryResult<Vec<&Person>> {
        let index = self.require(id)?;
        let Some(person) = self.person(index) else {
            return Ok(Vec::new());
        };

        let sibling_ids: HashSet<&str> = self
            .lookup_all(&person.parent_ids)
            .into_iter()
            .flat_map(|parent| parent.child_ids.iter().map(String::as_str))
            .filter(|sibling| *sibling != person.id)
            .collect();

        Ok(self
            .people()
            .filter(|p| sibling_ids.contains(p.id.as_str()))
            .collect())
    }

    /// Everyone above the person, nearest generation first.
    pub fn ancestors(&self, id: &str) -> QueryResult<Vec<&Person>> {
        let start = self.require(id)?;
        let mut bfs = Bfs::new(Reversed(&self.graph), start);
        let mut found = Vec::new();
        while let Some(idx) = bfs.next(Reversed(&self.graph)) {
            if idx != start {
                found.extend(self.person(idx));
            }
        }
        Ok(found)
    }

    /// Everyone below the person, nearest generation first.
    pub fn descendants(&self, id: &str) -> QueryResult<Vec<&Person>> {
        let start = self.require(id)?;
        let mut bfs = Bfs::new(&self.graph, start);
        let mut found = Vec::new();
        while let Some(idx) = bfs.next(&self.graph) {
            if idx != start {
                found.extend(self.person(idx));
            }
        }
        Ok(found)
    }

    /// Generation of `id` relative to `relative_to`: 0 for the same
    /// generation, -1 for parents, +1 for children, and so on.
    ///
    /// Returns `None` when the two are not connected through parent/child
    /// links. Uses the shortest connection, so in-law and cousin routes
    /// count the generations they actually cross.
    pub fn generation_of(&self, id: &str, relative_to: &str) -> QueryResult<Option<i32>> {
        let target = self.require(id)?;
        let origin = self.require(relative_to)?;

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, i32)> = VecDeque::from([(origin, 0)]);

        while let Some((current, level)) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if current == target {
                return Ok(Some(level));
            }
            let Some(person) = self.person(current) else {
                continue;
            };
            for parent in self.indexes_of(&person.parent_ids) {
                queue.push_back((parent, level - 1));
            }
            for child in self.indexes_of(&person.child_ids) {
                queue.push_back((child, level + 1));
            }
        }

        Ok(None)
    }

    /// The shortest line of descent from `ancestor` down to `descendant`,
    /// both included. `None` when `descendant` does not descend from
    /// `ancestor`.
    pub fn lineage(&self, ancestor: &str, descendant: &str) -> QueryResult<Option<Vec<&Person>>> {
        let from = self.require(ancestor)?;
        let to = self.require(descendant)?;

        let path = petgraph::algo::astar(
            &self.graph,
            from,
            |finish| finish == to,
            |_| 1, // weight of 1 for all edges (BFS-like)
            |_| 0,
        );

        Ok(path.map(|(_, indices)| {
            indices
                .into_iter()
                .filter_map(|idx| self.person(idx))
                .collect()
        }))
    }

    /// Everyone whose name shares the normalized form of `name`.
    pub fn find_by_name(&self, name: &str) -> Vec<&Person> {
        self.find_by_key(&normalize(name))
    }

    /// Case-insensitive substring search over names.
    pub fn search(&self, query: &str) -> Vec<&Person> {
        let query_lower = query.to_lowercase();
        self.people()
            .filter(|person| person.name.to_lowercase().contains(&query_lower))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use kinship_core::PersonRecord;

    /// Niels Peter og Dorthea
    /// ├── Karen og Tomas
    /// │   ├── Emil
    /// │   └── Simon
    /// └── Bodil og Carl
    ///     └── Mads
    ///         └── Iben
    fn family() -> ResolvedForest {
        let rows = [
            ("Niels Peter og Dorthea", "-"),
            ("Karen og Tomas", "Niels Peter og Dorthea"),
            ("Bodil og Carl", "Niels Peter og Dorthea"),
            ("Emil", "Karen og Tomas"),
            ("Simon", "Karen og Tomas"),
            ("Mads", "Bodil og Carl"),
            ("Iben", "Mads"),
        ];
        let records: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, (name, parents))| PersonRecord::new(i + 2, *name, None, *parents))
            .collect();
        GraphBuilder::new().build(&records)
    }

    fn ids(people: Vec<&Person>) -> Vec<&str> {
        people.into_iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_parents_children_spouses() {
        let forest = family();

        assert_eq!(ids(forest.parents("emil").unwrap()), vec!["karen", "tomas"]);
        assert_eq!(ids(forest.children("karen").unwrap()), vec!["emil", "simon"]);
        assert_eq!(ids(forest.spouses("bodil").unwrap()), vec!["carl"]);
    }

    #[test]
    fn test_siblings_share_a_parent() {
        let forest = family();
        assert_eq!(ids(forest.siblings("emil").unwrap()), vec!["simon"]);
        // Karen and Tomas share the parents listed on their couple row.
        assert_eq!(
            ids(forest.siblings("karen").unwrap()),
            vec!["tomas", "bodil", "carl"]
        );
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let forest = family();

        let ancestors = ids(forest.ancestors("iben").unwrap());
        assert_eq!(ancestors[0], "mads");
        assert!(ancestors.contains(&"niels-peter"));
        assert!(ancestors.contains(&"dorthea"));
        assert!(!ancestors.contains(&"iben"));

        let descendants = ids(forest.descendants("bodil").unwrap());
        assert_eq!(descendants, vec!["mads", "iben"]);
    }

    #[test]
    fn test_generation_levels() {
        let forest = family();

        assert_eq!(forest.generation_of("iben", "niels-peter").unwrap(), Some(3));
        assert_eq!(forest.generation_of("niels-peter", "iben").unwrap(), Some(-3));
        assert_eq!(forest.generation_of("emil", "mads").unwrap(), Some(0));
        assert_eq!(forest.generation_of("emil", "emil").unwrap(), Some(0));
    }

    #[test]
    fn test_lineage() {
        let forest = family();

        let line = ids(forest.lineage("dorthea", "iben").unwrap().unwrap());
        // Via Bodil or Carl; both are three steps.
        assert_eq!(line.len(), 4);
        assert_eq!(line[0], "dorthea");
        assert_eq!(line[2], "mads");
        assert_eq!(line[3], "iben");

        let direct = ids(forest.lineage("mads", "iben").unwrap().unwrap());
        assert_eq!(direct, vec!["mads", "iben"]);
        assert!(forest.lineage("iben", "dorthea").unwrap().is_none());
    }

    #[test]
    fn test_unknown_person_is_an_error() {
        let forest = family();
        assert_eq!(
            forest.parents("nobody").unwrap_err(),
            QueryError::UnknownPerson("nobody".to_string())
        );
    }

    #[test]
    fn test_search_and_find_by_name() {
        let forest = family();

        assert_eq!(ids(forest.search("PETER")), vec!["niels-peter"]);
        assert_eq!(ids(forest.find_by_name("  niels   peter ")), vec!["niels-peter"]);
    }

    #[test]
    fn test_queries_survive_cycles() {
        let records = vec![
            PersonRecord::new(2, "A", None, "B"),
            PersonRecord::new(3, "B", None, "A"),
        ];
        let forest = GraphBuilder::new().build(&records);

        assert_eq!(ids(forest.descendants("a").unwrap()), vec!["b"]);
        assert_eq!(ids(forest.ancestors("a").unwrap()), vec!["b"]);
    }
}
