//! Tree export for rendering layers.
//!
//! The exported [`FamilyDocument`] is a nested view: descent is encoded only
//! by `children` arrays, with no parent back-references and none of the
//! internal bookkeeping (keys, source lines, spouse lists). Exporting never
//! modifies the forest, so its diagnostics stay available afterwards.

use crate::forest::{NodeId, ResolvedForest};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Version of the exported document shape.
pub const SCHEMA_VERSION: &str = "1.0";

/// The document handed to rendering collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDocument {
    pub schema_version: String,
    pub roots: Vec<PersonNode>,
}

/// One person in the nested view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonNode {
    pub id: String,
    pub name: String,
    /// ISO date or bare year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PersonNode>,
}

impl PersonNode {
    /// Number of people in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        let mut size = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            size += 1;
            pending.extend(&node.children);
        }
        size
    }
}

// Long lines of descent would otherwise be dropped one stack frame per
// generation.
impl Drop for PersonNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl FamilyDocument {
    /// Number of people in the whole document.
    pub fn person_count(&self) -> usize {
        self.roots.iter().map(PersonNode::subtree_size).sum()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Projects a [`ResolvedForest`] into a [`FamilyDocument`].
///
/// Every person appears exactly once:
/// - a child with two parents is nested under its first-listed parent;
/// - people only reachable through a cycle are appended as extra top-level
///   nodes after the roots;
/// - after a root fallback the view is flat, one childless node per person.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeExporter;

impl TreeExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export(&self, forest: &ResolvedForest) -> FamilyDocument {
        let roots = if forest.diagnostics.root_fallback_triggered {
            flat_view(forest)
        } else {
            nested_view(forest)
        };

        let document = FamilyDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            roots,
        };
        debug!(
            "exported {} top-level nodes, {} people",
            document.roots.len(),
            document.person_count()
        );
        document
    }
}

fn flat_view(forest: &ResolvedForest) -> Vec<PersonNode> {
    forest
        .root_indexes()
        .iter()
        .filter_map(|&idx| leaf(forest, idx))
        .collect()
}

fn nested_view(forest: &ResolvedForest) -> Vec<PersonNode> {
    let mut placed = vec![false; forest.len()];
    let mut roots = Vec::new();

    for &root in forest.root_indexes() {
        if !placed[root.index()] {
            roots.extend(expand(forest, root, &mut placed));
        }
    }

    let detached: Vec<NodeId> = forest
        .node_indexes()
        .filter(|idx| !placed[idx.index()])
        .collect();
    for idx in detached {
        if placed[idx.index()] {
            continue;
        }
        if let Some(person) = forest.person(idx) {
            warn!("{} is not reachable from any root; exporting it at top level", person.id);
        }
        roots.extend(expand(forest, idx, &mut placed));
    }

    roots
}

fn leaf(forest: &ResolvedForest, idx: NodeId) -> Option<PersonNode> {
    let person = forest.person(idx)?;
    Some(PersonNode {
        id: person.id.clone(),
        name: person.name.clone(),
        birth_date: person.birth_date.map(|d| d.to_string()),
        children: Vec::new(),
    })
}

/// Nests the subtree of `start` under first-listed parents.
///
/// Walks top-down with an explicit stack to decide placement, then assembles
/// the nodes bottom-up, so chain length does not grow the call stack.
fn expand(forest: &ResolvedForest, start: NodeId, placed: &mut [bool]) -> Option<PersonNode> {
    forest.person(start)?;
    placed[start.index()] = true;

    let mut order: Vec<NodeId> = Vec::new();
    let mut nested: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut pending = vec![start];

    while let Some(idx) = pending.pop() {
        order.push(idx);
        let Some(person) = forest.person(idx) else {
            continue;
        };

        let mut children = Vec::new();
        for child_idx in forest.indexes_of(&person.child_ids) {
            if placed[child_idx.index()] {
                continue;
            }
            let is_primary = forest
                .person(child_idx)
                .and_then(|child| child.primary_parent())
                .is_some_and(|parent| *parent == person.id);
            if is_primary {
                placed[child_idx.index()] = true;
                children.push(child_idx);
            }
        }

        pending.extend(children.iter().rev().copied());
        nested.insert(idx, children);
    }

    // Children come after their parent in `order`, so they are built first.
    let mut built: HashMap<NodeId, PersonNode> = HashMap::new();
    for idx in order.into_iter().rev() {
        let Some(mut node) = leaf(forest, idx) else {
            continue;
        };
        if let Some(children) = nested.remove(&idx) {
            node.children = children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
        }
        built.insert(idx, node);
    }

    built.remove(&start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::integrity::IntegrityChecker;
    use kinship_core::PersonRecord;

    fn export(rows: &[(&str, &str, &str)]) -> FamilyDocument {
        let records: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, (name, birth, parents))| {
                let birth = Some(birth.to_string()).filter(|b| !b.is_empty());
                PersonRecord::new(i + 2, *name, birth, *parents)
            })
            .collect();
        let forest = IntegrityChecker::new().check(GraphBuilder::new().build(&records));
        TreeExporter::new().export(&forest)
    }

    fn names(nodes: &[PersonNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_nested_export() {
        let document = export(&[("Alice", "1950", "-"), ("Bob", "1980", "Alice")]);

        assert_eq!(document.schema_version, "1.0");
        assert_eq!(names(&document.roots), vec!["Alice"]);
        assert_eq!(names(&document.roots[0].children), vec!["Bob"]);
        assert_eq!(document.roots[0].birth_date.as_deref(), Some("1950"));
    }

    #[test]
    fn test_json_shape() {
        let document = export(&[("Alice", "1950", "-"), ("Bob", "", "Alice")]);
        let json: serde_json::Value = serde_json::to_value(&document).unwrap();

        assert_eq!(json["schemaVersion"], "1.0");
        let alice = &json["roots"][0];
        assert_eq!(alice["id"], "alice");
        assert_eq!(alice["birthDate"], "1950");
        let bob = &alice["children"][0];
        assert_eq!(bob["name"], "Bob");
        assert!(bob.get("birthDate").is_none());
        assert!(bob.get("children").is_none());
        assert!(bob.get("parentIds").is_none());
        assert!(bob.get("key").is_none());
        assert!(bob.get("sourceLine").is_none());
    }

    #[test]
    fn test_child_with_two_parents_appears_once() {
        let document = export(&[
            ("Karen og Tomas", "", "-"),
            ("Emil", "", "Karen og Tomas"),
        ]);

        assert_eq!(names(&document.roots), vec!["Karen", "Tomas"]);
        assert_eq!(names(&document.roots[0].children), vec!["Emil"]);
        assert!(document.roots[1].children.is_empty());
        assert_eq!(document.person_count(), 3);
    }

    #[test]
    fn test_detached_cycle_is_still_exported() {
        let document = export(&[("Root", "", "-"), ("X", "", "Y"), ("Y", "", "X")]);

        assert_eq!(names(&document.roots), vec!["Root", "X"]);
        assert_eq!(names(&document.roots[1].children), vec!["Y"]);
        assert_eq!(document.person_count(), 3);
    }

    #[test]
    fn test_fallback_export_is_flat() {
        let document = export(&[("Anna", "", "Bo"), ("Bo", "", "Anna")]);

        assert_eq!(names(&document.roots), vec!["Anna", "Bo"]);
        assert!(document.roots.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_children_keep_order_when_nested() {
        let document = export(&[
            ("Ruth", "", "-"),
            ("Ejgil", "", "Ruth"),
            ("Alfred", "", "Ruth"),
            ("Lis", "", "Ejgil"),
        ]);

        let ruth = &document.roots[0];
        assert_eq!(names(&ruth.children), vec!["Ejgil", "Alfred"]);
        assert_eq!(names(&ruth.children[0].children), vec!["Lis"]);
        assert_eq!(ruth.subtree_size(), 4);
    }

    #[test]
    fn test_long_line_of_descent() {
        let generations = 50_000;
        let rows: Vec<(String, String)> = (0..generations)
            .map(|i| {
                let parent = if i == 0 { "-".to_string() } else { format!("P{}", i - 1) };
                (format!("P{}", i), parent)
            })
            .collect();
        let rows: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(name, parent)| (name.as_str(), "1900", parent.as_str()))
            .collect();

        let document = export(&rows);

        assert_eq!(document.roots.len(), 1);
        assert_eq!(document.person_count(), generations);
        let mut depth = 0;
        let mut node = &document.roots[0];
        while let Some(child) = node.children.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, generations - 1);
        assert_eq!(node.id, format!("p{}", generations - 1));
    }

    #[test]
    fn test_empty_forest_exports_no_roots() {
        let document = export(&[]);
        assert!(document.roots.is_empty());
        assert_eq!(
            serde_json::to_string(&document).unwrap(),
            r#"{"schemaVersion":"1.0","roots":[]}"#
        );
    }
}
