//! Integrity checks over a built forest.
//!
//! The checker only reads edges; cycles are reported, never broken. Running
//! it twice yields the same report, because every finding is recomputed.

use crate::diagnostics::{ChronologyWarning, DuplicateNameGroup};
use crate::forest::{NodeId, ResolvedForest};
use crate::person::PersonId;
use petgraph::algo::{astar, kosaraju_scc};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Detects cycles, namesakes and impossible birth orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    /// Annotates the forest's diagnostics and hands the forest back.
    pub fn check(&self, mut forest: ResolvedForest) -> ResolvedForest {
        let mut cycles = find_cycles(&forest);
        cycles.extend(
            forest
                .diagnostics
                .self_references
                .iter()
                .map(|s| vec![s.person_id.clone()]),
        );

        let duplicates = find_duplicate_names(&forest);
        let chronology = find_chronology_warnings(&forest);

        if !cycles.is_empty() {
            warn!("{} cycles in family graph", cycles.len());
        }
        debug!(
            "integrity: {} cycles, {} duplicate names, {} chronology warnings",
            cycles.len(),
            duplicates.len(),
            chronology.len()
        );

        let diagnostics = &mut forest.diagnostics;
        diagnostics.cycles_detected = cycles;
        diagnostics.duplicate_name_groups = duplicates;
        diagnostics.chronology_warnings = chronology;
        forest
    }
}

/// Depth-first search along `child_ids` with an active path.
///
/// Roots are searched first, then any person not reached from a root, in
/// input order. A cycle whose members are still uncovered afterwards (it was
/// only reached through an already finished node) is completed through its
/// strongly connected component, so every person who is their own ancestor
/// appears in at least one reported cycle.
fn find_cycles(forest: &ResolvedForest) -> Vec<Vec<PersonId>> {
    let mut state = vec![Visit::New; forest.len()];
    let mut cycles: Vec<Vec<NodeId>> = Vec::new();

    let starts = forest
        .root_indexes()
        .iter()
        .copied()
        .chain(forest.node_indexes());

    for start in starts {
        if state[start.index()] == Visit::New {
            visit(forest, start, &mut state, &mut cycles);
        }
    }

    complete_from_components(forest, &mut cycles);

    cycles
        .into_iter()
        .map(|cycle| {
            cycle
                .into_iter()
                .filter_map(|idx| forest.person(idx).map(|p| p.id.clone()))
                .collect()
        })
        .collect()
}

/// A node on the active path and the position of its next unvisited child.
struct Frame {
    node: NodeId,
    children: Vec<NodeId>,
    next: usize,
}

impl Frame {
    fn enter(forest: &ResolvedForest, node: NodeId, state: &mut [Visit]) -> Self {
        state[node.index()] = Visit::Active;
        let children = forest
            .person(node)
            .map(|p| forest.indexes_of(&p.child_ids).collect())
            .unwrap_or_default();
        Self {
            node,
            children,
            next: 0,
        }
    }
}

/// Iterative DFS; the frame stack is the active path.
fn visit(
    forest: &ResolvedForest,
    start: NodeId,
    state: &mut [Visit],
    cycles: &mut Vec<Vec<NodeId>>,
) {
    let mut stack = vec![Frame::enter(forest, start, state)];

    while let Some(frame) = stack.last_mut() {
        let Some(&child) = frame.children.get(frame.next) else {
            state[frame.node.index()] = Visit::Done;
            stack.pop();
            continue;
        };
        frame.next += 1;

        match state[child.index()] {
            Visit::New => stack.push(Frame::enter(forest, child, state)),
            Visit::Active => {
                if let Some(begin) = stack.iter().position(|f| f.node == child) {
                    cycles.push(stack[begin..].iter().map(|f| f.node).collect());
                }
            }
            Visit::Done => {}
        }
    }
}

fn complete_from_components(forest: &ResolvedForest, cycles: &mut Vec<Vec<NodeId>>) {
    let mut covered: HashSet<NodeId> = cycles.iter().flatten().copied().collect();

    let mut components = kosaraju_scc(&forest.graph);
    for component in &mut components {
        component.sort();
    }
    components.sort();

    for component in components.into_iter().filter(|c| c.len() > 1) {
        let members: HashSet<NodeId> = component.iter().copied().collect();
        for &node in &component {
            if covered.contains(&node) {
                continue;
            }
            if let Some(cycle) = shortest_cycle_through(forest, node, &members) {
                covered.extend(cycle.iter().copied());
                cycles.push(cycle);
            }
        }
    }
}

/// Shortest descent path leaving `node` and returning to it.
fn shortest_cycle_through(
    forest: &ResolvedForest,
    node: NodeId,
    members: &HashSet<NodeId>,
) -> Option<Vec<NodeId>> {
    let person = forest.person(node)?;

    forest
        .indexes_of(&person.child_ids)
        .filter(|child| members.contains(child))
        .filter_map(|child| {
            astar(&forest.graph, child, |n| n == node, |_| 1usize, |_| 0)
        })
        .min_by_key(|(cost, _)| *cost)
        .map(|(_, path)| {
            let mut cycle = vec![node];
            cycle.extend(path.into_iter().filter(|&n| n != node));
            cycle
        })
}

fn find_duplicate_names(forest: &ResolvedForest) -> Vec<DuplicateNameGroup> {
    forest
        .name_groups()
        .into_iter()
        .filter(|(_, nodes)| nodes.len() > 1)
        .map(|(key, nodes)| DuplicateNameGroup {
            key: key.clone(),
            person_ids: nodes
                .iter()
                .filter_map(|&idx| forest.person(idx).map(|p| p.id.clone()))
                .collect(),
        })
        .collect()
}

fn find_chronology_warnings(forest: &ResolvedForest) -> Vec<ChronologyWarning> {
    let mut warnings = Vec::new();

    for child in forest.people() {
        let Some(child_year) = child.birth_year() else {
            continue;
        };
        for parent_id in &child.parent_ids {
            let Some(parent_year) = forest.get(parent_id).and_then(|p| p.birth_year()) else {
                continue;
            };
            if child_year < parent_year {
                warnings.push(ChronologyWarning {
                    child_id: child.id.clone(),
                    parent_id: parent_id.clone(),
                    child_birth_year: child_year,
                    parent_birth_year: parent_year,
                });
            }
        }
    }

    warnings
}
