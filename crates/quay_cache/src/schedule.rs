//! Topological scheduling of a target set.
//!
//! [`topological_levels`] partitions targets into levels such that every
//! target's dependencies sit in earlier levels. Targets within a level are
//! independent and can be hashed concurrently.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use quay_graph::{Graph, TargetId};

use crate::error::CacheError;

/// Orders targets by name, then by owning project path.
pub fn target_order(graph: &Graph, a: TargetId, b: TargetId) -> Ordering {
    graph
        .target(a)
        .name
        .cmp(&graph.target(b).name)
        .then_with(|| graph.project_of(a).path.cmp(&graph.project_of(b).path))
}

/// Partitions `scope` into dependency levels using Kahn's algorithm.
///
/// `scope` must be closed under dependencies. Each level is sorted with
/// [`target_order`]. If the targets contain a cycle, returns
/// [`CacheError::CyclicDependency`] naming a target on it.
pub fn topological_levels(
    graph: &Graph,
    scope: &BTreeSet<TargetId>,
) -> Result<Vec<Vec<TargetId>>, CacheError> {
    let mut indegree = BTreeMap::<TargetId, usize>::new();
    let mut dependents = BTreeMap::<TargetId, Vec<TargetId>>::new();
    for &id in scope {
        indegree.entry(id).or_insert(0);
        for &dep in graph.dependencies(id).iter().filter(|d| scope.contains(d)) {
            *indegree.entry(id).or_insert(0) += 1;
            dependents.entry(dep).or_default().push(id);
        }
    }

    let mut ready: Vec<TargetId> = indegree
        .iter()
        .filter_map(|(&id, &deg)| (deg == 0).then_some(id))
        .collect();
    let mut levels = Vec::new();
    let mut scheduled = 0usize;

    while !ready.is_empty() {
        ready.sort_by(|a, b| target_order(graph, *a, *b));
        let mut next = Vec::new();
        for id in &ready {
            for dependent in dependents.get(id).map(Vec::as_slice).unwrap_or_default() {
                if let Some(deg) = indegree.get_mut(dependent) {
                    *deg -= 1;
                    if *deg == 0 {
                        next.push(*dependent);
                    }
                }
            }
        }
        scheduled += ready.len();
        levels.push(std::mem::replace(&mut ready, next));
    }

    if scheduled != scope.len() {
        let unresolved: BTreeSet<TargetId> = indegree
            .into_iter()
            .filter_map(|(id, deg)| (deg > 0).then_some(id))
            .collect();
        return Err(cycle_error(graph, &unresolved));
    }
    Ok(levels)
}

/// Builds the error for a stalled schedule.
///
/// Runs Tarjan's SCC over the unresolved targets and reports the smallest
/// target (by [`target_order`]) that lies on a cycle.
fn cycle_error(graph: &Graph, unresolved: &BTreeSet<TargetId>) -> CacheError {
    let mut digraph = DiGraph::<TargetId, ()>::new();
    let nodes: HashMap<TargetId, NodeIndex> = unresolved
        .iter()
        .map(|&id| (id, digraph.add_node(id)))
        .collect();
    for (&id, &node) in &nodes {
        for dep in graph.dependencies(id) {
            if let Some(&dep_node) = nodes.get(dep) {
                digraph.add_edge(node, dep_node, ());
            }
        }
    }

    // Kahn stalls only when the unresolved set holds a cycle.
    let Some(start) = tarjan_scc(&digraph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || digraph.contains_edge(scc[0], scc[0]))
        .flatten()
        .min_by(|a, b| target_order(graph, digraph[*a], digraph[*b]))
    else {
        unreachable!("stalled schedule without a cycle")
    };

    let path = cycle_path(&digraph, start)
        .into_iter()
        .map(|node| digraph[node])
        .collect();
    cyclic(graph, digraph[start], path)
}

fn cyclic(graph: &Graph, id: TargetId, path: Vec<TargetId>) -> CacheError {
    CacheError::CyclicDependency {
        target: graph.target(id).name.clone(),
        project: graph.project_of(id).path.clone(),
        cycle: path
            .into_iter()
            .map(|t| graph.target(t).name.clone())
            .collect(),
    }
}

/// Shortest path from `start` back to itself, as a breadth-first search over
/// outgoing edges. Successors are visited in target order so the reported
/// path is deterministic.
fn cycle_path(digraph: &DiGraph<TargetId, ()>, start: NodeIndex) -> Vec<NodeIndex> {
    let mut parent = HashMap::<NodeIndex, NodeIndex>::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let mut successors: Vec<NodeIndex> = digraph.neighbors(node).collect();
        successors.sort_by_key(|n| digraph[*n]);
        for next in successors {
            if next == start {
                let mut inner = Vec::new();
                let mut cursor = node;
                while cursor != start {
                    inner.push(cursor);
                    match parent.get(&cursor) {
                        Some(&p) => cursor = p,
                        None => break,
                    }
                }
                inner.reverse();
                let mut path = vec![start];
                path.extend(inner);
                path.push(start);
                return path;
            }
            if !parent.contains_key(&next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    vec![start, start]
}
