//! Adjacency view and traversal algorithms.
//!
//! # Invariants
//!
//! - Edges added through [`ReferenceGraph::add_edge`] never close a cycle.
//! - Graphs loaded with [`ReferenceGraph::from_edges`] are taken as-is;
//!   traversals terminate on them even if they already contain cycles.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use vtrack_types::VersionId;

use crate::error::{GraphError, GraphResult};

/// An edge that passed [`ReferenceGraph::check_edge`].
///
/// Only the graph can produce one, so holding a `CheckedEdge` means the edge
/// was neither a self reference nor cycle-closing when it was checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckedEdge {
    referencer: VersionId,
    reference: VersionId,
}

impl CheckedEdge {
    pub fn referencer(&self) -> VersionId {
        self.referencer
    }

    pub fn reference(&self) -> VersionId {
        self.reference
    }
}

/// Directed `references` edges between versions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceGraph {
    /// Outgoing edges. Parallel edges collapse into one.
    edges: HashMap<VersionId, BTreeSet<VersionId>>,
}

impl ReferenceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(version, outgoing references)` pairs.
    pub fn from_edges<I, R>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (VersionId, R)>,
        R: IntoIterator<Item = VersionId>,
    {
        let mut graph = Self::new();
        for (id, references) in nodes {
            graph.edges.entry(id).or_default().extend(references);
        }
        graph
    }

    /// Number of versions with at least one recorded outgoing edge list.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Outgoing edges of `id`, in id order.
    pub fn references(&self, id: &VersionId) -> impl DoubleEndedIterator<Item = &VersionId> {
        self.edges.get(id).into_iter().flatten()
    }

    /// Versions with an edge to `id`, in id order.
    pub fn referrers(&self, id: &VersionId) -> Vec<VersionId> {
        let mut referrers: Vec<VersionId> = self
            .edges
            .iter()
            .filter(|(_, targets)| targets.contains(id))
            .map(|(source, _)| *source)
            .collect();
        referrers.sort();
        referrers
    }

    pub fn has_edge(&self, referencer: &VersionId, reference: &VersionId) -> bool {
        self.edges
            .get(referencer)
            .is_some_and(|targets| targets.contains(reference))
    }

    // ---------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------

    /// Returns `true` if `to` can be reached from `from` by following one or
    /// more edges.
    ///
    /// Iterative depth-first search with a visited set.
    pub fn reaches(&self, from: &VersionId, to: &VersionId) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<&VersionId> = self.references(from).collect();

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(*current) {
                continue;
            }
            stack.extend(self.references(current).filter(|next| !visited.contains(*next)));
        }
        false
    }

    /// Every version reachable from `start`, in depth-first preorder. Each
    /// version appears once; `start` itself only if a cycle leads back to it.
    pub fn walk_references(&self, start: &VersionId) -> Vec<VersionId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        // Reversed so the smallest id is visited first.
        let mut stack: Vec<&VersionId> = self.references(start).rev().collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(*current) {
                continue;
            }
            order.push(*current);
            stack.extend(self.references(current).rev().filter(|next| !visited.contains(*next)));
        }
        trace!(start = %start, reachable = order.len(), "walked references");
        order
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Check that `referencer -> reference` can be added without creating a
    /// self loop or a cycle. The graph is not modified.
    pub fn check_edge(
        &self,
        referencer: &VersionId,
        reference: &VersionId,
    ) -> GraphResult<CheckedEdge> {
        if referencer == reference {
            return Err(GraphError::SelfReference(*referencer));
        }
        if self.reaches(reference, referencer) {
            return Err(GraphError::CircularDependency {
                referencer: *referencer,
                reference: *reference,
            });
        }
        Ok(CheckedEdge {
            referencer: *referencer,
            reference: *reference,
        })
    }

    /// Add `referencer -> reference` after [`Self::check_edge`].
    ///
    /// Returns `false` if the edge was already present. On error the graph is
    /// unchanged.
    pub fn add_edge(&mut self, referencer: VersionId, reference: VersionId) -> GraphResult<bool> {
        self.check_edge(&referencer, &reference)?;
        let inserted = self.edges.entry(referencer).or_default().insert(reference);
        if inserted {
            debug!(referencer = %referencer, reference = %reference, "added reference edge");
        }
        Ok(inserted)
    }

    /// Remove one edge. Returns `true` if it existed.
    pub fn remove_edge(&mut self, referencer: &VersionId, reference: &VersionId) -> bool {
        self.edges
            .get_mut(referencer)
            .is_some_and(|targets| targets.remove(reference))
    }

    /// Remove a version and every edge touching it. Returns the number of
    /// incoming edges dropped.
    pub fn remove_node(&mut self, id: &VersionId) -> usize {
        self.edges.remove(id);
        let mut dropped = 0;
        for targets in self.edges.values_mut() {
            if targets.remove(id) {
                dropped += 1;
            }
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: usize) -> Vec<VersionId> {
        let mut ids: Vec<VersionId> = (0..n).map(|_| VersionId::new()).collect();
        ids.sort();
        ids
    }

    // ---- Test 1: self reference is always rejected ----
    #[test]
    fn self_reference_rejected() {
        let v = ids(1);
        let mut graph = ReferenceGraph::new();
        assert_eq!(graph.add_edge(v[0], v[0]), Err(GraphError::SelfReference(v[0])));
        assert_eq!(graph.edge_count(), 0);
    }

    // ---- Test 2: a two-node cycle is rejected and nothing is added ----
    #[test]
    fn two_cycle_rejected_without_partial_edge() {
        let v = ids(2);
        let mut graph = ReferenceGraph::new();
        assert!(graph.add_edge(v[0], v[1]).unwrap());

        let err = graph.add_edge(v[1], v[0]).unwrap_err();
        assert_eq!(
            err,
            GraphError::CircularDependency {
                referencer: v[1],
                reference: v[0],
            }
        );
        assert!(!graph.has_edge(&v[1], &v[0]));
        assert_eq!(graph.edge_count(), 1);
    }

    // ---- Test 3: longer cycles are found transitively ----
    #[test]
    fn transitive_cycle_rejected() {
        let v = ids(4);
        let mut graph = ReferenceGraph::new();
        graph.add_edge(v[0], v[1]).unwrap();
        graph.add_edge(v[1], v[2]).unwrap();
        graph.add_edge(v[2], v[3]).unwrap();
        assert!(matches!(
            graph.add_edge(v[3], v[0]),
            Err(GraphError::CircularDependency { .. })
        ));
        // A diamond is fine.
        graph.add_edge(v[0], v[3]).unwrap();
    }

    // ---- Test 4: duplicate edges are idempotent ----
    #[test]
    fn duplicate_edge_is_noop() {
        let v = ids(2);
        let mut graph = ReferenceGraph::new();
        assert!(graph.add_edge(v[0], v[1]).unwrap());
        assert!(!graph.add_edge(v[0], v[1]).unwrap());
        assert_eq!(graph.edge_count(), 1);
    }

    // ---- Test 5: traversal terminates on pre-existing cycles ----
    #[test]
    fn traversal_terminates_on_loaded_cycle() {
        let v = ids(4);
        let graph = ReferenceGraph::from_edges([
            (v[0], vec![v[1], v[1]]),
            (v[1], vec![v[2]]),
            (v[2], vec![v[0]]),
        ]);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.reaches(&v[0], &v[2]));
        assert!(!graph.reaches(&v[0], &v[3]));
        let edge = graph.check_edge(&v[3], &v[0]).unwrap();
        assert_eq!((edge.referencer(), edge.reference()), (v[3], v[0]));
        assert_eq!(graph.walk_references(&v[0]), vec![v[1], v[2], v[0]]);
    }

    // ---- Test 6: walk visits each version once in preorder ----
    #[test]
    fn walk_preorder_visits_once() {
        let v = ids(5);
        let graph = ReferenceGraph::from_edges([
            (v[0], vec![v[1], v[2]]),
            (v[1], vec![v[3]]),
            (v[2], vec![v[3], v[4]]),
        ]);
        assert_eq!(graph.walk_references(&v[0]), vec![v[1], v[3], v[2], v[4]]);
        assert!(graph.walk_references(&v[4]).is_empty());
    }

    // ---- Test 7: referrers and node removal ----
    #[test]
    fn remove_node_drops_incoming_edges() {
        let v = ids(3);
        let mut graph = ReferenceGraph::from_edges([
            (v[0], vec![v[2]]),
            (v[1], vec![v[2]]),
            (v[2], vec![]),
        ]);
        assert_eq!(graph.referrers(&v[2]), vec![v[0], v[1]]);
        assert_eq!(graph.remove_node(&v[2]), 2);
        assert!(graph.referrers(&v[2]).is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_edge_reports_presence() {
        let v = ids(2);
        let mut graph = ReferenceGraph::new();
        graph.add_edge(v[0], v[1]).unwrap();
        assert!(graph.remove_edge(&v[0], &v[1]));
        assert!(!graph.remove_edge(&v[0], &v[1]));
        graph.add_edge(v[1], v[0]).unwrap();
    }

    proptest! {
        /// Whatever edges are offered, the ones accepted never form a cycle.
        #[test]
        fn accepted_edges_stay_acyclic(
            pairs in proptest::collection::vec((0usize..8, 0usize..8), 0..40),
        ) {
            let v = ids(8);
            let mut graph = ReferenceGraph::new();
            for (a, b) in pairs {
                let _ = graph.add_edge(v[a], v[b]);
            }
            for id in &v {
                prop_assert!(!graph.reaches(id, id));
            }
        }
    }
}
