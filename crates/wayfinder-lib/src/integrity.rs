//! Diagnostics and repair for the waypoint neighbour relation.
//!
//! These run outside the per-query path: typically once after loading an
//! authored floor plan, or from maintenance tooling.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::graph::Graph;
use crate::waypoint::NodeId;

/// A directed neighbour entry `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EdgeRef {
    pub from: NodeId,
    pub to: NodeId,
}

/// Findings from [`report`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// `from` lists `to`, but `to` does not list `from`.
    pub one_sided: Vec<EdgeRef>,
    /// Waypoints listing themselves as a neighbour.
    pub self_edges: Vec<NodeId>,
    /// Neighbour entries listed more than once (reported once per pair).
    pub duplicates: Vec<EdgeRef>,
    /// Neighbour entries pointing at ids missing from the graph.
    pub dangling: Vec<EdgeRef>,
    /// Waypoints with no valid connection in either direction.
    pub orphans: Vec<NodeId>,
}

impl IntegrityReport {
    /// True when no edge-level problem was found. Orphans are informational:
    /// an isolated waypoint may be deliberate.
    pub fn is_clean(&self) -> bool {
        self.one_sided.is_empty()
            && self.self_edges.is_empty()
            && self.duplicates.is_empty()
            && self.dangling.is_empty()
    }

    /// Total number of edge-level findings.
    pub fn finding_count(&self) -> usize {
        self.one_sided.len() + self.self_edges.len() + self.duplicates.len() + self.dangling.len()
    }
}

/// Inspect the neighbour relation without changing it.
pub fn report(graph: &Graph) -> IntegrityReport {
    let mut findings = IntegrityReport::default();
    let mut incoming: BTreeSet<NodeId> = BTreeSet::new();

    for node in graph.nodes() {
        let mut seen = BTreeSet::new();
        let mut reported_duplicates = BTreeSet::new();
        let mut has_valid = false;

        for &target in &node.neighbors {
            let edge = EdgeRef {
                from: node.id,
                to: target,
            };

            if target == node.id {
                if !findings.self_edges.contains(&node.id) {
                    findings.self_edges.push(node.id);
                }
                continue;
            }

            let Some(other) = graph.node(target) else {
                findings.dangling.push(edge);
                continue;
            };

            if !seen.insert(target) {
                if reported_duplicates.insert(target) {
                    findings.duplicates.push(edge);
                }
                continue;
            }

            has_valid = true;
            incoming.insert(target);
            if !other.is_linked_to(node.id) {
                findings.one_sided.push(edge);
            }
        }

        if !has_valid {
            findings.orphans.push(node.id);
        }
    }

    findings.orphans.retain(|id| !incoming.contains(id));

    if findings.is_clean() {
        debug!(
            nodes = graph.len(),
            orphans = findings.orphans.len(),
            "waypoint graph is consistent"
        );
    } else {
        warn!(
            one_sided = findings.one_sided.len(),
            self_edges = findings.self_edges.len(),
            duplicates = findings.duplicates.len(),
            dangling = findings.dangling.len(),
            orphans = findings.orphans.len(),
            "waypoint graph has integrity problems"
        );
    }

    findings
}

/// Produce a repaired snapshot: dangling, self and duplicate entries are
/// dropped and every remaining link is made bidirectional.
pub fn repair(graph: &Graph) -> Result<Graph> {
    let mut links: BTreeMap<NodeId, BTreeSet<NodeId>> =
        graph.nodes().map(|node| (node.id, BTreeSet::new())).collect();

    for node in graph.nodes() {
        for &target in &node.neighbors {
            if target == node.id || !links.contains_key(&target) {
                continue;
            }
            links.entry(node.id).or_default().insert(target);
            links.entry(target).or_default().insert(node.id);
        }
    }

    let repaired = Graph::from_waypoints(graph.nodes().map(|node| {
        let mut node = node.clone();
        node.neighbors = links
            .get(&node.id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        node
    }))?;

    debug!(
        edges_before = graph.edge_count(),
        edges_after = repaired.edge_count(),
        "repaired waypoint graph"
    );
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::corridor;

    #[test]
    fn symmetric_graph_is_clean() {
        let graph = Graph::from_waypoints(vec![
            corridor(1, 0.0, 0.0, 0.0).with_neighbors([2]),
            corridor(2, 1.0, 0.0, 0.0).with_neighbors([1]),
        ])
        .expect("graph");
        let findings = report(&graph);
        assert!(findings.is_clean());
        assert!(findings.orphans.is_empty());
    }

    #[test]
    fn detects_every_kind_of_problem() {
        let graph = Graph::from_waypoints(vec![
            corridor(1, 0.0, 0.0, 0.0).with_neighbors([1, 2, 2, 42]),
            corridor(2, 1.0, 0.0, 0.0).with_neighbors([1, 3]),
            corridor(3, 2.0, 0.0, 0.0),
            corridor(4, 9.0, 0.0, 0.0),
        ])
        .expect("graph");

        let findings = report(&graph);
        assert_eq!(findings.self_edges, vec![1]);
        assert_eq!(findings.duplicates, vec![EdgeRef { from: 1, to: 2 }]);
        assert_eq!(findings.dangling, vec![EdgeRef { from: 1, to: 42 }]);
        assert_eq!(findings.one_sided, vec![EdgeRef { from: 2, to: 3 }]);
        assert_eq!(findings.orphans, vec![4]);
        assert_eq!(findings.finding_count(), 4);
    }

    #[test]
    fn repair_restores_symmetry_and_drops_junk() {
        let graph = Graph::from_waypoints(vec![
            corridor(1, 0.0, 0.0, 0.0).with_neighbors([1, 2, 2, 42]),
            corridor(2, 1.0, 0.0, 0.0).with_neighbors([3]),
            corridor(3, 2.0, 0.0, 0.0),
        ])
        .expect("graph");

        let repaired = repair(&graph).expect("repair");
        assert_eq!(repaired.neighbours(1), &[2]);
        assert_eq!(repaired.neighbours(2), &[1, 3]);
        assert_eq!(repaired.neighbours(3), &[2]);
        assert!(report(&repaired).is_clean());
    }
}
