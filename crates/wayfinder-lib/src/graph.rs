use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::visibility::VisibilityOracle;
use crate::waypoint::{NodeId, Waypoint};

/// Maximum number of label suggestions offered for an unknown office.
const MAX_LABEL_SUGGESTIONS: usize = 3;

/// Minimum similarity for a label to be offered as a suggestion.
const LABEL_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Immutable snapshot of the waypoint graph.
///
/// Cloning is cheap; the waypoints are shared behind an [`Arc`]. A new graph
/// is produced by [`GraphBuilder::build`] or by [`crate::integrity::repair`]
/// and nothing mutates a snapshot after construction.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Arc<BTreeMap<NodeId, Waypoint>>,
}

impl Graph {
    /// Wrap waypoints with their neighbour lists as authored, without
    /// recomputing connectivity.
    pub fn from_waypoints(waypoints: impl IntoIterator<Item = Waypoint>) -> Result<Self> {
        let mut nodes = BTreeMap::new();
        for waypoint in waypoints {
            let id = waypoint.id;
            if nodes.insert(id, waypoint).is_some() {
                return Err(Error::DuplicateNodeId { id });
            }
        }
        Ok(Self {
            nodes: Arc::new(nodes),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Waypoint> {
        self.nodes.get(&id)
    }

    /// Lookup that turns a missing id into [`Error::UnknownNode`].
    pub fn require(&self, id: NodeId) -> Result<&Waypoint> {
        self.node(id).ok_or(Error::UnknownNode { id })
    }

    /// Waypoints in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Waypoint> {
        self.nodes.values()
    }

    /// Return the neighbour ids for a given waypoint.
    pub fn neighbours(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct undirected connections, counting one-sided links once.
    pub fn edge_count(&self) -> usize {
        let mut pairs = BTreeSet::new();
        for node in self.nodes.values() {
            for &other in &node.neighbors {
                if other != node.id && self.nodes.contains_key(&other) {
                    pairs.insert((node.id.min(other), node.id.max(other)));
                }
            }
        }
        pairs.len()
    }

    /// Owned copy of every waypoint, e.g. for writing a floor plan back out.
    pub fn to_waypoints(&self) -> Vec<Waypoint> {
        self.nodes.values().cloned().collect()
    }

    /// Resolve an office by its label (case-insensitive), suggesting close
    /// matches when nothing fits.
    pub fn office_by_label(&self, label: &str) -> Result<&Waypoint> {
        let wanted = label.trim();
        if let Some(node) = self.nodes.values().find(|node| {
            node.kind
                .label()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(wanted))
        }) {
            return Ok(node);
        }

        Err(Error::UnknownOffice {
            name: wanted.to_string(),
            suggestions: self.label_suggestions(wanted),
        })
    }

    fn label_suggestions(&self, wanted: &str) -> Vec<String> {
        let wanted = wanted.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .nodes
            .values()
            .filter_map(|node| node.kind.label())
            .map(|label| {
                let score = strsim::jaro_winkler(&wanted, &label.to_lowercase());
                (score, label)
            })
            .filter(|(score, _)| *score >= LABEL_SIMILARITY_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.dedup_by(|a, b| a.1 == b.1);
        scored
            .into_iter()
            .take(MAX_LABEL_SUGGESTIONS)
            .map(|(_, label)| label.to_string())
            .collect()
    }
}

/// Tunables for [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphBuildOptions {
    /// Vertical separation at or above which two waypoints are on different
    /// levels. General edges never cross it; stair pairs must exceed it.
    pub floor_height_threshold: f64,
    /// Maximum horizontal offset between the two ends of one staircase.
    pub max_stair_horizontal: f64,
    /// Weight of vertical distance when ranking stair-pair candidates, so the
    /// adjacent floor wins over one further away.
    pub stair_vertical_weight: f64,
    /// Planar radius within which stairs are linked to same-level waypoints
    /// regardless of visibility.
    pub stair_link_radius: f64,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            floor_height_threshold: 2.0,
            max_stair_horizontal: 6.0,
            stair_vertical_weight: 0.1,
            stair_link_radius: 3.0,
        }
    }
}

/// Computes waypoint connectivity from geometry.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    oracle: VisibilityOracle,
    options: GraphBuildOptions,
}

impl GraphBuilder {
    pub fn new(oracle: VisibilityOracle, options: GraphBuildOptions) -> Self {
        Self { oracle, options }
    }

    /// Build a fresh graph snapshot. Neighbour lists on the input are ignored.
    pub fn build(&self, waypoints: impl IntoIterator<Item = Waypoint>) -> Result<Graph> {
        let mut nodes: Vec<Waypoint> = waypoints.into_iter().collect();
        nodes.sort_by_key(|node| node.id);
        if let Some(pair) = nodes.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(Error::DuplicateNodeId { id: pair[0].id });
        }

        let mut links: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); nodes.len()];
        let general = self.link_visible_pairs(&nodes, &mut links);
        let paired = self.pair_stairs(&nodes, &mut links);
        let anchored = self.anchor_stairs(&nodes, &mut links);

        let ids: Vec<NodeId> = nodes.iter().map(|node| node.id).collect();
        for (node, linked) in nodes.iter_mut().zip(&links) {
            node.neighbors = linked.iter().map(|&index| ids[index]).collect();
        }

        let graph = Graph::from_waypoints(nodes)?;
        info!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            visible_links = general,
            stair_pairs = paired,
            stair_anchors = anchored,
            "built waypoint graph"
        );
        Ok(graph)
    }

    fn same_level(&self, a: &Waypoint, b: &Waypoint) -> bool {
        a.position.vertical_distance_to(&b.position) < self.options.floor_height_threshold
    }

    fn link_visible_pairs(&self, nodes: &[Waypoint], links: &mut [BTreeSet<usize>]) -> usize {
        let mut linked = 0usize;
        let mut occluded = 0usize;

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let (a, b) = (&nodes[i], &nodes[j]);
                if !self.same_level(a, b) {
                    continue;
                }

                let distance = a.position.planar_distance_to(&b.position);
                if distance > a.connection_distance.min(b.connection_distance) {
                    continue;
                }

                let probe = a.probe.tighter(&b.probe);
                if !self.oracle.is_visible_with(a.position, b.position, &probe) {
                    occluded += 1;
                    continue;
                }

                link(links, i, j);
                linked += 1;
            }
        }

        debug!(linked, occluded, "linked mutually visible waypoints");
        linked
    }

    fn pair_stairs(&self, nodes: &[Waypoint], links: &mut [BTreeSet<usize>]) -> usize {
        let mut paired = 0usize;

        for (i, stair) in nodes.iter().enumerate() {
            if !stair.kind.is_stairs() {
                continue;
            }

            let mut best: Option<(f64, usize)> = None;
            for (j, candidate) in nodes.iter().enumerate() {
                if i == j || !candidate.kind.is_stairs() {
                    continue;
                }

                let vertical = stair.position.vertical_distance_to(&candidate.position);
                if vertical <= self.options.floor_height_threshold {
                    continue;
                }

                let horizontal = stair.position.planar_distance_to(&candidate.position);
                if horizontal >= self.options.max_stair_horizontal {
                    continue;
                }

                if let (Some(own), Some(other)) =
                    (stair.kind.stair_group(), candidate.kind.stair_group())
                {
                    if own != other {
                        continue;
                    }
                }

                let score = horizontal + self.options.stair_vertical_weight * vertical;
                if best.is_none_or(|(best_score, _)| score < best_score) {
                    best = Some((score, j));
                }
            }

            match best {
                Some((score, j)) => {
                    debug!(stair = stair.id, pair = nodes[j].id, score, "paired stairs");
                    if link(links, i, j) {
                        paired += 1;
                    }
                }
                None => debug!(stair = stair.id, "stairs have no counterpart on another floor"),
            }
        }

        paired
    }

    fn anchor_stairs(&self, nodes: &[Waypoint], links: &mut [BTreeSet<usize>]) -> usize {
        let mut anchored = 0usize;

        for (i, stair) in nodes.iter().enumerate() {
            if !stair.kind.is_stairs() {
                continue;
            }

            for (j, other) in nodes.iter().enumerate() {
                if i == j || !self.same_level(stair, other) {
                    continue;
                }
                if stair.position.planar_distance_to(&other.position)
                    <= self.options.stair_link_radius
                    && link(links, i, j)
                {
                    anchored += 1;
                }
            }
        }

        anchored
    }
}

/// Record a bidirectional link, returning whether it was new.
fn link(links: &mut [BTreeSet<usize>], a: usize, b: usize) -> bool {
    let inserted = links[a].insert(b);
    links[b].insert(a);
    inserted
}
