//! KD-tree over waypoint positions for nearest-node queries.
//!
//! Query points are resolved to waypoints many times per navigation session
//! (every replan), so the planner keeps one index per graph snapshot rather
//! than scanning all waypoints for each lookup.
//!
//! Waypoints sharing an exact position are stored as one tree item; kiddo
//! cannot split a bucket whose points all coincide.

use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::geometry::Point3;
use crate::graph::Graph;
use crate::waypoint::NodeId;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// First query size of [`NodeIndex::nearest_matching`]; grows fourfold.
const INITIAL_WINDOW: usize = 8;

/// Waypoints sharing one exact position.
struct Site {
    position: Point3,
    ids: Vec<NodeId>,
}

/// Spatial index built from one [`Graph`] snapshot.
pub struct NodeIndex {
    /// KD-tree keyed by position. Items index into `sites`.
    tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32>,
    sites: Vec<Site>,
    node_count: usize,
}

impl NodeIndex {
    pub fn build(graph: &Graph) -> Self {
        let mut sites: Vec<Site> = Vec::new();
        let mut by_position: HashMap<[u64; 3], usize> = HashMap::new();
        for node in graph.nodes() {
            let key = position_key(&node.position);
            match by_position.get(&key) {
                Some(&site) => sites[site].ids.push(node.id),
                None => {
                    by_position.insert(key, sites.len());
                    sites.push(Site {
                        position: node.position,
                        ids: vec![node.id],
                    });
                }
            }
        }
        for site in &mut sites {
            site.ids.sort_unstable();
        }

        let mut tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (index, site) in sites.iter().enumerate() {
            tree.add(&to_coords(&site.position), index);
        }

        let node_count = graph.len();
        debug!(
            node_count,
            site_count = sites.len(),
            "built waypoint index"
        );
        Self {
            tree,
            sites,
            node_count,
        }
    }

    pub fn len(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Find up to `k` nearest waypoints to a point.
    ///
    /// Returns `(NodeId, distance)` pairs sorted by distance, ties broken by id.
    pub fn nearest(&self, point: Point3, k: usize) -> Vec<(NodeId, f64)> {
        if k == 0 || self.sites.is_empty() {
            return Vec::new();
        }

        let results = self
            .tree
            .nearest_n::<SquaredEuclidean>(&to_coords(&point), k.min(self.sites.len()));

        let mut neighbours = self.expand(point, results.iter().map(|neighbour| neighbour.item));
        neighbours.truncate(k);
        neighbours
    }

    /// Nearest waypoint accepted by `accept`, visiting candidates in
    /// distance order (ties by id).
    ///
    /// The tree is queried in growing windows so a nearby match never costs
    /// a sort of the whole index. Candidates on the far edge of a window are
    /// held back until the next one, where every point at that distance is
    /// known.
    pub fn nearest_matching<F>(&self, point: Point3, mut accept: F) -> Option<(NodeId, f64)>
    where
        F: FnMut(NodeId) -> bool,
    {
        let total = self.sites.len();
        let query = to_coords(&point);
        let mut window = INITIAL_WINDOW;
        let mut visited_below = f32::NEG_INFINITY;

        while total > 0 {
            let complete = window >= total;
            let results = self
                .tree
                .nearest_n::<SquaredEuclidean>(&query, window.min(total));
            let ceiling = match results.last() {
                Some(last) if !complete => last.distance,
                _ => f32::INFINITY,
            };

            let batch = self.expand(
                point,
                results
                    .iter()
                    .filter(|n| n.distance >= visited_below && n.distance < ceiling)
                    .map(|n| n.item),
            );
            if let Some(found) = batch.into_iter().find(|&(id, _)| accept(id)) {
                return Some(found);
            }
            if complete {
                break;
            }
            visited_below = ceiling;
            window = window.saturating_mul(4);
        }
        None
    }

    /// Flatten sites into `(NodeId, distance)` pairs sorted by distance.
    ///
    /// Distances are recomputed in f64 so ordering is not at the mercy of
    /// the f32 tree coordinates.
    fn expand(&self, point: Point3, items: impl Iterator<Item = usize>) -> Vec<(NodeId, f64)> {
        let mut neighbours: Vec<(NodeId, f64)> = items
            .flat_map(|item| {
                let site = &self.sites[item];
                let distance = point.distance_to(&site.position);
                site.ids.iter().map(move |&id| (id, distance))
            })
            .collect();
        neighbours.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        neighbours
    }
}

fn to_coords(position: &Point3) -> [f32; 3] {
    [position.x as f32, position.y as f32, position.z as f32]
}

fn position_key(position: &Point3) -> [u64; 3] {
    // +0.0 and -0.0 name the same place.
    let bits = |v: f64| if v == 0.0 { 0 } else { v.to_bits() };
    [bits(position.x), bits(position.y), bits(position.z)]
}
