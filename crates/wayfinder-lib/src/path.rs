use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::floor::FloorClassifier;
use crate::geometry::{polyline_length, Point3};
use crate::graph::Graph;
use crate::planner::EdgeScorer;
use crate::waypoint::NodeId;

/// Ordered walkable polyline from a start query point to an end query point.
///
/// A path is never edited in place once planned; replanning produces a new
/// one, so holders of an old path can keep reading it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<Point3>,
}

impl Path {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Straight two-point path, used when no route can be resolved.
    pub fn direct(start: Point3, end: Point3) -> Self {
        Self {
            points: vec![start, end],
        }
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point3> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point3> {
        self.points.last().copied()
    }

    /// Total walking length in metres.
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

/// Cost model for one A* run.
pub struct SearchCost<'a> {
    pub floors: &'a dyn FloorClassifier,
    pub scorer: &'a dyn EdgeScorer,
    /// Added to the heuristic for candidates on a different floor than the goal.
    pub floor_penalty: f64,
    /// Upper bound on node expansions before the search gives up.
    pub max_expansions: usize,
}

/// Run A* between two waypoints.
///
/// Returns the waypoint ids from `start` to `goal` inclusive. Open nodes with
/// equal `f` are expanded in the order they were pushed.
pub fn find_route_a_star(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    cost: &SearchCost<'_>,
) -> Result<Vec<NodeId>> {
    let start_position = graph.require(start)?.position;
    let goal_node = graph.require(goal)?;

    if start == goal {
        return Ok(vec![start]);
    }

    let goal_position = goal_node.position;
    let goal_floor = cost.floors.floor_of(goal_position);
    let heuristic = |position: Point3| {
        let mut estimate = position.distance_to(&goal_position);
        if cost.floors.floor_of(position) != goal_floor {
            estimate += cost.floor_penalty;
        }
        estimate
    };

    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut closed: HashSet<NodeId> = HashSet::new();
    let mut queue = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expansions = 0usize;

    g_score.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(AStarEntry::new(start, 0.0, heuristic(start_position), sequence));

    while let Some(entry) = queue.pop() {
        if closed.contains(&entry.node) {
            continue;
        }

        if entry.node == goal {
            debug!(start, goal, expansions, "a* reached goal");
            return Ok(reconstruct_path(&parents, start, goal));
        }

        expansions += 1;
        if expansions > cost.max_expansions {
            warn!(
                start,
                goal,
                limit = cost.max_expansions,
                "a* expansion limit reached"
            );
            return Err(Error::NoRouteFound { start, goal });
        }
        closed.insert(entry.node);

        let Some(current) = graph.node(entry.node) else {
            continue;
        };
        let current_score = entry.cost.0;

        for &next in graph.neighbours(entry.node) {
            if next == entry.node || closed.contains(&next) {
                continue;
            }
            let Some(target) = graph.node(next) else {
                continue;
            };

            let step = current.position.distance_to(&target.position)
                + cost.scorer.penalty(current, target, goal);
            let tentative_g = current_score + step.max(0.0);

            if tentative_g < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                g_score.insert(next, tentative_g);
                parents.insert(next, Some(entry.node));
                sequence += 1;
                queue.push(AStarEntry::new(
                    next,
                    tentative_g,
                    heuristic(target.position),
                    sequence,
                ));
            }
        }
    }

    debug!(start, goal, expansions, "a* exhausted open set");
    Err(Error::NoRouteFound { start, goal })
}

fn reconstruct_path(
    parents: &HashMap<NodeId, Option<NodeId>>,
    start: NodeId,
    goal: NodeId,
) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeId,
    cost: FloatOrd,
    estimate: FloatOrd,
    sequence: u64,
}

impl AStarEntry {
    fn new(node: NodeId, cost: f64, heuristic: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
            sequence,
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate, with
        // earlier pushes winning ties.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
