//! Route planning between arbitrary query points.
//!
//! This module provides:
//! - [`PathPlanner`] - resolves query points to waypoints and runs A*
//! - [`PlannerConfig`] - penalties, limits and ramp density
//! - [`RoutePlan`] / [`PlanStatus`] - the planned path plus how it was obtained
//! - [`EdgeScorer`] - the seam for routing preferences
//!
//! # Cross-floor routes
//!
//! When the start and end query points sit on different floors the route is
//! spliced from three legs: start to the nearest stairs on the start floor,
//! stairs to stairs (normally a single pre-built stair-pair edge), and stairs
//! to the end. The vertical jump between the paired stairs is replaced with an
//! interpolated ramp so renderers draw a slope instead of a teleport.
//!
//! # Fallbacks
//!
//! [`PathPlanner::find_path`] always returns a path. When no waypoint can be
//! resolved or no route exists it degrades to the straight two-point path and
//! records why in [`PlanStatus::Fallback`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wayfinder_lib::{FloorBands, GraphBuilder, PathPlanner, PlannerConfig, VisibilityOracle};
//!
//! let oracle = VisibilityOracle::open();
//! let graph = GraphBuilder::new(oracle.clone(), Default::default()).build(waypoints)?;
//! let planner = PathPlanner::new(graph, oracle, Arc::new(FloorBands::default()), PlannerConfig::default());
//! let plan = planner.find_path(start, end);
//! println!("{} points, {:.1} m", plan.path.len(), plan.path.length());
//! ```

mod scoring;
mod splice;

pub use scoring::{EdgeScorer, NoPreference, RoutingPreferences};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::floor::FloorClassifier;
use crate::geometry::Point3;
use crate::graph::Graph;
use crate::path::{find_route_a_star, Path, SearchCost};
use crate::spatial::NodeIndex;
use crate::visibility::VisibilityOracle;
use crate::waypoint::NodeId;

/// Upper bound on [`PlannerConfig::ramp_points`].
pub const MAX_RAMP_POINTS: usize = 1000;

/// Planner tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Heuristic surcharge for candidates on a different floor than the goal.
    pub floor_penalty: f64,
    /// Node expansions allowed per A* run.
    pub max_expansions: usize,
    /// Interpolated points inserted at each floor transition, at most
    /// [`MAX_RAMP_POINTS`].
    pub ramp_points: usize,
    /// Routing preferences; `None` routes on geometry alone.
    pub preferences: Option<RoutingPreferences>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            floor_penalty: 50.0,
            max_expansions: 1000,
            ramp_points: 12,
            preferences: Some(RoutingPreferences::default()),
        }
    }
}

/// Why a plan degraded to the direct two-point path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoAccessibleNode,
    NoRouteFound,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            FallbackReason::NoAccessibleNode => "no accessible waypoint",
            FallbackReason::NoRouteFound => "no route found",
        };
        f.write_str(value)
    }
}

/// How a [`RoutePlan`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanStatus {
    /// A graph route was found.
    Routed,
    /// Both query points resolved to the same waypoint.
    SameNode,
    /// Planning failed; the path is the direct two-point line.
    Fallback { reason: FallbackReason },
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Routed => f.write_str("routed"),
            PlanStatus::SameNode => f.write_str("same waypoint"),
            PlanStatus::Fallback { reason } => write!(f, "fallback ({reason})"),
        }
    }
}

/// Planned path returned by [`PathPlanner::find_path`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub path: Path,
    pub status: PlanStatus,
    /// Waypoints visited, in order. Empty for fallbacks.
    pub waypoints: Vec<NodeId>,
    pub start_floor: i32,
    pub end_floor: i32,
}

impl RoutePlan {
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, PlanStatus::Fallback { .. })
    }

    pub fn is_cross_floor(&self) -> bool {
        self.start_floor != self.end_floor
    }
}

/// Resolves query points and searches the waypoint graph.
///
/// Holds its own [`Graph`] snapshot and spatial index; rebuild the planner
/// when the graph is rebuilt.
pub struct PathPlanner {
    graph: Graph,
    index: NodeIndex,
    oracle: VisibilityOracle,
    floors: Arc<dyn FloorClassifier>,
    scorer: Arc<dyn EdgeScorer>,
    config: PlannerConfig,
}

impl PathPlanner {
    pub fn new(
        graph: Graph,
        oracle: VisibilityOracle,
        floors: Arc<dyn FloorClassifier>,
        config: PlannerConfig,
    ) -> Self {
        let scorer: Arc<dyn EdgeScorer> = match config.preferences {
            Some(preferences) => Arc::new(preferences),
            None => Arc::new(NoPreference),
        };
        let index = NodeIndex::build(&graph);
        Self {
            graph,
            index,
            oracle,
            floors,
            scorer,
            config,
        }
    }

    /// Replace the edge scorer derived from [`PlannerConfig::preferences`].
    pub fn with_scorer(mut self, scorer: Arc<dyn EdgeScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn oracle(&self) -> &VisibilityOracle {
        &self.oracle
    }

    pub fn floor_of(&self, position: Point3) -> i32 {
        self.floors.floor_of(position)
    }

    /// Resolve a query point to a waypoint.
    ///
    /// Preference order: nearest same-floor waypoint with clear line of sight,
    /// then nearest same-floor waypoint, then nearest waypoint on any floor.
    pub fn nearest_accessible_node(&self, position: Point3) -> Result<NodeId> {
        let floor = self.floor_of(position);
        let on_floor = |id: NodeId| {
            self.graph
                .node(id)
                .is_some_and(|node| self.floor_of(node.position) == floor)
        };

        let visible = self.index.nearest_matching(position, |id| {
            self.graph.node(id).is_some_and(|node| {
                self.floor_of(node.position) == floor
                    && self
                        .oracle
                        .is_visible_with(position, node.position, &node.probe)
            })
        });
        if let Some((id, _)) = visible {
            return Ok(id);
        }

        if let Some((id, _)) = self.index.nearest_matching(position, on_floor) {
            debug!(position = %position, node = id, "no visible waypoint; using nearest on floor");
            return Ok(id);
        }

        if let Some((id, _)) = self.index.nearest_matching(position, |_| true) {
            debug!(position = %position, floor, node = id, "no waypoint on floor; using nearest overall");
            return Ok(id);
        }

        Err(Error::NoAccessibleNode { position })
    }

    /// Plan a route, degrading to the direct path on failure.
    pub fn find_path(&self, start: Point3, end: Point3) -> RoutePlan {
        match self.plan(start, end) {
            Ok(plan) => plan,
            Err(err) => {
                let reason = match err {
                    Error::NoAccessibleNode { .. } => FallbackReason::NoAccessibleNode,
                    _ => FallbackReason::NoRouteFound,
                };
                warn!(start = %start, end = %end, error = %err, "falling back to direct path");
                RoutePlan {
                    path: Path::direct(start, end),
                    status: PlanStatus::Fallback { reason },
                    waypoints: Vec::new(),
                    start_floor: self.floor_of(start),
                    end_floor: self.floor_of(end),
                }
            }
        }
    }

    /// Plan a route, surfacing failures as errors.
    pub fn try_find_path(&self, start: Point3, end: Point3) -> Result<Path> {
        self.plan(start, end).map(|plan| plan.path)
    }

    /// Plan a route to a labelled office.
    pub fn find_path_to_office(&self, start: Point3, label: &str) -> Result<RoutePlan> {
        let office = self.graph.office_by_label(label)?;
        Ok(self.find_path(start, office.position))
    }

    fn plan(&self, start: Point3, end: Point3) -> Result<RoutePlan> {
        let start_node = self.nearest_accessible_node(start)?;
        let end_node = self.nearest_accessible_node(end)?;
        let start_floor = self.floor_of(start);
        let end_floor = self.floor_of(end);

        if start_node == end_node {
            return Ok(RoutePlan {
                path: Path::direct(start, end),
                status: PlanStatus::SameNode,
                waypoints: vec![start_node],
                start_floor,
                end_floor,
            });
        }

        let waypoints = if start_floor != end_floor {
            match self.splice(start, end, start_node, end_node, start_floor, end_floor) {
                Ok(route) => route,
                Err(err @ Error::MissingStairPair { .. }) => {
                    warn!(error = %err, "searching across floors without a stair splice");
                    self.search(start_node, end_node)?
                }
                Err(err) => return Err(err),
            }
        } else {
            self.search(start_node, end_node)?
        };

        let ramp_points = self.config.ramp_points.min(MAX_RAMP_POINTS);
        let mut points = Vec::with_capacity(waypoints.len() + ramp_points + 2);
        points.push(start);
        points.extend(splice::expand_with_ramps(
            &self.graph,
            &waypoints,
            self.floors.as_ref(),
            ramp_points,
        ));
        points.push(end);
        splice::dedup_coincident(&mut points);
        if points.len() < 2 {
            points = vec![start, end];
        }

        debug!(
            start_node,
            end_node,
            waypoints = waypoints.len(),
            points = points.len(),
            "planned route"
        );

        Ok(RoutePlan {
            path: Path::new(points),
            status: PlanStatus::Routed,
            waypoints,
            start_floor,
            end_floor,
        })
    }

    fn search(&self, start: NodeId, goal: NodeId) -> Result<Vec<NodeId>> {
        let cost = SearchCost {
            floors: self.floors.as_ref(),
            scorer: self.scorer.as_ref(),
            floor_penalty: self.config.floor_penalty,
            max_expansions: self.config.max_expansions,
        };
        find_route_a_star(&self.graph, start, goal, &cost)
    }

    fn splice(
        &self,
        start: Point3,
        end: Point3,
        start_node: NodeId,
        end_node: NodeId,
        start_floor: i32,
        end_floor: i32,
    ) -> Result<Vec<NodeId>> {
        let missing = || Error::MissingStairPair {
            start_floor,
            end_floor,
        };

        let start_stair = self.nearest_stairs(start, start_floor).ok_or_else(missing)?;
        let end_stair = self.nearest_stairs(end, end_floor).ok_or_else(missing)?;

        let to_stairs = self.search(start_node, start_stair)?;
        let between = match self.search(start_stair, end_stair) {
            Ok(route) => route,
            Err(Error::NoRouteFound { .. }) => return Err(missing()),
            Err(err) => return Err(err),
        };
        let from_stairs = self.search(end_stair, end_node)?;

        debug!(start_stair, end_stair, "spliced cross-floor route");

        let mut route = Vec::new();
        splice::concat_legs(&mut route, to_stairs);
        splice::concat_legs(&mut route, between);
        splice::concat_legs(&mut route, from_stairs);
        Ok(route)
    }

    fn nearest_stairs(&self, position: Point3, floor: i32) -> Option<NodeId> {
        self.index
            .nearest_matching(position, |id| {
                self.graph.node(id).is_some_and(|node| {
                    node.kind.is_stairs() && self.floor_of(node.position) == floor
                })
            })
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::FloorBands;
    use crate::graph::{GraphBuildOptions, GraphBuilder};
    use crate::test_helpers::{assert_close, corridor, office, stairs};
    use crate::waypoint::Waypoint;

    fn planner_for(waypoints: Vec<crate::waypoint::Waypoint>) -> PathPlanner {
        let oracle = VisibilityOracle::open();
        let graph = GraphBuilder::new(oracle.clone(), GraphBuildOptions::default())
            .build(waypoints)
            .expect("build");
        PathPlanner::new(
            graph,
            oracle,
            Arc::new(FloorBands::default()),
            PlannerConfig::default(),
        )
    }

    #[test]
    fn empty_graph_falls_back_to_direct_path() {
        let planner = planner_for(Vec::new());
        let start = Point3::new(0.0, 0.0, 0.0);
        let end = Point3::new(5.0, 0.0, 0.0);

        let plan = planner.find_path(start, end);
        assert_eq!(plan.path.points(), &[start, end]);
        assert_eq!(
            plan.status,
            PlanStatus::Fallback {
                reason: FallbackReason::NoAccessibleNode
            }
        );
        assert!(matches!(
            planner.try_find_path(start, end),
            Err(Error::NoAccessibleNode { .. })
        ));
    }

    #[test]
    fn nearest_node_prefers_same_floor() {
        let planner = planner_for(vec![
            corridor(1, 0.0, 3.0, 0.0),
            corridor(2, 4.0, 0.0, 0.0),
        ]);
        // Node 1 is closer in 3D but one floor up.
        let id = planner
            .nearest_accessible_node(Point3::new(0.0, 0.4, 0.0))
            .expect("resolved");
        assert_eq!(id, 2);
    }

    #[test]
    fn nearest_node_falls_back_to_other_floor() {
        let planner = planner_for(vec![corridor(1, 0.0, 3.0, 0.0)]);
        let id = planner
            .nearest_accessible_node(Point3::new(0.0, 0.0, 0.0))
            .expect("resolved");
        assert_eq!(id, 1);
    }

    #[test]
    fn coincident_waypoints_do_not_break_the_index() {
        let mut waypoints: Vec<_> = (1..=40).map(|id| corridor(id, 1.0, 0.0, 1.0)).collect();
        waypoints.push(corridor(41, 6.0, 0.0, 1.0));
        let planner = planner_for(waypoints);

        let id = planner
            .nearest_accessible_node(Point3::new(0.0, 0.0, 1.0))
            .expect("resolved");
        assert_eq!(id, 1);

        let plan = planner.find_path(Point3::new(1.0, 0.0, 1.0), Point3::new(6.0, 0.0, 1.0));
        assert_eq!(plan.status, PlanStatus::Routed);
        assert_eq!(plan.waypoints, vec![1, 41]);
    }

    #[test]
    fn disconnected_nodes_fall_back_with_reason() {
        let planner = planner_for(vec![
            corridor(1, 0.0, 0.0, 0.0),
            corridor(2, 30.0, 0.0, 0.0),
        ]);
        let plan = planner.find_path(Point3::new(0.0, 0.0, 0.0), Point3::new(30.0, 0.0, 0.0));
        assert!(plan.is_fallback());
        assert_eq!(plan.path.len(), 2);
    }

    #[test]
    fn routes_to_labelled_office() {
        let planner = planner_for(vec![
            corridor(1, 0.0, 0.0, 0.0),
            corridor(2, 5.0, 0.0, 0.0),
            office(3, 10.0, 0.0, 0.0, "Room 204"),
        ]);
        let plan = planner
            .find_path_to_office(Point3::new(0.0, 0.0, 0.0), "room 204")
            .expect("office known");
        assert_eq!(plan.status, PlanStatus::Routed);
        assert_close(plan.path.last().unwrap(), Point3::new(10.0, 0.0, 0.0));
        assert!(planner
            .find_path_to_office(Point3::default(), "Room 999")
            .is_err());
    }

    #[test]
    fn cross_floor_without_stairs_cascades_to_fallback() {
        let planner = planner_for(vec![
            corridor(1, 0.0, 0.0, 0.0),
            corridor(2, 0.0, 3.0, 0.0),
        ]);
        let plan = planner.find_path(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 3.0, 0.0));
        assert_eq!(
            plan.status,
            PlanStatus::Fallback {
                reason: FallbackReason::NoRouteFound
            }
        );
        assert!(plan.is_cross_floor());
    }

    #[test]
    fn cross_floor_route_walks_to_the_stairs_first() {
        let planner = planner_for(vec![
            corridor(1, -6.0, 0.0, 0.0),
            corridor(2, -3.0, 0.0, 0.0),
            stairs(3, 0.0, 0.0, 0.0, None),
            stairs(4, 0.0, 3.0, 0.0, None),
            corridor(5, 4.0, 3.0, 0.0),
        ]);
        let plan = planner.find_path(Point3::new(-6.0, 0.0, 0.0), Point3::new(4.0, 3.0, 0.0));

        assert_eq!(plan.status, PlanStatus::Routed);
        assert_eq!(plan.waypoints, vec![1, 2, 3, 4, 5]);
        // 5 waypoint points plus the default 12-point ramp; the query points
        // coincide with waypoints 1 and 5.
        assert_eq!(plan.path.len(), 5 + 12);
    }

    struct AvoidNode(NodeId);

    impl EdgeScorer for AvoidNode {
        fn penalty(&self, _from: &Waypoint, to: &Waypoint, _goal: NodeId) -> f64 {
            if to.id == self.0 {
                10.0
            } else {
                0.0
            }
        }
    }

    #[test]
    fn custom_scorer_steers_the_search() {
        let waypoints = vec![
            corridor(1, 0.0, 0.0, 0.0),
            corridor(2, 4.0, 0.0, 1.0),
            corridor(3, 4.0, 0.0, -2.0),
            corridor(4, 9.0, 0.0, 0.0),
        ];
        let start = Point3::new(0.0, 0.0, 0.0);
        let end = Point3::new(9.0, 0.0, 0.0);

        let shortest = planner_for(waypoints.clone()).find_path(start, end);
        assert_eq!(shortest.waypoints, vec![1, 2, 4]);

        let steered = planner_for(waypoints)
            .with_scorer(Arc::new(AvoidNode(2)))
            .find_path(start, end);
        assert_eq!(steered.status, PlanStatus::Routed);
        assert_eq!(steered.waypoints, vec![1, 3, 4]);
    }
}
