//! JSON floor-plan documents and the settings block they carry.
//!
//! A floor plan bundles everything needed to stand up a planner: the authored
//! waypoints, the box obstacles that block line of sight, and optional
//! navigation settings.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": 1, "position": { "x": 0.0, "y": 0.0, "z": 0.0 }, "kind": { "type": "corridor" } },
//!     { "id": 2, "position": { "x": 5.0, "y": 0.0, "z": 0.0 }, "kind": { "type": "office", "label": "Room 101" } }
//!   ],
//!   "obstacles": [ { "min": { "x": 2.0, "y": 0.0, "z": 1.0 }, "max": { "x": 3.0, "y": 3.0, "z": 4.0 } } ],
//!   "settings": { "planner": { "floor_penalty": 40.0 } }
//! }
//! ```

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::floor::FloorBands;
use crate::graph::{Graph, GraphBuildOptions, GraphBuilder};
use crate::planner::{PathPlanner, PlannerConfig, MAX_RAMP_POINTS};
use crate::replan::ReplanConfig;
use crate::smoothing::SmoothingConfig;
use crate::turns::TurnConfig;
use crate::visibility::{
    Obstacles, VisibilityConfig, VisibilityOracle, VisibilityProbe, MIN_PROBE_SPACING,
};
use crate::waypoint::Waypoint;

/// Every tunable of the navigation pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    pub visibility: VisibilityConfig,
    pub graph: GraphBuildOptions,
    pub planner: PlannerConfig,
    pub smoothing: SmoothingConfig,
    pub turns: TurnConfig,
    pub replan: ReplanConfig,
    pub floors: FloorBands,
}

impl NavSettings {
    /// Reject values that would make the pipeline misbehave silently.
    pub fn validate(&self) -> Result<()> {
        self.floors.validate()?;
        validate_probe(&self.visibility.default_probe, "visibility.default_probe")?;

        let positive = [
            (self.graph.floor_height_threshold, "graph.floor_height_threshold"),
            (self.graph.max_stair_horizontal, "graph.max_stair_horizontal"),
            (self.graph.stair_link_radius, "graph.stair_link_radius"),
            (self.turns.passed_threshold, "turns.passed_threshold"),
        ];
        for (value, field) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{field} must be a finite positive number")));
            }
        }

        let non_negative = [
            (self.visibility.height_offset, "visibility.height_offset"),
            (self.graph.stair_vertical_weight, "graph.stair_vertical_weight"),
            (self.planner.floor_penalty, "planner.floor_penalty"),
            (self.smoothing.max_vertical_spread, "smoothing.max_vertical_spread"),
            (self.turns.min_segment_length, "turns.min_segment_length"),
            (self.replan.min_distance, "replan.min_distance"),
            (self.replan.min_heading_change, "replan.min_heading_change"),
        ];
        for (value, field) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{field} must be a finite non-negative number")));
            }
        }

        if self.planner.ramp_points > MAX_RAMP_POINTS {
            return Err(invalid(format!(
                "planner.ramp_points must not exceed {MAX_RAMP_POINTS}, got {}",
                self.planner.ramp_points
            )));
        }
        if self.planner.max_expansions == 0 {
            return Err(invalid("planner.max_expansions must be at least 1".to_string()));
        }
        if !(0.0..1.0).contains(&self.smoothing.max_shortcut_gain) {
            return Err(invalid(format!(
                "smoothing.max_shortcut_gain must be in [0, 1), got {}",
                self.smoothing.max_shortcut_gain
            )));
        }
        if self.turns.straight_threshold > self.turns.uturn_threshold {
            return Err(invalid(
                "turns.straight_threshold must not exceed turns.uturn_threshold".to_string(),
            ));
        }
        if !(self.turns.slight_angle <= self.turns.turn_angle
            && self.turns.turn_angle <= self.turns.reverse_angle)
        {
            return Err(invalid(
                "turns.slight_angle, turns.turn_angle and turns.reverse_angle must be ascending"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_probe(probe: &VisibilityProbe, field: &str) -> Result<()> {
    if !probe.radius.is_finite() || probe.radius <= 0.0 {
        return Err(invalid(format!("{field}.radius must be a finite positive number")));
    }
    if !probe.spacing.is_finite() || probe.spacing < MIN_PROBE_SPACING {
        return Err(invalid(format!(
            "{field}.spacing must be at least {MIN_PROBE_SPACING} m, got {}",
            probe.spacing
        )));
    }
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::InvalidSettings { message }
}

/// Authored building description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub nodes: Vec<Waypoint>,
    #[serde(default, skip_serializing_if = "Obstacles::is_empty")]
    pub obstacles: Obstacles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<NavSettings>,
}

impl FloorPlan {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let plan = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            nodes = plan.nodes.len(),
            obstacles = plan.obstacles.len(),
            "loaded floor plan"
        );
        Ok(plan)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let plan: FloorPlan = serde_json::from_reader(reader)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_reader(json.as_bytes())
    }

    /// Check ids, coordinates and the settings block.
    pub fn validate(&self) -> Result<()> {
        let mut ids: Vec<_> = self.nodes.iter().map(|node| node.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::DuplicateNodeId { id: pair[0] });
        }

        for node in &self.nodes {
            let position = node.position;
            if !(position.x.is_finite() && position.y.is_finite() && position.z.is_finite()) {
                return Err(invalid(format!("waypoint {} has a non-finite position", node.id)));
            }
            if !node.connection_distance.is_finite() || node.connection_distance < 0.0 {
                return Err(invalid(format!(
                    "waypoint {} has an invalid connection_distance",
                    node.id
                )));
            }
            validate_probe(&node.probe, &format!("waypoint {} probe", node.id))?;
        }

        self.settings().validate()
    }

    /// The settings block, or defaults when the document has none.
    pub fn settings(&self) -> NavSettings {
        self.settings.unwrap_or_default()
    }

    pub fn oracle(&self) -> VisibilityOracle {
        VisibilityOracle::new(
            Arc::new(self.obstacles.clone()),
            self.settings().visibility,
        )
    }

    /// The waypoints with their neighbour lists as authored.
    pub fn authored_graph(&self) -> Result<Graph> {
        Graph::from_waypoints(self.nodes.iter().cloned())
    }

    /// Recompute connectivity from geometry.
    pub fn build_graph(&self) -> Result<Graph> {
        GraphBuilder::new(self.oracle(), self.settings().graph).build(self.nodes.iter().cloned())
    }

    /// Build a graph and wrap it in a planner configured from the settings.
    pub fn planner(&self) -> Result<PathPlanner> {
        self.planner_with(self.settings().planner)
    }

    /// As [`planner`](Self::planner) but with an explicit planner config,
    /// e.g. one adjusted by command-line flags.
    pub fn planner_with(&self, config: PlannerConfig) -> Result<PathPlanner> {
        let settings = self.settings();
        let graph = self.build_graph()?;
        Ok(PathPlanner::new(
            graph,
            self.oracle(),
            Arc::new(settings.floors),
            config,
        ))
    }

    /// Copy of this plan with its nodes replaced by the graph's waypoints.
    pub fn with_graph(&self, graph: &Graph) -> Self {
        Self {
            nodes: graph.to_waypoints(),
            ..self.clone()
        }
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path)?;
        self.to_writer(&mut file)?;
        file.write_all(b"\n")?;
        Ok(())
    }
}
