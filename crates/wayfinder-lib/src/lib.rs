//! Wayfinder library entry points.
//!
//! This crate builds a waypoint graph for an indoor, multi-floor building from
//! authored waypoints and blocking geometry, plans routes between arbitrary
//! query points (splicing in stairs and ramps when floors differ), and turns
//! the resulting paths into turn-by-turn guidance. Higher-level consumers (the
//! CLI, host applications) should only depend on the items exported here.
//!

#![deny(warnings)]

pub mod error;
pub mod floor;
pub mod floorplan;
pub mod geometry;
pub mod graph;
pub mod integrity;
pub mod output;
pub mod path;
pub mod planner;
pub mod replan;
pub mod smoothing;
pub mod spatial;
pub mod turns;
pub mod visibility;
pub mod waypoint;

#[cfg(test)]
mod test_helpers;

pub use error::{Error, Result};
pub use floor::{FloorBands, FloorClassifier};
pub use floorplan::{FloorPlan, NavSettings};
pub use geometry::Point3;
pub use graph::{Graph, GraphBuildOptions, GraphBuilder};
pub use integrity::{EdgeRef, IntegrityReport};
pub use output::{GraphSummary, RouteRenderMode, RouteSummary};
pub use path::Path;
pub use planner::{
    EdgeScorer, FallbackReason, NoPreference, PathPlanner, PlanStatus, PlannerConfig, RoutePlan,
    RoutingPreferences, MAX_RAMP_POINTS,
};
pub use replan::{ReplanConfig, Replanner};
pub use smoothing::{smooth, SmoothingConfig};
pub use spatial::NodeIndex;
pub use turns::{
    extract_turns, Guidance, Instruction, TurnConfig, TurnDirection, TurnEvent, TurnTracker,
};
pub use visibility::{
    Aabb, BlockingGeometry, Obstacles, OpenSpace, VisibilityConfig, VisibilityOracle,
    VisibilityProbe, MIN_PROBE_SPACING,
};
pub use waypoint::{NodeId, NodeKind, Waypoint};
