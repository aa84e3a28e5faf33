#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use wayfinder_lib::{
    FloorBands, FloorPlan, GraphBuildOptions, GraphBuilder, NodeId, NodeKind, PathPlanner,
    PlannerConfig, Point3, VisibilityOracle, Waypoint,
};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn office_fixture() -> FloorPlan {
    let path = fixtures_dir().join("two_floor_office.json");
    FloorPlan::from_path(&path).expect("load fixture two_floor_office.json")
}

pub fn corridor(id: NodeId, x: f64, y: f64, z: f64) -> Waypoint {
    Waypoint::new(id, Point3::new(x, y, z), NodeKind::Corridor)
}

pub fn office(id: NodeId, x: f64, y: f64, z: f64, label: &str) -> Waypoint {
    Waypoint::new(
        id,
        Point3::new(x, y, z),
        NodeKind::Office {
            label: Some(label.to_string()),
        },
    )
}

pub fn stairs(id: NodeId, x: f64, y: f64, z: f64) -> Waypoint {
    Waypoint::new(id, Point3::new(x, y, z), NodeKind::Stairs { group: None })
}

/// Planner over open space with default settings.
pub fn open_planner(waypoints: Vec<Waypoint>) -> PathPlanner {
    planner_with(waypoints, VisibilityOracle::open(), PlannerConfig::default())
}

pub fn planner_with(
    waypoints: Vec<Waypoint>,
    oracle: VisibilityOracle,
    config: PlannerConfig,
) -> PathPlanner {
    let graph = GraphBuilder::new(oracle.clone(), GraphBuildOptions::default())
        .build(waypoints)
        .expect("graph builds");
    PathPlanner::new(graph, oracle, Arc::new(FloorBands::default()), config)
}

pub fn assert_close(actual: Point3, expected: Point3) {
    assert!(
        actual.distance_to(&expected) < 1e-6,
        "expected {expected}, got {actual}"
    );
}
