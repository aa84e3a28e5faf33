// Test-only helpers for `wayfinder-lib` unit tests
#![allow(dead_code)]
use crate::geometry::Point3;
use crate::waypoint::{NodeId, NodeKind, Waypoint};

pub fn corridor(id: NodeId, x: f64, y: f64, z: f64) -> Waypoint {
    Waypoint::new(id, Point3::new(x, y, z), NodeKind::Corridor)
}

pub fn junction(id: NodeId, x: f64, y: f64, z: f64) -> Waypoint {
    Waypoint::new(id, Point3::new(x, y, z), NodeKind::Junction)
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

pub fn stairs(id: NodeId, x: f64, y: f64, z: f64, group: Option<&str>) -> Waypoint {
    Waypoint::new(
        id,
        Point3::new(x, y, z),
        NodeKind::Stairs {
            group: group.map(str::to_string),
        },
    )
}

/// Assert two points match within a small tolerance.
pub fn assert_close(actual: Point3, expected: Point3) {
    assert!(
        actual.distance_to(&expected) < 1e-6,
        "expected {expected}, got {actual}"
    );
}
