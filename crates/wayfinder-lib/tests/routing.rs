mod common;

use std::sync::Arc;

use common::{assert_close, corridor, office, open_planner, planner_with, stairs};
use wayfinder_lib::{
    Aabb, Error, Obstacles, PlanStatus, PlannerConfig, Point3, VisibilityConfig,
    VisibilityOracle,
};

#[test]
fn chain_routes_through_the_middle_waypoint() {
    let planner = open_planner(vec![
        corridor(1, 0.0, 0.0, 0.0),
        corridor(2, 5.0, 0.0, 0.0),
        corridor(3, 10.0, 0.0, 0.0),
    ]);
    assert!(!planner.graph().node(1).expect("A").is_linked_to(3));

    let plan = planner.find_path(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0));
    assert_eq!(plan.status, PlanStatus::Routed);
    assert_eq!(plan.waypoints, vec![1, 2, 3]);

    let points = plan.path.points();
    assert_eq!(points.len(), 3);
    assert_close(points[0], Point3::new(0.0, 0.0, 0.0));
    assert_close(points[1], Point3::new(5.0, 0.0, 0.0));
    assert_close(points[2], Point3::new(10.0, 0.0, 0.0));
    assert!((plan.path.length() - 10.0).abs() < 1e-9);
}

#[test]
fn same_resolved_node_returns_both_query_points() {
    let planner = open_planner(vec![corridor(1, 0.0, 0.0, 0.0), corridor(2, 6.0, 0.0, 0.0)]);
    let x = Point3::new(0.0, 0.0, 0.0);

    let plan = planner.find_path(x, x);
    assert_eq!(plan.status, PlanStatus::SameNode);
    assert_eq!(plan.path.points(), &[x, x]);
}

#[test]
fn stair_ramp_climbs_monotonically() {
    let planner = open_planner(vec![
        stairs(1, 0.0, 0.0, 0.0),
        stairs(2, 0.0, 3.0, 0.0),
        stairs(3, 0.0, 0.0, 10.0),
        stairs(4, 0.0, 3.0, 10.0),
    ]);

    let plan = planner.find_path(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 3.0, 0.0));
    assert_eq!(plan.status, PlanStatus::Routed);
    assert!(plan.is_cross_floor());
    assert_eq!(plan.waypoints, vec![1, 2]);

    let heights: Vec<f64> = plan.path.points().iter().map(|point| point.y).collect();
    assert_eq!(heights.first().copied(), Some(0.0));
    assert_eq!(heights.last().copied(), Some(3.0));
    assert!(
        heights.windows(2).all(|pair| pair[1] >= pair[0]),
        "heights not monotonic: {heights:?}"
    );

    let climbing = heights
        .windows(2)
        .filter(|pair| pair[1] > pair[0])
        .count();
    assert_eq!(climbing, PlannerConfig::default().ramp_points + 1);
}

#[test]
fn preferences_keep_walkers_in_the_corridor() {
    // Office 3 sits marginally off the straight line; the corridor detour is
    // only slightly longer.
    let waypoints = vec![
        corridor(1, 0.0, 0.0, 0.0),
        office(3, 5.0, 0.0, 0.5, "Storage"),
        corridor(4, 5.0, 0.0, -0.8),
        corridor(2, 10.0, 0.0, 0.0),
    ];
    let start = Point3::new(0.0, 0.0, 0.0);
    let end = Point3::new(10.0, 0.0, 0.0);

    let geometric = planner_with(
        waypoints.clone(),
        VisibilityOracle::open(),
        PlannerConfig {
            preferences: None,
            ..PlannerConfig::default()
        },
    );
    let with_preferences = open_planner(waypoints);

    // Waypoints 1 and 2 are 10 m apart, beyond the default link distance.
    assert_eq!(geometric.find_path(start, end).waypoints, vec![1, 3, 2]);
    assert_eq!(with_preferences.find_path(start, end).waypoints, vec![1, 4, 2]);
}

#[test]
fn walls_force_a_detour() {
    let wall = Aabb::new(Point3::new(4.0, 0.0, -1.0), Point3::new(6.0, 3.0, 2.0));
    let oracle = VisibilityOracle::new(
        Arc::new(Obstacles::new(vec![wall])),
        VisibilityConfig::default(),
    );
    let planner = planner_with(
        vec![
            corridor(1, 0.0, 0.0, 0.0),
            corridor(2, 8.0, 0.0, 0.0),
            corridor(3, 3.0, 0.0, 3.0),
            corridor(4, 7.0, 0.0, 3.0),
        ],
        oracle,
        PlannerConfig::default(),
    );

    assert!(!planner.graph().node(1).expect("node").is_linked_to(2));
    let plan = planner.find_path(Point3::new(0.0, 0.0, 0.0), Point3::new(8.0, 0.0, 0.0));
    assert_eq!(plan.waypoints, vec![1, 3, 4, 2]);
}

#[test]
fn office_labels_resolve_with_suggestions() {
    let planner = open_planner(vec![
        corridor(1, 0.0, 0.0, 0.0),
        office(2, 4.0, 0.0, 0.0, "Room 101"),
        office(3, 0.0, 0.0, 4.0, "Reception"),
    ]);

    let plan = planner
        .find_path_to_office(Point3::new(0.0, 0.0, 0.0), "RECEPTION")
        .expect("label matches case-insensitively");
    assert_close(plan.path.last().expect("end"), Point3::new(0.0, 0.0, 4.0));

    let err = planner
        .find_path_to_office(Point3::new(0.0, 0.0, 0.0), "Room 10l")
        .expect_err("misspelt label");
    match &err {
        Error::UnknownOffice { suggestions, .. } => {
            assert_eq!(suggestions.first().map(String::as_str), Some("Room 101"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Did you mean 'Room 101'?"));
}

#[test]
fn fixture_routes_upstairs_to_an_office() {
    let fixture = common::office_fixture();
    let planner = fixture.planner().expect("planner");

    let plan = planner
        .find_path_to_office(Point3::new(0.0, 0.0, 0.0), "Room 201")
        .expect("office exists");
    assert_eq!(plan.status, PlanStatus::Routed);
    assert_eq!((plan.start_floor, plan.end_floor), (0, 1));

    let stairs_at = |id| {
        plan.waypoints
            .iter()
            .position(|&waypoint| waypoint == id)
            .expect("route uses the east stairs")
    };
    assert_eq!(stairs_at(21), stairs_at(20) + 1);
    assert_close(plan.path.last().expect("end"), Point3::new(10.0, 3.0, 4.0));
}
