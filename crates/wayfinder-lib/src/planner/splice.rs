//! Turning waypoint sequences into point sequences, with ramps at floor changes.

use crate::floor::FloorClassifier;
use crate::geometry::Point3;
use crate::graph::Graph;
use crate::waypoint::NodeId;

/// Consecutive points closer than this are treated as the same point.
const COINCIDENT_EPSILON: f64 = 1e-6;

/// Append `leg` to `route`, dropping the boundary node the two share.
pub(crate) fn concat_legs(route: &mut Vec<NodeId>, leg: Vec<NodeId>) {
    let mut leg = leg.into_iter().peekable();
    if route.last().is_some() && route.last() == leg.peek() {
        leg.next();
    }
    route.extend(leg);
}

/// Positions of `nodes`, with `ramp_points` interpolated points inserted
/// between every consecutive pair that sits on different floors.
pub(crate) fn expand_with_ramps(
    graph: &Graph,
    nodes: &[NodeId],
    floors: &dyn FloorClassifier,
    ramp_points: usize,
) -> Vec<Point3> {
    let positions: Vec<Point3> = nodes
        .iter()
        .filter_map(|id| graph.node(*id).map(|node| node.position))
        .collect();

    let mut points = Vec::with_capacity(positions.len() + ramp_points);
    for (index, position) in positions.iter().enumerate() {
        if let Some(previous) = index.checked_sub(1).map(|i| positions[i]) {
            if floors.floor_of(previous) != floors.floor_of(*position) {
                points.extend(ramp(previous, *position, ramp_points));
            }
        }
        points.push(*position);
    }
    points
}

/// Interior points of a straight ramp from `from` to `to`, endpoints excluded.
pub(crate) fn ramp(from: Point3, to: Point3, count: usize) -> impl Iterator<Item = Point3> {
    let divisions = (count + 1) as f64;
    (1..=count).map(move |step| from.lerp(&to, step as f64 / divisions))
}

/// Collapse runs of coincident points, e.g. a query point placed exactly on
/// its resolved waypoint.
pub(crate) fn dedup_coincident(points: &mut Vec<Point3>) {
    points.dedup_by(|current, previous| current.distance_to(previous) < COINCIDENT_EPSILON);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::FloorBands;
    use crate::test_helpers::{corridor, stairs};

    #[test]
    fn legs_share_boundary_nodes_once() {
        let mut route = vec![1, 2, 3];
        concat_legs(&mut route, vec![3, 4]);
        concat_legs(&mut route, vec![4]);
        concat_legs(&mut route, vec![7, 8]);
        assert_eq!(route, vec![1, 2, 3, 4, 7, 8]);
    }

    #[test]
    fn floor_change_inserts_ramp() {
        let graph = Graph::from_waypoints(vec![
            corridor(1, -2.0, 0.0, 0.0),
            stairs(2, 0.0, 0.0, 0.0, None),
            stairs(3, 0.0, 3.0, 0.0, None),
        ])
        .expect("graph");

        let points = expand_with_ramps(&graph, &[1, 2, 3], &FloorBands::default(), 5);
        assert_eq!(points.len(), 3 + 5);
        assert_eq!(points[2], Point3::new(0.0, 0.5, 0.0));
        assert!(points[1..]
            .windows(2)
            .all(|pair| pair[1].y > pair[0].y));
    }

    #[test]
    fn coincident_points_collapse() {
        let mut points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        dedup_coincident(&mut points);
        assert_eq!(points.len(), 2);
    }
}
