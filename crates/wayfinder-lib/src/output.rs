use std::fmt::Write;

use serde::Serialize;

use crate::geometry::Point3;
use crate::graph::Graph;
use crate::integrity::IntegrityReport;
use crate::path::Path;
use crate::planner::{PlanStatus, RoutePlan};
use crate::turns::{extract_turns, TurnConfig, TurnEvent};
use crate::waypoint::NodeId;

/// Presentation style for turning a summary into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Header, every point and every turn.
    PlainText,
    /// A single summary line.
    Compact,
}

/// Serialisable view of a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    #[serde(flatten)]
    pub status: PlanStatus,
    pub length: f64,
    pub start_floor: i32,
    pub end_floor: i32,
    pub waypoints: Vec<NodeId>,
    pub points: Vec<Point3>,
    pub turns: Vec<TurnEvent>,
}

impl RouteSummary {
    /// Summarise `plan`, extracting turns from the path it carries.
    pub fn from_plan(plan: &RoutePlan, turns: &TurnConfig) -> Self {
        Self::from_path(plan, &plan.path, turns)
    }

    /// Summarise `plan` using a post-processed replacement for its path.
    pub fn from_path(plan: &RoutePlan, path: &Path, turns: &TurnConfig) -> Self {
        Self {
            status: plan.status,
            length: path.length(),
            start_floor: plan.start_floor,
            end_floor: plan.end_floor,
            waypoints: plan.waypoints.clone(),
            points: path.points().to_vec(),
            turns: extract_turns(path, turns),
        }
    }

    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::Compact => self.render_compact(),
        }
    }

    fn floors(&self) -> String {
        if self.start_floor == self.end_floor {
            format!("floor {}", self.start_floor)
        } else {
            format!("floor {} -> {}", self.start_floor, self.end_floor)
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route: {:.2} m, {} points, {} ({})",
            self.length,
            self.points.len(),
            self.floors(),
            self.status
        );

        for (index, point) in self.points.iter().enumerate() {
            let _ = writeln!(buffer, "{index:>3}: {point}");
        }

        if self.turns.is_empty() {
            let _ = writeln!(buffer, "No turns.");
        } else {
            let _ = writeln!(buffer, "Turns:");
            for turn in &self.turns {
                let _ = writeln!(
                    buffer,
                    "  at point {:>3} {}: {} ({:+.0}°)",
                    turn.index, turn.position, turn.direction, turn.angle_degrees
                );
            }
        }
        buffer
    }

    fn render_compact(&self) -> String {
        format!(
            "{:.2} m, {} points, {} turns, {} ({})\n",
            self.length,
            self.points.len(),
            self.turns.len(),
            self.floors(),
            self.status
        )
    }
}

/// Serialisable view of a graph and its integrity findings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub offices: usize,
    pub stairs: usize,
    pub clean: bool,
    pub integrity: IntegrityReport,
}

impl GraphSummary {
    pub fn new(graph: &Graph, integrity: IntegrityReport) -> Self {
        Self {
            nodes: graph.len(),
            edges: graph.edge_count(),
            offices: graph.nodes().filter(|node| node.kind.is_office()).count(),
            stairs: graph.nodes().filter(|node| node.kind.is_stairs()).count(),
            clean: integrity.is_clean(),
            integrity,
        }
    }

    pub fn render(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Graph: {} nodes, {} edges ({} offices, {} stairs)",
            self.nodes, self.edges, self.offices, self.stairs
        );

        let report = &self.integrity;
        if self.clean {
            let _ = writeln!(buffer, "Integrity: clean");
        } else {
            let _ = writeln!(
                buffer,
                "Integrity: {} finding(s)",
                report.finding_count()
            );
        }
        for edge in &report.one_sided {
            let _ = writeln!(buffer, "  one-sided: {} -> {}", edge.from, edge.to);
        }
        for edge in &report.duplicates {
            let _ = writeln!(buffer, "  duplicate: {} -> {}", edge.from, edge.to);
        }
        for edge in &report.dangling {
            let _ = writeln!(buffer, "  dangling: {} -> {}", edge.from, edge.to);
        }
        for id in &report.self_edges {
            let _ = writeln!(buffer, "  self-edge: {id}");
        }
        if !report.orphans.is_empty() {
            let orphans = report
                .orphans
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(buffer, "  orphans: {orphans}");
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::EdgeRef;
    use crate::test_helpers::corridor;

    fn plan() -> RoutePlan {
        RoutePlan {
            path: Path::new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 5.0),
                Point3::new(5.0, 0.0, 5.0),
            ]),
            status: PlanStatus::Routed,
            waypoints: vec![1, 2, 3],
            start_floor: 0,
            end_floor: 0,
        }
    }

    #[test]
    fn summary_carries_turns_and_length() {
        let summary = RouteSummary::from_plan(&plan(), &TurnConfig::default());
        assert_eq!(summary.turns.len(), 1);
        assert!((summary.length - 10.0).abs() < 1e-9);

        let text = summary.render(RouteRenderMode::PlainText);
        assert!(text.starts_with("Route: 10.00 m, 3 points, floor 0 (routed)"));
        assert!(text.contains("turn right"));

        let compact = summary.render(RouteRenderMode::Compact);
        assert_eq!(compact, "10.00 m, 3 points, 1 turns, floor 0 (routed)\n");
    }

    #[test]
    fn summary_serialises_status_inline() {
        let summary = RouteSummary::from_plan(&plan(), &TurnConfig::default());
        let json = serde_json::to_value(&summary).expect("serialise");
        assert_eq!(json["status"], "routed");
        assert_eq!(json["turns"][0]["direction"], "right");
        assert_eq!(json["points"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn graph_summary_lists_findings() {
        let graph = Graph::from_waypoints(vec![
            corridor(1, 0.0, 0.0, 0.0).with_neighbors([2]),
            corridor(2, 1.0, 0.0, 0.0),
        ])
        .expect("graph");
        let report = IntegrityReport {
            one_sided: vec![EdgeRef { from: 1, to: 2 }],
            ..IntegrityReport::default()
        };
        let summary = GraphSummary::new(&graph, report);
        assert!(!summary.clean);
        let text = summary.render();
        assert!(text.contains("Graph: 2 nodes"));
        assert!(text.contains("one-sided: 1 -> 2"));
    }
}
