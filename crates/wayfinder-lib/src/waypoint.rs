use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;
use crate::visibility::VisibilityProbe;

/// Numeric identifier for a waypoint.
pub type NodeId = u32;

/// Default maximum planar distance over which a waypoint will link to another.
pub const DEFAULT_CONNECTION_DISTANCE: f64 = 8.0;

/// Role of a waypoint in the building, with the fields specific to each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Office {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Corridor,
    Junction,
    Stairs {
        /// Stairwell identifier used to pair the right flights when several
        /// staircases overlap horizontally.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
}

impl NodeKind {
    pub fn is_stairs(&self) -> bool {
        matches!(self, NodeKind::Stairs { .. })
    }

    pub fn is_office(&self) -> bool {
        matches!(self, NodeKind::Office { .. })
    }

    /// Corridors and junctions are the walkways routes should prefer.
    pub fn is_hallway(&self) -> bool {
        matches!(self, NodeKind::Corridor | NodeKind::Junction)
    }

    /// Office label, if this is a labelled office.
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::Office { label } => label.as_deref(),
            _ => None,
        }
    }

    /// Stair-group identifier, if this is a grouped staircase.
    pub fn stair_group(&self) -> Option<&str> {
        match self {
            NodeKind::Stairs { group } => group.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            NodeKind::Office { .. } => "office",
            NodeKind::Corridor => "corridor",
            NodeKind::Junction => "junction",
            NodeKind::Stairs { .. } => "stairs",
        };
        f.write_str(value)
    }
}

/// Fixed point of the building graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: NodeId,
    pub position: Point3,
    pub kind: NodeKind,
    /// Ids of directly walkable neighbours. Kept as a list so that duplicate
    /// entries in authored data stay visible to integrity checks.
    #[serde(default)]
    pub neighbors: Vec<NodeId>,
    /// Maximum planar distance this waypoint will link over.
    #[serde(default = "default_connection_distance")]
    pub connection_distance: f64,
    /// Sampling parameters used when testing visibility from this waypoint.
    #[serde(default)]
    pub probe: VisibilityProbe,
}

fn default_connection_distance() -> f64 {
    DEFAULT_CONNECTION_DISTANCE
}

impl Waypoint {
    /// Create an unlinked waypoint with default connection parameters.
    pub fn new(id: NodeId, position: Point3, kind: NodeKind) -> Self {
        Self {
            id,
            position,
            kind,
            neighbors: Vec::new(),
            connection_distance: DEFAULT_CONNECTION_DISTANCE,
            probe: VisibilityProbe::default(),
        }
    }

    pub fn with_connection_distance(mut self, distance: f64) -> Self {
        self.connection_distance = distance;
        self
    }

    pub fn with_probe(mut self, probe: VisibilityProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = NodeId>) -> Self {
        self.neighbors = neighbors.into_iter().collect();
        self
    }

    pub fn is_linked_to(&self, other: NodeId) -> bool {
        self.neighbors.contains(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_deserializes_from_tagged_json() {
        let kind: NodeKind =
            serde_json::from_str(r#"{"type":"office","label":"Room 101"}"#).expect("parse");
        assert_eq!(kind.label(), Some("Room 101"));

        let kind: NodeKind = serde_json::from_str(r#"{"type":"stairs"}"#).expect("parse");
        assert!(kind.is_stairs());
        assert_eq!(kind.stair_group(), None);
    }

    #[test]
    fn waypoint_defaults_fill_missing_fields() {
        let waypoint: Waypoint = serde_json::from_str(
            r#"{"id":7,"position":{"x":1.0,"y":0.0,"z":2.0},"kind":{"type":"corridor"}}"#,
        )
        .expect("parse");
        assert!(waypoint.neighbors.is_empty());
        assert_eq!(waypoint.connection_distance, DEFAULT_CONNECTION_DISTANCE);
        assert_eq!(waypoint.probe, VisibilityProbe::default());
    }
}
