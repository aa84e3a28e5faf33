use thiserror::Error;

use crate::geometry::Point3;
use crate::waypoint::NodeId;

/// Convenient result alias for the wayfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No waypoint could be resolved for a query position, even after relaxing
    /// the floor and visibility requirements.
    #[error("no accessible waypoint near {position}")]
    NoAccessibleNode { position: Point3 },

    /// Raised when the search exhausted its open set or hit the expansion cap.
    #[error("no route found between waypoint {start} and waypoint {goal}")]
    NoRouteFound { start: NodeId, goal: NodeId },

    /// Raised when a cross-floor request has no usable staircase on one side.
    #[error("no stair pair connects floor {start_floor} to floor {end_floor}")]
    MissingStairPair { start_floor: i32, end_floor: i32 },

    /// Raised when a waypoint identifier is not part of the graph.
    #[error("unknown waypoint id {id}")]
    UnknownNode { id: NodeId },

    /// Raised when a floor plan declares the same waypoint id twice.
    #[error("duplicate waypoint id {id} in floor plan")]
    DuplicateNodeId { id: NodeId },

    /// Raised when an office label could not be matched to a waypoint.
    #[error("unknown office: {name}{}", format_suggestions(.suggestions))]
    UnknownOffice {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when navigation settings fail validation.
    #[error("invalid navigation settings: {message}")]
    InvalidSettings { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for floor-plan JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_office_lists_single_suggestion() {
        let error = Error::UnknownOffice {
            name: "Room 10".to_string(),
            suggestions: vec!["Room 101".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "unknown office: Room 10. Did you mean 'Room 101'?"
        );
    }

    #[test]
    fn unknown_office_without_suggestions_is_plain() {
        let error = Error::UnknownOffice {
            name: "Vault".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(error.to_string(), "unknown office: Vault");
    }
}
