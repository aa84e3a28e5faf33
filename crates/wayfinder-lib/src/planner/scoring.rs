//! Routing-preference penalties layered on top of geometric edge cost.

use serde::{Deserialize, Serialize};

use crate::waypoint::{NodeId, Waypoint};

/// Extra cost for stepping from `from` to `to` while heading for `goal`.
///
/// Positive values discourage the step, negative values encourage it. The
/// search clamps the combined step cost at zero.
pub trait EdgeScorer: Send + Sync {
    fn penalty(&self, from: &Waypoint, to: &Waypoint, goal: NodeId) -> f64;
}

/// Pure geometric routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreference;

impl EdgeScorer for NoPreference {
    fn penalty(&self, _from: &Waypoint, _to: &Waypoint, _goal: NodeId) -> f64 {
        0.0
    }
}

/// Keeps walkers in hallways and out of offices they are not visiting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingPreferences {
    /// Added when entering an office that is not the destination.
    pub office_penalty: f64,
    /// Subtracted when entering a corridor or junction.
    pub hallway_bonus: f64,
    /// Added on top of `office_penalty` for office-to-office shortcuts.
    pub office_to_office_penalty: f64,
}

impl Default for RoutingPreferences {
    fn default() -> Self {
        Self {
            office_penalty: 5.0,
            hallway_bonus: 1.0,
            office_to_office_penalty: 10.0,
        }
    }
}

impl EdgeScorer for RoutingPreferences {
    fn penalty(&self, from: &Waypoint, to: &Waypoint, goal: NodeId) -> f64 {
        let mut penalty = 0.0;
        if to.kind.is_office() && to.id != goal {
            penalty += self.office_penalty;
            if from.kind.is_office() {
                penalty += self.office_to_office_penalty;
            }
        }
        if to.kind.is_hallway() {
            penalty -= self.hallway_bonus;
        }
        penalty
    }
}
