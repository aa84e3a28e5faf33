//! Debounced re-planning while the walker moves.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{normalize_degrees, Point3};
use crate::planner::{PathPlanner, RoutePlan};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplanConfig {
    /// Minimum time between two re-plans.
    #[serde(with = "duration_secs")]
    pub min_interval: Duration,
    /// Movement that justifies a re-plan, in metres.
    pub min_distance: f64,
    /// Heading change that justifies a re-plan, in degrees.
    pub min_heading_change: f64,
}

impl Default for ReplanConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            min_distance: 0.5,
            min_heading_change: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    at: Duration,
    position: Point3,
    heading: f64,
}

/// Decides when a live position update warrants a fresh route.
///
/// Time is supplied by the caller as a [`Duration`] since any fixed epoch.
#[derive(Debug, Clone, Default)]
pub struct Replanner {
    config: ReplanConfig,
    baseline: Option<Baseline>,
}

impl Replanner {
    pub fn new(config: ReplanConfig) -> Self {
        Self {
            config,
            baseline: None,
        }
    }

    /// Returns `true` when a re-plan is due and records the new baseline.
    pub fn should_replan(&mut self, now: Duration, position: Point3, heading: f64) -> bool {
        let due = match self.baseline {
            None => true,
            Some(last) => {
                let elapsed = now.saturating_sub(last.at);
                let moved = position.distance_to(&last.position);
                let turned = normalize_degrees(heading - last.heading).abs();
                elapsed >= self.config.min_interval
                    && (moved >= self.config.min_distance
                        || turned >= self.config.min_heading_change)
            }
        };

        if due {
            self.baseline = Some(Baseline {
                at: now,
                position,
                heading,
            });
        }
        due
    }

    /// Make the next [`should_replan`](Self::should_replan) call succeed.
    pub fn force(&mut self) {
        self.baseline = None;
    }

    /// Plan from `position` to `goal` if a re-plan is due.
    pub fn replan(
        &mut self,
        now: Duration,
        position: Point3,
        heading: f64,
        planner: &PathPlanner,
        goal: Point3,
    ) -> Option<RoutePlan> {
        if !self.should_replan(now, position, heading) {
            return None;
        }
        debug!(position = %position, goal = %goal, "re-planning");
        Some(planner.find_path(position, goal))
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}
