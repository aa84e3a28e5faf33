//! Conservative shortcutting of planned paths.
//!
//! Post-processes a planned path by dropping interior points that the walker
//! can see past, but only when the shortcut saves little distance. Big savings
//! usually mean the shortcut hugs a wall corner that the waypoint graph was
//! deliberately routing around.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::path::Path;
use crate::visibility::VisibilityOracle;

/// Configuration for path smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Smoothing is opt-in.
    pub enabled: bool,
    /// Number of sweeps over the path.
    pub passes: usize,
    /// Largest fraction of the two-segment length a shortcut may save.
    pub max_shortcut_gain: f64,
    /// Triples spanning more elevation than this are left alone so ramps
    /// survive.
    pub max_vertical_spread: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            passes: 2,
            max_shortcut_gain: 0.10,
            max_vertical_spread: 0.25,
        }
    }
}

/// Return a smoothed copy of `path`. Endpoints are always kept.
pub fn smooth(path: &Path, oracle: &VisibilityOracle, config: &SmoothingConfig) -> Path {
    if !config.enabled || path.len() < 3 {
        return path.clone();
    }

    let mut points = path.points().to_vec();
    let mut removed = 0usize;

    for _ in 0..config.passes {
        let before = points.len();
        let mut i = 0;
        while i + 2 < points.len() {
            let (a, b, c) = (points[i], points[i + 1], points[i + 2]);

            let low = a.y.min(b.y).min(c.y);
            let high = a.y.max(b.y).max(c.y);
            let flat = high - low <= config.max_vertical_spread;

            let detour = a.distance_to(&b) + b.distance_to(&c);
            let direct = a.distance_to(&c);
            let modest = direct >= (1.0 - config.max_shortcut_gain) * detour;

            if flat && modest && oracle.is_visible(a, c) {
                points.remove(i + 1);
            } else {
                i += 1;
            }
        }

        removed += before - points.len();
        if points.len() == before {
            break;
        }
    }

    debug!(removed, remaining = points.len(), "smoothed path");
    Path::new(points)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::Point3;
    use crate::visibility::{Aabb, Obstacles, VisibilityConfig};

    fn enabled() -> SmoothingConfig {
        SmoothingConfig {
            enabled: true,
            ..SmoothingConfig::default()
        }
    }

    #[test]
    fn disabled_by_default() {
        let path = Path::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.1),
            Point3::new(10.0, 0.0, 0.0),
        ]);
        let smoothed = smooth(&path, &VisibilityOracle::open(), &SmoothingConfig::default());
        assert_eq!(smoothed, path);
    }

    #[test]
    fn removes_nearly_straight_kinks() {
        let path = Path::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.5),
            Point3::new(10.0, 0.0, 0.0),
        ]);
        let smoothed = smooth(&path, &VisibilityOracle::open(), &enabled());
        assert_eq!(
            smoothed.points(),
            &[Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn keeps_corners_that_save_too_much() {
        let path = Path::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 5.0),
        ]);
        let smoothed = smooth(&path, &VisibilityOracle::open(), &enabled());
        assert_eq!(smoothed.len(), 3);
    }

    #[test]
    fn never_shortcuts_through_walls() {
        let wall = Aabb::new(Point3::new(4.9, 0.0, -0.2), Point3::new(5.1, 3.0, 0.3));
        let oracle = VisibilityOracle::new(
            Arc::new(Obstacles::new(vec![wall])),
            VisibilityConfig::default(),
        );
        let path = Path::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 1.0),
            Point3::new(10.0, 0.0, 0.0),
        ]);
        let smoothed = smooth(&path, &oracle, &enabled());
        assert_eq!(smoothed.len(), 3);
    }

    #[test]
    fn ramps_are_left_intact() {
        let path = Path::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 2.0, 2.0),
            Point3::new(0.0, 3.0, 3.0),
        ]);
        let smoothed = smooth(&path, &VisibilityOracle::open(), &enabled());
        assert_eq!(smoothed.len(), 4);
    }
}
