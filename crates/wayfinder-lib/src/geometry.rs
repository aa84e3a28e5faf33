//! Minimal 3D vector math shared by every component.
//!
//! The building is modelled with `y` as the vertical axis. "Planar" quantities
//! ignore `y` and work in the horizontal x/z plane.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cartesian position in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance in the horizontal plane, ignoring elevation.
    pub fn planar_distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Absolute elevation difference.
    pub fn vertical_distance_to(&self, other: &Self) -> f64 {
        (self.y - other.y).abs()
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Copy of this point lifted by `offset` along the vertical axis.
    pub fn raised(&self, offset: f64) -> Self {
        Self {
            y: self.y + offset,
            ..*self
        }
    }

    /// Horizontal displacement `(dx, dz)` from `self` to `other`.
    pub fn planar_delta(&self, other: &Self) -> (f64, f64) {
        (other.x - self.x, other.z - self.z)
    }

    /// Compass-style bearing in degrees from `self` to `other`.
    ///
    /// 0° faces +z and angles grow toward +x, so the result is directly
    /// comparable with a device heading.
    pub fn bearing_to(&self, other: &Self) -> f64 {
        let (dx, dz) = self.planar_delta(other);
        dx.atan2(dz).to_degrees()
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

/// Wrap an angle in degrees into the `(-180, 180]` range.
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut wrapped = angle % 360.0;
    if wrapped <= -180.0 {
        wrapped += 360.0;
    } else if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}
