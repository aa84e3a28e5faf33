//! Floor classification for arbitrary positions.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Point3;

/// Maps a position to the floor it belongs to.
///
/// Implemented for plain closures so hosts can plug in building-specific
/// rules (split levels, mezzanines) without a wrapper type.
pub trait FloorClassifier: Send + Sync {
    fn floor_of(&self, position: Point3) -> i32;
}

impl<F> FloorClassifier for F
where
    F: Fn(Point3) -> i32 + Send + Sync,
{
    fn floor_of(&self, position: Point3) -> i32 {
        self(position)
    }
}

/// Uniform floor slabs stacked from a base elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorBands {
    /// Elevation of the ground floor, in metres.
    pub base_elevation: f64,
    /// Storey height, in metres.
    pub floor_height: f64,
    /// Tolerance below a floor plane still counted as that floor. Absorbs
    /// tracking noise when a query point dips under the slab.
    pub slack: f64,
}

impl Default for FloorBands {
    fn default() -> Self {
        Self {
            base_elevation: 0.0,
            floor_height: 3.0,
            slack: 0.5,
        }
    }
}

impl FloorBands {
    pub fn validate(&self) -> Result<()> {
        if self.floor_height <= 0.0 {
            return Err(Error::InvalidSettings {
                message: format!("floor_height must be positive, got {}", self.floor_height),
            });
        }
        if self.slack < 0.0 || self.slack >= self.floor_height {
            return Err(Error::InvalidSettings {
                message: format!(
                    "slack must be in [0, floor_height), got {} (floor_height {})",
                    self.slack, self.floor_height
                ),
            });
        }
        Ok(())
    }
}

impl FloorClassifier for FloorBands {
    fn floor_of(&self, position: Point3) -> i32 {
        ((position.y - self.base_elevation + self.slack) / self.floor_height).floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_classify_by_elevation() {
        let bands = FloorBands::default();
        assert_eq!(bands.floor_of(Point3::new(0.0, 0.0, 0.0)), 0);
        assert_eq!(bands.floor_of(Point3::new(0.0, -0.3, 0.0)), 0);
        assert_eq!(bands.floor_of(Point3::new(0.0, 2.4, 0.0)), 0);
        assert_eq!(bands.floor_of(Point3::new(0.0, 3.0, 0.0)), 1);
        assert_eq!(bands.floor_of(Point3::new(0.0, 6.1, 0.0)), 2);
        assert_eq!(bands.floor_of(Point3::new(0.0, -3.0, 0.0)), -1);
    }

    #[test]
    fn closures_are_classifiers() {
        let split = |p: Point3| if p.x > 10.0 { 1 } else { 0 };
        assert_eq!(split.floor_of(Point3::new(11.0, 0.0, 0.0)), 1);
        assert_eq!(split.floor_of(Point3::new(1.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn invalid_bands_are_rejected() {
        let bands = FloorBands {
            floor_height: 0.0,
            ..FloorBands::default()
        };
        assert!(bands.validate().is_err());
        assert!(FloorBands::default().validate().is_ok());
    }
}
