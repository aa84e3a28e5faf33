//! Line-of-sight queries against blocking geometry.
//!
//! A segment is visible when two independent tests both pass:
//!
//! 1. a single obstruction test along the whole segment, and
//! 2. a sweep of small spheres sampled along the segment, which catches thin or
//!    angled occluders that a single ray can slip past.
//!
//! Both endpoints are lifted by [`VisibilityConfig::height_offset`] first so
//! that the floor itself never counts as an occluder. Geometry is injected via
//! the [`BlockingGeometry`] trait; [`Obstacles`] is the box-based
//! implementation used by floor-plan files and tests.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::Point3;

const PARALLEL_EPSILON: f64 = 1e-12;

/// Densest sphere-sweep sampling honoured, in metres between samples.
pub const MIN_PROBE_SPACING: f64 = 0.01;

/// Per-waypoint sampling parameters for the sphere sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityProbe {
    /// Radius of each sampled sphere, in metres.
    pub radius: f64,
    /// Distance between consecutive samples, in metres.
    pub spacing: f64,
}

impl Default for VisibilityProbe {
    fn default() -> Self {
        Self {
            radius: 0.15,
            spacing: 0.5,
        }
    }
}

impl VisibilityProbe {
    /// Combine two probes into the stricter one: the wider radius and the
    /// denser spacing.
    pub fn tighter(&self, other: &Self) -> Self {
        Self {
            radius: self.radius.max(other.radius),
            spacing: self.spacing.min(other.spacing),
        }
    }
}

/// Scene geometry able to answer the two primitive occlusion queries.
pub trait BlockingGeometry: Send + Sync {
    /// Whether anything intersects the straight segment `from`-`to`.
    fn segment_blocked(&self, from: Point3, to: Point3) -> bool;

    /// Whether anything overlaps the sphere at `center` with `radius`.
    fn sphere_blocked(&self, center: Point3, radius: f64) -> bool;
}

/// Geometry with nothing in it. Every segment is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSpace;

impl BlockingGeometry for OpenSpace {
    fn segment_blocked(&self, _from: Point3, _to: Point3) -> bool {
        false
    }

    fn sphere_blocked(&self, _center: Point3, _radius: f64) -> bool {
        false
    }
}

/// Axis-aligned box, typically a wall segment or a pillar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Build a box from any two opposite corners.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Slab test for the segment `from`-`to`.
    pub fn intersects_segment(&self, from: Point3, to: Point3) -> bool {
        let origin = [from.x, from.y, from.z];
        let delta = [to.x - from.x, to.y - from.y, to.z - from.z];
        let min = [self.min.x, self.min.y, self.min.z];
        let max = [self.max.x, self.max.y, self.max.z];

        let mut t_enter = 0.0_f64;
        let mut t_exit = 1.0_f64;

        for axis in 0..3 {
            if delta[axis].abs() < PARALLEL_EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / delta[axis];
            let mut t1 = (min[axis] - origin[axis]) * inv;
            let mut t2 = (max[axis] - origin[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_enter = t_enter.max(t1);
            t_exit = t_exit.min(t2);
            if t_enter > t_exit {
                return false;
            }
        }

        true
    }

    /// Whether the sphere touches or penetrates the box.
    pub fn overlaps_sphere(&self, center: Point3, radius: f64) -> bool {
        let closest = Point3::new(
            center.x.clamp(self.min.x, self.max.x),
            center.y.clamp(self.min.y, self.max.y),
            center.z.clamp(self.min.z, self.max.z),
        );
        let dx = closest.x - center.x;
        let dy = closest.y - center.y;
        let dz = closest.z - center.z;
        dx * dx + dy * dy + dz * dz <= radius * radius
    }
}

/// Collection of box occluders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Obstacles {
    boxes: Vec<Aabb>,
}

impl Obstacles {
    pub fn new(boxes: Vec<Aabb>) -> Self {
        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl BlockingGeometry for Obstacles {
    fn segment_blocked(&self, from: Point3, to: Point3) -> bool {
        self.boxes.iter().any(|b| b.intersects_segment(from, to))
    }

    fn sphere_blocked(&self, center: Point3, radius: f64) -> bool {
        self.boxes.iter().any(|b| b.overlaps_sphere(center, radius))
    }
}

/// Settings shared by every visibility query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Vertical lift applied to both endpoints, in metres.
    pub height_offset: f64,
    /// Probe used by [`VisibilityOracle::is_visible`].
    pub default_probe: VisibilityProbe,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            height_offset: 1.0,
            default_probe: VisibilityProbe::default(),
        }
    }
}

/// Pure line-of-sight query over injected geometry.
#[derive(Clone)]
pub struct VisibilityOracle {
    geometry: Arc<dyn BlockingGeometry>,
    config: VisibilityConfig,
}

impl fmt::Debug for VisibilityOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityOracle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VisibilityOracle {
    pub fn new(geometry: Arc<dyn BlockingGeometry>, config: VisibilityConfig) -> Self {
        Self { geometry, config }
    }

    /// Oracle over empty space; every query succeeds.
    pub fn open() -> Self {
        Self::new(Arc::new(OpenSpace), VisibilityConfig::default())
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Visibility using the default probe.
    pub fn is_visible(&self, from: Point3, to: Point3) -> bool {
        self.is_visible_with(from, to, &self.config.default_probe)
    }

    /// Visibility using an explicit sampling probe.
    pub fn is_visible_with(&self, from: Point3, to: Point3, probe: &VisibilityProbe) -> bool {
        let a = from.raised(self.config.height_offset);
        let b = to.raised(self.config.height_offset);

        if self.geometry.segment_blocked(a, b) {
            trace!(from = %from, to = %to, "segment obstructed");
            return false;
        }

        if self.sweep_blocked(a, b, probe) {
            trace!(from = %from, to = %to, "sphere sweep obstructed");
            return false;
        }

        true
    }

    /// Sample interior points only: endpoints sit on waypoints, which are
    /// often placed close to walls, and the segment test already covers them.
    fn sweep_blocked(&self, a: Point3, b: Point3, probe: &VisibilityProbe) -> bool {
        if !(probe.radius > 0.0 && probe.spacing > 0.0) {
            return false;
        }

        let length = a.distance_to(&b);
        let steps = (length / probe.spacing.max(MIN_PROBE_SPACING)).ceil() as usize;
        (1..steps).any(|i| {
            let t = i as f64 / steps as f64;
            self.geometry.sphere_blocked(a.lerp(&b, t), probe.radius)
        })
    }
}
