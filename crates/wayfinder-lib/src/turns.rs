//! Turn events and live turn-by-turn guidance.
//!
//! Angles are measured in the horizontal x/z plane. The signed turn angle at a
//! vertex has the sign of the 2D cross product `in.x * out.z - in.z * out.x`:
//! positive is a left turn, negative a right turn (x east, z north, seen from
//! above). Live headings use the compass convention of
//! [`Point3::bearing_to`]: 0° faces +z and angles grow clockwise.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{normalize_degrees, Point3};
use crate::path::Path;

/// Thresholds for turn extraction and live guidance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Vertex angles below this are not turns, in degrees.
    pub straight_threshold: f64,
    /// Vertex angles above this are U-turns, in degrees.
    pub uturn_threshold: f64,
    /// Vertices next to a shorter segment are ignored, in metres.
    pub min_segment_length: f64,
    /// A turn counts as passed once the walker is this close, in metres.
    pub passed_threshold: f64,
    /// Heading offsets from here up are "slight" turns, in degrees.
    pub slight_angle: f64,
    /// Heading offsets from here up are full turns, in degrees.
    pub turn_angle: f64,
    /// Heading offsets from here up mean "turn around", in degrees.
    pub reverse_angle: f64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            straight_threshold: 30.0,
            uturn_threshold: 150.0,
            min_segment_length: 0.2,
            passed_threshold: 1.5,
            slight_angle: 20.0,
            turn_angle: 45.0,
            reverse_angle: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
    UTurn,
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TurnDirection::Left => "turn left",
            TurnDirection::Right => "turn right",
            TurnDirection::UTurn => "make a U-turn",
        };
        f.write_str(value)
    }
}

/// Direction change at one vertex of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Index of the vertex in the path.
    pub index: usize,
    pub position: Point3,
    pub direction: TurnDirection,
    /// Signed vertex angle in degrees, positive for left turns.
    pub angle_degrees: f64,
}

/// Extract turn events from a path. Paths shorter than three points have none.
pub fn extract_turns(path: &Path, config: &TurnConfig) -> Vec<TurnEvent> {
    let points = path.points();
    if points.len() < 3 {
        return Vec::new();
    }

    let mut events = Vec::new();
    for index in 1..points.len() - 1 {
        let (prev, vertex, next) = (points[index - 1], points[index], points[index + 1]);
        let (in_x, in_z) = prev.planar_delta(&vertex);
        let (out_x, out_z) = vertex.planar_delta(&next);

        if in_x.hypot(in_z) < config.min_segment_length
            || out_x.hypot(out_z) < config.min_segment_length
        {
            continue;
        }

        let cross = in_x * out_z - in_z * out_x;
        let dot = in_x * out_x + in_z * out_z;
        let angle = cross.atan2(dot).to_degrees();
        let magnitude = angle.abs();

        if magnitude < config.straight_threshold {
            continue;
        }

        let direction = if magnitude > config.uturn_threshold {
            TurnDirection::UTurn
        } else if angle > 0.0 {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        };

        events.push(TurnEvent {
            index,
            position: vertex,
            direction,
            angle_degrees: angle,
        });
    }

    debug!(
        points = points.len(),
        turns = events.len(),
        "extracted turn events"
    );
    events
}

/// Coarse live instruction relative to the walker's heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    Straight,
    SlightLeft,
    SlightRight,
    TurnLeft,
    TurnRight,
    UTurn,
    Arrived,
}

impl Instruction {
    /// Bucket a signed heading offset (positive = target to the right).
    pub fn from_offset(offset: f64, config: &TurnConfig) -> Self {
        let magnitude = offset.abs();
        let right = offset > 0.0;
        if magnitude >= config.reverse_angle {
            Instruction::UTurn
        } else if magnitude >= config.turn_angle {
            if right {
                Instruction::TurnRight
            } else {
                Instruction::TurnLeft
            }
        } else if magnitude >= config.slight_angle {
            if right {
                Instruction::SlightRight
            } else {
                Instruction::SlightLeft
            }
        } else {
            Instruction::Straight
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Instruction::Straight => "Go straight",
            Instruction::SlightLeft => "Bear left",
            Instruction::SlightRight => "Bear right",
            Instruction::TurnLeft => "Turn left",
            Instruction::TurnRight => "Turn right",
            Instruction::UTurn => "Turn around",
            Instruction::Arrived => "You have arrived",
        };
        f.write_str(value)
    }
}

/// Snapshot of what the walker should do now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Guidance {
    pub instruction: Instruction,
    /// Horizontal distance to the next unpassed turn, or to the destination
    /// once every turn is passed.
    pub distance: f64,
    /// Turn to make at the next unpassed turn point.
    pub next_turn: Option<TurnDirection>,
    /// The turn after that, for one-step lookahead.
    pub then: Option<TurnDirection>,
}

impl Guidance {
    /// Sentence suitable for on-screen or spoken guidance.
    pub fn text(&self) -> String {
        if self.instruction == Instruction::Arrived {
            return self.instruction.to_string();
        }

        let mut sentence = format!("{} for {:.0} m", self.instruction, self.distance);
        match self.next_turn {
            Some(turn) => {
                sentence.push_str(&format!(", then {turn}"));
                if let Some(after) = self.then {
                    sentence.push_str(&format!(", and after that {after}"));
                }
            }
            None => sentence.push_str(" to your destination"),
        }
        sentence
    }
}

/// Progress of a walker along the turn events of one path.
#[derive(Debug, Clone)]
pub struct TurnTracker {
    events: Vec<TurnEvent>,
    destination: Option<Point3>,
    cursor: usize,
    announced: bool,
    config: TurnConfig,
}

impl TurnTracker {
    pub fn new(path: &Path, config: TurnConfig) -> Self {
        Self {
            events: extract_turns(path, &config),
            destination: path.last(),
            cursor: 0,
            announced: false,
            config,
        }
    }

    /// Start tracking a replacement path from its first turn.
    pub fn reset(&mut self, path: &Path) {
        self.events = extract_turns(path, &self.config);
        self.destination = path.last();
        self.cursor = 0;
        self.announced = false;
    }

    pub fn events(&self) -> &[TurnEvent] {
        &self.events
    }

    /// Index of the next unpassed turn.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next_turn(&self) -> Option<&TurnEvent> {
        self.events.get(self.cursor)
    }

    /// Whether the next turn has already been announced.
    pub fn is_announced(&self) -> bool {
        self.announced
    }

    pub fn mark_announced(&mut self) {
        self.announced = true;
    }

    /// Advance past reached turns and describe what to do from `position`
    /// while facing `heading` (degrees, compass convention).
    pub fn update(&mut self, position: Point3, heading: f64) -> Guidance {
        while let Some(turn) = self.events.get(self.cursor) {
            if position.planar_distance_to(&turn.position) >= self.config.passed_threshold {
                break;
            }
            debug!(index = turn.index, "passed turn");
            self.cursor += 1;
            self.announced = false;
        }

        let next = self.events.get(self.cursor);
        let then = self.events.get(self.cursor + 1).map(|turn| turn.direction);
        let target = next.map(|turn| turn.position).or(self.destination);

        let Some(target) = target else {
            return self.arrived();
        };

        let distance = position.planar_distance_to(&target);
        if next.is_none() && distance < self.config.passed_threshold {
            return self.arrived();
        }

        let offset = normalize_degrees(position.bearing_to(&target) - heading);
        Guidance {
            instruction: Instruction::from_offset(offset, &self.config),
            distance,
            next_turn: next.map(|turn| turn.direction),
            then,
        }
    }

    fn arrived(&self) -> Guidance {
        Guidance {
            instruction: Instruction::Arrived,
            distance: 0.0,
            next_turn: None,
            then: None,
        }
    }
}
