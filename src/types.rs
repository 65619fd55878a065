// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub controller: ControllerConfig,
    pub scenario: ScenarioConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Run the pedestrian detector every tick and stop while one is visible.
    pub pedestrian_gate: bool,
    /// Parking-capable variant: a TurnRight sign hands command generation to
    /// the parking state machine and widens the legal speed range to [-1, 1].
    pub parking: bool,
    /// Both-wheel speed commanded before any sign has ever been classified.
    pub cruise_speed: f32,
    /// Entries kept in the per-run diagnostic log before old ones are dropped.
    pub log_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pedestrian_gate: true,
            parking: false,
            cruise_speed: 1.0,
            log_capacity: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub input_path: String,
    pub output_dir: String,
    pub write_trace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// One camera image. The decision core never looks at pixels itself; frames
/// are passed through to the feature extractors.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl Frame {
    pub fn empty(width: usize, height: usize, channels: usize) -> Self {
        Self {
            data: Vec::new(),
            width,
            height,
            channels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A fitted line segment, endpoints ordered left to right on x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

/// Traffic sign classes the classifier can emit. Anything else it produces
/// maps to `Unknown`, which the controller treats as a commanded stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignClass {
    Stop,
    TurnRight,
    TurnLeft,
    Straight,
    Unknown,
}

impl SignClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::TurnRight => "TURN_RIGHT",
            Self::TurnLeft => "TURN_LEFT",
            Self::Straight => "STRAIGHT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

impl LightColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
        }
    }
}

/// The pair of wheel speeds a tick produces. Always valid: anomalies are
/// resolved inside the tick, never surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelCommand {
    pub left: f32,
    pub right: f32,
}

impl WheelCommand {
    pub const STOP: WheelCommand = WheelCommand {
        left: 0.0,
        right: 0.0,
    };

    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    pub fn both(speed: f32) -> Self {
        Self {
            left: speed,
            right: speed,
        }
    }

    pub fn clamped(self, lo: f32, hi: f32) -> Self {
        Self {
            left: self.left.clamp(lo, hi),
            right: self.right.clamp(lo, hi),
        }
    }
}
