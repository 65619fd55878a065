// src/scenario.rs
//
// Scripted frames stand in for real camera input: the runner replays a JSONL
// scenario (one frame pair per line) through a `ScriptedExtractor` that
// answers the extractor interface from the script instead of from pixels.
// The same extractor doubles as the test harness for the control core.

use crate::control::state::ParkingStage;
use crate::features::{
    FeatureExtractor, LineDetection, ParkingLanes, Roi, SignDetection,
};
use crate::types::{Frame, LightColor, LineSegment, Point, Rect, SignClass};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted feature answers for one tick. Fields are public so tests can
/// stage exactly the situation they need.
#[derive(Debug, Clone)]
pub struct ScriptedExtractor {
    pub line: LineDetection,
    pub pedestrian: bool,
    pub sign: Option<SignDetection>,
    pub sign_class: SignClass,
    pub light: Option<LightColor>,
    pub parking_lanes: ParkingLanes,
    pub yellow_slope: Option<f32>,
    pub rear_yellow: bool,
}

impl Default for ScriptedExtractor {
    fn default() -> Self {
        Self {
            line: LineDetection::none(),
            pedestrian: false,
            sign: None,
            sign_class: SignClass::Unknown,
            light: None,
            parking_lanes: ParkingLanes::default(),
            yellow_slope: None,
            rear_yellow: false,
        }
    }
}

impl ScriptedExtractor {
    pub fn with_light(light: Option<LightColor>) -> Self {
        Self {
            light,
            ..Self::default()
        }
    }
}

impl FeatureExtractor for ScriptedExtractor {
    fn detect_line(&self, _frame: &Frame, _hint: Option<SignClass>) -> LineDetection {
        self.line
    }

    fn detect_sign(&self, _frame: &Frame) -> Option<SignDetection> {
        self.sign.clone()
    }

    fn classify_sign(&self, _roi: &Roi) -> SignClass {
        self.sign_class
    }

    fn detect_traffic_light(&self, _frame: &Frame) -> Option<LightColor> {
        self.light
    }

    fn detect_pedestrian(&self, _frame: &Frame) -> bool {
        self.pedestrian
    }

    fn detect_parking_lanes(&self, _frame: &Frame, _stage: ParkingStage) -> ParkingLanes {
        self.parking_lanes
    }

    fn detect_yellow_slope(&self, _frame: &Frame) -> Option<f32> {
        self.yellow_slope
    }

    fn detect_rear_yellow(&self, _frame: &Frame) -> bool {
        self.rear_yellow
    }
}

// ============================================================================
// JSONL SCENARIO FORMAT
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSpec {
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_channels")]
    pub channels: usize,
}

fn default_channels() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedSign {
    pub class: SignClass,
    /// Right bbox edge; proposals at x >= 600 are ignored by the core.
    #[serde(default = "default_sign_xmax")]
    pub xmax: f32,
}

fn default_sign_xmax() -> f32 {
    300.0
}

/// One line of a scenario file. Absent fields read as "not detected".
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedFrame {
    #[serde(default)]
    pub lane_view: Option<ViewSpec>,
    #[serde(default)]
    pub forward_view: Option<ViewSpec>,
    #[serde(default)]
    pub line_centroid: Option<(f32, f32)>,
    #[serde(default)]
    pub line_present: bool,
    #[serde(default)]
    pub pedestrian: bool,
    #[serde(default)]
    pub sign: Option<ScriptedSign>,
    #[serde(default)]
    pub light: Option<LightColor>,
    #[serde(default)]
    pub parking_left: Option<[f32; 4]>,
    #[serde(default)]
    pub parking_right: Option<[f32; 4]>,
    #[serde(default)]
    pub yellow_slope: Option<f32>,
    #[serde(default)]
    pub rear_yellow: bool,
}

impl ScriptedFrame {
    pub fn views(&self) -> (Option<Frame>, Option<Frame>) {
        let lane = self
            .lane_view
            .as_ref()
            .map(|v| Frame::empty(v.width, v.height, v.channels));
        let forward = self
            .forward_view
            .as_ref()
            .map(|v| Frame::empty(v.width, v.height, v.channels));
        (lane, forward)
    }

    pub fn extractor(&self) -> ScriptedExtractor {
        ScriptedExtractor {
            line: LineDetection {
                present: self.line_present || self.line_centroid.is_some(),
                centroid: self.line_centroid.map(|(x, y)| Point { x, y }),
            },
            pedestrian: self.pedestrian,
            sign: self.sign.as_ref().map(|s| SignDetection {
                bbox: Rect {
                    xmin: (s.xmax - 100.0).max(0.0),
                    ymin: 50.0,
                    xmax: s.xmax,
                    ymax: 150.0,
                },
                roi: Roi {
                    data: Vec::new(),
                    width: 32,
                    height: 32,
                },
            }),
            sign_class: self
                .sign
                .as_ref()
                .map(|s| s.class)
                .unwrap_or(SignClass::Unknown),
            light: self.light,
            parking_lanes: ParkingLanes {
                left: self.parking_left.map(to_segment),
                right: self.parking_right.map(to_segment),
            },
            yellow_slope: self.yellow_slope,
            rear_yellow: self.rear_yellow,
        }
    }
}

fn to_segment(coords: [f32; 4]) -> LineSegment {
    LineSegment {
        x1: coords[0],
        y1: coords[1],
        x2: coords[2],
        y2: coords[3],
    }
}

/// Load a scenario from a JSONL file. Blank lines and `#` comments are
/// skipped.
pub fn load(path: &Path) -> Result<Vec<ScriptedFrame>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading scenario {}", path.display()))?;

    let mut frames = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame: ScriptedFrame = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: bad scenario line", path.display(), lineno + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_line() {
        let frame: ScriptedFrame = serde_json::from_str("{}").unwrap();
        assert!(frame.lane_view.is_none());
        assert!(!frame.pedestrian);

        let fx = frame.extractor();
        assert!(!fx.line.present);
        assert_eq!(fx.sign_class, SignClass::Unknown);
    }

    #[test]
    fn test_parse_full_line() {
        let json = r#"{
            "lane_view": {"width": 160, "height": 120, "channels": 1},
            "forward_view": {"width": 640, "height": 480},
            "line_centroid": [26.0, 60.0],
            "sign": {"class": "TurnLeft"},
            "light": "Green",
            "parking_left": [200.0, 400.0, 250.0, 420.0],
            "yellow_slope": 0.02
        }"#;
        let frame: ScriptedFrame = serde_json::from_str(json).unwrap();

        let (lane, forward) = frame.views();
        assert_eq!(lane.unwrap().channels, 1);
        assert_eq!(forward.unwrap().width, 640);

        let fx = frame.extractor();
        assert!(fx.line.usable());
        assert_eq!(fx.sign_class, SignClass::TurnLeft);
        assert_eq!(fx.light, Some(LightColor::Green));
        assert_eq!(fx.parking_lanes.left.unwrap().x2, 250.0);
        assert!(fx.parking_lanes.right.is_none());
        assert_eq!(fx.yellow_slope, Some(0.02));
    }

    #[test]
    fn test_sign_xmax_defaults_below_edge_cutoff() {
        let frame: ScriptedFrame =
            serde_json::from_str(r#"{"sign": {"class": "Stop"}}"#).unwrap();
        let fx = frame.extractor();
        assert!(fx.sign.unwrap().bbox.xmax < 600.0);
    }
}
