// src/features.rs
//
// Feature-extraction interface between the vision layer and the decision
// core. The extractors are pure functions of their input frame; the core
// treats an empty result as "not detected" and never as an error.

use crate::control::state::ParkingStage;
use crate::types::{Frame, LightColor, LineSegment, Point, Rect, SignClass};

/// Yellow-line detector output for the lane-camera view.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDetection {
    pub present: bool,
    /// Centroid of the line mask, in raw pixel coordinates. Detectors must
    /// leave this `None` for a zero-area mask instead of dividing by it.
    pub centroid: Option<Point>,
}

impl LineDetection {
    pub fn none() -> Self {
        Self::default()
    }

    /// A detection is only usable for steering when the centroid survived
    /// the zero-area guard.
    pub fn usable(&self) -> bool {
        self.present && self.centroid.is_some()
    }
}

/// A sign region proposal from the forward view.
#[derive(Debug, Clone)]
pub struct SignDetection {
    pub bbox: Rect,
    pub roi: Roi,
}

/// Pixel crop handed from the sign detector to the classifier.
#[derive(Debug, Clone)]
pub struct Roi {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// White parking-lane segments found in the rear view, already grouped into
/// a left and (when the endpoint gap exceeds the split threshold) a right
/// average segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParkingLanes {
    pub left: Option<LineSegment>,
    pub right: Option<LineSegment>,
}

/// The vision collaborators the controller consumes. Implementations must be
/// pure per frame: no shared mutable state across calls, and "not found" is
/// expressed as `None`/`false`/empty, never a panic.
pub trait FeatureExtractor {
    /// Yellow line presence + mask centroid in the lane view. `hint` carries
    /// the sticky sign so the detector can suppress the right-hand line
    /// during left-turn and straight episodes.
    fn detect_line(&self, frame: &Frame, hint: Option<SignClass>) -> LineDetection;

    fn detect_sign(&self, frame: &Frame) -> Option<SignDetection>;

    fn classify_sign(&self, roi: &Roi) -> SignClass;

    fn detect_traffic_light(&self, frame: &Frame) -> Option<LightColor>;

    fn detect_pedestrian(&self, frame: &Frame) -> bool;

    /// White lane segments in the rear view. `stage` lets the detector mask
    /// the right image margin while still searching for the first lane.
    fn detect_parking_lanes(&self, frame: &Frame, stage: ParkingStage) -> ParkingLanes;

    /// Average slope of the forward yellow line, fitted in the upper image
    /// region. `None` when no line is found at all.
    fn detect_yellow_slope(&self, frame: &Frame) -> Option<f32>;

    /// Whether any yellow remains in the lower rear-view region.
    fn detect_rear_yellow(&self, frame: &Frame) -> bool;
}

/// Per-tick feature bundle assembled by the controller. Owned by the tick,
/// discarded when it returns.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub line: LineDetection,
    pub sign_bbox: Option<Rect>,
    pub pedestrian_present: bool,
}
