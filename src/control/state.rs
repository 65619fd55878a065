// src/control/state.rs

use crate::types::{LightColor, SignClass};
use serde::Serialize;

/// Stages of the parking maneuver. Strictly forward-progressing: a stage is
/// never revisited, though SearchSecondLane and AlignYellow re-derive their
/// membership from fresh detections every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ParkingStage {
    SearchFirstLane,
    SearchSecondLane,
    AlignYellow,
    ReverseOut,
}

impl ParkingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchFirstLane => "SEARCH_FIRST_LANE",
            Self::SearchSecondLane => "SEARCH_SECOND_LANE",
            Self::AlignYellow => "ALIGN_YELLOW",
            Self::ReverseOut => "REVERSE_OUT",
        }
    }
}

/// The one record that survives across ticks. Created on the first tick,
/// mutated in place by every tick thereafter, never reset mid-run.
#[derive(Debug, Clone, Serialize)]
pub struct ControlState {
    /// Strictly increasing, +1 per invocation.
    pub tick: u64,
    /// Max commanded wheel component of the previous tick, used as ramp
    /// state. Clamped to the variant's legal range.
    pub current_speed: f32,
    /// Last classified sign, sticky until overwritten by a new read.
    pub sign: Option<SignClass>,
    /// Last traffic-light color read during the current sign episode.
    pub last_light: Option<LightColor>,
    /// Sticky "already cleared" marker: once the light has been seen green
    /// the gate stays open and the light is not re-read. Reset only when a
    /// lane-follow episode begins again.
    pub light_confirmed: bool,
    pub parking_stage: ParkingStage,
}

impl ControlState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            current_speed: 0.5,
            sign: None,
            last_light: None,
            light_confirmed: false,
            parking_stage: ParkingStage::SearchFirstLane,
        }
    }

    /// A new lane-follow episode clears the traffic-light gate so the next
    /// sign maneuver evaluates the light afresh.
    pub fn reset_light_gate(&mut self) {
        self.last_light = None;
        self.light_confirmed = false;
    }

    /// Forward-only stage advance. A request to move backward is ignored.
    pub fn advance_parking_stage(&mut self, next: ParkingStage) {
        if next > self.parking_stage {
            self.parking_stage = next;
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parking_stage_never_moves_backward() {
        let mut state = ControlState::new();
        state.advance_parking_stage(ParkingStage::AlignYellow);
        assert_eq!(state.parking_stage, ParkingStage::AlignYellow);

        state.advance_parking_stage(ParkingStage::SearchSecondLane);
        assert_eq!(state.parking_stage, ParkingStage::AlignYellow);

        state.advance_parking_stage(ParkingStage::ReverseOut);
        assert_eq!(state.parking_stage, ParkingStage::ReverseOut);
    }

    #[test]
    fn test_light_gate_reset() {
        let mut state = ControlState::new();
        state.last_light = Some(crate::types::LightColor::Green);
        state.light_confirmed = true;

        state.reset_light_gate();
        assert!(state.last_light.is_none());
        assert!(!state.light_confirmed);
    }
}
