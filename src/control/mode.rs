// src/control/mode.rs
//
// Per-tick mode selection. The priority order is the contract here, so it
// lives in one match-free table instead of being buried in nested branches:
// pedestrian gate first, then the parking latch, then lane following, then
// the sticky sign, and finally the pre-sign default cruise.

use crate::types::SignClass;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    PedestrianStop,
    Parking,
    LaneFollow,
    SignManeuver,
    DefaultCruise,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PedestrianStop => "PEDESTRIAN_STOP",
            Self::Parking => "PARKING",
            Self::LaneFollow => "LANE_FOLLOW",
            Self::SignManeuver => "SIGN_MANEUVER",
            Self::DefaultCruise => "DEFAULT_CRUISE",
        }
    }
}

/// Everything mode selection is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct ModeInputs {
    pub pedestrian_present: bool,
    /// Lane line present with a usable centroid (zero-area masks re-checked
    /// by the caller count as absent).
    pub lane_usable: bool,
    pub sign: Option<SignClass>,
    /// Parking-capable variant flag from config.
    pub parking_variant: bool,
}

/// First match wins. With the parking variant latched on TurnRight, lane
/// presence is deliberately not consulted: the parking machine owns command
/// generation unconditionally from that point on.
pub fn select(inputs: ModeInputs) -> Mode {
    if inputs.pedestrian_present {
        return Mode::PedestrianStop;
    }
    if inputs.parking_variant && inputs.sign == Some(SignClass::TurnRight) {
        return Mode::Parking;
    }
    if inputs.lane_usable {
        return Mode::LaneFollow;
    }
    if inputs.sign.is_some() {
        return Mode::SignManeuver;
    }
    Mode::DefaultCruise
}
