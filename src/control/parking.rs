// src/control/parking.rs
//
// Four-stage reverse-parking machine, entered for good once a TurnRight sign
// is latched in the parking variant.
//
//   SearchFirstLane  — open-loop reverse arc until a white lane shows up
//   SearchSecondLane — steer toward a point offset from the known lane
//   AlignYellow      — square up on the forward yellow line by slope
//   ReverseOut       — creep back until the rear yellow clears, then stop
//
// Stage membership for the first two stages is re-derived every tick from
// fresh white-lane detections, and that update runs before dispatch: a
// two-segment detection jumps straight to AlignYellow within the same tick.

use crate::control::primitives;
use crate::control::state::{ControlState, ParkingStage};
use crate::features::{FeatureExtractor, ParkingLanes};
use crate::ticklog::TickLog;
use crate::types::{Frame, WheelCommand};
use tracing::{debug, info};

// ============================================================================
// STAGE CONSTANTS
// ============================================================================
const SEARCH_LEFT_SPEED: f32 = -0.5;
const SEARCH_RIGHT_SPEED: f32 = -0.8;

const SECOND_LANE_BASE_SPEED: f32 = -0.5;
const SECOND_LANE_KP: f32 = 0.001;
const TARGET_OFFSET_PX: f32 = 200.0;
const TARGET_HEIGHT_RATIO: f32 = 0.75;
const THROTTLE_BASE_PX: f32 = 400.0;

const SLOPE_DEADBAND: f32 = 0.01;
const ALIGN_BASE_SPEED: f32 = -0.2;
const ALIGN_RATIO: f32 = 0.5;

pub fn run(
    state: &mut ControlState,
    log: &mut TickLog,
    view_lane: Option<&Frame>,
    view_forward: Option<&Frame>,
    extractor: &dyn FeatureExtractor,
) -> WheelCommand {
    log.push(format!("parking_stage: {}", state.parking_stage.as_str()));

    // White-lane detection only runs while still searching; later stages
    // steer off the yellow line instead.
    let lanes = match state.parking_stage {
        ParkingStage::SearchFirstLane | ParkingStage::SearchSecondLane => view_forward
            .map(|frame| extractor.detect_parking_lanes(frame, state.parking_stage))
            .unwrap_or_default(),
        _ => ParkingLanes::default(),
    };

    if lanes.right.is_some() {
        advance(state, log, ParkingStage::AlignYellow);
    } else if lanes.left.is_some() {
        advance(state, log, ParkingStage::SearchSecondLane);
    }

    match state.parking_stage {
        ParkingStage::SearchFirstLane => {
            log.push(format!(
                "finding carpark, l:{:.2}, r:{:.2}",
                SEARCH_LEFT_SPEED, SEARCH_RIGHT_SPEED
            ));
            WheelCommand::new(SEARCH_LEFT_SPEED, SEARCH_RIGHT_SPEED)
        }
        ParkingStage::SearchSecondLane => {
            search_second_lane(log, lanes, view_forward)
        }
        ParkingStage::AlignYellow => align_with_yellow(state, log, view_lane, extractor),
        ParkingStage::ReverseOut => reverse_out(log, view_forward, extractor),
    }
}

fn advance(state: &mut ControlState, log: &mut TickLog, next: ParkingStage) {
    if next > state.parking_stage {
        info!(
            "parking stage {} -> {}",
            state.parking_stage.as_str(),
            next.as_str()
        );
        log.push(format!("parking stage -> {}", next.as_str()));
        state.advance_parking_stage(next);
    }
}

/// Steer toward a point offset right of the known lane's far endpoint,
/// clamped to the frame width, at 75% frame height.
fn search_second_lane(
    log: &mut TickLog,
    lanes: ParkingLanes,
    view_forward: Option<&Frame>,
) -> WheelCommand {
    let (left_lane, frame) = match (lanes.left, view_forward) {
        (Some(lane), Some(frame)) => (lane, frame),
        // The lane that got us into this stage vanished this tick. Keep the
        // search arc going rather than steering on stale geometry.
        _ => {
            log.push("second-lane search: no lane this tick, keep searching".to_string());
            return WheelCommand::new(SEARCH_LEFT_SPEED, SEARCH_RIGHT_SPEED);
        }
    };

    let w = frame.width as f32;
    let cx = (left_lane.x2 + TARGET_OFFSET_PX).min(w);
    let cy = frame.height as f32 * TARGET_HEIGHT_RATIO;
    debug!(cx, cy, "second-lane target");

    let err = cx - w / 2.0;
    log.push(format!("err: {:.0}", err));

    if err == 0.0 {
        primitives::reverse_straight(log)
    } else if err > 0.0 {
        let lr_ratio = (THROTTLE_BASE_PX - err.abs()) * SECOND_LANE_KP;
        primitives::turn_left(log, SECOND_LANE_BASE_SPEED, lr_ratio)
    } else {
        let lr_ratio = (THROTTLE_BASE_PX - err.abs()) * SECOND_LANE_KP;
        primitives::turn_right(log, SECOND_LANE_BASE_SPEED, lr_ratio)
    }
}

/// Square up on the forward yellow line. No line at all means the line has
/// slid out of view behind the bay: hand off to ReverseOut and stop for
/// this tick.
fn align_with_yellow(
    state: &mut ControlState,
    log: &mut TickLog,
    view_lane: Option<&Frame>,
    extractor: &dyn FeatureExtractor,
) -> WheelCommand {
    let slope = view_lane.and_then(|frame| extractor.detect_yellow_slope(frame));

    match slope {
        Some(s) => {
            log.push(format!("slope: {:.4}", s));
            if s > SLOPE_DEADBAND {
                primitives::turn_left(log, ALIGN_BASE_SPEED, ALIGN_RATIO)
            } else if s < -SLOPE_DEADBAND {
                primitives::turn_right(log, ALIGN_BASE_SPEED, ALIGN_RATIO)
            } else {
                primitives::reverse_straight(log)
            }
        }
        None => {
            advance(state, log, ParkingStage::ReverseOut);
            primitives::stop(log)
        }
    }
}

/// Keep creeping back while the lower rear view still shows yellow; once it
/// clears, the maneuver is done and the vehicle stays stopped.
fn reverse_out(
    log: &mut TickLog,
    view_forward: Option<&Frame>,
    extractor: &dyn FeatureExtractor,
) -> WheelCommand {
    let still_yellow = view_forward
        .map(|frame| extractor.detect_rear_yellow(frame))
        .unwrap_or(false);

    if still_yellow {
        primitives::reverse_straight(log)
    } else {
        primitives::stop(log)
    }
}
