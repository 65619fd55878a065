// src/control/sign.rs
//
// Sign maneuvers, entered once the lane line is lost while a sticky sign is
// latched. Left-turn and straight are gated on the traffic light: the light
// is re-read every tick until it shows green, after which the gate stays
// open for the rest of the sign episode.

use crate::control::primitives;
use crate::control::state::ControlState;
use crate::features::FeatureExtractor;
use crate::ticklog::TickLog;
use crate::types::{Frame, LightColor, SignClass, WheelCommand};
use tracing::{debug, warn};

const TURN_SPEED: f32 = 0.6;
const TURN_RIGHT_RATIO: f32 = 0.4;
const TURN_LEFT_RATIO: f32 = 0.5;
const STRAIGHT_INITIAL_SPEED: f32 = 1.0;

pub fn run(
    state: &mut ControlState,
    log: &mut TickLog,
    sign: SignClass,
    view_forward: Option<&Frame>,
    extractor: &dyn FeatureExtractor,
) -> WheelCommand {
    match sign {
        SignClass::Stop => primitives::stop(log),
        SignClass::TurnRight => primitives::turn_right(log, TURN_SPEED, TURN_RIGHT_RATIO),
        SignClass::TurnLeft => {
            if light_gate_open(state, log, view_forward, extractor) {
                primitives::turn_left(log, TURN_SPEED, TURN_LEFT_RATIO)
            } else {
                primitives::stop(log)
            }
        }
        SignClass::Straight => {
            if light_gate_open(state, log, view_forward, extractor) {
                primitives::straight_ramp(log, &mut state.current_speed, STRAIGHT_INITIAL_SPEED)
            } else {
                primitives::stop(log)
            }
        }
        SignClass::Unknown => {
            // Fail closed: an unrecognized class must never fall through to
            // a stale command.
            warn!("unknown sign class, commanding stop");
            log.push("unknown sign, stopping".to_string());
            primitives::stop(log)
        }
    }
}

/// Evaluate (or recall) the traffic light for a gated maneuver. Returns true
/// once the light has been confirmed green for this sign episode.
fn light_gate_open(
    state: &mut ControlState,
    log: &mut TickLog,
    view_forward: Option<&Frame>,
    extractor: &dyn FeatureExtractor,
) -> bool {
    if state.light_confirmed {
        return true;
    }

    let color = view_forward.and_then(|frame| extractor.detect_traffic_light(frame));
    state.last_light = color;

    match color {
        Some(LightColor::Green) => {
            state.light_confirmed = true;
            log.push("green light confirmed".to_string());
            debug!("traffic light gate opened");
            true
        }
        Some(other) => {
            log.push(format!("{} light, holding", other.as_str()));
            false
        }
        // No detection reads as "light not yet green", not as an error.
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScriptedExtractor;
    use crate::types::Frame;

    fn forward_frame() -> Frame {
        Frame::empty(640, 480, 3)
    }

    fn run_sign(
        state: &mut ControlState,
        sign: SignClass,
        extractor: &ScriptedExtractor,
    ) -> WheelCommand {
        let mut log = TickLog::new(16);
        let frame = forward_frame();
        run(state, &mut log, sign, Some(&frame), extractor)
    }

    #[test]
    fn test_stop_sign_stops() {
        let mut state = ControlState::new();
        let fx = ScriptedExtractor::default();
        assert_eq!(run_sign(&mut state, SignClass::Stop, &fx), WheelCommand::STOP);
    }

    #[test]
    fn test_turn_right_is_ungated() {
        let mut state = ControlState::new();
        // Red light scripted, but TurnRight must not consult it.
        let fx = ScriptedExtractor::with_light(Some(LightColor::Red));
        let cmd = run_sign(&mut state, SignClass::TurnRight, &fx);
        assert_eq!(cmd.left, 0.6);
        assert!((cmd.right - 0.24).abs() < 1e-6);
        assert!(state.last_light.is_none());
    }

    #[test]
    fn test_turn_left_holds_on_red() {
        let mut state = ControlState::new();
        let fx = ScriptedExtractor::with_light(Some(LightColor::Red));
        let cmd = run_sign(&mut state, SignClass::TurnLeft, &fx);
        assert_eq!(cmd, WheelCommand::STOP);
        assert!(!state.light_confirmed);
        assert_eq!(state.last_light, Some(LightColor::Red));
    }

    #[test]
    fn test_turn_left_proceeds_on_green_and_confirms() {
        let mut state = ControlState::new();
        let fx = ScriptedExtractor::with_light(Some(LightColor::Green));
        let cmd = run_sign(&mut state, SignClass::TurnLeft, &fx);
        assert!((cmd.left - 0.3).abs() < 1e-6);
        assert_eq!(cmd.right, 0.6);
        assert!(state.light_confirmed);
    }

    #[test]
    fn test_confirmed_gate_skips_light_read() {
        let mut state = ControlState::new();
        state.light_confirmed = true;
        // A red light after confirmation must be ignored.
        let fx = ScriptedExtractor::with_light(Some(LightColor::Red));
        let cmd = run_sign(&mut state, SignClass::TurnLeft, &fx);
        assert_eq!(cmd.right, 0.6);
        // last_light untouched: the extractor was never invoked.
        assert!(state.last_light.is_none());
    }

    #[test]
    fn test_straight_ramps_from_one_point_zero() {
        let mut state = ControlState::new();
        state.current_speed = 0.5;
        let fx = ScriptedExtractor::with_light(Some(LightColor::Green));
        let cmd = run_sign(&mut state, SignClass::Straight, &fx);
        // Ramp applies to the 1.0 initial speed, not the remembered 0.5.
        assert_eq!(cmd, WheelCommand::both(1.1));
        assert!((state.current_speed - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_no_light_detection_holds() {
        let mut state = ControlState::new();
        let fx = ScriptedExtractor::with_light(None);
        let cmd = run_sign(&mut state, SignClass::Straight, &fx);
        assert_eq!(cmd, WheelCommand::STOP);
        assert!(!state.light_confirmed);
    }

    #[test]
    fn test_unknown_class_fails_closed() {
        let mut state = ControlState::new();
        let fx = ScriptedExtractor::default();
        let cmd = run_sign(&mut state, SignClass::Unknown, &fx);
        assert_eq!(cmd, WheelCommand::STOP);
    }
}
