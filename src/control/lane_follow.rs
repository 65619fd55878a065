// src/control/lane_follow.rs
//
// Proportional-ish lane following on the yellow-line centroid. The numbers
// are the calibrated ones from the track vehicle: a 54 px mount offset, a
// two-level gain schedule around a 20 px dead-band boundary, and the
// (50 - |err|) inside-wheel throttle, reproduced unclamped.

use crate::control::primitives;
use crate::control::state::ControlState;
use crate::ticklog::TickLog;
use crate::types::{Point, WheelCommand};
use tracing::debug;

// Half the vehicle width in lane-view pixels; compensates the camera being
// mounted off the chassis centerline.
const MOUNT_OFFSET_PX: f32 = 108.0 / 2.0;

const FINE_ERR_PX: f32 = 20.0;
const KP_FINE: f32 = 0.02;
const KP_COARSE: f32 = 0.01;

const MIN_SPEED: f32 = 0.5;
const THROTTLE_BASE_PX: f32 = 50.0;

/// Steer along the line centroid. `frame_w` is the lane-view width in
/// pixels. Updates the ramp state in place.
pub fn run(
    state: &mut ControlState,
    log: &mut TickLog,
    centroid: Point,
    frame_w: f32,
) -> WheelCommand {
    let cx = centroid.x + MOUNT_OFFSET_PX;
    let cy = centroid.y;
    let err = cx - frame_w / 2.0;
    log.push(format!("err: {:.0}", err));
    debug!(err, cx, cy, "lane follow");

    let kp = if err.abs() < FINE_ERR_PX {
        KP_FINE
    } else {
        KP_COARSE
    };

    if state.current_speed < MIN_SPEED {
        state.current_speed = MIN_SPEED;
    }

    if err == 0.0 {
        let speed = state.current_speed;
        primitives::straight_ramp(log, &mut state.current_speed, speed)
    } else if err > 0.0 {
        // Centroid right of center: throttle the right wheel. The ratio goes
        // negative past 50 px of error; that reversed inside wheel is the
        // vehicle's established behavior.
        let lr_ratio = (THROTTLE_BASE_PX - err.abs()) * kp;
        primitives::turn_right(log, state.current_speed, lr_ratio)
    } else {
        let lr_ratio = (THROTTLE_BASE_PX - err.abs()) * kp;
        primitives::turn_left(log, state.current_speed, lr_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_W: f32 = 160.0;

    fn centered_centroid() -> Point {
        // cx + 54 == 80 == w/2
        Point { x: 26.0, y: 60.0 }
    }

    fn run_one(state: &mut ControlState, centroid: Point) -> WheelCommand {
        let mut log = TickLog::new(16);
        run(state, &mut log, centroid, FRAME_W)
    }

    #[test]
    fn test_centered_ramps_once_and_updates_speed() {
        let mut state = ControlState::new();
        state.current_speed = 0.5;

        let cmd = run_one(&mut state, centered_centroid());
        assert_eq!(cmd, WheelCommand::both(0.6));
        assert!((state.current_speed - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_speed_floor_applied_before_steering() {
        let mut state = ControlState::new();
        state.current_speed = 0.1;

        // err = +10 -> fine gain, ratio = (50-10)*0.02 = 0.8
        let cmd = run_one(&mut state, Point { x: 36.0, y: 60.0 });
        assert_eq!(cmd.left, 0.5);
        assert!((cmd.right - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_gain_schedule_switches_at_twenty_px() {
        let mut state = ControlState::new();
        state.current_speed = 0.5;

        // |err| = 10 < 20 -> kp = 0.02
        let fine = run_one(&mut state, Point { x: 36.0, y: 60.0 });
        assert!((fine.right / fine.left - (50.0 - 10.0) * 0.02).abs() < 1e-6);

        // |err| = 30 >= 20 -> kp = 0.01
        let coarse = run_one(&mut state, Point { x: 56.0, y: 60.0 });
        assert!((coarse.right / coarse.left - (50.0 - 30.0) * 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_left_error_throttles_left_wheel() {
        let mut state = ControlState::new();
        state.current_speed = 0.5;

        // err = -10 -> right wheel leads
        let cmd = run_one(&mut state, Point { x: 16.0, y: 60.0 });
        assert_eq!(cmd.right, 0.5);
        assert!((cmd.left - 0.5 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_large_error_reverses_inside_wheel() {
        let mut state = ControlState::new();
        state.current_speed = 0.5;

        // err = +60 -> ratio = (50-60)*0.01 = -0.1, right wheel reversed
        let cmd = run_one(&mut state, Point { x: 86.0, y: 60.0 });
        assert_eq!(cmd.left, 0.5);
        assert!((cmd.right - (-0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_ramp_stops_at_ceiling() {
        let mut state = ControlState::new();
        state.current_speed = 0.9;

        let cmd = run_one(&mut state, centered_centroid());
        assert_eq!(cmd, WheelCommand::both(0.9));
        assert_eq!(state.current_speed, 0.9);
    }
}
