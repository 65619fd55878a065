// src/control/primitives.rs
//
// The four primitive maneuvers every mode reduces to. Each one appends a
// human-readable line to the diagnostic log, matching the command actually
// returned.

use crate::ticklog::TickLog;
use crate::types::WheelCommand;
use tracing::debug;

pub fn stop(log: &mut TickLog) -> WheelCommand {
    let cmd = WheelCommand::STOP;
    log.push(format!("stopping, l:{:.2}, r:{:.2}", cmd.left, cmd.right));
    debug!("stop command");
    cmd
}

/// Differential right turn: the left wheel leads, the right wheel runs at
/// `lr_ratio` of it. The ratio is applied as given, including negative
/// values from the unclamped gain formulas.
pub fn turn_right(log: &mut TickLog, left_speed: f32, lr_ratio: f32) -> WheelCommand {
    let cmd = WheelCommand::new(left_speed, lr_ratio * left_speed);
    log.push(format!(
        "turning right, l:{:.2}, r:{:.2}",
        cmd.left, cmd.right
    ));
    debug!(left = cmd.left, right = cmd.right, "turn right");
    cmd
}

/// Mirror of `turn_right`: the right wheel leads.
pub fn turn_left(log: &mut TickLog, right_speed: f32, lr_ratio: f32) -> WheelCommand {
    let cmd = WheelCommand::new(lr_ratio * right_speed, right_speed);
    log.push(format!(
        "turning left, l:{:.2}, r:{:.2}",
        cmd.left, cmd.right
    ));
    debug!(left = cmd.left, right = cmd.right, "turn left");
    cmd
}

/// Reverse-straight creep used throughout the parking maneuver.
pub fn reverse_straight(log: &mut TickLog) -> WheelCommand {
    let cmd = WheelCommand::both(-0.2);
    log.push(format!(
        "going straight, l:{:.2}, r:{:.2}",
        cmd.left, cmd.right
    ));
    debug!("reverse straight");
    cmd
}

/// Forward straight with a one-step ramp: while the remembered speed is
/// below 0.9, the commanded speed becomes `initial_speed + 0.1` and is
/// written back as the new ramp state.
pub fn straight_ramp(
    log: &mut TickLog,
    current_speed: &mut f32,
    initial_speed: f32,
) -> WheelCommand {
    if *current_speed < 0.9 {
        *current_speed = initial_speed + 0.1;
    }
    let cmd = WheelCommand::both(*current_speed);
    log.push(format!(
        "going straight, l:{:.2}, r:{:.2}",
        cmd.left, cmd.right
    ));
    debug!(speed = *current_speed, "straight ramp");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> TickLog {
        TickLog::new(16)
    }

    #[test]
    fn test_turn_right_throttles_inside_wheel() {
        let cmd = turn_right(&mut log(), 0.6, 0.4);
        assert_eq!(cmd.left, 0.6);
        assert!((cmd.right - 0.24).abs() < 1e-6);
    }

    #[test]
    fn test_turn_left_is_symmetric() {
        let cmd = turn_left(&mut log(), 0.6, 0.5);
        assert!((cmd.left - 0.3).abs() < 1e-6);
        assert_eq!(cmd.right, 0.6);
    }

    #[test]
    fn test_negative_ratio_reverses_inside_wheel() {
        // Large tracking error drives the unclamped gain formula negative.
        let cmd = turn_right(&mut log(), 0.5, -0.1);
        assert!(cmd.right < 0.0);
    }

    #[test]
    fn test_straight_ramp_steps_once() {
        let mut speed = 0.5;
        let cmd = straight_ramp(&mut log(), &mut speed, 0.5);
        assert!((speed - 0.6).abs() < 1e-6);
        assert_eq!(cmd, WheelCommand::both(0.6));
    }

    #[test]
    fn test_straight_ramp_holds_at_ceiling() {
        let mut speed = 0.9;
        let cmd = straight_ramp(&mut log(), &mut speed, 0.9);
        assert_eq!(speed, 0.9);
        assert_eq!(cmd, WheelCommand::both(0.9));
    }

    #[test]
    fn test_stop_logs_command() {
        let mut log = log();
        let cmd = stop(&mut log);
        assert_eq!(cmd, WheelCommand::STOP);
        assert_eq!(log.last(), Some("stopping, l:0.00, r:0.00"));
    }
}
