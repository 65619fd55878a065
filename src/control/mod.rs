// src/control/mod.rs
//
// The per-tick decision core: one call consumes a pair of camera views,
// runs feature extraction, selects a mode, runs that mode's control law and
// returns a wheel-speed pair. All state that survives between frames lives
// in `ControlState`; everything else is rebuilt from scratch each tick.

pub mod lane_follow;
pub mod mode;
pub mod parking;
pub mod primitives;
pub mod sign;
pub mod state;

use crate::features::{FeatureExtractor, FeatureSet, LineDetection};
use crate::ticklog::TickLog;
use crate::types::{ControllerConfig, Frame, SignClass, WheelCommand};
use self::mode::{Mode, ModeInputs};
use self::state::ControlState;
use tracing::{debug, info};

// Sign proposals whose right edge reaches this column are too close to the
// camera (or clipped) and are not classified.
const SIGN_BBOX_MAX_X: f32 = 600.0;

// Physical actuator limit; derived ratio wheels below are deliberately left
// unclamped, only the leading components saturate here.
const ACTUATOR_LIMIT: f32 = 1.0;

/// The two camera views a tick consumes. Either may be absent; a missing
/// view simply reads as "nothing detected" for the extractors that need it.
#[derive(Clone, Copy, Default)]
pub struct TickViews<'a> {
    pub lane: Option<&'a Frame>,
    pub forward: Option<&'a Frame>,
}

pub struct Controller {
    config: ControllerConfig,
    state: ControlState,
    last_mode: Option<Mode>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: ControlState::new(),
            last_mode: None,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn last_mode(&self) -> Option<Mode> {
        self.last_mode
    }

    /// The external entry point, invoked once per frame pair. Never fails:
    /// every anomaly resolves to a defined command within the tick.
    pub fn tick(
        &mut self,
        views: TickViews<'_>,
        extractor: &dyn FeatureExtractor,
        log: &mut TickLog,
    ) -> WheelCommand {
        self.state.tick += 1;
        log.push(format!("#{}", self.state.tick));

        let features = self.extract_features(views, extractor, log);
        debug!(
            lane = features.line.present,
            pedestrian = features.pedestrian_present,
            sign_bbox = ?features.sign_bbox,
            "features"
        );

        let selected = mode::select(ModeInputs {
            pedestrian_present: features.pedestrian_present,
            lane_usable: features.line.usable(),
            sign: self.state.sign,
            parking_variant: self.config.parking,
        });
        self.last_mode = Some(selected);
        debug!(tick = self.state.tick, mode = selected.as_str(), "tick");

        let command = match selected {
            Mode::PedestrianStop => {
                // Gate fires before any control law runs; nothing else in
                // the persistent state moves this tick.
                log.push("pedestrian detected".to_string());
                return primitives::stop(log);
            }
            Mode::Parking => {
                return parking::run(
                    &mut self.state,
                    log,
                    views.lane,
                    views.forward,
                    extractor,
                );
            }
            Mode::LaneFollow => {
                // Reacquiring the line starts a fresh lane-follow episode,
                // which re-arms the traffic-light gate.
                self.state.reset_light_gate();
                let centroid = features
                    .line
                    .centroid
                    .expect("mode table requires a centroid for LaneFollow");
                let frame_w = views.lane.map(|f| f.width as f32).unwrap_or(0.0);
                lane_follow::run(&mut self.state, log, centroid, frame_w)
            }
            Mode::SignManeuver => {
                let sign = self
                    .state
                    .sign
                    .expect("mode table requires a sticky sign for SignManeuver");
                sign::run(&mut self.state, log, sign, views.forward, extractor)
            }
            Mode::DefaultCruise => {
                log.push(format!("cruise, speed:{:.2}", self.config.cruise_speed));
                WheelCommand::both(self.config.cruise_speed)
            }
        };

        self.finalize(command)
    }

    fn extract_features(
        &mut self,
        views: TickViews<'_>,
        extractor: &dyn FeatureExtractor,
        log: &mut TickLog,
    ) -> FeatureSet {
        let mut features = FeatureSet::default();

        // Once the parking machine owns the run, neither the line detector
        // nor the sign classifier is consulted again.
        let parking_latched = self.config.parking && self.state.sign == Some(SignClass::TurnRight);

        if !parking_latched {
            if let Some(frame) = views.lane {
                let hint = match self.state.sign {
                    Some(SignClass::TurnLeft) | Some(SignClass::Straight) => self.state.sign,
                    _ => None,
                };
                features.line = extractor.detect_line(frame, hint);
            } else {
                features.line = LineDetection::none();
            }
        }

        if let Some(frame) = views.forward {
            if self.config.pedestrian_gate {
                features.pedestrian_present = extractor.detect_pedestrian(frame);
                if features.pedestrian_present {
                    info!(tick = self.state.tick, "pedestrian in view");
                }
            }

            if !parking_latched {
                if let Some(detection) = extractor.detect_sign(frame) {
                    features.sign_bbox = Some(detection.bbox);
                    if detection.bbox.xmax < SIGN_BBOX_MAX_X {
                        let class = extractor.classify_sign(&detection.roi);
                        self.state.sign = Some(class);
                        log.push(format!("id: {}", class.as_str()));
                        debug!(sign = class.as_str(), "sign classified");
                    }
                }
            }
        }

        features
    }

    /// Post-command bookkeeping for the forward-driving modes: remember the
    /// fastest wheel as the next tick's ramp state and saturate the leading
    /// components at the actuator limit.
    fn finalize(&mut self, command: WheelCommand) -> WheelCommand {
        let command = command.clamped(-ACTUATOR_LIMIT, ACTUATOR_LIMIT);
        let speed_floor = if self.config.parking {
            -ACTUATOR_LIMIT
        } else {
            0.0
        };
        self.state.current_speed = command.left.max(command.right).clamp(speed_floor, ACTUATOR_LIMIT);
        command
    }
}
