use nidhogg::JointValues;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{info, warn};

use super::{Generator, KeyframeSequence, MotionInput, PoseLibrary};
use crate::Result;
use crate::action::ActionRequest;
use crate::config::{GetupSpeed, MotionConfig, RobotInfo};
use crate::model::BodyModel;
use crate::odometry::Odometry;

/// Configuration for getting up after a fall.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetupConfig {
    /// Torso pitch in degrees beyond which the robot is considered to be lying down.
    pub fall_angle_threshold: f32,
    /// Number of frames that must have been played before a new fall is detected.
    pub min_ticks_before_redetection: usize,
    /// Number of falls during a single getup after which the robot gives up and goes limp.
    pub consecutive_falls_allowed: u32,
    /// Torso pitch in degrees within which a limp robot counts as picked up again.
    pub upright_angle: f32,
}

impl Default for GetupConfig {
    fn default() -> Self {
        Self {
            fall_angle_threshold: 70.0,
            min_ticks_before_redetection: 4,
            consecutive_falls_allowed: 3,
            upright_angle: 30.0,
        }
    }
}

/// The side the robot is lying on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum FallDirection {
    Front,
    Back,
}

/// Selects the getup pose file for a fall direction, role and speed.
#[must_use]
pub fn getup_file(direction: FallDirection, is_goalkeeper: bool, speed: GetupSpeed) -> &'static str {
    match (direction, speed) {
        (FallDirection::Front, GetupSpeed::Fast) if is_goalkeeper => "getupFront",
        (FallDirection::Front, GetupSpeed::Fast) => "getupFrontFast",
        (FallDirection::Front, GetupSpeed::Moderate) => "getupFront",
        (FallDirection::Front, GetupSpeed::Slow) => "getupFrontSlow",
        (FallDirection::Back, GetupSpeed::Fast | GetupSpeed::Moderate) => "getupBack",
        (FallDirection::Back, GetupSpeed::Slow) => "getupBackSlow",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GetupState {
    NotRunning,
    Running(usize),
    /// Fell too often, lying limp until someone picks the robot up.
    Abandoned,
}

/// Plays the getup motion for a fall direction, switching motions if the robot falls again.
#[derive(Debug)]
pub struct GetupGenerator {
    initial_direction: FallDirection,
    direction: FallDirection,
    front: KeyframeSequence,
    back: KeyframeSequence,
    frames: KeyframeSequence,
    state: GetupState,
    fallen: bool,
    falls: u32,
    config: GetupConfig,
}

impl GetupGenerator {
    #[must_use]
    pub fn new(direction: FallDirection) -> Self {
        Self {
            initial_direction: direction,
            direction,
            front: KeyframeSequence::default(),
            back: KeyframeSequence::default(),
            frames: KeyframeSequence::default(),
            state: GetupState::NotRunning,
            fallen: false,
            falls: 0,
            config: GetupConfig::default(),
        }
    }

    /// The direction of the motion currently being played.
    #[must_use]
    pub fn direction(&self) -> FallDirection {
        self.direction
    }

    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.state == GetupState::Abandoned
    }

    #[cfg(test)]
    pub(crate) fn with_sequences(
        direction: FallDirection,
        front: KeyframeSequence,
        back: KeyframeSequence,
        config: GetupConfig,
    ) -> Self {
        Self {
            front,
            back,
            config,
            ..Self::new(direction)
        }
    }

    fn sequence(&self, direction: FallDirection) -> &KeyframeSequence {
        match direction {
            FallDirection::Front => &self.front,
            FallDirection::Back => &self.back,
        }
    }

    fn last_frame(&self, input: &MotionInput) -> JointValues {
        self.frames
            .last()
            .or_else(|| self.sequence(self.direction).last())
            .copied()
            .unwrap_or_else(|| JointValues::limp(input.sensors.joints.angles))
    }

    /// Checks whether the robot fell again, and restarts the matching motion if so.
    fn detect_fall(&mut self, index: usize, pitch: f32) -> usize {
        let threshold = self.config.fall_angle_threshold;
        if pitch.abs() <= threshold {
            self.fallen = false;
            return index;
        }

        if index <= self.config.min_ticks_before_redetection || self.fallen {
            return index;
        }

        self.fallen = true;
        self.falls += 1;
        self.direction = if pitch < -threshold {
            FallDirection::Back
        } else {
            FallDirection::Front
        };
        warn!(direction = %self.direction, falls = self.falls, "fell again while getting up");

        0
    }
}

impl Generator for GetupGenerator {
    fn make_joints(
        &mut self,
        _request: &mut ActionRequest,
        _odometry: &mut Odometry,
        _body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        let pitch = input.sensors.inertial.angle_y.to_degrees();

        let index = match self.state {
            GetupState::NotRunning => {
                self.falls = 0;
                return self.last_frame(input);
            }
            GetupState::Abandoned => {
                if pitch.abs() < self.config.upright_angle {
                    info!("picked up after giving up on getting up");
                    self.state = GetupState::NotRunning;
                    self.falls = 0;
                    self.fallen = false;
                }
                return JointValues::limp(input.sensors.joints.angles);
            }
            GetupState::Running(index) => self.detect_fall(index, pitch),
        };

        if self.falls >= self.config.consecutive_falls_allowed {
            warn!(falls = self.falls, "fell too often, going limp");
            self.state = GetupState::Abandoned;
            return JointValues::limp(input.sensors.joints.angles);
        }

        if index == 0 {
            self.frames = self.sequence(self.direction).clone();
            self.frames.blend_from(&input.sensors.joints.angles);
        }

        let Some(joints) = self.frames.frame(index).copied() else {
            self.state = GetupState::NotRunning;
            return JointValues::limp(input.sensors.joints.angles);
        };

        self.state = if index + 1 < self.frames.len() {
            GetupState::Running(index + 1)
        } else {
            info!(direction = %self.direction, "finished getting up");
            GetupState::NotRunning
        };

        joints
    }

    fn is_active(&self) -> bool {
        matches!(self.state, GetupState::Running(_))
    }

    /// Restarts the motion for this generator's own fall direction.
    ///
    /// Ignored while lying limp, the robot has to be picked up first.
    fn reset(&mut self) {
        if self.state == GetupState::Abandoned {
            return;
        }

        self.direction = self.initial_direction;
        self.state = GetupState::Running(0);
    }

    fn stop(&mut self) {}

    fn read_options(&mut self, config: &MotionConfig, robot: &RobotInfo) -> Result<()> {
        let library = PoseLibrary::new(&config.motion, robot);
        let is_goalkeeper = config.player.is_goalkeeper();
        let speed = config.motion.getup_speed;

        self.front =
            library.load_individual(getup_file(FallDirection::Front, is_goalkeeper, speed))?;
        self.back = library.load_individual(getup_file(FallDirection::Back, is_goalkeeper, speed))?;
        self.config = config.getup.clone();

        Ok(())
    }
}
