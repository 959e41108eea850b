//! Head movement, independent of whatever the body is doing.
use nidhogg::JointValues;
use nidhogg::types::{FillExt, HeadJoints};
use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;
use crate::config::{MotionConfig, RobotInfo};
use crate::generator::{Generator, MotionInput};
use crate::model::BodyModel;
use crate::odometry::Odometry;
use crate::{CYCLE_TIME, Result};

/// Mechanical limits of the head joints, in radians.
const MAX_YAW: f32 = 2.0857;
const MIN_PITCH: f32 = -0.672;
const MAX_PITCH: f32 = 0.5149;

/// Configuration for the head generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadConfig {
    /// Maximum yaw speed in radians per second.
    pub max_yaw_speed: f32,
    /// Maximum pitch speed in radians per second.
    pub max_pitch_speed: f32,
    pub stiffness: f32,
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            max_yaw_speed: 6.0,
            max_pitch_speed: 3.0,
            stiffness: 0.7,
        }
    }
}

fn step_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step.copysign(delta)
    }
}

/// Moves the head towards the requested angles, limited in speed.
///
/// Relative requests are added to the last commanded position, so holding a relative request
/// keeps the head turning.
#[derive(Debug, Default)]
pub struct HeadGenerator {
    config: HeadConfig,
    command: Option<HeadJoints<f32>>,
    is_moving: bool,
}

impl HeadGenerator {
    fn clamp(head: HeadJoints<f32>) -> HeadJoints<f32> {
        HeadJoints {
            yaw: head.yaw.clamp(-MAX_YAW, MAX_YAW),
            pitch: head.pitch.clamp(MIN_PITCH, MAX_PITCH),
        }
    }
}

impl Generator for HeadGenerator {
    fn make_joints(
        &mut self,
        request: &mut ActionRequest,
        _odometry: &mut Odometry,
        _body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        let current = *self
            .command
            .get_or_insert_with(|| input.sensors.joints.angles.head());
        let head = &request.head;

        let requested = HeadJoints {
            yaw: head.yaw,
            pitch: head.pitch,
        };
        let target = Self::clamp(if head.is_relative {
            current + requested
        } else {
            requested
        });

        let dt = CYCLE_TIME.as_secs_f32();
        let max_yaw_step = self.config.max_yaw_speed * head.yaw_speed.clamp(0.0, 1.0) * dt;
        let max_pitch_step = self.config.max_pitch_speed * head.pitch_speed.clamp(0.0, 1.0) * dt;

        let next = HeadJoints {
            yaw: step_towards(current.yaw, target.yaw, max_yaw_step),
            pitch: step_towards(current.pitch, target.pitch, max_pitch_step),
        };

        self.is_moving = next != target;
        self.command = Some(next);

        let mut joints = JointValues::with_stiffness(input.sensors.joints.angles, 0.0);
        joints.angles.set_head(next);
        joints.stiffness.set_head(HeadJoints::fill(self.config.stiffness));
        joints
    }

    fn is_active(&self) -> bool {
        self.is_moving
    }

    /// Forgets the last command, the next cycle starts from the sensed head position.
    fn reset(&mut self) {
        self.command = None;
        self.is_moving = false;
    }

    fn stop(&mut self) {}

    fn read_options(&mut self, config: &MotionConfig, _robot: &RobotInfo) -> Result<()> {
        self.config = config.head.clone();
        Ok(())
    }
}
