use std::time::Duration;

use nidhogg::JointValues;
use nidhogg::types::{FillExt, JointArray, LeftLegJoints, RightLegJoints, SingleArmJoints};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use super::{Generator, MotionInput};
use crate::action::ActionRequest;
use crate::config::{MotionConfig, RobotInfo};
use crate::model::BodyModel;
use crate::odometry::Odometry;
use crate::{CYCLE_TIME, Result};

/// Configuration for the pose the robot takes while a referee handles it.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefPickupConfig {
    /// Time to move from the sensed pose into the crouch.
    #[serde_as(as = "DurationMilliSeconds")]
    pub duration: Duration,
    /// Stiffness of the legs once crouched.
    pub stiffness: f32,
}

impl Default for RefPickupConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1000),
            stiffness: 0.5,
        }
    }
}

fn crouch_pose() -> JointArray<f32> {
    let mut pose = JointArray::default();
    let arm = SingleArmJoints {
        shoulder_pitch: 90f32.to_radians(),
        ..Default::default()
    };
    pose.set_left_arm(arm);
    pose.set_right_arm(arm);
    pose.set_left_leg(LeftLegJoints {
        hip_yaw_pitch: 0.0,
        hip_roll: 0.0,
        hip_pitch: -45f32.to_radians(),
        knee_pitch: 90f32.to_radians(),
        ankle_pitch: -45f32.to_radians(),
        ankle_roll: 0.0,
    });
    pose.set_right_leg(RightLegJoints {
        hip_roll: 0.0,
        hip_pitch: -45f32.to_radians(),
        knee_pitch: 90f32.to_radians(),
        ankle_pitch: -45f32.to_radians(),
        ankle_roll: 0.0,
    });
    pose
}

/// Ramps from wherever the robot is into a soft crouch.
///
/// Used when the robot was limp before, so the motors do not jump to a standing pose at once.
#[derive(Debug, Default)]
pub struct RefPickupGenerator {
    start: Option<JointArray<f32>>,
    tick: u32,
    config: RefPickupConfig,
}

impl RefPickupGenerator {
    fn ramp_ticks(&self) -> u32 {
        (self.config.duration.as_millis() / CYCLE_TIME.as_millis()).max(1) as u32
    }
}

impl Generator for RefPickupGenerator {
    fn make_joints(
        &mut self,
        _request: &mut ActionRequest,
        _odometry: &mut Odometry,
        _body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        let start = *self.start.get_or_insert(input.sensors.joints.angles);
        let progress = (self.tick as f32 / self.ramp_ticks() as f32).min(1.0);
        self.tick = self.tick.saturating_add(1);

        let target = crouch_pose();
        let angles = start
            .zip(target)
            .map(|(from, to)| from + (to - from) * progress);

        let mut stiffness = JointArray::fill(self.config.stiffness * progress);
        stiffness.set_left_arm(SingleArmJoints::fill(0.0));
        stiffness.set_right_arm(SingleArmJoints::fill(0.0));

        JointValues::new(angles, stiffness)
    }

    fn is_active(&self) -> bool {
        self.start.is_some() && self.tick <= self.ramp_ticks()
    }

    fn reset(&mut self) {
        self.start = None;
        self.tick = 0;
    }

    fn stop(&mut self) {}

    fn read_options(&mut self, config: &MotionConfig, _robot: &RobotInfo) -> Result<()> {
        self.config = config.ref_pickup.clone();
        Ok(())
    }
}
