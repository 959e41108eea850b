use nidhogg::JointValues;

use super::{Generator, MotionInput};
use crate::action::ActionRequest;
use crate::model::BodyModel;
use crate::odometry::Odometry;

/// Holds the sensed angles without any stiffness.
#[derive(Debug, Default)]
pub struct NullGenerator;

impl Generator for NullGenerator {
    fn make_joints(
        &mut self,
        _request: &mut ActionRequest,
        _odometry: &mut Odometry,
        _body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        JointValues::with_stiffness(input.sensors.joints.angles, 0.0)
    }

    fn is_active(&self) -> bool {
        false
    }

    fn reset(&mut self) {}

    fn stop(&mut self) {}
}

/// Lets every motor go limp.
#[derive(Debug, Default)]
pub struct DeadGenerator;

impl Generator for DeadGenerator {
    fn make_joints(
        &mut self,
        _request: &mut ActionRequest,
        _odometry: &mut Odometry,
        _body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        JointValues::limp(input.sensors.joints.angles)
    }

    fn is_active(&self) -> bool {
        false
    }

    fn reset(&mut self) {}

    fn stop(&mut self) {}
}
