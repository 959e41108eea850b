//! The generators the dispatcher chooses between.
//!
//! Every generator turns the current [`ActionRequest`] into a complete set of joint values, each
//! cycle. The dispatcher owns one [`BodyGenerator`] per slot and switches between them.
mod action_file;
mod getup;
pub mod pose;
mod ref_pickup;
mod simple;

use std::time::Duration;

use nidhogg::{JointValues, SensorValues};

use crate::Result;
use crate::action::ActionRequest;
use crate::config::{MotionConfig, RobotInfo};
use crate::model::{BallPosition, BodyModel};
use crate::odometry::Odometry;
use crate::preprocessor::WalkEnginePreprocessor;

pub use action_file::ActionGenerator;
pub use getup::{FallDirection, GetupConfig, GetupGenerator, getup_file};
pub use pose::{KeyframeSequence, PoseFileError, PoseLibrary};
pub use ref_pickup::{RefPickupConfig, RefPickupGenerator};
pub use simple::{DeadGenerator, NullGenerator};

/// Everything a generator reads, but never writes, during a cycle.
#[derive(Clone, Copy, Debug)]
pub struct MotionInput<'a> {
    pub sensors: &'a SensorValues,
    pub ball: BallPosition,
    /// Time since the motion loop started.
    pub now: Duration,
}

/// A stateful source of joint values.
pub trait Generator {
    /// Computes the joint values for this cycle.
    ///
    /// Generators may rewrite `request`, which is how they report back what they actually did.
    fn make_joints(
        &mut self,
        request: &mut ActionRequest,
        odometry: &mut Odometry,
        body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues;

    /// Whether the generator is in the middle of something that should not be cut off.
    fn is_active(&self) -> bool;

    /// Forces the generator back into its initial state.
    fn reset(&mut self);

    /// Asks the generator to wind down, after which it reports itself inactive.
    fn stop(&mut self);

    /// Reads options and pose files, once at startup.
    fn read_options(&mut self, _config: &MotionConfig, _robot: &RobotInfo) -> Result<()> {
        Ok(())
    }
}

/// One of the body generators the dispatcher owns.
#[derive(Debug)]
pub enum BodyGenerator {
    Null(NullGenerator),
    Dead(DeadGenerator),
    Action(ActionGenerator),
    Getup(GetupGenerator),
    RefPickup(RefPickupGenerator),
    Walk(Box<WalkEnginePreprocessor>),
}

macro_rules! delegate {
    ($self:ident, $generator:ident => $call:expr) => {
        match $self {
            BodyGenerator::Null($generator) => $call,
            BodyGenerator::Dead($generator) => $call,
            BodyGenerator::Action($generator) => $call,
            BodyGenerator::Getup($generator) => $call,
            BodyGenerator::RefPickup($generator) => $call,
            BodyGenerator::Walk($generator) => $call,
        }
    };
}

impl BodyGenerator {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BodyGenerator::Null(_) => "null",
            BodyGenerator::Dead(_) => "dead",
            BodyGenerator::Action(generator) => generator.file_name(),
            BodyGenerator::Getup(_) => "getup",
            BodyGenerator::RefPickup(_) => "ref pickup",
            BodyGenerator::Walk(_) => "walk",
        }
    }
}

impl Generator for BodyGenerator {
    fn make_joints(
        &mut self,
        request: &mut ActionRequest,
        odometry: &mut Odometry,
        body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        delegate!(self, generator => generator.make_joints(request, odometry, body_model, input))
    }

    fn is_active(&self) -> bool {
        delegate!(self, generator => generator.is_active())
    }

    fn reset(&mut self) {
        delegate!(self, generator => generator.reset());
    }

    fn stop(&mut self) {
        delegate!(self, generator => generator.stop());
    }

    fn read_options(&mut self, config: &MotionConfig, robot: &RobotInfo) -> Result<()> {
        delegate!(self, generator => generator.read_options(config, robot))
    }
}
