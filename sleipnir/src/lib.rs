//! Motion generation for a humanoid soccer robot.
//!
//! Each control cycle the behaviour layer writes an [`ActionRequest`], and the
//! [`ActionDispatcher`] turns it into joint angles and stiffnesses by routing it to one of
//! its generators: keyframe players, the getup player, the walk engine and the head.
pub mod action;
pub mod config;
pub mod dispatcher;
pub mod generator;
pub mod head;
pub mod model;
pub mod odometry;
pub mod plugin;
pub mod preprocessor;
pub mod script;
pub mod walk;

use std::time::Duration;

pub use miette::Result;

pub use action::{ActionRequest, ActionTable, ActionType, ActiveAction, BodyRequest, Foot};
pub use dispatcher::ActionDispatcher;
pub use plugin::{JointCommand, MotionPlugin};

/// Duration of one control cycle.
pub const CYCLE_TIME: Duration = Duration::from_millis(10);

pub mod prelude {
    pub use crate::action::{ActionRequest, ActionType, BodyRequest, Foot, HeadRequest};
    pub use crate::config::{MotionConfig, RobotInfo};
    pub use crate::generator::{Generator, MotionInput};
    pub use crate::model::{BallPosition, BodyModel};
    pub use crate::odometry::Odometry;
    pub use crate::{CYCLE_TIME, Result};
}
