//! Runs the [`ActionDispatcher`] inside a bevy app, once per control cycle.
use bevy::prelude::*;
use nidhogg::{JointValues, SensorValues};
use tracing::debug;

use crate::action::{ActionRequest, ActiveAction};
use crate::dispatcher::ActionDispatcher;
use crate::generator::MotionInput;
use crate::model::{BallPosition, BodyModel};
use crate::odometry::Odometry;

/// The joint values that should be sent to the robot this cycle.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Deref, DerefMut)]
pub struct JointCommand(pub JointValues);

/// Plugin that turns the [`ActionRequest`] into a [`JointCommand`] every update.
///
/// The [`ActionDispatcher`] loads pose files when it is created, so it has to be inserted by the
/// app itself. Motion only runs once it exists.
pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionRequest>()
            .init_resource::<SensorValues>()
            .init_resource::<BodyModel>()
            .init_resource::<BallPosition>()
            .init_resource::<Odometry>()
            .init_resource::<JointCommand>()
            .init_resource::<ActiveAction>()
            .add_systems(
                Update,
                run_motion.run_if(resource_exists::<ActionDispatcher>),
            );
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_motion(
    mut dispatcher: ResMut<ActionDispatcher>,
    request: Res<ActionRequest>,
    sensors: Res<SensorValues>,
    ball: Res<BallPosition>,
    time: Res<Time>,
    mut odometry: ResMut<Odometry>,
    mut body_model: ResMut<BodyModel>,
    mut command: ResMut<JointCommand>,
    mut active: ResMut<ActiveAction>,
) {
    let input = MotionInput {
        sensors: &sensors,
        ball: *ball,
        now: time.elapsed(),
    };

    let mut request = request.clone();
    odometry.begin_cycle();
    let joints = dispatcher.make_joints(&mut request, &mut odometry, &mut body_model, &input);

    **command = joints;
    if **active != request.body.action_type {
        debug!(action = %request.body.action_type, "active action changed");
    }
    *active = ActiveAction(request.body.action_type);
}
