use std::f32::consts::{PI, TAU};

use crate::action::{ActionType, BodyRequest, Foot};
use crate::model::BallPosition;
use crate::walk::WalkEngine;

/// Distance from the ball to the front of the foot when lined up, in millimetres.
const BALL_CLEARANCE: f32 = 100.0;
/// Distance from the ankle to the front of the foot, in millimetres.
const FOOT_LENGTH: f32 = 90.0;
/// Sideways offset of the ball from the robot's centre for a left foot kick, in millimetres.
const LEFT_FOOT_GAP: f32 = 75.0;

const MAX_FORWARD: f32 = 90.0;
const MAX_LEFT: f32 = 50.0;
const MAX_TURN_DEGREES: f32 = 20.0;
/// Largest difference between the requested turn and the direction of the ball.
const TURN_WINDOW_DEGREES: f32 = 30.0;

const FORWARD_TOLERANCE: f32 = 25.0;
const LEFT_TOLERANCE: f32 = 20.0;

/// Walks up to the ball, so that it ends up in front of the requested foot.
///
/// The request's `speed` is the tolerance on the heading, in radians.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineUp {
    has_ended: bool,
}

fn signed_min(value: f32, max: f32) -> f32 {
    value.signum() * value.abs().min(max)
}

impl LineUp {
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.has_ended
    }

    pub fn reset(&mut self) {
        self.has_ended = false;
    }

    /// Rewrites `request` into the next step towards the ball, walked with exact steps.
    pub fn preprocess(
        &mut self,
        request: &mut BodyRequest,
        ball: BallPosition,
        engine: &mut WalkEngine,
    ) {
        self.step(request, ball, engine.forward_l(), engine.forward_r());
        engine.exact_steps_requested = true;
    }

    /// `forward_l` and `forward_r` are the current forward offsets of the feet, in meters.
    fn step(
        &mut self,
        request: &mut BodyRequest,
        ball: BallPosition,
        forward_l: f32,
        forward_r: f32,
    ) {
        let gap_x = ball.x() - BALL_CLEARANCE - FOOT_LENGTH - forward_l.max(forward_r) * 1000.0;
        let gap_y = match request.foot {
            Foot::Left => ball.y() - LEFT_FOOT_GAP,
            Foot::Right => ball.y(),
        };

        self.has_ended = gap_x.abs() < FORWARD_TOLERANCE
            && gap_y.abs() < LEFT_TOLERANCE
            && request.turn.abs() < request.speed;

        let heading = ball.y().atan2(ball.x());
        let window = TURN_WINDOW_DEGREES.to_radians();
        let turn = normalize(heading + normalize(request.turn - heading).clamp(-window, window));

        request.action_type = ActionType::Walk;
        request.forward = signed_min(gap_x, MAX_FORWARD);
        request.left = signed_min(gap_y, MAX_LEFT);
        request.turn = signed_min(turn / 2.0, MAX_TURN_DEGREES.to_radians());
    }
}

/// Wraps `angle` into [-pi, pi).
fn normalize(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
