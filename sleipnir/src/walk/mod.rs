//! Omnidirectional walk and kick engine.
mod engine;
mod filter;
mod kick;
pub mod kinematics;
pub mod smoothing;

use std::ops::Neg;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::action::BodyRequest;

pub use engine::{WalkEngine, WalkOption, WalkState};
pub use filter::ExponentialLpf;
pub use kick::{KickPhase, KickPose, KickSequence};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalancingConfig {
    /// Shoulder pitch change per meter of opposite foot offset.
    pub arm_swing_multiplier: f32,
    /// Support ankle pitch change per rad/s of filtered gyro y.
    pub filtered_gyro_y_multiplier: f32,
}

/// Configuration for the walking engine.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalkConfig {
    /// Duration of a single step, from one foot switch to the next.
    #[serde_as(as = "DurationMilliSeconds")]
    pub base_step_period: Duration,
    pub leg_stiffness: f32,
    pub arm_stiffness: f32,
    /// Pressure in kg on the swing foot that ends a step early.
    pub cop_pressure_threshold: f32,
    /// Swing foot lift in meters, for a step in place.
    pub base_foot_lift: f32,
    /// Extra foot lift per meter of step.
    pub foot_lift_modifier: Step,
    pub max_step_size: Step,
    /// Maximum change of the step size between two consecutive steps.
    pub max_acceleration: Step,
    /// Hip height in meters while walking.
    pub hip_height: f32,
    /// Hip height in meters while standing.
    pub stand_hip_height: f32,
    /// Speed in meters per second at which the hip is raised or lowered.
    pub hip_height_speed: f32,
    /// Outward roll of the shoulders, in radians.
    pub shoulder_roll: f32,
    pub balancing: BalancingConfig,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            base_step_period: Duration::from_millis(240),
            leg_stiffness: 0.9,
            arm_stiffness: 0.6,
            cop_pressure_threshold: 0.2,
            base_foot_lift: 0.012,
            foot_lift_modifier: Step {
                forward: 0.1,
                left: 0.2,
                turn: 0.0,
            },
            max_step_size: Step {
                forward: 0.14,
                left: 0.05,
                turn: 0.8,
            },
            max_acceleration: Step {
                forward: 0.03,
                left: 0.02,
                turn: 0.3,
            },
            hip_height: 0.225,
            stand_hip_height: 0.24,
            hip_height_speed: 0.2,
            shoulder_roll: 0.12,
            balancing: BalancingConfig {
                arm_swing_multiplier: 6.0,
                filtered_gyro_y_multiplier: 0.04,
            },
        }
    }
}

/// Configuration for kicks, performed by the walking engine from its ready pose.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KickConfig {
    #[serde_as(as = "DurationMilliSeconds")]
    pub weight_shift: Duration,
    #[serde_as(as = "DurationMilliSeconds")]
    pub back_swing: Duration,
    #[serde_as(as = "DurationMilliSeconds")]
    pub strike: Duration,
    #[serde_as(as = "DurationMilliSeconds")]
    pub hold: Duration,
    #[serde_as(as = "DurationMilliSeconds")]
    pub retract: Duration,
    /// Hip and ankle roll in radians that moves the weight onto the support foot.
    pub lean: f32,
    /// How far the kicking foot swings back before the strike, in meters.
    pub back_swing_distance: f32,
    /// How far the kicking foot swings forward at full power, in meters.
    pub strike_distance: f32,
    /// Height of the kicking foot, in meters.
    pub foot_lift: f32,
}

impl Default for KickConfig {
    fn default() -> Self {
        Self {
            weight_shift: Duration::from_millis(400),
            back_swing: Duration::from_millis(200),
            strike: Duration::from_millis(120),
            hold: Duration::from_millis(100),
            retract: Duration::from_millis(400),
            lean: 0.12,
            back_swing_distance: 0.04,
            strike_distance: 0.1,
            foot_lift: 0.03,
        }
    }
}

/// A walking step, in meters and radians per step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub forward: f32,
    pub left: f32,
    pub turn: f32,
}

impl Step {
    /// Converts the millimetre walk parameters of a request.
    #[must_use]
    pub fn from_request(request: &BodyRequest) -> Self {
        Step {
            forward: request.forward / 1000.0,
            left: request.left / 1000.0,
            turn: request.turn,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.forward == 0.0 && self.left == 0.0 && self.turn == 0.0
    }

    /// Clamps the step to the provided `max_step_size`.
    #[must_use]
    pub fn clamped(&self, max_step_size: Step) -> Step {
        Step {
            forward: self
                .forward
                .clamp(-max_step_size.forward, max_step_size.forward),
            left: self.left.clamp(-max_step_size.left, max_step_size.left),
            turn: self.turn.clamp(-max_step_size.turn, max_step_size.turn),
        }
    }

    /// Moves from `self` towards `target`, by at most `max_change` per component.
    #[must_use]
    pub fn approach(&self, target: Step, max_change: Step) -> Step {
        let approach = |from: f32, to: f32, max: f32| from + (to - from).clamp(-max, max);
        Step {
            forward: approach(self.forward, target.forward, max_change.forward),
            left: approach(self.left, target.left, max_change.left),
            turn: approach(self.turn, target.turn, max_change.turn),
        }
    }
}

impl Neg for Step {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Step {
            forward: -self.forward,
            left: -self.left,
            turn: -self.turn,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// The position of a foot relative to its neutral position under the hip.
///
/// `forward`, `left`, `hip_height` and `lift` are in meters, `turn` is in radians.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct FootOffset {
    pub forward: f32,
    pub left: f32,
    pub turn: f32,
    pub hip_height: f32,
    pub lift: f32,
}

impl FootOffset {
    #[must_use]
    pub fn zero(hip_height: f32) -> Self {
        Self {
            hip_height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FootOffsets {
    pub left: FootOffset,
    pub right: FootOffset,
}

impl FootOffsets {
    #[must_use]
    pub fn zero(hip_height: f32) -> Self {
        FootOffsets {
            left: FootOffset::zero(hip_height),
            right: FootOffset::zero(hip_height),
        }
    }

    #[must_use]
    pub fn get(&self, side: Side) -> FootOffset {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut FootOffset {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Whether both feet are back under the hips.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        const EPSILON: f32 = 1e-4;
        [self.left, self.right].iter().all(|foot| {
            foot.forward.abs() < EPSILON && foot.left.abs() < EPSILON && foot.turn.abs() < EPSILON
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_from_request_converts_to_meters() {
        let step = Step::from_request(&BodyRequest::walk(120.0, -30.0, 0.2));
        assert!((step.forward - 0.12).abs() < 1e-6);
        assert!((step.left + 0.03).abs() < 1e-6);
        assert_eq!(step.turn, 0.2);
    }

    #[test]
    fn approach_limits_change() {
        let current = Step::default();
        let next = current.approach(
            Step {
                forward: 0.1,
                left: -0.01,
                turn: 0.5,
            },
            Step {
                forward: 0.03,
                left: 0.02,
                turn: 0.3,
            },
        );

        assert!((next.forward - 0.03).abs() < 1e-6);
        assert!((next.left + 0.01).abs() < 1e-6);
        assert!((next.turn - 0.3).abs() < 1e-6);
    }
}
