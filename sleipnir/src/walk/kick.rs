use std::time::Duration;

use strum::{Display, EnumIter, IntoEnumIterator};

use super::KickConfig;
use super::smoothing::{lerp, parabolic_step};
use crate::action::Foot;

/// Phases of a kick, in the order they are executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum KickPhase {
    /// Lean onto the support foot and lift the kicking foot.
    WeightShift,
    /// Pull the kicking foot back.
    BackSwing,
    /// Swing the kicking foot forward through the ball.
    Strike,
    /// Keep the foot extended.
    Hold,
    /// Bring the foot back down under the hip and straighten up.
    Return,
}

impl KickPhase {
    fn duration(self, config: &KickConfig) -> Duration {
        match self {
            KickPhase::WeightShift => config.weight_shift,
            KickPhase::BackSwing => config.back_swing,
            KickPhase::Strike => config.strike,
            KickPhase::Hold => config.hold,
            KickPhase::Return => config.retract,
        }
    }
}

/// Pose of the kicking foot, relative to its neutral position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KickPose {
    pub forward: f32,
    pub lift: f32,
    /// Roll of hips and ankles towards the support foot, in radians.
    pub lean: f32,
}

/// A kick in progress.
#[derive(Clone, Debug)]
pub struct KickSequence {
    foot: Foot,
    power: f32,
    elapsed: Duration,
}

impl KickSequence {
    #[must_use]
    pub fn new(foot: Foot, power: f32) -> Self {
        Self {
            foot,
            power: power.clamp(0.0, 1.0),
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn foot(&self) -> Foot {
        self.foot
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    #[must_use]
    pub fn total_duration(config: &KickConfig) -> Duration {
        KickPhase::iter().map(|phase| phase.duration(config)).sum()
    }

    #[must_use]
    pub fn is_finished(&self, config: &KickConfig) -> bool {
        self.elapsed >= Self::total_duration(config)
    }

    /// The current phase, and the linear progress through it.
    #[must_use]
    pub fn phase(&self, config: &KickConfig) -> (KickPhase, f32) {
        let mut start = Duration::ZERO;
        for phase in KickPhase::iter() {
            let duration = phase.duration(config);
            if self.elapsed < start + duration {
                let progress = (self.elapsed - start).as_secs_f32() / duration.as_secs_f32();
                return (phase, progress);
            }
            start += duration;
        }

        (KickPhase::Return, 1.0)
    }

    /// Pose of the kicking foot for the current point in time.
    #[must_use]
    pub fn pose(&self, config: &KickConfig) -> KickPose {
        let (phase, progress) = self.phase(config);
        let t = parabolic_step(progress);

        let back = -config.back_swing_distance * self.power;
        let strike = config.strike_distance * self.power;

        match phase {
            KickPhase::WeightShift => KickPose {
                forward: 0.0,
                lift: lerp(0.0, config.foot_lift, t),
                lean: lerp(0.0, config.lean, t),
            },
            KickPhase::BackSwing => KickPose {
                forward: lerp(0.0, back, t),
                lift: config.foot_lift,
                lean: config.lean,
            },
            KickPhase::Strike => KickPose {
                forward: lerp(back, strike, t),
                lift: config.foot_lift,
                lean: config.lean,
            },
            KickPhase::Hold => KickPose {
                forward: strike,
                lift: config.foot_lift,
                lean: config.lean,
            },
            KickPhase::Return => KickPose {
                forward: lerp(strike, 0.0, t),
                lift: lerp(config.foot_lift, 0.0, t),
                lean: lerp(config.lean, 0.0, t),
            },
        }
    }
}
