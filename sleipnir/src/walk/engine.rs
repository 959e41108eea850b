use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use nalgebra::Vector2;
use nidhogg::JointValues;
use nidhogg::types::{FillExt, JointArray, LeftLegJoints, RightLegJoints, SingleArmJoints};
use tracing::{debug, info};

use super::filter::ExponentialLpf;
use super::kick::KickSequence;
use super::kinematics::leg_angles;
use super::{FootOffset, FootOffsets, KickConfig, Side, Step, WalkConfig, smoothing};
use crate::action::{ActionRequest, ActionType, BodyRequest, Foot};
use crate::config::{MotionConfig, RobotInfo};
use crate::generator::{Generator, MotionInput};
use crate::model::BodyModel;
use crate::odometry::Odometry;
use crate::{CYCLE_TIME, Result};

const GYRO_FILTER_ALPHA: f32 = 0.2;

/// Part of the swing phase after which foot pressure may end the step early.
const EARLY_SWITCH_PHASE: f32 = 0.75;

/// What the walk engine is doing with the body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkOption {
    /// The engine has not run since it was created or reset.
    #[default]
    None,
    /// Standing with near straight legs.
    Stand,
    /// Raising the hips back to standing height, after a stop.
    StandUp,
    /// Lowering the hips to walking height.
    Crouch,
    /// Crouched, with both feet under the hips.
    Ready,
    Walk,
    /// Walking, without smoothing the step size.
    Step,
    /// Lowering the hips on the way to a kick.
    KickCrouch,
    Kick,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkState {
    #[default]
    NotWalking,
    Starting,
    Walking,
    Stopping,
}

/// What the active request asks of the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Intent {
    Idle,
    Walk(Step),
    Kick { foot: Foot, power: f32 },
}

impl Intent {
    fn from_request(request: &BodyRequest) -> Self {
        match request.action_type {
            ActionType::Walk
            | ActionType::Dribble
            | ActionType::TurnDribble
            | ActionType::LineUp => Intent::Walk(Step::from_request(request)),
            ActionType::Kick => Intent::Kick {
                foot: request.foot,
                power: request.power,
            },
            _ => Intent::Idle,
        }
    }
}

/// An omnidirectional walk, based on Hengst, 2014, that also performs kicks.
///
/// <https://cgi.cse.unsw.edu.au/~robocup/2014ChampionTeamPaperReports/20140930-Bernhard.Hengst-Walk2014Report.pdf>
///
/// The phase timer is reset at every foot switch, after the joints for that cycle are
/// computed. A phase time of zero is therefore seen for exactly one cycle per step.
#[derive(Debug)]
pub struct WalkEngine {
    config: WalkConfig,
    kick_config: KickConfig,
    option: WalkOption,
    state: WalkState,
    /// The request the engine is executing, latched for the duration of a kick.
    pub active: BodyRequest,
    /// Disables the acceleration limit, so every step is exactly the requested one.
    pub exact_steps_requested: bool,
    stop_requested: bool,
    stopped: bool,
    /// Time into the current step phase.
    t: Duration,
    /// Whether the left foot is the swing foot.
    is_left_phase: bool,
    hip_height: f32,
    step: Step,
    foot_offsets: FootOffsets,
    foot_offsets_t0: FootOffsets,
    max_foot_lift: f32,
    switch_pending: bool,
    gyro: ExponentialLpf<2>,
    kick: Option<KickSequence>,
}

impl Default for WalkEngine {
    fn default() -> Self {
        Self::new(WalkConfig::default(), KickConfig::default())
    }
}

impl WalkEngine {
    #[must_use]
    pub fn new(config: WalkConfig, kick_config: KickConfig) -> Self {
        let hip_height = config.stand_hip_height;

        Self {
            config,
            kick_config,
            option: WalkOption::None,
            state: WalkState::NotWalking,
            active: BodyRequest::default(),
            exact_steps_requested: false,
            stop_requested: false,
            stopped: true,
            t: Duration::ZERO,
            is_left_phase: false,
            hip_height,
            step: Step::default(),
            foot_offsets: FootOffsets::zero(hip_height),
            foot_offsets_t0: FootOffsets::zero(hip_height),
            max_foot_lift: 0.0,
            switch_pending: false,
            gyro: ExponentialLpf::new(GYRO_FILTER_ALPHA),
            kick: None,
        }
    }

    #[must_use]
    pub fn option(&self) -> WalkOption {
        self.option
    }

    #[must_use]
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Time into the current step phase.
    #[must_use]
    pub fn phase_time(&self) -> Duration {
        self.t
    }

    #[must_use]
    pub fn is_left_phase(&self) -> bool {
        self.is_left_phase
    }

    /// Forward offset of the left foot, in meters.
    #[must_use]
    pub fn forward_l(&self) -> f32 {
        self.foot_offsets.left.forward
    }

    /// Forward offset of the right foot, in meters.
    #[must_use]
    pub fn forward_r(&self) -> f32 {
        self.foot_offsets.right.forward
    }

    #[must_use]
    pub fn is_kicking(&self) -> bool {
        self.kick.is_some()
    }

    fn swing_side(&self) -> Side {
        if self.is_left_phase {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn linear_time(&self) -> f32 {
        (self.t.as_secs_f32() / self.config.base_step_period.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn stand(&mut self, intent: Intent) {
        self.foot_offsets = FootOffsets::zero(self.hip_height);

        if self.stop_requested {
            self.stop_requested = false;
            self.stopped = true;
            info!("walk engine stopped");
            return;
        }

        match intent {
            Intent::Idle => self.stopped = true,
            Intent::Walk(_) => self.option = WalkOption::Crouch,
            Intent::Kick { .. } => self.option = WalkOption::KickCrouch,
        }
    }

    fn crouch(&mut self, dt: Duration) {
        if self.stop_requested {
            self.option = WalkOption::StandUp;
            return;
        }

        self.hip_height -= self.config.hip_height_speed * dt.as_secs_f32();
        if self.hip_height <= self.config.hip_height {
            self.hip_height = self.config.hip_height;
            self.option = WalkOption::Ready;
        }
        self.foot_offsets = FootOffsets::zero(self.hip_height);
    }

    fn stand_up(&mut self, dt: Duration) {
        self.hip_height += self.config.hip_height_speed * dt.as_secs_f32();
        if self.hip_height >= self.config.stand_hip_height {
            self.hip_height = self.config.stand_hip_height;
            self.option = WalkOption::Stand;
            if self.stop_requested {
                self.stop_requested = false;
                self.stopped = true;
                info!("walk engine stopped");
            }
        }
        self.foot_offsets = FootOffsets::zero(self.hip_height);
    }

    fn ready(&mut self, intent: Intent) {
        self.t = Duration::ZERO;
        self.foot_offsets = FootOffsets::zero(self.hip_height);

        if self.stop_requested {
            debug!("walk engine standing up");
            self.option = WalkOption::StandUp;
            return;
        }

        match intent {
            Intent::Kick { foot, power } => {
                info!(?foot, power, "starting kick");
                self.kick = Some(KickSequence::new(foot, power));
                self.option = WalkOption::Kick;
                self.is_left_phase = foot == Foot::Left;
            }
            Intent::Walk(step) if !step.is_zero() => {
                // step away from the direction we are going to, so the first swing moves that way
                self.is_left_phase = step.left > 0.0 || (step.left == 0.0 && step.turn > 0.0);
                self.state = WalkState::NotWalking;
                self.option = if self.exact_steps_requested {
                    WalkOption::Step
                } else {
                    WalkOption::Walk
                };
            }
            Intent::Walk(_) => {}
            // nothing to walk or kick, so wind down as if stopped
            Intent::Idle => {
                debug!("walk engine standing up, nothing requested");
                self.stop_requested = true;
                self.option = WalkOption::StandUp;
            }
        }
    }

    /// Initialises the next step phase, latching the step and the start offsets.
    fn init_step_phase(&mut self, intent: Intent) {
        self.foot_offsets_t0 = self.foot_offsets;

        let target = match intent {
            Intent::Walk(step) if !self.stop_requested => step.clamped(self.config.max_step_size),
            _ => Step::default(),
        };

        self.step = if self.exact_steps_requested {
            target
        } else {
            self.step.approach(target, self.config.max_acceleration)
        };

        self.state = if self.state == WalkState::NotWalking {
            WalkState::Starting
        } else if target.is_zero() {
            WalkState::Stopping
        } else {
            WalkState::Walking
        };
        self.option = if self.exact_steps_requested {
            WalkOption::Step
        } else {
            WalkOption::Walk
        };

        let modifier = self.config.foot_lift_modifier;
        self.max_foot_lift = self.config.base_foot_lift
            + self.step.forward.abs() * modifier.forward
            + self.step.left.abs() * modifier.left;
    }

    fn step_phase(&mut self, intent: Intent, input: &MotionInput, odometry: &mut Odometry) {
        if self.t.is_zero() {
            self.init_step_phase(intent);
        }

        let previous_time = self.linear_time();
        let support = self.swing_side().opposite();
        let previous_support = self.foot_offsets.get(support);

        self.t += CYCLE_TIME;
        self.foot_offsets = self.compute_foot_offsets();

        let linear_time = self.linear_time();
        let current_support = self.foot_offsets.get(support);
        odometry.add(
            previous_support.forward - current_support.forward,
            previous_support.left - current_support.left,
            self.step.turn * (linear_time - previous_time),
        );

        let swing_pressure = match self.swing_side() {
            Side::Left => input.sensors.foot_pressure.left,
            Side::Right => input.sensors.foot_pressure.right,
        };
        self.switch_pending = self.t >= self.config.base_step_period
            || (linear_time > EARLY_SWITCH_PHASE
                && swing_pressure > self.config.cop_pressure_threshold);
    }

    /// Ends the step phase, switching the support foot.
    fn switch_support_foot(&mut self) {
        self.switch_pending = false;
        self.t = Duration::ZERO;
        self.is_left_phase = !self.is_left_phase;

        if self.step.is_zero() && self.foot_offsets.is_neutral() {
            debug!("walk engine ready");
            self.foot_offsets = FootOffsets::zero(self.hip_height);
            self.option = WalkOption::Ready;
            self.state = WalkState::NotWalking;
        }
    }

    fn compute_foot_offsets(&self) -> FootOffsets {
        let linear_time = self.linear_time();
        let swing_lift = self.max_foot_lift * smoothing::parabolic_return(linear_time);
        let swing = self.swing_side();

        let swing_foot = self.compute_foot_offset(
            self.step,
            self.foot_offsets_t0.get(swing),
            swing_lift,
            true,
            smoothing::parabolic_step(linear_time),
        );
        let support_foot = self.compute_foot_offset(
            -self.step,
            self.foot_offsets_t0.get(swing.opposite()),
            0.0,
            false,
            linear_time,
        );

        match swing {
            Side::Left => FootOffsets {
                left: swing_foot,
                right: support_foot,
            },
            Side::Right => FootOffsets {
                left: support_foot,
                right: swing_foot,
            },
        }
    }

    fn compute_foot_offset(
        &self,
        step: Step,
        foot_t0: FootOffset,
        lift: f32,
        swing: bool,
        smoothing: f32,
    ) -> FootOffset {
        // two thirds of the turn is done by the swing foot, one third by the support foot
        let turn_base = if swing { 2.0 } else { 1.0 };
        let turn_multiplier = match self.swing_side() {
            Side::Left => turn_base,
            Side::Right => -turn_base,
        } / 3.0;

        FootOffset {
            forward: foot_t0.forward + (step.forward / 2.0 - foot_t0.forward) * smoothing,
            left: foot_t0.left + (step.left / 2.0 - foot_t0.left) * smoothing,
            turn: foot_t0.turn + (step.turn * turn_multiplier - foot_t0.turn) * smoothing,
            hip_height: self.hip_height,
            lift,
        }
    }

    fn kick_phase(&mut self, request: &mut ActionRequest) {
        let Some(kick) = self.kick.as_mut() else {
            self.option = WalkOption::Ready;
            return;
        };

        kick.advance(CYCLE_TIME);
        let pose = kick.pose(&self.kick_config);
        let mut kicking = FootOffset::zero(self.hip_height);
        kicking.forward = pose.forward;
        kicking.lift = pose.lift;

        self.foot_offsets = match kick.foot() {
            Foot::Left => FootOffsets {
                left: kicking,
                right: FootOffset::zero(self.hip_height),
            },
            Foot::Right => FootOffsets {
                left: FootOffset::zero(self.hip_height),
                right: kicking,
            },
        };

        if kick.is_finished(&self.kick_config) {
            info!(foot = ?kick.foot(), "kick finished");
            self.kick = None;
            self.option = WalkOption::Ready;
            request.body.action_type = ActionType::Walk;
        }
    }

    /// Roll towards the support foot while kicking, in radians.
    fn kick_lean(&self) -> f32 {
        self.kick.as_ref().map_or(0.0, |kick| {
            let lean = kick.pose(&self.kick_config).lean;
            match kick.foot() {
                Foot::Left => -lean,
                Foot::Right => lean,
            }
        })
    }

    fn joints(&mut self, input: &MotionInput) -> JointValues {
        let FootOffsets {
            left: left_foot,
            right: right_foot,
        } = self.foot_offsets;
        let (mut left_leg, mut right_leg) = leg_angles(&left_foot, &right_foot);

        let lean = self.kick_lean();
        left_leg.hip_roll += lean;
        right_leg.hip_roll += lean;
        left_leg.ankle_roll -= lean;
        right_leg.ankle_roll -= lean;

        let inertial = &input.sensors.inertial;
        let gyro = self
            .gyro
            .update(Vector2::new(inertial.gyro_x, inertial.gyro_y));
        let balance_adjustment = gyro.y * self.config.balancing.filtered_gyro_y_multiplier;
        match self.swing_side() {
            Side::Left => right_leg.ankle_pitch += balance_adjustment,
            Side::Right => left_leg.ankle_pitch += balance_adjustment,
        }

        // the arms swing against the opposite foot
        let arm_swing = self.config.balancing.arm_swing_multiplier;
        let left_arm = SingleArmJoints {
            shoulder_pitch: FRAC_PI_2 - right_foot.forward * arm_swing,
            shoulder_roll: self.config.shoulder_roll,
            ..Default::default()
        };
        let right_arm = SingleArmJoints {
            shoulder_pitch: FRAC_PI_2 - left_foot.forward * arm_swing,
            shoulder_roll: -self.config.shoulder_roll,
            ..Default::default()
        };

        let mut angles = input.sensors.joints.angles;
        angles.set_left_leg(left_leg);
        angles.set_right_leg(right_leg);
        angles.set_left_arm(left_arm);
        angles.set_right_arm(right_arm);

        let arm_stiffness = |limp: bool| {
            SingleArmJoints::fill(if limp { 0.0 } else { self.config.arm_stiffness })
        };
        let mut stiffness = JointArray::fill(0.0);
        stiffness.set_left_leg(LeftLegJoints::fill(self.config.leg_stiffness));
        stiffness.set_right_leg(RightLegJoints::fill(self.config.leg_stiffness));
        stiffness.set_left_arm(arm_stiffness(self.active.left_arm_limp));
        stiffness.set_right_arm(arm_stiffness(self.active.right_arm_limp));

        JointValues::new(angles, stiffness)
    }
}

impl Generator for WalkEngine {
    fn make_joints(
        &mut self,
        request: &mut ActionRequest,
        odometry: &mut Odometry,
        body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        if self.option != WalkOption::Kick {
            self.active = request.body.clone();
        }

        let intent = Intent::from_request(&self.active);
        if self.stopped && intent != Intent::Idle {
            debug!(?intent, "walk engine starting");
            self.stopped = false;
            self.stop_requested = false;
        }

        match self.option {
            WalkOption::None | WalkOption::Stand => self.stand(intent),
            WalkOption::Crouch | WalkOption::KickCrouch => self.crouch(CYCLE_TIME),
            WalkOption::StandUp => self.stand_up(CYCLE_TIME),
            WalkOption::Ready => self.ready(intent),
            WalkOption::Walk | WalkOption::Step => self.step_phase(intent, input, odometry),
            WalkOption::Kick => self.kick_phase(request),
        }

        let joints = self.joints(input);
        if self.switch_pending {
            self.switch_support_foot();
        }

        body_model.is_left_phase = self.is_left_phase;
        joints
    }

    fn is_active(&self) -> bool {
        !self.stopped
    }

    fn reset(&mut self) {
        let hip_height = self.config.stand_hip_height;

        self.option = WalkOption::None;
        self.state = WalkState::NotWalking;
        self.exact_steps_requested = false;
        self.stop_requested = false;
        self.stopped = true;
        self.t = Duration::ZERO;
        self.is_left_phase = false;
        self.hip_height = hip_height;
        self.step = Step::default();
        self.foot_offsets = FootOffsets::zero(hip_height);
        self.foot_offsets_t0 = FootOffsets::zero(hip_height);
        self.max_foot_lift = 0.0;
        self.switch_pending = false;
        self.gyro.reset();
        self.kick = None;
    }

    fn stop(&mut self) {
        if !self.stopped && !self.stop_requested {
            debug!(option = ?self.option, "walk engine stop requested");
            self.stop_requested = true;
        }
    }

    fn read_options(&mut self, config: &MotionConfig, _robot: &RobotInfo) -> Result<()> {
        *self = Self::new(config.walk.clone(), config.kick.clone());
        Ok(())
    }
}
