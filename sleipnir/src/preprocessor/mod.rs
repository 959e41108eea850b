//! Scripted multi-step maneuvers on top of the walk engine.
//!
//! The [`WalkEnginePreprocessor`] sits between the dispatcher and the [`WalkEngine`]. Each cycle
//! it may rewrite the request into the next step of a dribble or turn-dribble, advancing the
//! maneuver whenever the walk engine switches its support foot.
mod cooldown;
mod dribble;
mod line_up;
mod turn_dribble;

use std::time::Duration;

use nidhogg::JointValues;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::debug;

use crate::Result;
use crate::action::{ActionRequest, ActionType};
use crate::config::{MotionConfig, RobotInfo};
use crate::generator::{Generator, MotionInput};
use crate::model::BodyModel;
use crate::odometry::Odometry;
use crate::walk::WalkEngine;

pub use cooldown::Cooldown;
pub use dribble::{Dribble, DribbleState};
pub use line_up::LineUp;
pub use turn_dribble::{TurnDribble, TurnDribbleState};

/// Configuration for the dribble and turn-dribble maneuvers.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManeuverConfig {
    /// Time after a maneuver ends before it may start again.
    #[serde_as(as = "DurationMilliSeconds")]
    pub cooldown: Duration,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(400),
        }
    }
}

/// What the maneuvers see of the walk engine in a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Phase {
    /// Whether the support foot switched since the last cycle.
    pub edge: bool,
    /// Whether the left foot is the swing foot.
    pub is_left_phase: bool,
}

/// Detects foot switches from the walk engine's phase timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseEdge {
    last: Option<Duration>,
}

impl PhaseEdge {
    /// Returns `true` when the phase timer just became zero, or on the first observation of a
    /// zero timer.
    pub fn observe(&mut self, t: Duration) -> bool {
        let edge = t.is_zero() && self.last.is_none_or(|last| !last.is_zero());
        self.last = Some(t);
        edge
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// The walk engine, wrapped with the maneuvers that steer it.
#[derive(Debug, Default)]
pub struct WalkEnginePreprocessor {
    engine: WalkEngine,
    dribble: Dribble,
    turn_dribble: TurnDribble,
    line_up: LineUp,
    is_kicking: bool,
    edge: PhaseEdge,
}

impl WalkEnginePreprocessor {
    #[must_use]
    pub fn new(engine: WalkEngine, config: &ManeuverConfig) -> Self {
        Self {
            engine,
            dribble: Dribble::new(config.cooldown),
            turn_dribble: TurnDribble::new(config.cooldown),
            line_up: LineUp::default(),
            is_kicking: false,
            edge: PhaseEdge::default(),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &WalkEngine {
        &self.engine
    }

    #[must_use]
    pub fn dribble(&self) -> &Dribble {
        &self.dribble
    }

    #[must_use]
    pub fn turn_dribble(&self) -> &TurnDribble {
        &self.turn_dribble
    }

    #[must_use]
    pub fn line_up(&self) -> &LineUp {
        &self.line_up
    }

    #[must_use]
    pub fn is_kicking(&self) -> bool {
        self.is_kicking
    }

    /// Rewrites the request for the running maneuver, if any, or starts a requested one.
    ///
    /// Returns the action the request is reported as, once the walk engine ran.
    fn preprocess(
        &mut self,
        request: &mut ActionRequest,
        phase: Phase,
        now: Duration,
    ) -> ActionType {
        let body = &mut request.body;

        if !self.dribble.has_ended() {
            self.dribble.preprocess(body, phase, now);
            return ActionType::Dribble;
        }

        if !self.turn_dribble.has_ended() {
            self.turn_dribble.preprocess(body, phase, now);
            return ActionType::TurnDribble;
        }

        self.dribble.reset();
        self.turn_dribble.reset();

        match body.action_type {
            ActionType::TurnDribble => {
                self.turn_dribble.start(body.foot);
                self.turn_dribble.preprocess(body, phase, now);
                ActionType::TurnDribble
            }
            ActionType::Dribble => {
                self.dribble.start(body.foot, body.forward);
                self.dribble.preprocess(body, phase, now);
                ActionType::Dribble
            }
            action => action,
        }
    }
}

impl Generator for WalkEnginePreprocessor {
    fn make_joints(
        &mut self,
        request: &mut ActionRequest,
        odometry: &mut Odometry,
        body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        let phase = Phase {
            edge: self.edge.observe(self.engine.phase_time()),
            is_left_phase: self.engine.is_left_phase(),
        };

        let body = &mut request.body;
        let cooling_down = match body.action_type {
            ActionType::Dribble => !self.dribble.cooldown().is_ready(input.now),
            ActionType::TurnDribble => !self.turn_dribble.cooldown().is_ready(input.now),
            _ => false,
        };
        if cooling_down {
            debug!(action = %body.action_type, "maneuver is cooling down");
            body.neutralize();
        }

        // a kick that was requested but never started does not block the maneuvers
        if self.is_kicking && !self.engine.is_kicking() && body.action_type != ActionType::Kick {
            self.is_kicking = false;
        }

        let reported = if self.is_kicking {
            self.engine.exact_steps_requested = false;
            ActionType::Kick
        } else {
            let reported = self.preprocess(request, phase, input.now);
            self.engine.exact_steps_requested = matches!(
                reported,
                ActionType::Dribble | ActionType::TurnDribble
            );
            reported
        };

        let body = &mut request.body;
        if body.action_type == ActionType::Kick {
            self.is_kicking = true;
            body.turn = 0.0;
            body.speed = 0.0;
        }

        let joints = self
            .engine
            .make_joints(request, odometry, body_model, input);

        if self.engine.active.action_type == ActionType::Kick
            && request.body.action_type == ActionType::Walk
        {
            self.is_kicking = false;
        } else {
            request.body.action_type = reported;
        }

        joints
    }

    fn is_active(&self) -> bool {
        self.engine.is_active() || !self.dribble.has_ended() || !self.turn_dribble.has_ended()
    }

    fn reset(&mut self) {
        self.engine.reset();
        self.dribble.reset();
        self.dribble.cooldown_mut().clear();
        self.turn_dribble.reset();
        self.turn_dribble.cooldown_mut().clear();
        self.line_up.reset();
        self.is_kicking = false;
        self.edge.reset();
    }

    /// Stops the walk engine and abandons any running maneuver.
    fn stop(&mut self) {
        self.engine.stop();
        self.dribble.reset();
        self.turn_dribble.reset();
    }

    fn read_options(&mut self, config: &MotionConfig, robot: &RobotInfo) -> Result<()> {
        self.engine.read_options(config, robot)?;
        self.dribble = Dribble::new(config.maneuver.cooldown);
        self.turn_dribble = TurnDribble::new(config.maneuver.cooldown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nidhogg::SensorValues;

    use super::*;
    use crate::action::{BodyRequest, Foot};
    use crate::model::BallPosition;
    use crate::walk::WalkOption;

    struct Harness {
        preprocessor: WalkEnginePreprocessor,
        sensors: SensorValues,
        now: Duration,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                preprocessor: WalkEnginePreprocessor::default(),
                sensors: SensorValues::default(),
                now: Duration::ZERO,
            }
        }

        fn tick(&mut self, body: BodyRequest) -> ActionRequest {
            let mut request = ActionRequest {
                body,
                ..Default::default()
            };
            let input = MotionInput {
                sensors: &self.sensors,
                ball: BallPosition::default(),
                now: self.now,
            };
            self.preprocessor.make_joints(
                &mut request,
                &mut Odometry::default(),
                &mut BodyModel::default(),
                &input,
            );
            self.now += crate::CYCLE_TIME;
            request
        }
    }

    #[test]
    fn phase_edge_fires_once_per_zero() {
        let mut edge = PhaseEdge::default();
        let ms = Duration::from_millis;

        assert!(edge.observe(Duration::ZERO));
        assert!(!edge.observe(Duration::ZERO));
        assert!(!edge.observe(ms(10)));
        assert!(!edge.observe(ms(20)));
        assert!(edge.observe(Duration::ZERO));
        assert!(!edge.observe(ms(10)));

        let mut first = PhaseEdge::default();
        assert!(!first.observe(ms(10)));
    }

    #[test]
    fn dribble_runs_through_all_states() {
        let mut harness = Harness::new();
        let walk = BodyRequest::walk(100.0, 0.0, 0.0);
        for _ in 0..100 {
            harness.tick(walk.clone());
        }

        let dribble = BodyRequest {
            action_type: ActionType::Dribble,
            forward: 120.0,
            foot: Foot::Left,
            ..Default::default()
        };

        let mut states = vec![];
        for _ in 0..200 {
            let request = harness.tick(dribble.clone());
            assert_eq!(request.body.action_type, ActionType::Dribble);
            assert!(harness.preprocessor.engine().exact_steps_requested);

            let state = harness.preprocessor.dribble().state();
            if states.last() != Some(&state) {
                states.push(state);
            }
            if state == DribbleState::End {
                break;
            }
        }

        assert_eq!(
            states,
            [
                DribbleState::Init,
                DribbleState::Step,
                DribbleState::Kick,
                DribbleState::Follow,
                DribbleState::End
            ]
        );
    }

    #[test]
    fn dribble_cooldown_neutralizes_requests() {
        let mut harness = Harness::new();
        let dribble = BodyRequest {
            action_type: ActionType::Dribble,
            forward: 120.0,
            ..Default::default()
        };

        for _ in 0..400 {
            harness.tick(dribble.clone());
            if harness.preprocessor.dribble().has_ended()
                && !harness.preprocessor.dribble().cooldown().is_ready(harness.now)
            {
                break;
            }
        }
        assert!(harness.preprocessor.dribble().has_ended());

        let request = harness.tick(dribble.clone());
        assert_eq!(request.body.action_type, ActionType::Walk);
        assert_eq!(request.body.forward, 1.0);
        assert_eq!(request.body.power, 0.0);
        assert!(harness.preprocessor.dribble().has_ended());

        harness.now += Duration::from_millis(400);
        let request = harness.tick(dribble);
        assert_eq!(request.body.action_type, ActionType::Dribble);
        assert!(!harness.preprocessor.dribble().has_ended());
    }

    #[test]
    fn turn_dribble_turns_then_pushes() {
        let mut harness = Harness::new();
        let walk = BodyRequest::walk(100.0, 0.0, 0.0);
        for _ in 0..100 {
            harness.tick(walk.clone());
        }

        let turn_dribble = BodyRequest {
            action_type: ActionType::TurnDribble,
            foot: Foot::Right,
            ..Default::default()
        };

        let mut states = vec![];
        for _ in 0..400 {
            let request = harness.tick(turn_dribble.clone());
            assert_eq!(request.body.action_type, ActionType::TurnDribble);

            let state = harness.preprocessor.turn_dribble().state();
            if states.last() != Some(&state) {
                states.push(state);
            }
            if state == TurnDribbleState::End {
                break;
            }
        }

        assert_eq!(
            states,
            [
                TurnDribbleState::Init,
                TurnDribbleState::Turn,
                TurnDribbleState::Forward,
                TurnDribbleState::End
            ]
        );
    }

    #[test]
    fn kick_zeroes_turn_and_speed() {
        let mut harness = Harness::new();
        let kick = BodyRequest {
            turn: 0.4,
            ..BodyRequest::kick(Foot::Left, 1.0)
        };

        let request = harness.tick(kick);
        assert!(harness.preprocessor.is_kicking());
        assert_eq!(request.body.action_type, ActionType::Kick);
        assert_eq!(request.body.turn, 0.0);
        assert_eq!(request.body.speed, 0.0);
    }

    #[test]
    fn kick_completion_clears_kicking() {
        let mut harness = Harness::new();
        let kick = BodyRequest::kick(Foot::Right, 1.0);

        for _ in 0..400 {
            let request = harness.tick(kick.clone());
            if request.body.action_type == ActionType::Walk {
                assert!(!harness.preprocessor.is_kicking());
                assert_eq!(harness.preprocessor.engine().option(), WalkOption::Ready);
                return;
            }
            assert!(harness.preprocessor.is_kicking());
        }

        panic!("kick did not finish");
    }

    #[test]
    fn stop_abandons_maneuvers() {
        let mut harness = Harness::new();
        let dribble = BodyRequest {
            action_type: ActionType::Dribble,
            forward: 120.0,
            ..Default::default()
        };
        for _ in 0..20 {
            harness.tick(dribble.clone());
        }
        assert!(!harness.preprocessor.dribble().has_ended());

        harness.preprocessor.stop();
        let mut ticks = 0;
        while harness.preprocessor.is_active() {
            harness.tick(BodyRequest::new(ActionType::Stand));
            ticks += 1;
            assert!(ticks < 500, "preprocessor did not stop");
        }
    }

    #[test]
    fn reset_clears_maneuvers_and_cooldowns() {
        let mut harness = Harness::new();
        let dribble = BodyRequest {
            action_type: ActionType::Dribble,
            ..Default::default()
        };
        for _ in 0..20 {
            harness.tick(dribble.clone());
        }

        harness.preprocessor.reset();
        assert!(!harness.preprocessor.is_active());
        assert!(harness.preprocessor.dribble().has_ended());
        assert!(harness.preprocessor.dribble().cooldown().is_ready(harness.now));
    }
}
