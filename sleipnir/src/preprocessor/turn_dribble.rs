use std::time::Duration;

use strum::Display;
use tracing::info;

use super::{Cooldown, Phase};
use crate::action::{ActionType, BodyRequest, Foot};

/// Turn of the turning step, in degrees.
const TURN_DEGREES: f32 = 40.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum TurnDribbleState {
    Init,
    /// Turning around the ball with a short step.
    Turn,
    /// Pushing the ball out with a long step.
    Forward,
    #[default]
    End,
}

/// Turns with the ball, then pushes it forward.
///
/// A left foot turns left, a right foot turns right.
#[derive(Clone, Debug, Default)]
pub struct TurnDribble {
    state: TurnDribbleState,
    foot: Foot,
    cooldown: Cooldown,
}

impl TurnDribble {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: Cooldown::new(cooldown),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> TurnDribbleState {
        self.state
    }

    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.state == TurnDribbleState::End
    }

    #[must_use]
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn cooldown_mut(&mut self) -> &mut Cooldown {
        &mut self.cooldown
    }

    pub fn start(&mut self, foot: Foot) {
        info!(?foot, "starting turn dribble");
        self.state = TurnDribbleState::Init;
        self.foot = foot;
    }

    pub fn reset(&mut self) {
        self.state = TurnDribbleState::End;
    }

    fn direction(&self) -> f32 {
        match self.foot {
            Foot::Left => 1.0,
            Foot::Right => -1.0,
        }
    }

    /// Advances the turn dribble on a foot switch and rewrites `request` for the current state.
    pub fn preprocess(&mut self, request: &mut BodyRequest, phase: Phase, now: Duration) {
        let in_turn_phase = phase.is_left_phase == (self.foot == Foot::Left);

        if phase.edge {
            let next = match (self.state, in_turn_phase) {
                (TurnDribbleState::Init, true) => TurnDribbleState::Turn,
                (TurnDribbleState::Turn, false) => TurnDribbleState::Forward,
                (TurnDribbleState::Forward, true) => {
                    self.cooldown.restart(now);
                    TurnDribbleState::End
                }
                (state, _) => state,
            };

            if next != self.state {
                info!(from = %self.state, to = %next, "turn dribble");
                self.state = next;
            }
        }

        let (forward, turn) = match self.state {
            TurnDribbleState::Init => (1.0, 0.0),
            TurnDribbleState::Turn => (30.0, self.direction() * TURN_DEGREES.to_radians()),
            TurnDribbleState::Forward => (140.0, 0.0),
            TurnDribbleState::End => (70.0, 0.0),
        };

        request.action_type = ActionType::Walk;
        request.forward = forward;
        request.left = 0.0;
        request.turn = turn;
    }
}
