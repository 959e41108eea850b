use std::time::Duration;

use strum::Display;
use tracing::info;

use super::{Cooldown, Phase};
use crate::action::{ActionType, BodyRequest, Foot};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum DribbleState {
    /// Waiting for the dribble foot to become the support foot.
    Init,
    /// Stepping up to the ball with the other foot.
    Step,
    /// Pushing the ball with the dribble foot.
    Kick,
    Follow,
    #[default]
    End,
}

/// Pushes the ball forward with a short sequence of steps, timed on the support foot.
#[derive(Clone, Debug, Default)]
pub struct Dribble {
    state: DribbleState,
    foot: Foot,
    forward: f32,
    cooldown: Cooldown,
}

impl Dribble {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: Cooldown::new(cooldown),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> DribbleState {
        self.state
    }

    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.state == DribbleState::End
    }

    #[must_use]
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn cooldown_mut(&mut self) -> &mut Cooldown {
        &mut self.cooldown
    }

    /// Starts a new dribble with `foot`, stepping `forward` millimetres per step.
    pub fn start(&mut self, foot: Foot, forward: f32) {
        info!(?foot, forward, "starting dribble");
        self.state = DribbleState::Init;
        self.foot = foot;
        self.forward = forward;
    }

    pub fn reset(&mut self) {
        self.state = DribbleState::End;
    }

    /// Advances the dribble on a foot switch and rewrites `request` for the current state.
    pub fn preprocess(&mut self, request: &mut BodyRequest, phase: Phase, now: Duration) {
        let dribble_foot_swings = phase.is_left_phase == (self.foot == Foot::Left);

        if phase.edge {
            let next = match (self.state, dribble_foot_swings) {
                (DribbleState::Init, false) => DribbleState::Step,
                (DribbleState::Step, true) => DribbleState::Kick,
                (DribbleState::Kick, false) => DribbleState::Follow,
                (DribbleState::Follow, true) => {
                    self.cooldown.restart(now);
                    DribbleState::End
                }
                (state, _) => state,
            };

            if next != self.state {
                info!(from = %self.state, to = %next, "dribble");
                self.state = next;
            }
        }

        let forward = match self.state {
            DribbleState::Init => 1.0,
            DribbleState::Step | DribbleState::Kick => self.forward,
            DribbleState::Follow => 0.75 * self.forward,
            DribbleState::End => 0.5 * self.forward,
        };

        request.action_type = ActionType::Walk;
        request.forward = forward;
        request.left = 0.0;
        request.turn = 0.0;
    }
}
