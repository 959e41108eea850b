//! Arbitration between the body generators.
//!
//! Every [`ActionType`] is backed by a slot, several actions may share a single slot. The
//! dispatcher only switches slots once the running generator is inactive, asking it to stop
//! when another slot is requested, unless the request has a higher priority.
use bevy::prelude::*;
use miette::WrapErr;
use nidhogg::JointValues;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::Result;
use crate::action::{ACTION_COUNT, ActionRequest, ActionTable, ActionType};
use crate::config::{MotionConfig, RobotInfo};
use crate::generator::{
    ActionGenerator, BodyGenerator, DeadGenerator, FallDirection, Generator, GetupGenerator,
    MotionInput, NullGenerator, RefPickupGenerator,
};
use crate::head::HeadGenerator;
use crate::model::BodyModel;
use crate::odometry::Odometry;

/// Heading change of a dive, in degrees, applied once the robot gets up after it.
const DIVE_TURN_DEGREES: f32 = 80.0;

/// Whether `action` is executed by the walk engine.
fn is_walk_action(action: ActionType) -> bool {
    matches!(
        action,
        ActionType::Walk
            | ActionType::Kick
            | ActionType::Dribble
            | ActionType::TurnDribble
            | ActionType::LineUp
    )
}

fn pose_player(file_name: &'static str) -> BodyGenerator {
    BodyGenerator::Action(ActionGenerator::new(file_name))
}

/// Creates the generator backing `action`.
fn body_generator(action: ActionType) -> BodyGenerator {
    match action {
        ActionType::None => BodyGenerator::Null(NullGenerator),
        ActionType::Stand => pose_player("stand"),
        ActionType::Walk
        | ActionType::Kick
        | ActionType::Dribble
        | ActionType::TurnDribble
        | ActionType::LineUp => BodyGenerator::Walk(Box::default()),
        ActionType::GetupFront => BodyGenerator::Getup(GetupGenerator::new(FallDirection::Front)),
        ActionType::GetupBack => BodyGenerator::Getup(GetupGenerator::new(FallDirection::Back)),
        ActionType::TipOver => pose_player("tipOver"),
        ActionType::Initial => pose_player("initial"),
        ActionType::Dead => BodyGenerator::Dead(DeadGenerator),
        ActionType::RefPickup => BodyGenerator::RefPickup(RefPickupGenerator::default()),
        ActionType::GoalieSit => pose_player("goalieSit"),
        ActionType::GoalieDiveRight => pose_player("goalieDiveRight"),
        ActionType::GoalieDiveLeft => pose_player("goalieDiveLeft"),
        ActionType::GoalieCentre => pose_player("defenderSquat"),
        ActionType::GoalieUncentre => pose_player("goalieUncentre"),
        ActionType::GoalieInitial | ActionType::GoalieAftersitInitial => {
            pose_player("goalieInitial")
        }
        ActionType::DefenderCentre => pose_player("defenderCentre"),
        ActionType::GoalieFastSit => pose_player("goalieFastSit"),
        ActionType::MotionCalibrate | ActionType::StandStraight => pose_player("standStraight"),
    }
}

/// Owns every body generator and the head generator, and decides which one runs.
#[derive(Resource, Debug)]
pub struct ActionDispatcher {
    table: ActionTable,
    slots: Vec<BodyGenerator>,
    slot_of: [usize; ACTION_COUNT],
    head: HeadGenerator,
    current: ActionType,
    previous: ActionType,
    is_stopping: bool,
    requested_dive: Option<ActionType>,
}

impl ActionDispatcher {
    /// Creates all generators and loads their options and pose files.
    pub fn new(config: &MotionConfig, robot: &RobotInfo) -> Result<Self> {
        let mut dispatcher = Self::unloaded();

        for slot in &mut dispatcher.slots {
            let name = slot.name();
            slot.read_options(config, robot)
                .wrap_err_with(|| format!("failed to load the {name} generator"))?;
        }
        dispatcher.head.read_options(config, robot)?;

        info!(slots = dispatcher.slots.len(), "loaded motion generators");
        Ok(dispatcher)
    }

    /// Creates all generators, without reading any options.
    fn unloaded() -> Self {
        let mut slots = Vec::new();
        let mut slot_of = [0; ACTION_COUNT];
        let mut walk_slot = None;

        for action in ActionType::iter() {
            let slot = match walk_slot {
                Some(slot) if is_walk_action(action) => slot,
                _ => {
                    slots.push(body_generator(action));
                    slots.len() - 1
                }
            };

            if is_walk_action(action) {
                walk_slot = Some(slot);
            }
            slot_of[action.index()] = slot;
        }

        Self {
            table: ActionTable::standard(),
            slots,
            slot_of,
            head: HeadGenerator::default(),
            current: ActionType::None,
            previous: ActionType::None,
            is_stopping: false,
            requested_dive: None,
        }
    }

    /// The action of the generator that currently moves the body.
    #[must_use]
    pub fn current(&self) -> ActionType {
        self.current
    }

    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.is_stopping
    }

    /// The dive that was requested, but has not started yet.
    #[must_use]
    pub fn requested_dive(&self) -> Option<ActionType> {
        self.requested_dive
    }

    /// Number of distinct generators backing the actions.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn slot_of(&self, action: ActionType) -> usize {
        self.slot_of[action.index()]
    }

    #[must_use]
    pub fn generator(&self, action: ActionType) -> &BodyGenerator {
        &self.slots[self.slot_of(action)]
    }

    fn generator_mut(&mut self, action: ActionType) -> &mut BodyGenerator {
        &mut self.slots[self.slot_of[action.index()]]
    }

    fn shares_slot(&self, a: ActionType, b: ActionType) -> bool {
        self.slot_of(a) == self.slot_of(b)
    }

    /// Resets every generator, and starts over from [`ActionType::None`].
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.reset();
        }
        self.head.reset();
        self.current = ActionType::None;
    }

    /// Computes the joint values for this cycle.
    ///
    /// The request is rewritten to the action that was actually executed.
    pub fn make_joints(
        &mut self,
        request: &mut ActionRequest,
        odometry: &mut Odometry,
        body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        let requested = request.body.action_type;
        if self.requested_dive.is_none() && !self.current.is_dive() && requested.is_dive() {
            debug!(dive = %requested, "dive requested");
            self.requested_dive = Some(requested);
        }

        // a limp robot first goes through the ref pickup pose, so the motors do not jump
        if self.previous == ActionType::Dead && !requested.follows_dead() {
            request.body.action_type = ActionType::RefPickup;
        }
        let requested = request.body.action_type;

        if self.table.priority(requested) > self.table.priority(self.current) {
            info!(from = %self.current, to = %requested, "preempting current generator");
            self.reset();
            self.is_stopping = false;
        }

        let current = self.current;
        if !self.generator(current).is_active() {
            let restart_getup = current == requested && current.is_getup();
            if !self.shares_slot(current, requested) || self.is_stopping || restart_getup {
                self.generator_mut(current).reset();
            }

            if current != requested {
                info!(from = %current, to = %requested, "switching generator");
            }
            self.current = requested;
            self.is_stopping = false;
        } else if !self.shares_slot(current, requested) {
            // a kick finishes before standing
            let kick_through_stand = current == ActionType::Kick && requested == ActionType::Stand;
            if !kick_through_stand && !self.is_stopping {
                info!(current = %current, requested = %requested, "stopping current generator");
            }
            if !kick_through_stand {
                self.generator_mut(current).stop();
                self.is_stopping = true;
            }
        }

        if self.requested_dive == Some(self.current) {
            self.requested_dive = None;
        }

        let body_drives_head = self.table.body_drives_head(self.current);

        let direction = self.current.getup_direction();
        let dive_turn = match self.previous {
            ActionType::GoalieDiveLeft => direction * DIVE_TURN_DEGREES,
            ActionType::GoalieDiveRight => -direction * DIVE_TURN_DEGREES,
            _ => 0.0,
        };
        if dive_turn != 0.0 {
            odometry.add(0.0, 0.0, dive_turn.to_radians());
        }

        let current = self.current;
        let mut joints = self
            .generator_mut(current)
            .make_joints(request, odometry, body_model, input);

        if self.current == ActionType::Kick && request.body.action_type == ActionType::Walk {
            self.current = ActionType::Walk;
        }

        if !body_drives_head {
            let head = self
                .head
                .make_joints(request, odometry, body_model, input);
            joints.splice_head(&head);
        }

        self.previous = self.current;
        joints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_actions_share_a_slot() {
        let dispatcher = ActionDispatcher::unloaded();

        assert_eq!(dispatcher.slot_count(), 20);
        let walk = dispatcher.slot_of(ActionType::Walk);
        for action in [
            ActionType::Kick,
            ActionType::Dribble,
            ActionType::TurnDribble,
            ActionType::LineUp,
        ] {
            assert_eq!(dispatcher.slot_of(action), walk);
        }

        // same pose file, separate generators
        assert_ne!(
            dispatcher.slot_of(ActionType::GoalieInitial),
            dispatcher.slot_of(ActionType::GoalieAftersitInitial)
        );
        assert_ne!(
            dispatcher.slot_of(ActionType::MotionCalibrate),
            dispatcher.slot_of(ActionType::StandStraight)
        );
    }

    #[test]
    fn slots_back_the_right_generators() {
        let dispatcher = ActionDispatcher::unloaded();

        assert_eq!(dispatcher.generator(ActionType::None).name(), "null");
        assert_eq!(dispatcher.generator(ActionType::Dead).name(), "dead");
        assert_eq!(dispatcher.generator(ActionType::Kick).name(), "walk");
        assert_eq!(dispatcher.generator(ActionType::GoalieCentre).name(), "defenderSquat");
        assert_eq!(dispatcher.generator(ActionType::StandStraight).name(), "standStraight");
        assert!(matches!(
            dispatcher.generator(ActionType::GetupBack),
            BodyGenerator::Getup(getup) if getup.direction() == FallDirection::Back
        ));
    }

    #[test]
    fn every_slot_is_used() {
        let dispatcher = ActionDispatcher::unloaded();
        let mut used = vec![false; dispatcher.slot_count()];
        for action in ActionType::iter() {
            used[dispatcher.slot_of(action)] = true;
        }

        assert!(used.into_iter().all(|used| used));
    }
}
