//! Requests from the behaviour layer, and the fixed tables describing every action.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Number of distinct [`ActionType`]s.
pub const ACTION_COUNT: usize = <ActionType as EnumCount>::COUNT;

/// The high level motion the behaviour layer asks for.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    #[default]
    None,
    Stand,
    Walk,
    Dribble,
    TurnDribble,
    GetupFront,
    GetupBack,
    TipOver,
    Kick,
    Initial,
    Dead,
    RefPickup,
    GoalieSit,
    GoalieDiveRight,
    GoalieDiveLeft,
    GoalieCentre,
    GoalieUncentre,
    GoalieInitial,
    GoalieAftersitInitial,
    DefenderCentre,
    GoalieFastSit,
    MotionCalibrate,
    StandStraight,
    LineUp,
}

impl ActionType {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_getup(self) -> bool {
        matches!(self, ActionType::GetupFront | ActionType::GetupBack)
    }

    /// Whether this is one of the goalkeeper saves.
    #[must_use]
    pub const fn is_dive(self) -> bool {
        matches!(
            self,
            ActionType::GoalieCentre
                | ActionType::GoalieDiveLeft
                | ActionType::GoalieDiveRight
                | ActionType::DefenderCentre
        )
    }

    /// Actions that may directly follow [`ActionType::Dead`] without going through a ref pickup.
    #[must_use]
    pub const fn follows_dead(self) -> bool {
        matches!(
            self,
            ActionType::GetupFront | ActionType::GetupBack | ActionType::TipOver
        )
    }

    /// `1.0` when getting up from the front, `-1.0` from the back, `0.0` otherwise.
    #[must_use]
    pub const fn getup_direction(self) -> f32 {
        match self {
            ActionType::GetupFront => 1.0,
            ActionType::GetupBack => -1.0,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Foot {
    #[default]
    Left,
    Right,
}

/// The body part of an [`ActionRequest`].
///
/// Walk parameters are per step: `forward` and `left` in millimetres, `turn` in radians.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyRequest {
    pub action_type: ActionType,
    pub forward: f32,
    pub left: f32,
    pub turn: f32,
    pub power: f32,
    pub bend: f32,
    pub speed: f32,
    pub foot: Foot,
    pub is_fast: bool,
    pub misaligned_kick: bool,
    pub use_shuffle: bool,
    pub left_arm_limp: bool,
    pub right_arm_limp: bool,
}

impl Default for BodyRequest {
    fn default() -> Self {
        Self {
            action_type: ActionType::None,
            forward: 0.0,
            left: 0.0,
            turn: 0.0,
            power: 1.0,
            bend: 15.0,
            speed: 1.0,
            foot: Foot::Left,
            is_fast: false,
            misaligned_kick: false,
            use_shuffle: false,
            left_arm_limp: false,
            right_arm_limp: false,
        }
    }
}

impl BodyRequest {
    #[must_use]
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn walk(forward: f32, left: f32, turn: f32) -> Self {
        Self {
            action_type: ActionType::Walk,
            forward,
            left,
            turn,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn kick(foot: Foot, power: f32) -> Self {
        Self {
            action_type: ActionType::Kick,
            foot,
            power,
            ..Default::default()
        }
    }

    /// Turns this request into a walk that barely moves.
    ///
    /// The forward component is kept at a millimetre so the walk engine keeps stepping instead
    /// of settling into its ready pose.
    pub fn neutralize(&mut self) {
        self.action_type = ActionType::Walk;
        self.forward = 1.0;
        self.left = 0.0;
        self.turn = 0.0;
        self.power = 0.0;
        self.bend = 1.0;
        self.speed = 1.0;
    }
}

/// The head part of an [`ActionRequest`].
///
/// Positive pitch looks down. Speeds are fractions of the configured maximum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadRequest {
    pub yaw: f32,
    pub pitch: f32,
    pub is_relative: bool,
    pub yaw_speed: f32,
    pub pitch_speed: f32,
}

impl Default for HeadRequest {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            is_relative: true,
            yaw_speed: 1.0,
            pitch_speed: 1.0,
        }
    }
}

/// What the behaviour layer wants the robot to do this cycle.
///
/// The dispatcher and the walk preprocessor rewrite the request in place, the final
/// `body.action_type` is what actually got executed.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub body: BodyRequest,
    pub head: HeadRequest,
}

/// The body action that was executed in the last cycle.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq, Deref)]
pub struct ActiveAction(pub ActionType);

/// Priority and head ownership of every [`ActionType`].
#[derive(Clone, Debug)]
pub struct ActionTable {
    priorities: [u8; ACTION_COUNT],
    body_drives_head: [bool; ACTION_COUNT],
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ActionTable {
    /// Builds the table used on the robot.
    ///
    /// Getting up beats the goalkeeper and set-piece poses, which beat going limp, which beats
    /// everything else.
    #[must_use]
    pub fn standard() -> Self {
        let mut priorities = [0; ACTION_COUNT];
        let mut body_drives_head = [false; ACTION_COUNT];

        for action in ActionType::iter() {
            priorities[action.index()] = match action {
                ActionType::GetupFront | ActionType::GetupBack | ActionType::TipOver => 3,
                ActionType::Initial
                | ActionType::GoalieSit
                | ActionType::GoalieDiveRight
                | ActionType::GoalieDiveLeft
                | ActionType::GoalieCentre
                | ActionType::GoalieUncentre
                | ActionType::DefenderCentre
                | ActionType::GoalieFastSit => 2,
                ActionType::Dead => 1,
                _ => 0,
            };

            body_drives_head[action.index()] = matches!(
                action,
                ActionType::GetupFront
                    | ActionType::GetupBack
                    | ActionType::TipOver
                    | ActionType::Initial
                    | ActionType::Dead
                    | ActionType::GoalieSit
                    | ActionType::GoalieFastSit
                    | ActionType::GoalieDiveLeft
                    | ActionType::GoalieDiveRight
                    | ActionType::GoalieCentre
                    | ActionType::GoalieUncentre
                    | ActionType::GoalieInitial
                    | ActionType::GoalieAftersitInitial
            );
        }

        Self {
            priorities,
            body_drives_head,
        }
    }

    #[must_use]
    pub fn priority(&self, action: ActionType) -> u8 {
        self.priorities[action.index()]
    }

    /// Whether the body generator of `action` also moves the head.
    #[must_use]
    pub fn body_drives_head(&self, action: ActionType) -> bool {
        self.body_drives_head[action.index()]
    }
}
