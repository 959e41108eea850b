//! Shared robot state that generators read and write next to the request.
use bevy::prelude::*;
use nalgebra::Vector2;

/// State of the body, as tracked by the walk engine.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BodyModel {
    /// Whether the left foot is the swing foot in the current step phase.
    pub is_left_phase: bool,
}

/// Position of the ball relative to the robot, in millimetres.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct BallPosition(pub Vector2<f32>);

impl BallPosition {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vector2::new(x, y))
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.0.y
    }
}
