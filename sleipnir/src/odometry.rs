use bevy::prelude::*;
use nalgebra::{Isometry2, Vector2};

/// The odometry of the robot, as estimated by the motion generators.
///
/// Translations are in meters, rotations in radians.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct Odometry {
    /// The accumulated odometry offset of the robot.
    pub accumulated: Isometry2<f32>,
    /// The offset accumulated during the current cycle.
    pub offset_to_last: Isometry2<f32>,
}

impl Odometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new cycle, clearing [`Odometry::offset_to_last`].
    pub fn begin_cycle(&mut self) {
        self.offset_to_last = Isometry2::identity();
    }

    /// Moves the robot by an offset expressed in its own frame.
    pub fn add(&mut self, forward: f32, left: f32, turn: f32) {
        let offset = Isometry2::new(Vector2::new(forward, left), turn);

        self.offset_to_last *= offset;
        self.accumulated *= offset;
    }

    /// Heading relative to where the odometry started, in radians.
    #[must_use]
    pub fn heading(&self) -> f32 {
        self.accumulated.rotation.angle()
    }

    #[must_use]
    pub fn translation(&self) -> Vector2<f32> {
        self.accumulated.translation.vector
    }
}
