use serde::{Deserialize, Serialize};

use super::JointValues;

/// Filtered inertial readings of the torso.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InertialSensors {
    /// Roll of the torso in radians.
    pub angle_x: f32,
    /// Pitch of the torso in radians, positive when leaning forward.
    pub angle_y: f32,
    /// Angular velocity around the x axis, in radians per second.
    pub gyro_x: f32,
    /// Angular velocity around the y axis, in radians per second.
    pub gyro_y: f32,
}

/// Total pressure on each foot, in kilograms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FootPressure {
    pub left: f32,
    pub right: f32,
}

/// Everything the motion generators read from the robot each cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct SensorValues {
    /// Measured joint angles, and the stiffness currently applied.
    pub joints: JointValues,
    pub inertial: InertialSensors,
    pub foot_pressure: FootPressure,
}
