//! Leg inverse kinematics for the walking engine.
//!
//! Foot offsets are expressed relative to the torso: the x-axis points forward, the y-axis
//! points left and the z-axis points up.
use std::f32::consts::FRAC_PI_4;

use nalgebra::{Isometry3, Matrix3x1, Rotation3, Translation3, Vector3, vector};
use nidhogg::types::{LeftLegJoints, RightLegJoints};

use super::FootOffset;

/// Offset from the torso to the left pelvis, in meters.
pub const ROBOT_TO_LEFT_PELVIS: Vector3<f32> = vector![0.0, 0.05, 0.0];
/// Offset from the torso to the right pelvis, in meters.
pub const ROBOT_TO_RIGHT_PELVIS: Vector3<f32> = vector![0.0, -0.05, 0.0];
pub const HIP_TO_KNEE: Vector3<f32> = vector![0.0, 0.0, -0.1];
pub const KNEE_TO_ANKLE: Vector3<f32> = vector![0.0, 0.0, -0.1029];
pub const ANKLE_TO_SOLE: Vector3<f32> = vector![0.0, 0.0, -0.04519];

/// Offset of the torso in front of the hips, in meters.
const TORSO_OFFSET: f32 = 0.025;

/// Side specific parts of the leg kinematics.
trait Leg {
    fn torso_to_pelvis() -> Isometry3<f32>;
    fn robot_to_pelvis() -> Isometry3<f32>;
    fn foot_rotation(turn: f32) -> Isometry3<f32>;
}

struct Left;
struct Right;

impl Leg for Left {
    fn torso_to_pelvis() -> Isometry3<f32> {
        Isometry3::rotation(Vector3::x() * -FRAC_PI_4) * Translation3::from(-ROBOT_TO_LEFT_PELVIS)
    }

    fn robot_to_pelvis() -> Isometry3<f32> {
        Isometry3::from(ROBOT_TO_LEFT_PELVIS)
    }

    fn foot_rotation(turn: f32) -> Isometry3<f32> {
        Isometry3::rotation(Vector3::z() * turn)
    }
}

impl Leg for Right {
    fn torso_to_pelvis() -> Isometry3<f32> {
        Isometry3::rotation(Vector3::x() * FRAC_PI_4) * Translation3::from(-ROBOT_TO_RIGHT_PELVIS)
    }

    fn robot_to_pelvis() -> Isometry3<f32> {
        Isometry3::from(ROBOT_TO_RIGHT_PELVIS)
    }

    fn foot_rotation(turn: f32) -> Isometry3<f32> {
        Isometry3::rotation(Vector3::z() * -turn)
    }
}

/// Transformation from the foot to the pelvis of leg `L`.
fn foot_to_pelvis<L: Leg>(foot: &FootOffset) -> Isometry3<f32> {
    // the translation is computed for the ankle, the hip height is measured to the sole
    let foot_translation = Isometry3::translation(
        foot.forward - TORSO_OFFSET,
        foot.left,
        -(foot.hip_height + ANKLE_TO_SOLE.z) + foot.lift,
    );

    L::torso_to_pelvis() * L::robot_to_pelvis() * foot_translation * L::foot_rotation(foot.turn)
}

fn hip_yaw_pitch(foot_to_pelvis: &Isometry3<f32>) -> f32 {
    let pelvis_to_foot = foot_to_pelvis.inverse().translation;

    let foot_roll_in_pelvis = pelvis_to_foot.y.atan2(pelvis_to_foot.z);
    let foot_pitch_in_pelvis = pelvis_to_foot
        .x
        .atan2((pelvis_to_foot.y.powi(2) + pelvis_to_foot.z.powi(2)).sqrt());

    let rotation = Rotation3::new(Vector3::x() * -foot_roll_in_pelvis)
        * Rotation3::new(Vector3::y() * foot_pitch_in_pelvis);
    let hip_rotation_c1 = foot_to_pelvis.rotation * (rotation * Vector3::y());

    (-hip_rotation_c1.x).atan2(hip_rotation_c1.y)
}

/// Computes the leg angles that place the feet at the given offsets.
///
/// Both legs share a single hip yaw pitch joint, so the yaw of the two feet is averaged.
#[must_use]
pub fn leg_angles(
    left_foot: &FootOffset,
    right_foot: &FootOffset,
) -> (LeftLegJoints<f32>, RightLegJoints<f32>) {
    let left_foot_to_pelvis = foot_to_pelvis::<Left>(left_foot);
    let right_foot_to_pelvis = foot_to_pelvis::<Right>(right_foot);

    let combined =
        (-hip_yaw_pitch(&left_foot_to_pelvis) + hip_yaw_pitch(&right_foot_to_pelvis)) / 2.0;

    let left = LegAngles::compute(combined, left_foot_to_pelvis);
    let right = LegAngles::compute(-combined, right_foot_to_pelvis);

    (
        LeftLegJoints {
            hip_yaw_pitch: combined,
            hip_roll: left.hip_roll_in_hip + FRAC_PI_4,
            hip_pitch: left.hip_pitch_minus_alpha + left.alpha,
            knee_pitch: -left.alpha - left.beta,
            ankle_pitch: left.foot_rotation.x.atan2(left.foot_rotation.z) + left.beta,
            ankle_roll: (-left.foot_rotation.y).asin(),
        },
        RightLegJoints {
            hip_roll: right.hip_roll_in_hip - FRAC_PI_4,
            hip_pitch: right.hip_pitch_minus_alpha + right.alpha,
            knee_pitch: -right.alpha - right.beta,
            ankle_pitch: right.foot_rotation.x.atan2(right.foot_rotation.z) + right.beta,
            ankle_roll: (-right.foot_rotation.y).asin(),
        },
    )
}

struct LegAngles {
    hip_roll_in_hip: f32,
    hip_pitch_minus_alpha: f32,
    alpha: f32,
    beta: f32,
    foot_rotation: Matrix3x1<f32>,
}

impl LegAngles {
    fn compute(hip_yaw_pitch: f32, foot_to_pelvis: Isometry3<f32>) -> Self {
        let pelvis_to_hip = Isometry3::rotation(Vector3::z() * hip_yaw_pitch);
        let foot_to_hip = pelvis_to_hip * foot_to_pelvis;
        let hip_to_foot = foot_to_hip.translation;

        let hip_roll_in_hip = -(-hip_to_foot.y).atan2(-hip_to_foot.z);
        let hip_pitch_minus_alpha = (-hip_to_foot.x).atan2(
            (hip_to_foot.y.powi(2) + hip_to_foot.z.powi(2)).sqrt() * -hip_to_foot.z.signum(),
        );

        let foot_rotation = Isometry3::rotation(Vector3::y() * -hip_pitch_minus_alpha)
            * Isometry3::rotation(Vector3::x() * -hip_roll_in_hip)
            * (foot_to_hip.rotation * Vector3::z());

        let thigh = HIP_TO_KNEE.z.abs();
        let tibia = KNEE_TO_ANKLE.z.abs();
        let foot_height = hip_to_foot.vector.norm();

        let alpha_cos =
            (thigh.powi(2) + foot_height.powi(2) - tibia.powi(2)) / (2.0 * thigh * foot_height);
        let beta_cos =
            (tibia.powi(2) + foot_height.powi(2) - thigh.powi(2)) / (2.0 * tibia * foot_height);

        Self {
            hip_roll_in_hip,
            hip_pitch_minus_alpha,
            alpha: -alpha_cos.clamp(-1.0, 1.0).acos(),
            beta: -beta_cos.clamp(-1.0, 1.0).acos(),
            foot_rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_stance_is_symmetric() {
        let foot = FootOffset::zero(0.225);
        let (left, right) = leg_angles(&foot, &foot);

        assert!(left.hip_yaw_pitch.abs() < 1e-4);
        assert!((left.knee_pitch - right.knee_pitch).abs() < 1e-4);
        assert!((left.hip_pitch - right.hip_pitch).abs() < 1e-4);
        assert!((left.hip_roll + right.hip_roll).abs() < 1e-4);
        assert!(left.knee_pitch > 0.0);
    }

    #[test]
    fn lower_hips_bend_the_knees_more() {
        let (high, _) = leg_angles(&FootOffset::zero(0.24), &FootOffset::zero(0.24));
        let (low, _) = leg_angles(&FootOffset::zero(0.2), &FootOffset::zero(0.2));

        assert!(low.knee_pitch > high.knee_pitch);
    }

    #[test]
    fn angles_are_finite_within_step_limits() {
        let swing = FootOffset {
            forward: 0.07,
            left: 0.025,
            turn: 0.5,
            hip_height: 0.225,
            lift: 0.03,
        };
        let support = FootOffset {
            forward: -0.07,
            left: -0.025,
            turn: -0.25,
            hip_height: 0.225,
            lift: 0.0,
        };

        let (left, right) = leg_angles(&swing, &support);
        assert!(left.iter().chain(right.iter()).all(|angle| angle.is_finite()));
    }
}
