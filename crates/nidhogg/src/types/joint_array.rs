use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

use super::{FillExt, HeadJoints, LeftLegJoints, RightLegJoints, SingleArmJoints};

/// Number of joints of the robot.
pub const JOINT_COUNT: usize = 25;

/// All joints of the robot, in the order used by pose files and [`JointArray`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount, Display, IntoStaticStr,
)]
pub enum Joint {
    HeadYaw,
    HeadPitch,
    LeftShoulderPitch,
    LeftShoulderRoll,
    LeftElbowYaw,
    LeftElbowRoll,
    LeftWristYaw,
    LeftHipYawPitch,
    LeftHipRoll,
    LeftHipPitch,
    LeftKneePitch,
    LeftAnklePitch,
    LeftAnkleRoll,
    RightHipRoll,
    RightHipPitch,
    RightKneePitch,
    RightAnklePitch,
    RightAnkleRoll,
    RightShoulderPitch,
    RightShoulderRoll,
    RightElbowYaw,
    RightElbowRoll,
    RightWristYaw,
    LeftHand,
    RightHand,
}

impl Joint {
    /// Position of this joint in a [`JointArray`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this joint belongs to the head.
    #[must_use]
    pub const fn is_head(self) -> bool {
        matches!(self, Joint::HeadYaw | Joint::HeadPitch)
    }
}

/// A value for every joint of the robot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointArray<T>([T; JOINT_COUNT]);

impl<T> JointArray<T> {
    /// Builds a [`JointArray`] by calling `f` for every [`Joint`].
    pub fn from_fn(mut f: impl FnMut(Joint) -> T) -> Self {
        let mut joints = Joint::iter();
        Self(std::array::from_fn(|_| {
            // `Joint::iter` yields exactly `JOINT_COUNT` items.
            f(joints.next().unwrap_or(Joint::RightHand))
        }))
    }

    #[must_use]
    pub fn from_array(values: [T; JOINT_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn into_inner(self) -> [T; JOINT_COUNT] {
        self.0
    }

    pub fn map<F, U>(self, f: F) -> JointArray<U>
    where
        F: FnMut(T) -> U,
    {
        JointArray(self.0.map(f))
    }

    pub fn zip<U>(self, other: JointArray<U>) -> JointArray<(T, U)> {
        let mut other = other.0.into_iter();
        JointArray(self.0.map(|value| {
            // both arrays have `JOINT_COUNT` elements
            let Some(rhs) = other.next() else {
                unreachable!("joint arrays have equal length")
            };
            (value, rhs)
        }))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }

    /// Iterates over every joint together with its value.
    pub fn enumerate(&self) -> impl Iterator<Item = (Joint, &T)> {
        Joint::iter().zip(self.0.iter())
    }
}

impl<T: Copy> JointArray<T> {
    #[must_use]
    pub fn head(&self) -> HeadJoints<T> {
        HeadJoints {
            yaw: self[Joint::HeadYaw],
            pitch: self[Joint::HeadPitch],
        }
    }

    pub fn set_head(&mut self, head: HeadJoints<T>) {
        self[Joint::HeadYaw] = head.yaw;
        self[Joint::HeadPitch] = head.pitch;
    }

    #[must_use]
    pub fn left_leg(&self) -> LeftLegJoints<T> {
        LeftLegJoints {
            hip_yaw_pitch: self[Joint::LeftHipYawPitch],
            hip_roll: self[Joint::LeftHipRoll],
            hip_pitch: self[Joint::LeftHipPitch],
            knee_pitch: self[Joint::LeftKneePitch],
            ankle_pitch: self[Joint::LeftAnklePitch],
            ankle_roll: self[Joint::LeftAnkleRoll],
        }
    }

    pub fn set_left_leg(&mut self, leg: LeftLegJoints<T>) {
        self[Joint::LeftHipYawPitch] = leg.hip_yaw_pitch;
        self[Joint::LeftHipRoll] = leg.hip_roll;
        self[Joint::LeftHipPitch] = leg.hip_pitch;
        self[Joint::LeftKneePitch] = leg.knee_pitch;
        self[Joint::LeftAnklePitch] = leg.ankle_pitch;
        self[Joint::LeftAnkleRoll] = leg.ankle_roll;
    }

    #[must_use]
    pub fn right_leg(&self) -> RightLegJoints<T> {
        RightLegJoints {
            hip_roll: self[Joint::RightHipRoll],
            hip_pitch: self[Joint::RightHipPitch],
            knee_pitch: self[Joint::RightKneePitch],
            ankle_pitch: self[Joint::RightAnklePitch],
            ankle_roll: self[Joint::RightAnkleRoll],
        }
    }

    pub fn set_right_leg(&mut self, leg: RightLegJoints<T>) {
        self[Joint::RightHipRoll] = leg.hip_roll;
        self[Joint::RightHipPitch] = leg.hip_pitch;
        self[Joint::RightKneePitch] = leg.knee_pitch;
        self[Joint::RightAnklePitch] = leg.ankle_pitch;
        self[Joint::RightAnkleRoll] = leg.ankle_roll;
    }

    #[must_use]
    pub fn left_arm(&self) -> SingleArmJoints<T> {
        SingleArmJoints {
            shoulder_pitch: self[Joint::LeftShoulderPitch],
            shoulder_roll: self[Joint::LeftShoulderRoll],
            elbow_yaw: self[Joint::LeftElbowYaw],
            elbow_roll: self[Joint::LeftElbowRoll],
            wrist_yaw: self[Joint::LeftWristYaw],
            hand: self[Joint::LeftHand],
        }
    }

    pub fn set_left_arm(&mut self, arm: SingleArmJoints<T>) {
        self[Joint::LeftShoulderPitch] = arm.shoulder_pitch;
        self[Joint::LeftShoulderRoll] = arm.shoulder_roll;
        self[Joint::LeftElbowYaw] = arm.elbow_yaw;
        self[Joint::LeftElbowRoll] = arm.elbow_roll;
        self[Joint::LeftWristYaw] = arm.wrist_yaw;
        self[Joint::LeftHand] = arm.hand;
    }

    #[must_use]
    pub fn right_arm(&self) -> SingleArmJoints<T> {
        SingleArmJoints {
            shoulder_pitch: self[Joint::RightShoulderPitch],
            shoulder_roll: self[Joint::RightShoulderRoll],
            elbow_yaw: self[Joint::RightElbowYaw],
            elbow_roll: self[Joint::RightElbowRoll],
            wrist_yaw: self[Joint::RightWristYaw],
            hand: self[Joint::RightHand],
        }
    }

    pub fn set_right_arm(&mut self, arm: SingleArmJoints<T>) {
        self[Joint::RightShoulderPitch] = arm.shoulder_pitch;
        self[Joint::RightShoulderRoll] = arm.shoulder_roll;
        self[Joint::RightElbowYaw] = arm.elbow_yaw;
        self[Joint::RightElbowRoll] = arm.elbow_roll;
        self[Joint::RightWristYaw] = arm.wrist_yaw;
        self[Joint::RightHand] = arm.hand;
    }
}

impl<T: Clone> FillExt<T> for JointArray<T> {
    fn fill(value: T) -> Self {
        Self(std::array::from_fn(|_| value.clone()))
    }
}

impl<T> Index<Joint> for JointArray<T> {
    type Output = T;

    fn index(&self, joint: Joint) -> &T {
        &self.0[joint.index()]
    }
}

impl<T> IndexMut<Joint> for JointArray<T> {
    fn index_mut(&mut self, joint: Joint) -> &mut T {
        &mut self.0[joint.index()]
    }
}

impl<T: Add<Output = T>> Add for JointArray<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip(rhs).map(|(lhs, rhs)| lhs + rhs)
    }
}

impl<T: Sub<Output = T>> Sub for JointArray<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs).map(|(lhs, rhs)| lhs - rhs)
    }
}

impl<T: Mul<Output = T> + Clone> Mul<T> for JointArray<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|value| value * rhs.clone())
    }
}

impl<T: Div<Output = T> + Clone> Div<T> for JointArray<T> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|value| value / rhs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_count_matches_enum() {
        assert_eq!(Joint::COUNT, JOINT_COUNT);
        assert_eq!(Joint::RightHand.index(), JOINT_COUNT - 1);
    }

    #[test]
    fn from_fn_follows_joint_order() {
        let indices = JointArray::from_fn(Joint::index);

        for (joint, index) in indices.enumerate() {
            assert_eq!(joint.index(), *index);
        }
    }

    #[test]
    fn group_accessors_round_trip() {
        let mut joints = JointArray::<f32>::default();
        joints.set_head(HeadJoints {
            yaw: 0.5,
            pitch: -0.25,
        });
        joints.set_left_leg(LeftLegJoints::fill(1.0));
        joints.set_right_arm(SingleArmJoints::fill(2.0));

        assert_eq!(joints[Joint::HeadYaw], 0.5);
        assert_eq!(joints[Joint::HeadPitch], -0.25);
        assert_eq!(joints.left_leg(), LeftLegJoints::fill(1.0));
        assert_eq!(joints[Joint::RightHand], 2.0);
        assert_eq!(joints.right_leg(), RightLegJoints::fill(0.0));
    }

    #[test]
    fn element_wise_arithmetic() {
        let a = JointArray::fill(3.0_f32);
        let b = JointArray::fill(1.0_f32);

        assert_eq!((a - b) / 2.0, JointArray::fill(1.0));
        assert_eq!(a + b * 2.0, JointArray::fill(5.0));
    }
}
