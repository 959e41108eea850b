use serde::{Deserialize, Serialize};

use super::{FillExt, Joint, JointArray};

/// Stiffness value that lets the joint motors go limp.
pub const STIFFNESS_LIMP: f32 = -1.0;

/// Joint angles in radians, with their stiffnesses.
///
/// A stiffness lies in `0.0..=1.0`, or is [`STIFFNESS_LIMP`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointValues {
    pub angles: JointArray<f32>,
    pub stiffness: JointArray<f32>,
}

impl JointValues {
    #[must_use]
    pub fn new(angles: JointArray<f32>, stiffness: JointArray<f32>) -> Self {
        Self { angles, stiffness }
    }

    /// Uses `stiffness` for every joint.
    #[must_use]
    pub fn with_stiffness(angles: JointArray<f32>, stiffness: f32) -> Self {
        Self {
            angles,
            stiffness: JointArray::fill(stiffness),
        }
    }

    /// Holds `angles`, but with every motor limp.
    #[must_use]
    pub fn limp(angles: JointArray<f32>) -> Self {
        Self::with_stiffness(angles, STIFFNESS_LIMP)
    }

    /// Copies the head angles and stiffnesses of `other` into `self`.
    pub fn splice_head(&mut self, other: &JointValues) {
        self.angles.set_head(other.angles.head());
        self.stiffness.set_head(other.stiffness.head());
    }

    /// Returns whether every angle is finite and every stiffness is in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.angles.iter().all(|angle| angle.is_finite())
            && self
                .stiffness
                .iter()
                .all(|s| (0.0..=1.0).contains(s) || *s == STIFFNESS_LIMP)
    }

    /// Returns the angle and stiffness of a single joint.
    #[must_use]
    pub fn joint(&self, joint: Joint) -> (f32, f32) {
        (self.angles[joint], self.stiffness[joint])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeadJoints;

    #[test]
    fn splice_only_touches_the_head() {
        let mut body = JointValues::with_stiffness(JointArray::fill(1.0), 1.0);
        let mut head = JointValues::with_stiffness(JointArray::fill(0.0), 0.0);
        head.angles.set_head(HeadJoints {
            yaw: 0.3,
            pitch: 0.1,
        });
        head.stiffness.set_head(HeadJoints::fill(0.6));

        body.splice_head(&head);

        assert_eq!(body.joint(Joint::HeadYaw), (0.3, 0.6));
        assert_eq!(body.joint(Joint::HeadPitch), (0.1, 0.6));
        assert_eq!(body.joint(Joint::LeftShoulderPitch), (1.0, 1.0));
    }

    #[test]
    fn limp_is_valid() {
        assert!(JointValues::limp(JointArray::default()).is_valid());
        assert!(!JointValues::with_stiffness(JointArray::default(), 1.5).is_valid());
        assert!(!JointValues::with_stiffness(JointArray::fill(f32::NAN), 1.0).is_valid());
    }
}
