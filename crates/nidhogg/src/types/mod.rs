#[macro_use]
mod group;

mod arm_joints;
mod head_joints;
mod joint_array;
mod joint_values;
mod leg_joints;
mod sensors;

pub use arm_joints::SingleArmJoints;
pub use head_joints::HeadJoints;
pub use joint_array::{JOINT_COUNT, Joint, JointArray};
pub use joint_values::{JointValues, STIFFNESS_LIMP};
pub use leg_joints::{LeftLegJoints, RightLegJoints};
pub use sensors::{FootPressure, InertialSensors, SensorValues};

/// Fill a joint collection with a single value.
///
/// # Example
///
/// ```
/// use nidhogg::types::{FillExt, HeadJoints};
///
/// let stiffness = HeadJoints::fill(0.6);
/// assert_eq!(stiffness.yaw, 0.6);
/// assert_eq!(stiffness.pitch, 0.6);
/// ```
pub trait FillExt<T> {
    fn fill(value: T) -> Self;
}
