//! Joint-space types for the NAO robot.
//!
//! Every motion generator speaks in terms of [`JointValues`]: one angle and one stiffness
//! for each of the 25 joints in [`types::Joint`]. Smaller groups such as [`types::HeadJoints`]
//! or [`types::LeftLegJoints`] can be read from, and written into, a full [`types::JointArray`].
pub mod types;

pub use types::{JointValues, SensorValues};
