joint_group! {
    /// The left leg joints of the robot.
    LeftLegJoints {
        hip_yaw_pitch,
        hip_roll,
        hip_pitch,
        knee_pitch,
        ankle_pitch,
        ankle_roll,
    }
}

joint_group! {
    /// The right leg joints of the robot.
    ///
    /// The right hip yaw pitch is mechanically coupled to the left one, and is therefore not part
    /// of this group.
    RightLegJoints {
        hip_roll,
        hip_pitch,
        knee_pitch,
        ankle_pitch,
        ankle_roll,
    }
}
