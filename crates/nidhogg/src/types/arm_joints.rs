joint_group! {
    /// The joints for a single arm of the robot, including the hand.
    SingleArmJoints {
        shoulder_pitch,
        shoulder_roll,
        elbow_yaw,
        elbow_roll,
        wrist_yaw,
        hand,
    }
}
