joint_group! {
    /// The head joints of the robot.
    ///
    /// Positive yaw turns the head to the left, positive pitch tilts it down.
    HeadJoints { yaw, pitch }
}

#[cfg(test)]
mod tests {
    use super::HeadJoints;
    use crate::types::FillExt;

    #[test]
    fn map_and_zip() {
        let joints = HeadJoints { yaw: 1, pitch: 2 };

        assert_eq!(joints.map(|x| x * 10), HeadJoints { yaw: 10, pitch: 20 });
        assert_eq!(
            joints.zip(HeadJoints::fill('a')),
            HeadJoints {
                yaw: (1, 'a'),
                pitch: (2, 'a')
            }
        );
    }

    #[test]
    fn arithmetic() {
        let a = HeadJoints { yaw: 1.0, pitch: 2.0 };
        let b = HeadJoints::fill(0.5);

        assert_eq!(a + b, HeadJoints { yaw: 1.5, pitch: 2.5 });
        assert_eq!(a - b, HeadJoints { yaw: 0.5, pitch: 1.5 });
        assert_eq!(a * 2.0, HeadJoints { yaw: 2.0, pitch: 4.0 });
        assert_eq!(a / 2.0, HeadJoints { yaw: 0.5, pitch: 1.0 });
        assert_eq!(a.iter().sum::<f32>(), 3.0);
    }
}
