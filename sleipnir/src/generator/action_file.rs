use nidhogg::JointValues;
use tracing::debug;

use super::{Generator, KeyframeSequence, MotionInput, PoseLibrary};
use crate::Result;
use crate::action::ActionRequest;
use crate::config::{MotionConfig, RobotInfo};
use crate::model::BodyModel;
use crate::odometry::Odometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playback {
    Idle,
    Playing(usize),
    Finished,
}

/// Plays a pose file once, and then holds its last frame.
#[derive(Debug)]
pub struct ActionGenerator {
    file_name: &'static str,
    sequence: KeyframeSequence,
    frames: KeyframeSequence,
    playback: Playback,
}

impl ActionGenerator {
    #[must_use]
    pub fn new(file_name: &'static str) -> Self {
        Self {
            file_name,
            sequence: KeyframeSequence::default(),
            frames: KeyframeSequence::default(),
            playback: Playback::Idle,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    #[cfg(test)]
    pub(crate) fn with_sequence(file_name: &'static str, sequence: KeyframeSequence) -> Self {
        Self {
            sequence,
            ..Self::new(file_name)
        }
    }
}

impl Generator for ActionGenerator {
    fn make_joints(
        &mut self,
        _request: &mut ActionRequest,
        _odometry: &mut Odometry,
        _body_model: &mut BodyModel,
        input: &MotionInput,
    ) -> JointValues {
        if self.playback == Playback::Idle {
            self.frames = self.sequence.clone();
            self.frames.blend_from(&input.sensors.joints.angles);
            self.playback = Playback::Playing(0);
            debug!(file = self.file_name, "starting action");
        }

        let frame = match self.playback {
            Playback::Playing(index) => {
                self.playback = if index + 1 < self.frames.len() {
                    Playback::Playing(index + 1)
                } else {
                    Playback::Finished
                };
                self.frames.frame(index)
            }
            Playback::Idle | Playback::Finished => self.frames.last(),
        };

        frame
            .copied()
            .unwrap_or_else(|| JointValues::with_stiffness(input.sensors.joints.angles, 0.0))
    }

    fn is_active(&self) -> bool {
        matches!(self.playback, Playback::Playing(_))
    }

    fn reset(&mut self) {
        self.playback = Playback::Idle;
    }

    // A pose file always ends, so it is left to finish.
    fn stop(&mut self) {}

    fn read_options(&mut self, config: &MotionConfig, robot: &RobotInfo) -> Result<()> {
        self.sequence = PoseLibrary::new(&config.motion, robot).load(self.file_name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nidhogg::SensorValues;
    use nidhogg::types::{FillExt, Joint, JointArray, JOINT_COUNT};

    use super::*;
    use crate::generator::pose::parse_pose_records;
    use crate::model::BallPosition;

    fn sequence() -> KeyframeSequence {
        let first = vec!["10"; JOINT_COUNT].join(" ");
        let second = vec!["20"; JOINT_COUNT].join(" ");
        let text = format!("{first} 30\n{second} 20 $ {}\n", vec!["0.7"; JOINT_COUNT].join(" "));
        KeyframeSequence::from_records(&parse_pose_records("test", &text).unwrap())
    }

    fn tick(generator: &mut ActionGenerator, sensors: &SensorValues) -> JointValues {
        let input = MotionInput {
            sensors,
            ball: BallPosition::default(),
            now: Duration::ZERO,
        };
        generator.make_joints(
            &mut ActionRequest::default(),
            &mut Odometry::default(),
            &mut BodyModel::default(),
            &input,
        )
    }

    #[test]
    fn plays_once_then_holds_last_frame() {
        let mut generator = ActionGenerator::with_sequence("test", sequence());
        let sensors = SensorValues::default();

        let first = tick(&mut generator, &sensors);
        assert_eq!(first.angles, JointArray::fill(0.0));
        assert_eq!(first.stiffness, JointArray::fill(1.0));
        assert!(generator.is_active());

        // four frames up to the first record and two towards the second, one is already played
        for _ in 0..5 {
            tick(&mut generator, &sensors);
        }
        assert!(!generator.is_active());

        let held = tick(&mut generator, &sensors);
        assert!((held.angles[Joint::LeftHipPitch].to_degrees() - 20.0).abs() < 1e-3);
        assert_eq!(held.stiffness, JointArray::fill(0.7));
    }

    #[test]
    fn reset_restarts_from_sensed_pose() {
        let mut generator = ActionGenerator::with_sequence("test", sequence());
        let mut sensors = SensorValues::default();
        for _ in 0..10 {
            tick(&mut generator, &sensors);
        }

        generator.reset();
        sensors.joints.angles = JointArray::fill(0.5);

        assert_eq!(tick(&mut generator, &sensors).angles, JointArray::fill(0.5));
        assert!(generator.is_active());
    }

    #[test]
    fn unloaded_generator_holds_sensed_angles() {
        let mut generator = ActionGenerator::new("missing");
        let joints = tick(&mut generator, &SensorValues::default());

        assert!(joints.is_valid());
        assert!(!generator.is_active());
    }
}
