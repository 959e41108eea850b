//! Pose files and the keyframe sequences played back from them.
//!
//! A pose file is a list of records. Each record holds the 25 joint angles in degrees, followed
//! by the time in milliseconds to move there from the previous record. A record may end with a
//! `$` and 25 stiffness values, which otherwise default to `1.0`. Everything after a `#` on a
//! line is a comment.
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use nidhogg::types::{FillExt, Joint, JointArray};
use nidhogg::JointValues;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{PathConfig, RobotInfo};

#[derive(Error, Diagnostic, Debug)]
pub enum PoseFileError {
    #[error("could not read pose file `{}`", path.display())]
    #[diagnostic(help("Check `motion.path` and `motion.individual_config_path` in motion.toml"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{name}` record {record}: missing angle for {joint}")]
    MissingJoint {
        name: String,
        record: usize,
        joint: Joint,
    },

    #[error("`{name}` record {record}: missing duration")]
    MissingDuration { name: String, record: usize },

    #[error("`{name}` record {record}: missing stiffness for {joint}")]
    MissingStiffness {
        name: String,
        record: usize,
        joint: Joint,
    },

    #[error("`{name}` record {record}: `{token}` is not a valid number")]
    InvalidNumber {
        name: String,
        record: usize,
        token: String,
    },

    #[error("`{name}` contains no poses")]
    #[diagnostic(help("A pose file needs at least one record of 25 angles and a duration"))]
    Empty { name: String },
}

/// A single record of a pose file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseRecord {
    /// Target angles in radians and the stiffness to reach them with.
    pub values: JointValues,
    pub duration_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Stiffness,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    for line in text.lines() {
        let content = line.split('#').next().unwrap_or_default();
        for word in content.split_whitespace() {
            let mut rest = word;
            while let Some(position) = rest.find('$') {
                if position > 0 {
                    tokens.push(Token::Number(&rest[..position]));
                }
                tokens.push(Token::Stiffness);
                rest = &rest[position + 1..];
            }
            if !rest.is_empty() {
                tokens.push(Token::Number(rest));
            }
        }
    }

    tokens
}

/// Parses the records of a pose file, `name` is only used in errors.
pub fn parse_pose_records(name: &str, text: &str) -> Result<Vec<PoseRecord>, PoseFileError> {
    let invalid = |record: usize, token: &str| PoseFileError::InvalidNumber {
        name: name.to_string(),
        record,
        token: token.to_string(),
    };

    let mut tokens = tokenize(text).into_iter().peekable();
    let mut records = Vec::new();

    while tokens.peek().is_some() {
        let record = records.len();

        let mut angles = JointArray::<f32>::default();
        for joint in Joint::iter() {
            let Some(Token::Number(token)) = tokens.next() else {
                return Err(PoseFileError::MissingJoint {
                    name: name.to_string(),
                    record,
                    joint,
                });
            };
            let degrees: f32 = token.parse().map_err(|_| invalid(record, token))?;
            angles[joint] = degrees.to_radians();
        }

        let Some(Token::Number(token)) = tokens.next() else {
            return Err(PoseFileError::MissingDuration {
                name: name.to_string(),
                record,
            });
        };
        let duration_ms: u32 = token.parse().map_err(|_| invalid(record, token))?;

        let mut stiffness = JointArray::fill(1.0);
        if tokens.next_if_eq(&Token::Stiffness).is_some() {
            for joint in Joint::iter() {
                let Some(Token::Number(token)) = tokens.next() else {
                    return Err(PoseFileError::MissingStiffness {
                        name: name.to_string(),
                        record,
                        joint,
                    });
                };
                stiffness[joint] = token.parse().map_err(|_| invalid(record, token))?;
            }
        }

        records.push(PoseRecord {
            values: JointValues::new(angles, stiffness),
            duration_ms,
        });
    }

    if records.is_empty() {
        return Err(PoseFileError::Empty {
            name: name.to_string(),
        });
    }

    Ok(records)
}

/// Joint values for every 10 ms cycle of a motion.
///
/// The first `lead_in` frames all hold the first record. They are meant to be overwritten by
/// [`KeyframeSequence::blend_from`] to move smoothly from wherever the robot currently is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeSequence {
    frames: Vec<JointValues>,
    lead_in: usize,
}

impl KeyframeSequence {
    #[must_use]
    pub fn from_records(records: &[PoseRecord]) -> Self {
        let Some((first, rest)) = records.split_first() else {
            return Self::default();
        };

        let lead_in = (first.duration_ms / 10) as usize;
        let mut frames = vec![first.values; lead_in + 1];

        for record in rest {
            let steps = (record.duration_ms / 10) as usize;
            if steps == 0 {
                continue;
            }

            let start = frames[frames.len() - 1].angles;
            let increment = (record.values.angles - start) / steps as f32;
            for step in 1..=steps {
                frames.push(JointValues::new(
                    start + increment * step as f32,
                    record.values.stiffness,
                ));
            }
        }

        Self { frames, lead_in }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn lead_in(&self) -> usize {
        self.lead_in
    }

    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&JointValues> {
        self.frames.get(index)
    }

    #[must_use]
    pub fn last(&self) -> Option<&JointValues> {
        self.frames.last()
    }

    /// Rewrites the lead-in as a linear ramp from the `sensed` angles into the first record.
    ///
    /// The first frame gets full stiffness, so the joints are held where they are, the rest of the
    /// ramp uses the stiffness of the first record.
    pub fn blend_from(&mut self, sensed: &JointArray<f32>) {
        if self.lead_in == 0 || self.frames.len() <= self.lead_in {
            return;
        }

        let target = self.frames[self.lead_in];
        let increment = (target.angles - *sensed) / self.lead_in as f32;

        self.frames[0] = JointValues::with_stiffness(*sensed, 1.0);
        for index in 1..self.lead_in {
            self.frames[index] = JointValues::new(
                *sensed + increment * index as f32,
                target.stiffness,
            );
        }
    }
}

/// Resolves pose file names to files on disk.
#[derive(Clone, Debug)]
pub struct PoseLibrary {
    path: PathBuf,
    individual_path: PathBuf,
    robot_name: String,
}

impl PoseLibrary {
    #[must_use]
    pub fn new(config: &PathConfig, robot: &RobotInfo) -> Self {
        Self {
            path: config.path.clone(),
            individual_path: config.individual_config_path.clone(),
            robot_name: robot.robot_name.clone(),
        }
    }

    #[must_use]
    pub fn shared_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.pos"))
    }

    /// Path of `name` tuned for this robot, if such a file exists.
    #[must_use]
    pub fn individual_path(&self, name: &str) -> Option<PathBuf> {
        let path = self
            .individual_path
            .join(format!("{}_{name}.pos", self.robot_name));
        path.is_file().then_some(path)
    }

    /// Loads the shared pose file `name`.
    pub fn load(&self, name: &str) -> Result<KeyframeSequence, PoseFileError> {
        load_file(name, &self.shared_path(name))
    }

    /// Loads `name`, preferring the version tuned for this robot.
    pub fn load_individual(&self, name: &str) -> Result<KeyframeSequence, PoseFileError> {
        match self.individual_path(name) {
            Some(path) => {
                debug!(file = %path.display(), "using individual pose file");
                load_file(name, &path)
            }
            None => self.load(name),
        }
    }
}

fn load_file(name: &str, path: &Path) -> Result<KeyframeSequence, PoseFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| PoseFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sequence = KeyframeSequence::from_records(&parse_pose_records(name, &text)?);
    info!(file = %path.display(), frames = sequence.len(), "loaded pose file");

    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use nidhogg::types::JOINT_COUNT;
    use tempfile::tempdir;

    use super::*;

    fn record(angle: f32, duration_ms: u32) -> String {
        let angles = vec![angle.to_string(); JOINT_COUNT].join(" ");
        format!("{angles} {duration_ms}\n")
    }

    #[test]
    fn parses_angles_durations_and_stiffness() {
        let text = format!(
            "# stand\n{}{} $ {}\n",
            record(0.0, 1000),
            record(90.0, 500).trim_end(),
            vec!["0.5"; JOINT_COUNT].join(" ")
        );

        let records = parse_pose_records("stand", &text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].duration_ms, 1000);
        assert_eq!(records[0].values.stiffness, JointArray::fill(1.0));
        assert!((records[1].values.angles[Joint::LeftKneePitch] - 90f32.to_radians()).abs() < 1e-6);
        assert_eq!(records[1].values.stiffness, JointArray::fill(0.5));
    }

    #[test]
    fn stiffness_marker_may_touch_a_number() {
        let text = format!(
            "{} ${}",
            record(0.0, 100).trim_end(),
            vec!["0.25"; JOINT_COUNT].join(" ")
        );

        let records = parse_pose_records("touching", &text).unwrap();
        assert_eq!(records[0].values.stiffness, JointArray::fill(0.25));
    }

    #[test]
    fn parse_errors() {
        let short = vec!["0"; 10].join(" ");
        assert!(matches!(
            parse_pose_records("short", &short),
            Err(PoseFileError::MissingJoint {
                joint: Joint::LeftKneePitch,
                ..
            })
        ));

        let no_duration = vec!["0"; JOINT_COUNT].join(" ");
        assert!(matches!(
            parse_pose_records("no_duration", &no_duration),
            Err(PoseFileError::MissingDuration { record: 0, .. })
        ));

        let few_stiffness = format!("{} $ 1 1 1", record(0.0, 100).trim_end());
        assert!(matches!(
            parse_pose_records("few_stiffness", &few_stiffness),
            Err(PoseFileError::MissingStiffness {
                joint: Joint::LeftShoulderRoll,
                ..
            })
        ));

        let garbage = record(0.0, 100).replace("100", "soon");
        assert!(matches!(
            parse_pose_records("garbage", &garbage),
            Err(PoseFileError::InvalidNumber { .. })
        ));

        assert!(matches!(
            parse_pose_records("empty", "# nothing here\n"),
            Err(PoseFileError::Empty { .. })
        ));
    }

    #[test]
    fn sequence_interpolates_between_records() {
        let text = format!("{}{}", record(0.0, 30), record(40.0, 40));
        let sequence = KeyframeSequence::from_records(&parse_pose_records("ramp", &text).unwrap());

        // three lead-in frames plus the first record, then four interpolated frames
        assert_eq!(sequence.lead_in(), 3);
        assert_eq!(sequence.len(), 8);

        let angle = |index: usize| sequence.frame(index).unwrap().angles[Joint::HeadYaw].to_degrees();
        assert!(angle(3).abs() < 1e-4);
        assert!((angle(4) - 10.0).abs() < 1e-3);
        assert!((angle(7) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn blend_starts_at_sensed_pose() {
        let text = format!("{}{}", record(20.0, 40), record(20.0, 20));
        let mut sequence =
            KeyframeSequence::from_records(&parse_pose_records("blend", &text).unwrap());

        sequence.blend_from(&JointArray::fill(0.0));

        let first = sequence.frame(0).unwrap();
        assert_eq!(first.angles, JointArray::fill(0.0));
        assert_eq!(first.stiffness, JointArray::fill(1.0));

        let halfway = sequence.frame(2).unwrap().angles[Joint::RightKneePitch].to_degrees();
        assert!((halfway - 10.0).abs() < 1e-3);

        let target = sequence.frame(4).unwrap().angles[Joint::RightKneePitch].to_degrees();
        assert!((target - 20.0).abs() < 1e-3);
    }

    #[test]
    fn individual_file_is_preferred() {
        let shared = tempdir().unwrap();
        let individual = tempdir().unwrap();
        fs::write(shared.path().join("getupFront.pos"), record(0.0, 100)).unwrap();
        fs::write(
            individual.path().join("sleipnir-3_getupFront.pos"),
            format!("{}{}", record(0.0, 100), record(10.0, 100)),
        )
        .unwrap();

        let config = PathConfig {
            path: shared.path().to_path_buf(),
            individual_config_path: individual.path().to_path_buf(),
            ..Default::default()
        };

        let tuned = PoseLibrary::new(&config, &RobotInfo::new("sleipnir-3"));
        assert_eq!(tuned.load_individual("getupFront").unwrap().len(), 21);
        assert_eq!(tuned.load("getupFront").unwrap().len(), 11);

        let other = PoseLibrary::new(&config, &RobotInfo::new("sleipnir-4"));
        assert_eq!(other.load_individual("getupFront").unwrap().len(), 11);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let library = PoseLibrary::new(
            &PathConfig {
                path: PathBuf::from("/nonexistent"),
                ..Default::default()
            },
            &RobotInfo::new("sleipnir-1"),
        );

        assert!(matches!(
            library.load("stand"),
            Err(PoseFileError::Io { .. })
        ));
    }
}
