//! Scripted behaviour for running the motion core without a behaviour engine.
//!
//! A script is a TOML file with a list of steps, each holding one body request for a number of
//! cycles:
//!
//! ```toml
//! [[step]]
//! action = "WALK"
//! ticks = 300
//! forward = 100.0
//! ```
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::action::{ActionType, BodyRequest, Foot};

fn default_power() -> f32 {
    1.0
}

/// A single request, held for `ticks` cycles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    pub action: ActionType,
    pub ticks: u32,
    #[serde(default)]
    pub forward: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub turn: f32,
    #[serde(default)]
    pub foot: Foot,
    #[serde(default = "default_power")]
    pub power: f32,
}

impl ScriptStep {
    #[must_use]
    pub fn body_request(&self) -> BodyRequest {
        BodyRequest {
            action_type: self.action,
            forward: self.forward,
            left: self.left,
            turn: self.turn,
            foot: self.foot,
            power: self.power,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(rename = "step", default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text)
            .into_diagnostic()
            .wrap_err("failed to parse behaviour script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read behaviour script {}", path.display()))?;
        Self::parse(&text)
    }

    /// Number of cycles until the script is done.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.ticks)).sum()
    }
}

/// Plays a [`Script`], one cycle at a time.
#[derive(Resource, Clone, Debug, Default)]
pub struct ScriptPlayer {
    script: Script,
    step: usize,
    tick: u32,
}

impl ScriptPlayer {
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script,
            step: 0,
            tick: 0,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.step >= self.script.steps.len()
    }

    /// The request for the next cycle, or `None` once the script is done.
    pub fn advance(&mut self) -> Option<BodyRequest> {
        while let Some(step) = self.script.steps.get(self.step) {
            if self.tick < step.ticks {
                self.tick += 1;
                return Some(step.body_request());
            }

            self.step += 1;
            self.tick = 0;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        [[step]]
        action = "STAND"
        ticks = 2

        [[step]]
        action = "DEAD"
        ticks = 0

        [[step]]
        action = "KICK"
        ticks = 1
        foot = "RIGHT"
        power = 0.5
    "#;

    #[test]
    fn plays_steps_in_order() {
        let script = Script::parse(SCRIPT).unwrap();
        assert_eq!(script.total_ticks(), 3);
        assert_eq!(script.steps[0].power, 1.0);

        let mut player = ScriptPlayer::new(script);
        let actions: Vec<_> = std::iter::from_fn(|| player.advance())
            .map(|request| request.action_type)
            .collect();

        assert_eq!(
            actions,
            [ActionType::Stand, ActionType::Stand, ActionType::Kick]
        );
        assert!(player.is_finished());
    }

    #[test]
    fn step_fields_reach_the_request() {
        let script = Script::parse(SCRIPT).unwrap();
        let kick = script.steps[2].body_request();

        assert_eq!(kick.foot, Foot::Right);
        assert_eq!(kick.power, 0.5);
        assert_eq!(kick.bend, 15.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Script::parse("[[step]]\naction = \"WALK\"\nticks = 1\nspeed = 2.0\n");
        assert!(error.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Script::load(&dir.path().join("missing.toml")).is_err());
    }
}
