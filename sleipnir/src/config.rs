//! Typed motion configuration.
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use miette::{Result, miette};
use odal::{Config, ConfigKind, ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::generator::{GetupConfig, RefPickupConfig};
use crate::head::HeadConfig;
use crate::preprocessor::ManeuverConfig;
use crate::walk::{KickConfig, WalkConfig};

/// Name of the robot this process runs on, used to select overlays and individual pose files.
#[derive(Resource, Clone, Debug, PartialEq, Eq)]
pub struct RobotInfo {
    pub robot_name: String,
}

impl RobotInfo {
    #[must_use]
    pub fn new(robot_name: impl Into<String>) -> Self {
        Self {
            robot_name: robot_name.into(),
        }
    }
}

/// How quickly the robot gets up after a fall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GetupSpeed {
    Fast,
    #[default]
    Moderate,
    Slow,
}

/// Where pose files are found.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    /// Directory with the shared `.pos` files.
    pub path: PathBuf,
    /// Directory with per-robot `<robot>_<file>.pos` overrides.
    pub individual_config_path: PathBuf,
    pub getup_speed: GetupSpeed,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/poses"),
            individual_config_path: PathBuf::from("assets/poses/individual"),
            getup_speed: GetupSpeed::Moderate,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    /// Shirt number, the goalkeeper is number 1.
    pub number: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { number: 2 }
    }
}

impl PlayerConfig {
    #[must_use]
    pub fn is_goalkeeper(&self) -> bool {
        self.number == 1
    }
}

/// Everything the motion generators read at startup.
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionConfig {
    pub motion: PathConfig,
    pub player: PlayerConfig,
    pub walk: WalkConfig,
    pub kick: KickConfig,
    pub head: HeadConfig,
    pub getup: GetupConfig,
    pub maneuver: ManeuverConfig,
    pub ref_pickup: RefPickupConfig,
}

impl Config for MotionConfig {
    const PATH: &'static str = "motion.toml";
}

impl MotionConfig {
    /// Loads `motion.toml` from `config_dir`, with the overlay of `robot` on top if there is one.
    ///
    /// Relative pose paths are resolved against `base_dir`.
    pub fn load_for_robot(config_dir: &Path, base_dir: &Path, robot: &RobotInfo) -> Result<Self> {
        let overlay_dir = config_dir.join("overlay").join(&robot.robot_name);

        let mut config = match MotionConfig::load_with_overlay(config_dir, &overlay_dir) {
            Ok(config) => {
                info!(robot = %robot.robot_name, "loaded motion config with overlay");
                config
            }
            Err(error)
                if matches!(
                    error.kind,
                    ErrorKind::Load {
                        config_kind: ConfigKind::Overlay,
                        ..
                    }
                ) =>
            {
                debug!(path = %overlay_dir.display(), "no overlay, using main config only");
                MotionConfig::load(config_dir)
                    .map_err(|error| miette!("failed to load motion config: {error}"))?
            }
            Err(error) => return Err(miette!("failed to load motion config: {error}")),
        };

        config.motion.path = base_dir.join(&config.motion.path);
        config.motion.individual_config_path = base_dir.join(&config.motion.individual_config_path);
        Ok(config)
    }
}
