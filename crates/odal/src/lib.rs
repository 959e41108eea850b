//! Layered TOML configuration.
//!
//! A config is read from a main directory, and can be partially overridden by a file with the
//! same name in an overlay directory (typically one per robot).
mod error;


use std::path::Path;

use serde::de::DeserializeOwned;
use toml::Table;

pub use error::{ConfigKind, Error, ErrorKind, Result};

/// A configuration struct that lives in a TOML file at [`Config::PATH`].
pub trait Config: DeserializeOwned {
    /// Path of the config file, relative to a config directory.
    const PATH: &'static str;

    /// Loads the config from `main_dir` only.
    fn load(main_dir: &Path) -> Result<Self> {
        let main = read_table::<Self>(main_dir, ConfigKind::Main)?;
        deserialize(main)
    }

    /// Loads the config from `main_dir`, and merges the file in `overlay_dir` on top of it.
    ///
    /// An overlay that does not exist results in an [`ErrorKind::Load`] with
    /// [`ConfigKind::Overlay`], so callers can choose to fall back to [`Config::load`].
    fn load_with_overlay(main_dir: &Path, overlay_dir: &Path) -> Result<Self> {
        let main = read_table::<Self>(main_dir, ConfigKind::Main)?;
        let overlay = read_table::<Self>(overlay_dir, ConfigKind::Overlay)?;

        deserialize(merge_tables(main, overlay))
    }
}

fn read_table<T: Config>(dir: &Path, config_kind: ConfigKind) -> Result<Table> {
    let path = dir.join(T::PATH);
    let name = std::any::type_name::<T>();

    let contents = std::fs::read_to_string(&path).map_err(|source| Error {
        name,
        kind: ErrorKind::Load {
            path: path.clone(),
            config_kind,
            source,
        },
    })?;

    contents.parse::<Table>().map_err(|source| Error {
        name,
        kind: ErrorKind::Parse { path, source },
    })
}

fn deserialize<T: Config>(table: Table) -> Result<T> {
    toml::Value::Table(table).try_into().map_err(|source| Error {
        name: std::any::type_name::<T>(),
        kind: ErrorKind::Deserialize(source),
    })
}

/// Merges `overlay` on top of `main`.
///
/// Nested tables are merged recursively, any other value in `overlay` replaces the value in
/// `main`. Keys that only exist in `overlay` are added.
#[must_use]
pub fn merge_tables(main: Table, mut overlay: Table) -> Table {
    let mut merged = Table::new();

    for (key, main_value) in main {
        let value = match (main_value, overlay.remove(&key)) {
            (toml::Value::Table(main_table), Some(toml::Value::Table(overlay_table))) => {
                toml::Value::Table(merge_tables(main_table, overlay_table))
            }
            (_, Some(overlay_value)) => overlay_value,
            (main_value, None) => main_value,
        };
        merged.insert(key, value);
    }

    merged.extend(overlay);
    merged
}
