//! Result and Error types for the crate.
use std::path::PathBuf;

use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two config layers an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Main,
    Overlay,
}

/// A failure while loading the config `name`.
#[derive(Error, Debug)]
#[error("failed to load config `{name}`: {kind}")]
pub struct Error {
    /// Type name of the config that failed to load.
    pub name: &'static str,
    pub kind: ErrorKind,
}

/// Configuration error variants
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// The file could not be read, this wraps a [std::io::Error]
    #[error("could not read {config_kind:?} config at `{}`", path.display())]
    Load {
        path: PathBuf,
        config_kind: ConfigKind,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid toml, this wraps a [toml::de::Error]
    #[error("`{}` is not valid toml", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The merged table does not match the config struct, this wraps a [toml::de::Error]
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),
}
