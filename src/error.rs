// ABOUTME: Application-wide error types for hubsync.
// ABOUTME: Uses thiserror; ErrorKind maps every variant onto the run-level taxonomy.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("failed to parse content: {0}")]
    InvalidContent(#[from] serde_json::Error),

    #[error("too many images in content: {count} > {max}")]
    TooManyImages { count: usize, max: usize },

    #[error("container engine unavailable: {0}")]
    Client(#[from] crate::runtime::RuntimeError),

    #[error("failed to write output file {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Coarse classification of run-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad settings or content; nothing was sent to the engine.
    Config,
    /// The container engine could not be reached or authenticated.
    Client,
    /// A step of the run itself failed (writing the output script).
    Operation,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfig(_)
            | Error::ConfigNotFound(_)
            | Error::UnknownProfile(_)
            | Error::InvalidContent(_)
            | Error::TooManyImages { .. }
            | Error::Yaml(_) => ErrorKind::Config,
            Error::Client(_) => ErrorKind::Client,
            Error::Output { .. } | Error::Io(_) => ErrorKind::Operation,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
