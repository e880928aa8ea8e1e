//! Error types shared by every scaffolding step

use crate::git::GitError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scaffolding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scaffolding a sample.
///
/// Messages are shown to the user verbatim, so each variant carries the
/// originating message rather than a summary.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid descriptor, or a missing account attribute
    #[error("{0}")]
    Configuration(String),

    /// Clone, pull or API failure
    #[error("{0}")]
    Network(String),

    /// API response that does not have the expected shape
    #[error("{0}")]
    Data(String),

    /// The user aborted a prompt
    #[error("Operation cancelled")]
    Cancelled,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<GitError> for Error {
    fn from(err: GitError) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
