use crate::config::ConfigError;
use crate::package::LockFileError;
use thiserror::Error;

/// Top-level error type for the nettpack library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("lock file error: {0}")]
    LockFile(#[from] LockFileError),

    /// A composition step ran against a skeleton that lacks what it requires.
    #[error("composition precondition violated: {0}")]
    Precondition(String),
}
