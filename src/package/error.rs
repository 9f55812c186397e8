use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LockFileError {
    #[error("composer lock file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read composer lock file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse composer lock file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
