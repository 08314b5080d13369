use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Invalid name template {template:?}: {reason}")]
    InvalidNameTemplate { template: String, reason: String },

    #[error("Could not create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: failed to spawn ffmpeg: {source}")]
    EncoderSpawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: ffmpeg exited with {status}: {message}")]
    EncoderFailed {
        path: PathBuf,
        status: ExitStatus,
        message: String,
    },
}

pub type SplitResult<T> = Result<T, SplitError>;
