use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error(transparent)]
    FlacError(#[from] claxon::Error),

    #[error("ffprobe failed for {path}: {message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("Invalid sample rate reported for {path}: {value:?}")]
    InvalidSampleRate { path: PathBuf, value: String },
}

pub type AudioResult<T> = Result<T, AudioError>;
