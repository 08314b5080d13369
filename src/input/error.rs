use crate::audio::error::AudioError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("{path}: {source}")]
    EmbeddedSheet { path: PathBuf, source: AudioError },

    #[error("Could not find a CUE sheet for {0}")]
    NoCueSheetFound(PathBuf),

    #[error("no input found")]
    NoInputFound,
}

pub type InputResult<T> = Result<T, InputError>;
