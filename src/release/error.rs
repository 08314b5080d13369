use crate::audio::error::AudioError;
use crate::cue::error::CueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("{name}: {source}")]
    AudioFile { name: String, source: AudioError },

    #[error("no audio files")]
    NoAudioFiles,

    #[error("Invalid {key} value: {value:?}")]
    InvalidComment { key: &'static str, value: String },

    #[error("track number {track} doesn't have INDEX 01")]
    MissingStartIndex { track: u32 },

    #[error("track number {track} ends at sample {end}, which is not after its start at sample {start}")]
    InvalidTrackRange { track: u32, start: u64, end: u64 },
}

pub type ReleaseResult<T> = Result<T, ReleaseError>;
