use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Unknown file type: {0}")]
    InvalidFileType(String),

    #[error("Unknown track type: {0}")]
    InvalidTrackType(String),

    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("Invalid quoted string: {0}")]
    InvalidQuotedString(String),

    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("Line {line}: missing argument for {keyword}")]
    MissingArgument { line: usize, keyword: String },

    #[error("Line {0}: TRACK appears before any FILE")]
    TrackOutsideFile(usize),
}

pub type CueResult<T> = Result<T, CueError>;
