#[derive(Debug, Clone, Default)]
pub struct CueSheet {
    pub performer: String,
    pub songwriter: String,
    pub title: String,
    /// REM lines of the sheet header, without the `REM ` prefix.
    pub comments: Vec<String>,
    pub files: Vec<CueFile>,
}

#[derive(Debug, Clone)]
pub struct CueFile {
    pub name: String,
    pub file_type: FileType,
    pub tracks: Vec<CueTrack>,
}

#[derive(Debug, Clone)]
pub struct CueTrack {
    pub number: u32,
    pub track_type: TrackType,
    pub title: String,
    pub performer: String,
    pub songwriter: String,
    pub comments: Vec<String>,
    pub indices: Vec<Index>,
}

impl CueTrack {
    pub fn new(number: u32, track_type: TrackType) -> Self {
        Self {
            number,
            track_type,
            title: String::new(),
            performer: String::new(),
            songwriter: String::new(),
            comments: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn index(&self, number: u8) -> Option<&Index> {
        self.indices.iter().find(|i| i.number == number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub number: u8,
    pub position: Timecode,
}

/// `MM:SS:FF` position, frames being 1/75 of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub minutes: u32,
    pub seconds: u8,
    pub frames: u8,
}

impl Timecode {
    pub const FRAMES_PER_SECOND: u64 = 75;

    pub fn new(minutes: u32, seconds: u8, frames: u8) -> Self {
        Self {
            minutes,
            seconds,
            frames,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    CdG,
    Mode1_2048,
    Mode1_2352,
    Mode2_2336,
    Mode2_2352,
    CdI2336,
    CdI2352,
}

impl TrackType {
    pub fn is_audio(&self) -> bool {
        matches!(self, TrackType::Audio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Binary,
    Motorola,
    Aiff,
    Wave,
    Mp3,
}

impl FileType {
    /// Only `WAVE` files are split; that type also covers FLAC, APE and friends.
    pub fn is_wave(&self) -> bool {
        matches!(self, FileType::Wave)
    }
}
