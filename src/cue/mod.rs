use crate::cue::charset::decode_cue_text;
use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueFile, CueSheet, CueTrack, FileType, Index, Timecode, TrackType};
use log::debug;
use std::path::{Path, PathBuf};

pub mod charset;
pub mod error;
pub mod models;

pub struct CueParser {
    cue_path: PathBuf,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub async fn parse(&self) -> CueResult<CueSheet> {
        let data = tokio::fs::read(&self.cue_path).await?;
        parse_bytes(&data)
    }
}

/// Normalizes the text encoding of a raw sheet, then parses it.
pub fn parse_bytes(raw: &[u8]) -> CueResult<CueSheet> {
    let decoded = decode_cue_text(raw);
    debug!(
        "CUE sheet decoded as {} (detected: {})",
        decoded.encoding, decoded.detected
    );
    parse_str(&decoded.text)
}

pub fn parse_str(text: &str) -> CueResult<CueSheet> {
    let mut cue_sheet = CueSheet::default();

    let mut current_file: Option<CueFile> = None;
    let mut current_track: Option<CueTrack> = None;

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        match keyword {
            "REM" => {
                if rest.is_empty() {
                    continue;
                }
                match &mut current_track {
                    Some(track) => track.comments.push(rest.to_string()),
                    None => cue_sheet.comments.push(rest.to_string()),
                }
            }
            "PERFORMER" | "SONGWRITER" | "TITLE" => {
                let value = unquote(rest)?;
                let target = match &mut current_track {
                    Some(track) => match keyword {
                        "PERFORMER" => &mut track.performer,
                        "SONGWRITER" => &mut track.songwriter,
                        _ => &mut track.title,
                    },
                    None => match keyword {
                        "PERFORMER" => &mut cue_sheet.performer,
                        "SONGWRITER" => &mut cue_sheet.songwriter,
                        _ => &mut cue_sheet.title,
                    },
                };
                *target = value;
            }
            "FILE" => {
                if let Some(mut file) = current_file.take() {
                    if let Some(track) = current_track.take() {
                        file.tracks.push(track);
                    }
                    cue_sheet.files.push(file);
                }

                let (name, type_str) = split_file_argument(rest).ok_or_else(|| {
                    CueError::MissingArgument {
                        line: line_no,
                        keyword: keyword.to_string(),
                    }
                })?;

                current_file = Some(CueFile {
                    name,
                    file_type: parse_file_type(type_str)?,
                    tracks: Vec::new(),
                });
            }
            "TRACK" => {
                let file = current_file
                    .as_mut()
                    .ok_or(CueError::TrackOutsideFile(line_no))?;
                if let Some(track) = current_track.take() {
                    file.tracks.push(track);
                }

                let parts: Vec<&str> = rest.split_whitespace().collect();
                if parts.len() < 2 {
                    return Err(CueError::MissingArgument {
                        line: line_no,
                        keyword: keyword.to_string(),
                    });
                }

                let number = parts[0].parse::<u32>()?;
                let track_type = parse_track_type(parts[1])?;
                current_track = Some(CueTrack::new(number, track_type));
            }
            "INDEX" => {
                if let Some(track) = &mut current_track {
                    let parts: Vec<&str> = rest.split_whitespace().collect();
                    if parts.len() < 2 {
                        return Err(CueError::MissingArgument {
                            line: line_no,
                            keyword: keyword.to_string(),
                        });
                    }

                    let number = parts[0].parse::<u8>()?;
                    let position = parse_timecode(parts[1])?;
                    track.indices.push(Index { number, position });
                }
            }
            _ => {}
        }
    }

    if let Some(mut file) = current_file {
        if let Some(track) = current_track {
            file.tracks.push(track);
        }
        cue_sheet.files.push(file);
    }

    Ok(cue_sheet)
}

/// Strips the surrounding quotes of a value, unquoted values are taken verbatim.
fn unquote(value: &str) -> CueResult<String> {
    let value = value.trim();
    if !value.starts_with('"') {
        return Ok(value.to_string());
    }

    match value.rfind('"') {
        Some(end) if end > 0 => Ok(value[1..end].to_string()),
        _ => Err(CueError::InvalidQuotedString(value.to_string())),
    }
}

/// Splits `"name with spaces.wav" WAVE` into the file name and its type.
fn split_file_argument(rest: &str) -> Option<(String, &str)> {
    let (name, type_str) = rest.rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    let name = name
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name);
    if name.is_empty() {
        return None;
    }

    Some((name.to_string(), type_str.trim()))
}

fn parse_file_type(type_str: &str) -> CueResult<FileType> {
    match type_str {
        "BINARY" => Ok(FileType::Binary),
        "MOTOROLA" => Ok(FileType::Motorola),
        "AIFF" => Ok(FileType::Aiff),
        "WAVE" => Ok(FileType::Wave),
        "MP3" => Ok(FileType::Mp3),
        _ => Err(CueError::InvalidFileType(type_str.to_string())),
    }
}

fn parse_track_type(type_str: &str) -> CueResult<TrackType> {
    match type_str {
        "AUDIO" => Ok(TrackType::Audio),
        "CDG" => Ok(TrackType::CdG),
        "MODE1/2048" => Ok(TrackType::Mode1_2048),
        "MODE1/2352" => Ok(TrackType::Mode1_2352),
        "MODE2/2336" => Ok(TrackType::Mode2_2336),
        "MODE2/2352" => Ok(TrackType::Mode2_2352),
        "CDI/2336" => Ok(TrackType::CdI2336),
        "CDI/2352" => Ok(TrackType::CdI2352),
        _ => Err(CueError::InvalidTrackType(type_str.to_string())),
    }
}

fn parse_timecode(value: &str) -> CueResult<Timecode> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return Err(CueError::InvalidTimecode(value.to_string()));
    }

    let timecode = Timecode::new(parts[0].parse()?, parts[1].parse()?, parts[2].parse()?);
    if timecode.seconds >= 60 || u64::from(timecode.frames) >= Timecode::FRAMES_PER_SECOND {
        return Err(CueError::InvalidTimecode(value.to_string()));
    }

    Ok(timecode)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"REM GENRE "Progressive Rock"
REM DATE 1973
PERFORMER "Some Band"
TITLE "Some Album"
FILE "Some Band - Some Album.flac" WAVE
  TRACK 01 AUDIO
    TITLE "First"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Second"
    PERFORMER "Guest"
    REM COMPOSER Somebody Else
    INDEX 00 03:28:50
    INDEX 01 03:30:00
"#;

    #[test]
    fn parses_header_and_tracks() {
        let sheet = parse_str(SHEET).unwrap();

        assert_eq!(sheet.performer, "Some Band");
        assert_eq!(sheet.title, "Some Album");
        assert_eq!(sheet.comments, vec!["GENRE \"Progressive Rock\"", "DATE 1973"]);
        assert_eq!(sheet.files.len(), 1);

        let file = &sheet.files[0];
        assert_eq!(file.name, "Some Band - Some Album.flac");
        assert_eq!(file.file_type, FileType::Wave);
        assert_eq!(file.tracks.len(), 2);

        let second = &file.tracks[1];
        assert_eq!(second.number, 2);
        assert_eq!(second.title, "Second");
        assert_eq!(second.performer, "Guest");
        assert_eq!(second.comments, vec!["COMPOSER Somebody Else"]);
        assert_eq!(second.index(0).unwrap().position, Timecode::new(3, 28, 50));
        assert_eq!(second.index(1).unwrap().position, Timecode::new(3, 30, 0));
    }

    #[test]
    fn splits_tracks_across_files() {
        let sheet = parse_str(
            "FILE \"cd1.wav\" WAVE\n TRACK 01 AUDIO\n INDEX 01 00:00:00\nFILE cd2.wav WAVE\n TRACK 02 AUDIO\n INDEX 01 00:00:00\n",
        )
        .unwrap();

        assert_eq!(sheet.files.len(), 2);
        assert_eq!(sheet.files[0].tracks.len(), 1);
        assert_eq!(sheet.files[1].name, "cd2.wav");
        assert_eq!(sheet.files[1].tracks[0].number, 2);
    }

    #[test]
    fn rejects_track_before_file() {
        let err = parse_str("TRACK 01 AUDIO\n").unwrap_err();
        assert!(matches!(err, CueError::TrackOutsideFile(1)));
    }

    #[test]
    fn rejects_out_of_range_timecode() {
        assert!(parse_timecode("01:60:00").is_err());
        assert!(parse_timecode("01:00:75").is_err());
        assert!(parse_timecode("01:00").is_err());
        assert_eq!(parse_timecode("120:59:74").unwrap(), Timecode::new(120, 59, 74));
    }

    #[test]
    fn unquote_handles_bare_and_quoted_values() {
        assert_eq!(unquote("\"a b\"").unwrap(), "a b");
        assert_eq!(unquote("plain").unwrap(), "plain");
        assert!(unquote("\"open").is_err());
    }

    #[test]
    fn keeps_non_wave_files_with_their_type() {
        let sheet = parse_str("FILE \"data.bin\" BINARY\n TRACK 01 MODE1/2352\n INDEX 01 00:00:00\n")
            .unwrap();
        assert_eq!(sheet.files[0].file_type, FileType::Binary);
        assert!(!sheet.files[0].tracks[0].track_type.is_audio());
    }
}
