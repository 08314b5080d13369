use crate::cue::models::{CueFile, CueSheet};
use crate::release::boundary::resolve_boundaries;
use crate::release::error::{ReleaseError, ReleaseResult};
use crate::release::models::{AudioSource, Release, Track};
use std::path::{Path, PathBuf};

/// A wave-like FILE entry of the sheet together with its resolved path and rate.
#[derive(Debug)]
pub struct ProbedFile<'a> {
    pub file: &'a CueFile,
    pub path: PathBuf,
    pub sample_rate: u32,
}

#[derive(Debug, Default)]
struct HeaderComments {
    date: String,
    genre: String,
    composer: String,
    disc_number: u32,
    total_discs: u32,
}

/// Builds a [`Release`] out of a parsed sheet.
///
/// This is the first phase of the build: every track is created and every
/// count (tracks, discs) is final when this returns. Tags referencing those
/// counts are only derived later, from the finished release.
pub fn build_release(
    cue_path: &Path,
    sheet: &CueSheet,
    files: Vec<ProbedFile<'_>>,
) -> ReleaseResult<Release> {
    if files.is_empty() {
        return Err(ReleaseError::NoAudioFiles);
    }

    let header = scan_header_comments(&sheet.comments)?;
    let multi_disc = files.len() > 1;
    let total_discs = if multi_disc {
        header.total_discs.max(files.len() as u32)
    } else {
        header.total_discs
    };

    let mut audio = Vec::with_capacity(files.len());
    let mut total_tracks = 0;

    for (position, probed) in files.into_iter().enumerate() {
        let disc_number = if multi_disc {
            position as u32 + 1
        } else {
            header.disc_number
        };

        let ranges = resolve_boundaries(&probed.file.tracks, probed.sample_rate)?;
        let audio_tracks = probed.file.tracks.iter().filter(|t| t.track_type.is_audio());

        let mut tracks = Vec::with_capacity(ranges.len());
        for (cue_track, range) in audio_tracks.zip(ranges) {
            let number = if cue_track.number == 0 {
                tracks.len() as u32 + 1
            } else {
                cue_track.number
            };

            let composer = cue_track
                .comments
                .iter()
                .find_map(|comment| comment_value(comment, "COMPOSER"))
                .unwrap_or_else(|| header.composer.clone());

            tracks.push(Track {
                number,
                disc_number,
                title: cue_track.title.clone(),
                performer: or_release(&cue_track.performer, &sheet.performer),
                songwriter: or_release(&cue_track.songwriter, &sheet.songwriter),
                composer,
                genre: header.genre.clone(),
                date: header.date.clone(),
                start_sample: range.start,
                end_sample: range.end,
            });
        }

        total_tracks += tracks.len() as u32;
        audio.push(AudioSource {
            path: probed.path,
            sample_rate: probed.sample_rate,
            disc_number,
            tracks,
        });
    }

    Ok(Release {
        path: cue_path.to_path_buf(),
        audio,
        composer: header.composer,
        performer: sheet.performer.clone(),
        songwriter: sheet.songwriter.clone(),
        title: sheet.title.clone(),
        genre: header.genre,
        date: header.date,
        total_tracks,
        total_discs,
    })
}

fn scan_header_comments(comments: &[String]) -> ReleaseResult<HeaderComments> {
    let mut header = HeaderComments::default();

    for comment in comments {
        let Some((key, value)) = split_comment(comment) else {
            continue;
        };

        match key {
            "DATE" => header.date = value,
            "GENRE" => header.genre = value,
            "COMPOSER" => header.composer = value,
            "DISCNUMBER" => header.disc_number = parse_count("DISCNUMBER", value)?,
            "TOTALDISCS" => header.total_discs = parse_count("TOTALDISCS", value)?,
            _ => {}
        }
    }

    Ok(header)
}

/// Splits `KEY value` at the first whitespace run, dropping quotes around the value.
fn split_comment(comment: &str) -> Option<(&str, String)> {
    let (key, value) = comment.split_once(char::is_whitespace)?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    Some((key, value.to_string()))
}

fn comment_value(comment: &str, wanted: &str) -> Option<String> {
    split_comment(comment)
        .filter(|(key, value)| *key == wanted && !value.is_empty())
        .map(|(_, value)| value)
}

fn parse_count(key: &'static str, value: String) -> ReleaseResult<u32> {
    value
        .parse()
        .map_err(|_| ReleaseError::InvalidComment { key, value })
}

fn or_release(track_value: &str, release_value: &str) -> String {
    if track_value.is_empty() {
        release_value.to_string()
    } else {
        track_value.to_string()
    }
}
