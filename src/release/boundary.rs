use crate::cue::models::{CueTrack, Timecode};
use crate::release::error::{ReleaseError, ReleaseResult};

/// `[start, end)` in samples, an open `end` runs to the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    pub start: u64,
    pub end: Option<u64>,
}

/// Converts a CUE position into a sample offset.
///
/// A frame is 1/75 s and is counted as `sample_rate / 75` whole samples, which
/// is only exact for rates divisible by 75 (44.1k, 48k, 96k, ...). The rounding
/// is kept as is rather than compensated.
pub fn sample_offset(position: &Timecode, sample_rate: u32) -> u64 {
    let sample_rate = u64::from(sample_rate);
    let seconds = u64::from(position.minutes) * 60 + u64::from(position.seconds);

    seconds * sample_rate + sample_rate / Timecode::FRAMES_PER_SECOND * u64::from(position.frames)
}

/// Resolves the sample range of every audio track of a single file.
///
/// The returned ranges follow the order of the audio tracks in `tracks`. A
/// track starts at its INDEX 01 and ends where the next TRACK entry begins:
/// that entry's INDEX 00 (pre-gap) if it has one, INDEX 01 otherwise. Data
/// tracks are skipped but still close the audio track before them. The last
/// audio track is left open.
pub fn resolve_boundaries(tracks: &[CueTrack], sample_rate: u32) -> ReleaseResult<Vec<SampleRange>> {
    let mut ranges: Vec<SampleRange> = Vec::new();
    let mut pending: Option<(u32, usize)> = None;

    for track in tracks {
        if let Some((number, position)) = pending.take() {
            let next_start = track.index(0).or_else(|| track.index(1));
            if let Some(index) = next_start {
                let end = sample_offset(&index.position, sample_rate);
                let range = &mut ranges[position];
                if end <= range.start {
                    return Err(ReleaseError::InvalidTrackRange {
                        track: number,
                        start: range.start,
                        end,
                    });
                }
                range.end = Some(end);
            }
        }

        if !track.track_type.is_audio() {
            continue;
        }

        let start = track
            .index(1)
            .map(|index| sample_offset(&index.position, sample_rate))
            .ok_or(ReleaseError::MissingStartIndex {
                track: track.number,
            })?;

        ranges.push(SampleRange { start, end: None });
        pending = Some((track.number, ranges.len() - 1));
    }

    Ok(ranges)
}
