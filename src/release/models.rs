use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const VARIOUS_ARTISTS: &str = "Various Artists";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One CUE sheet worth of audio, possibly spread over several files (discs).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub path: PathBuf,
    pub audio: Vec<AudioSource>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub composer: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub performer: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub songwriter: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub genre: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    pub total_tracks: u32,
    pub total_discs: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub disc_number: u32,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub number: u32,
    pub disc_number: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub performer: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub songwriter: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub composer: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub genre: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    pub start_sample: u64,
    /// `None` until the end of the stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_sample: Option<u64>,
}

impl Track {
    /// Composer, then songwriter, then performer.
    pub fn artist(&self) -> &str {
        pick_artist(&self.composer, &self.songwriter, &self.performer).unwrap_or(UNKNOWN_ARTIST)
    }
}

impl Release {
    pub fn tracks(&self) -> impl Iterator<Item = (&AudioSource, &Track)> {
        self.audio
            .iter()
            .flat_map(|audio| audio.tracks.iter().map(move |track| (audio, track)))
    }

    /// Artist of the whole release, used to name its directory.
    pub fn artist(&self) -> &str {
        if let Some(artist) = pick_artist(&self.composer, &self.songwriter, &self.performer) {
            return artist;
        }

        let artists: HashSet<&str> = self.tracks().map(|(_, track)| track.artist()).collect();
        match artists.len() {
            0 => UNKNOWN_ARTIST,
            1 => artists.into_iter().next().unwrap_or(UNKNOWN_ARTIST),
            _ => VARIOUS_ARTISTS,
        }
    }

    pub fn album(&self) -> &str {
        if self.title.is_empty() {
            UNKNOWN_ALBUM
        } else {
            &self.title
        }
    }

    /// Zero padding of track numbers, fixed once for the whole release.
    pub fn track_number_width(&self) -> usize {
        if self.total_tracks > 99 { 3 } else { 2 }
    }
}

fn pick_artist<'a>(composer: &'a str, songwriter: &'a str, performer: &'a str) -> Option<&'a str> {
    [composer, songwriter, performer]
        .into_iter()
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(composer: &str, songwriter: &str, performer: &str) -> Track {
        Track {
            number: 1,
            disc_number: 0,
            title: String::new(),
            performer: performer.to_string(),
            songwriter: songwriter.to_string(),
            composer: composer.to_string(),
            genre: String::new(),
            date: String::new(),
            start_sample: 0,
            end_sample: None,
        }
    }

    fn release(tracks: Vec<Track>) -> Release {
        Release {
            path: PathBuf::from("album.cue"),
            total_tracks: tracks.len() as u32,
            audio: vec![AudioSource {
                path: PathBuf::from("album.flac"),
                sample_rate: 44_100,
                disc_number: 0,
                tracks,
            }],
            composer: String::new(),
            performer: String::new(),
            songwriter: String::new(),
            title: String::new(),
            genre: String::new(),
            date: String::new(),
            total_discs: 0,
        }
    }

    #[test]
    fn artist_precedence_covers_every_combination() {
        for mask in 0..8u8 {
            let composer = if mask & 1 != 0 { "C" } else { "" };
            let songwriter = if mask & 2 != 0 { "S" } else { "" };
            let performer = if mask & 4 != 0 { "P" } else { "" };

            let expected = if !composer.is_empty() {
                "C"
            } else if !songwriter.is_empty() {
                "S"
            } else if !performer.is_empty() {
                "P"
            } else {
                UNKNOWN_ARTIST
            };

            assert_eq!(
                track(composer, songwriter, performer).artist(),
                expected,
                "composer={composer:?} songwriter={songwriter:?} performer={performer:?}"
            );
        }
    }

    #[test]
    fn release_artist_prefers_release_fields() {
        let mut release = release(vec![track("", "", "Track Artist")]);
        release.performer = "Band".to_string();
        assert_eq!(release.artist(), "Band");
    }

    #[test]
    fn release_artist_falls_back_to_track_artists() {
        let same = release(vec![track("", "", "A"), track("", "", "A")]);
        assert_eq!(same.artist(), "A");

        let mixed = release(vec![track("", "", "A"), track("", "", "B")]);
        assert_eq!(mixed.artist(), VARIOUS_ARTISTS);

        let empty = release(vec![]);
        assert_eq!(empty.artist(), UNKNOWN_ARTIST);
    }

    #[test]
    fn track_number_width_depends_on_total() {
        let mut release = release(vec![]);
        release.total_tracks = 8;
        assert_eq!(release.track_number_width(), 2);
        release.total_tracks = 99;
        assert_eq!(release.track_number_width(), 2);
        release.total_tracks = 120;
        assert_eq!(release.track_number_width(), 3);
    }

    #[test]
    fn album_falls_back_to_placeholder() {
        let mut release = release(vec![]);
        assert_eq!(release.album(), UNKNOWN_ALBUM);
        release.title = "Title".to_string();
        assert_eq!(release.album(), "Title");
    }
}
