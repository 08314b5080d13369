use crate::config::{OutputFormat, SplitConfig};
use crate::release::models::{AudioSource, Release, Track};
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Highest sample rate written to FLAC and Ogg outputs.
pub const MAX_OUTPUT_SAMPLE_RATE: u32 = 192_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: &'static str,
    pub value: String,
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Tags of `track` in the vocabulary of `format`, empty values are left out.
pub fn map_tags(format: OutputFormat, release: &Release, track: &Track) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut push = |key: &'static str, value: String| {
        if !value.is_empty() {
            tags.push(Tag { key, value });
        }
    };

    push("composer", track.composer.clone());
    push("artist", track.artist().to_string());
    push("performer", track.performer.clone());
    push("album", release.title.clone());
    push("title", track.title.clone());
    push("genre", track.genre.clone());
    push("date", track.date.clone());

    let disc = non_zero(track.disc_number);
    let total_discs = non_zero(release.total_discs);

    match format {
        OutputFormat::Flac => {
            push("tracknumber", track.number.to_string());
            push("tracktotal", release.total_tracks.to_string());
            push("discnumber", disc);
            push("totaldiscs", total_discs);
        }
        OutputFormat::Ogg => {
            push("tracknumber", track.number.to_string());
            push("discnumber", disc);
            push("totaldiscs", total_discs);
        }
        OutputFormat::Mp3 => {
            push("track", combined(track.number.to_string(), release.total_tracks.to_string()));
            push("disc", combined(disc, total_discs));
        }
    }

    tags
}

/// `atrim` filter selecting the samples of `track`, open-ended tracks run to the end of the stream.
pub fn trim_filter(track: &Track) -> String {
    match track.end_sample {
        Some(end) => format!("atrim=start_sample={}:end_sample={end}", track.start_sample),
        None => format!("atrim=start_sample={}", track.start_sample),
    }
}

/// Encoder flags specific to `format` for a source sampled at `sample_rate`.
pub fn format_flags(format: OutputFormat, sample_rate: u32) -> Vec<String> {
    match format {
        OutputFormat::Flac | OutputFormat::Ogg if sample_rate > MAX_OUTPUT_SAMPLE_RATE => {
            vec!["-ar".to_string(), MAX_OUTPUT_SAMPLE_RATE.to_string()]
        }
        OutputFormat::Flac | OutputFormat::Ogg => Vec::new(),
        OutputFormat::Mp3 => ["-q:a", "0", "-id3v2_version", "3"]
            .map(String::from)
            .to_vec(),
    }
}

/// Full ffmpeg command line extracting `track` of `source` into `output`, tagged with `tags`.
pub fn ffmpeg_arguments(
    config: &SplitConfig,
    source: &AudioSource,
    track: &Track,
    tags: &[Tag],
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
        .map(OsString::from)
        .to_vec();
    args.push(source.path.clone().into_os_string());

    args.push("-af".into());
    args.push(trim_filter(track).into());
    args.extend(["-map", "0:a", "-map_metadata", "-1"].map(OsString::from));

    for tag in tags {
        args.push("-metadata".into());
        args.push(tag.to_string().into());
    }

    args.extend(format_flags(config.format, source.sample_rate).into_iter().map(OsString::from));
    args.extend(config.extra_args.iter().map(OsString::from));
    args.push(output.as_os_str().to_os_string());

    args
}

fn non_zero(value: u32) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}

/// `a/b`, or nothing unless both halves are known.
fn combined(first: String, second: String) -> String {
    if first.is_empty() || second.is_empty() {
        String::new()
    } else {
        format!("{first}/{second}")
    }
}
