use crate::audio::error::{AudioError, AudioResult};
use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub mod error;

/// Vorbis comment holding a CUE sheet embedded into a FLAC file.
const CUESHEET_TAG: &str = "CUESHEET";

/// Looks up the sample rate of an audio file, queried once per file at load time.
pub trait SampleRateProbe: Send + Sync {
    fn sample_rate<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AudioResult<u32>>;
}

/// Reads FLAC STREAMINFO in-process and asks `ffprobe` about everything else.
#[derive(Debug, Clone)]
pub struct MediaProbe {
    ffprobe: PathBuf,
}

impl MediaProbe {
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    async fn ffprobe_sample_rate(&self, path: &Path) -> AudioResult<u32> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "a:0",
                "-show_entries",
                "stream=sample_rate",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::ProbeFailed {
                path: path.to_path_buf(),
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    stderr.lines().last().unwrap_or("unknown error")
                ),
            });
        }

        parse_sample_rate(path, &String::from_utf8_lossy(&output.stdout))
    }
}

impl SampleRateProbe for MediaProbe {
    fn sample_rate<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AudioResult<u32>> {
        async move {
            let sample_rate = if is_flac(path) {
                let owned = path.to_path_buf();
                tokio::task::spawn_blocking(move || flac_sample_rate(&owned)).await??
            } else {
                self.ffprobe_sample_rate(path).await?
            };

            debug!("{path:?} has a sample rate of {sample_rate} Hz");
            Ok::<_, AudioError>(sample_rate)
        }
        .boxed()
    }
}

pub fn is_flac(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("flac"))
}

fn flac_sample_rate(path: &Path) -> AudioResult<u32> {
    let reader = claxon::FlacReader::open(path)?;
    let sample_rate = reader.streaminfo().sample_rate;
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate {
            path: path.to_path_buf(),
            value: sample_rate.to_string(),
        });
    }

    Ok(sample_rate)
}

fn parse_sample_rate(path: &Path, stdout: &str) -> AudioResult<u32> {
    let value = stdout.lines().next().unwrap_or("").trim();
    match value.parse::<u32>() {
        Ok(rate) if rate > 0 => Ok(rate),
        _ => Err(AudioError::InvalidSampleRate {
            path: path.to_path_buf(),
            value: value.to_string(),
        }),
    }
}

/// Returns the CUE sheet stored in the `CUESHEET` Vorbis comment of a FLAC file.
pub async fn read_embedded_cue_sheet(path: &Path) -> AudioResult<Option<String>> {
    let owned = path.to_path_buf();
    let sheet = tokio::task::spawn_blocking(move || -> AudioResult<Option<String>> {
        let reader = claxon::FlacReader::open(&owned)?;
        Ok(reader.get_tag(CUESHEET_TAG).next().map(str::to_string))
    })
    .await??;

    Ok(sheet)
}
