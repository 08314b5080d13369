use crate::audio::SampleRateProbe;
use crate::cue::{CueParser, parse_str};
use crate::input::CueSource;
use crate::release::error::{ReleaseError, ReleaseResult};
use crate::release::interpreter::{ProbedFile, build_release};
use crate::release::models::Release;
use log::debug;
use std::path::Path;

pub mod boundary;
pub mod error;
pub mod interpreter;
pub mod models;

/// Parses the sheet of `source`, probes every wave-like file it references and
/// builds the release with all track boundaries resolved.
pub async fn load_release(source: &CueSource, probe: &dyn SampleRateProbe) -> ReleaseResult<Release> {
    let sheet = match source {
        CueSource::Sheet(path) => {
            debug!("Parsing CUE file: {path:?}");
            CueParser::new(path).parse().await?
        }
        CueSource::Embedded { audio_path, text } => {
            debug!("Parsing CUE sheet embedded into {audio_path:?}");
            parse_str(text)?
        }
    };

    let base_dir = source.path().parent().unwrap_or(Path::new("."));

    let mut files = Vec::new();
    for file in &sheet.files {
        if !file.file_type.is_wave() {
            debug!("Skipping {} of type {:?}", file.name, file.file_type);
            continue;
        }

        // an embedded sheet always describes the file it lives in
        let path = match source {
            CueSource::Sheet(_) => base_dir.join(&file.name),
            CueSource::Embedded { audio_path, .. } => audio_path.clone(),
        };

        let sample_rate = probe
            .sample_rate(&path)
            .await
            .map_err(|source| ReleaseError::AudioFile {
                name: file.name.clone(),
                source,
            })?;

        files.push(ProbedFile {
            file,
            path,
            sample_rate,
        });
    }

    build_release(source.path(), &sheet, files)
}
