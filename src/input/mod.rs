use crate::audio::{is_flac, read_embedded_cue_sheet};
use crate::cue::CueParser;
use crate::input::error::{InputError, InputResult};
use async_recursion::async_recursion;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod error;

/// Where the CUE sheet of a release comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueSource {
    /// A standalone `.cue` file.
    Sheet(PathBuf),
    /// A sheet stored inside the audio file it describes.
    Embedded { audio_path: PathBuf, text: String },
}

impl CueSource {
    pub fn path(&self) -> &Path {
        match self {
            CueSource::Sheet(path) => path,
            CueSource::Embedded { audio_path, .. } => audio_path,
        }
    }
}

/// Turns the paths given on the command line into CUE sources.
///
/// Directories are scanned recursively, an empty list stands for the current
/// directory.
pub async fn discover_inputs(paths: &[PathBuf]) -> InputResult<Vec<CueSource>> {
    let default_paths = [PathBuf::from(".")];
    let paths = if paths.is_empty() {
        &default_paths[..]
    } else {
        paths
    };

    let mut sources = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path).await?;
        if metadata.is_dir() {
            sources.append(&mut scan_dir(path).await?);
        } else {
            let source = source_for_file(path)
                .await?
                .ok_or_else(|| InputError::NoCueSheetFound(path.clone()))?;
            sources.push(source);
        }
    }

    if sources.is_empty() {
        return Err(InputError::NoInputFound);
    }

    Ok(sources)
}

#[async_recursion]
async fn scan_dir(dir_path: &Path) -> InputResult<Vec<CueSource>> {
    let mut dir = fs::read_dir(dir_path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();

    let referenced = referenced_audio(&entries).await;

    let mut sources = Vec::new();
    for path in entries {
        if path.is_dir() {
            sources.append(&mut scan_dir(&path).await?);
        } else if is_cue(&path) {
            sources.push(CueSource::Sheet(path));
        } else if is_flac(&path) {
            if referenced.contains(&path) || fs::try_exists(path.with_extension("cue")).await? {
                continue;
            }

            match embedded_source(&path).await {
                Ok(Some(source)) => sources.push(source),
                Ok(None) => debug!("Ignoring {path:?}, it has no CUE sheet"),
                Err(err) => warn!("Skipping {err}"),
            }
        }
    }

    Ok(sources)
}

/// Audio files named by the FILE entries of the CUE sheets among `entries`.
async fn referenced_audio(entries: &[PathBuf]) -> HashSet<PathBuf> {
    let mut referenced = HashSet::new();

    for path in entries.iter().filter(|path| is_cue(path)) {
        let base_dir = path.parent().unwrap_or(Path::new("."));
        match CueParser::new(path).parse().await {
            Ok(sheet) => {
                referenced.extend(sheet.files.iter().map(|file| base_dir.join(&file.name)));
            }
            // reported once the sheet itself is loaded
            Err(err) => debug!("Could not read FILE entries of {path:?}: {err}"),
        }
    }

    referenced
}

async fn source_for_file(path: &Path) -> InputResult<Option<CueSource>> {
    if is_cue(path) {
        return Ok(Some(CueSource::Sheet(path.to_path_buf())));
    }

    let external = path.with_extension("cue");
    if fs::try_exists(&external).await? {
        return Ok(Some(CueSource::Sheet(external)));
    }

    if is_flac(path) {
        return embedded_source(path).await;
    }

    Ok(None)
}

async fn embedded_source(path: &Path) -> InputResult<Option<CueSource>> {
    let text = read_embedded_cue_sheet(path)
        .await
        .map_err(|source| InputError::EmbeddedSheet {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(text.map(|text| CueSource::Embedded {
        audio_path: path.to_path_buf(),
        text,
    }))
}

fn is_cue(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cue"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, create_dir_all};

    #[tokio::test]
    async fn scans_directories_recursively_for_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("artist").join("album");
        create_dir_all(&nested).unwrap();
        File::create(dir.path().join("single.CUE")).unwrap();
        File::create(nested.join("album.cue")).unwrap();
        File::create(nested.join("album.flac")).unwrap();
        File::create(nested.join("cover.jpg")).unwrap();

        let sources = discover_inputs(&[dir.path().to_path_buf()]).await.unwrap();

        assert_eq!(
            sources,
            vec![
                CueSource::Sheet(nested.join("album.cue")),
                CueSource::Sheet(dir.path().join("single.CUE")),
            ]
        );
    }

    #[tokio::test]
    async fn audio_file_uses_sibling_sheet() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("album.cue")).unwrap();
        let audio = dir.path().join("album.wav");
        File::create(&audio).unwrap();

        let sources = discover_inputs(&[audio]).await.unwrap();
        assert_eq!(sources, vec![CueSource::Sheet(dir.path().join("album.cue"))]);
    }

    #[tokio::test]
    async fn audio_file_without_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("album.wav");
        File::create(&audio).unwrap();

        let err = discover_inputs(&[audio.clone()]).await.unwrap_err();
        assert!(matches!(err, InputError::NoCueSheetFound(path) if path == audio));
    }

    #[tokio::test]
    async fn empty_directory_yields_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_inputs(&[dir.path().to_path_buf()]).await.unwrap_err();
        assert!(matches!(err, InputError::NoInputFound));
    }

    #[tokio::test]
    async fn missing_path_is_an_io_error() {
        let err = discover_inputs(&[PathBuf::from("/definitely/not/here")])
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::IoError(_)));
    }

    const SHEET: &str = "PERFORMER \"Band\"\nTITLE \"Album\"\nFILE \"CDImage.flac\" WAVE\n  TRACK 01 AUDIO\n    INDEX 01 00:00:00\n";

    /// Metadata-only FLAC stream, 44.1 kHz stereo 16 bit, carrying `tags` as Vorbis comments.
    fn flac_with_tags(tags: &[&str]) -> Vec<u8> {
        let mut flac = b"fLaC".to_vec();

        flac.extend_from_slice(&[0x00, 0x00, 0x00, 34]);
        flac.extend_from_slice(&4096u16.to_be_bytes());
        flac.extend_from_slice(&4096u16.to_be_bytes());
        flac.extend_from_slice(&[0; 6]);
        let packed = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36);
        flac.extend_from_slice(&packed.to_be_bytes());
        flac.extend_from_slice(&[0; 16]);

        let vendor = b"cuesplit";
        let mut comments = Vec::new();
        comments.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        comments.extend_from_slice(vendor);
        comments.extend_from_slice(&(tags.len() as u32).to_le_bytes());
        for tag in tags {
            comments.extend_from_slice(&(tag.len() as u32).to_le_bytes());
            comments.extend_from_slice(tag.as_bytes());
        }

        flac.push(0x80 | 4);
        flac.extend_from_slice(&(comments.len() as u32).to_be_bytes()[1..]);
        flac.extend_from_slice(&comments);
        flac
    }

    #[tokio::test]
    async fn lone_flac_with_embedded_sheet_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("CDImage.flac");
        std::fs::write(&audio, flac_with_tags(&[&format!("CUESHEET={SHEET}")])).unwrap();

        let sources = discover_inputs(&[dir.path().to_path_buf()]).await.unwrap();
        assert_eq!(
            sources,
            vec![CueSource::Embedded {
                audio_path: audio,
                text: SHEET.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn flac_named_by_a_sheet_is_not_scanned_again() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Album.cue"), SHEET).unwrap();
        std::fs::write(
            dir.path().join("CDImage.flac"),
            flac_with_tags(&[&format!("CUESHEET={SHEET}")]),
        )
        .unwrap();

        let sources = discover_inputs(&[dir.path().to_path_buf()]).await.unwrap();
        assert_eq!(sources, vec![CueSource::Sheet(dir.path().join("Album.cue"))]);
    }

    #[tokio::test]
    async fn unreadable_flac_is_skipped_while_scanning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Album.cue"), SHEET).unwrap();
        std::fs::write(dir.path().join("partial-download.flac"), b"truncated").unwrap();

        let sources = discover_inputs(&[dir.path().to_path_buf()]).await.unwrap();
        assert_eq!(sources, vec![CueSource::Sheet(dir.path().join("Album.cue"))]);
    }

    #[tokio::test]
    async fn unreadable_flac_given_explicitly_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("partial-download.flac");
        std::fs::write(&audio, b"truncated").unwrap();

        let err = discover_inputs(&[audio.clone()]).await.unwrap_err();
        assert!(matches!(err, InputError::EmbeddedSheet { path, .. } if path == audio));
    }
}
