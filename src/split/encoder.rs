use crate::split::ExtractionJob;
use crate::split::error::{SplitError, SplitResult};
use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Turns one [`ExtractionJob`] into one output file.
pub trait Encoder: Send + Sync {
    fn extract<'a>(&'a self, job: &'a ExtractionJob) -> BoxFuture<'a, SplitResult<()>>;
}

/// Runs one `ffmpeg` process per job.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl Encoder for FfmpegEncoder {
    fn extract<'a>(&'a self, job: &'a ExtractionJob) -> BoxFuture<'a, SplitResult<()>> {
        async move {
            debug!("Running {:?} {:?}", self.ffmpeg, job.args);

            let output = Command::new(&self.ffmpeg)
                .args(&job.args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| SplitError::EncoderSpawn {
                    path: job.output_path.clone(),
                    source,
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(SplitError::EncoderFailed {
                    path: job.output_path.clone(),
                    status: output.status,
                    message: last_line(&stderr).to_string(),
                });
            }

            Ok(())
        }
        .boxed()
    }
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("unknown error")
}
