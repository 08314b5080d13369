use crate::config::SplitConfig;
use crate::release::boundary::SampleRange;
use crate::release::models::{AudioSource, Release, Track};
use crate::split::encoder::Encoder;
use crate::split::error::{SplitError, SplitResult};
use crate::split::tags::{Tag, ffmpeg_arguments, map_tags};
use futures::FutureExt;
use futures::future::BoxFuture;
use indicatif::ProgressBar;
use log::{debug, info};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tower::limit::ConcurrencyLimit;
use tower::{Service, ServiceBuilder, ServiceExt};

pub mod encoder;
pub mod error;
pub mod naming;
pub mod tags;

/// Everything needed to produce a single output track.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub source: PathBuf,
    pub track_number: u32,
    pub output_path: PathBuf,
    pub tags: Vec<Tag>,
    pub range: SampleRange,
    pub args: Vec<OsString>,
}

impl ExtractionJob {
    pub fn new(config: &SplitConfig, release: &Release, source: &AudioSource, track: &Track) -> Self {
        let output_path = config.name_template.render(
            &config.output_dir,
            release,
            track,
            config.format.extension(),
        );
        let tags = map_tags(config.format, release, track);
        let args = ffmpeg_arguments(config, source, track, &tags, &output_path);

        Self {
            source: source.path.clone(),
            track_number: track.number,
            output_path,
            tags,
            range: SampleRange {
                start: track.start_sample,
                end: track.end_sample,
            },
            args,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs one job through the encoder, answering with the finished output path.
#[derive(Clone)]
pub struct ExtractService {
    encoder: Arc<dyn Encoder>,
}

impl Service<ExtractionJob> for ExtractService {
    type Response = PathBuf;
    type Error = SplitError;
    type Future = BoxFuture<'static, SplitResult<PathBuf>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, job: ExtractionJob) -> Self::Future {
        let encoder = self.encoder.clone();
        async move {
            debug!(
                "Extracting track {} of {:?} tagged {}",
                job.track_number,
                job.source,
                job.tags.iter().map(Tag::to_string).collect::<Vec<_>>().join(", ")
            );

            encoder.extract(&job).await?;
            Ok(job.output_path)
        }
        .boxed()
    }
}

pub struct Splitter<'a> {
    config: &'a SplitConfig,
    pool: ConcurrencyLimit<ExtractService>,
    progress: ProgressBar,
}

impl<'a> Splitter<'a> {
    pub fn new(config: &'a SplitConfig, encoder: Arc<dyn Encoder>, progress: ProgressBar) -> Self {
        let pool = ServiceBuilder::new()
            .concurrency_limit(config.jobs.get())
            .service(ExtractService { encoder });

        Self {
            config,
            pool,
            progress,
        }
    }

    /// Jobs for every selected track of `release`, in sheet order.
    pub fn plan(&self, release: &Release) -> Vec<ExtractionJob> {
        release
            .tracks()
            .filter(|(_, track)| self.config.selects(track.number))
            .map(|(source, track)| ExtractionJob::new(self.config, release, source, track))
            .collect()
    }

    /// Extracts every selected track of `releases` and waits for all of them.
    ///
    /// A failed job hands its error to `first_error` if the channel has room
    /// and is dropped otherwise. Submission carries on regardless, so the
    /// receiver decides whether a failure ends the run.
    pub async fn dispatch(
        &self,
        releases: &[Release],
        first_error: mpsc::Sender<SplitError>,
    ) -> SplitResult<SplitReport> {
        let mut jobs = Vec::new();
        for release in releases {
            let planned = self.plan(release);
            debug!("Planned {} track(s) of {:?}", planned.len(), release.path);
            jobs.extend(planned);
        }

        // nothing is submitted until every destination exists
        prepare_directories(&jobs).await?;

        let mut tasks = JoinSet::new();
        for job in jobs {
            let mut pool = self.pool.clone();
            let call = pool.ready().await?.call(job);

            let progress = self.progress.clone();
            let first_error = first_error.clone();
            let quiet = self.config.quiet;

            tasks.spawn(async move {
                let outcome = call.await;
                progress.inc(1);

                match outcome {
                    Ok(path) => {
                        if !quiet {
                            progress.suspend(|| println!("{}", path.display()));
                        }
                        true
                    }
                    Err(err) => {
                        if let Err(dropped) = first_error.try_send(err) {
                            debug!("Dropping extraction error: {}", dropped.into_inner());
                        }
                        false
                    }
                }
            });
        }

        let mut report = SplitReport::default();
        while let Some(joined) = tasks.join_next().await {
            if joined? {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }

        if !self.config.quiet {
            info!(
                "Extracted {} track(s), {} failed",
                report.succeeded, report.failed
            );
        }

        Ok(report)
    }

    /// Prints what a real run would extract without touching the filesystem.
    pub fn dry_run(&self, releases: &[Release]) {
        if self.config.quiet {
            return;
        }

        for release in releases {
            let jobs = self.plan(release);
            for source in &release.audio {
                println!("{}", source.path.display());
                for job in jobs.iter().filter(|job| job.source == source.path) {
                    let last = job
                        .range
                        .end
                        .map_or_else(|| "-".to_string(), |end| end.to_string());
                    println!("{}\n\tfirst={} last={last}", job.output_path.display(), job.range.start);
                }
            }
        }
    }

    pub fn track_count(&self, releases: &[Release]) -> u64 {
        releases
            .iter()
            .flat_map(Release::tracks)
            .filter(|(_, track)| self.config.selects(track.number))
            .count() as u64
    }
}

/// Creates every distinct parent directory of `jobs`.
async fn prepare_directories(jobs: &[ExtractionJob]) -> SplitResult<()> {
    let directories: BTreeSet<PathBuf> = jobs
        .iter()
        .filter_map(|job| job.output_path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
        .collect();

    for path in directories {
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| SplitError::CreateDirectory { path, source })?;
    }

    Ok(())
}
