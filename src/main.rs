use crate::audio::MediaProbe;
use crate::commands::Cli;
use crate::config::SplitConfig;
use crate::input::discover_inputs;
use crate::release::load_release;
use crate::split::Splitter;
use crate::split::encoder::FfmpegEncoder;
use anyhow::Result;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::error;
use std::sync::Arc;
use tokio::sync::mpsc;

mod audio;
mod commands;
mod config;
mod cue;
mod input;
mod release;
mod split;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();
    let config = SplitConfig::from_cli(&cli)?;
    let probe = MediaProbe::new(&cli.ffprobe);

    let mut releases = Vec::new();
    for source in discover_inputs(&cli.paths).await? {
        match load_release(&source, &probe).await {
            Ok(release) => releases.push(release),
            Err(err) => {
                error!("{}: {err}", source.path().display());
                std::process::exit(1);
            }
        }
    }

    let progress = if config.quiet || config.dry_run {
        ProgressBar::hidden()
    } else {
        pb.add(ProgressBar::new(0))
    };
    progress.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} tracks",
    )?);

    let encoder = Arc::new(FfmpegEncoder::new(&config.ffmpeg));
    let splitter = Splitter::new(&config, encoder, progress.clone());

    if config.dry_run {
        splitter.dry_run(&releases);
    } else {
        progress.set_length(splitter.track_count(&releases));

        let (first_error, mut failures) = mpsc::channel(1);
        let watcher = tokio::spawn(async move {
            if let Some(err) = failures.recv().await {
                error!("{err}");
                std::process::exit(1);
            }
        });

        splitter.dispatch(&releases, first_error).await?;
        progress.finish_and_clear();

        // all senders are gone by now, so this only returns without a failure
        watcher.await?;
    }

    if cli.json_dump {
        println!("{}", serde_json::to_string(&releases)?);
    }

    Ok(())
}
