use crate::commands::Cli;
use crate::split::error::SplitResult;
use crate::split::naming::NameTemplate;
use clap::ValueEnum;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Flac,
    Ogg,
    Mp3,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Flac => "flac",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

/// Settings of one run, built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub dry_run: bool,
    pub quiet: bool,
    pub name_template: NameTemplate,
    /// Passed to ffmpeg after every built-in argument.
    pub extra_args: Vec<String>,
    /// Track numbers to extract, empty means all of them.
    pub tracks: Vec<u32>,
    pub jobs: NonZeroUsize,
    pub ffmpeg: PathBuf,
}

impl SplitConfig {
    pub fn from_cli(cli: &Cli) -> SplitResult<Self> {
        let jobs = cli.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
        });

        Ok(Self {
            output_dir: cli.output.clone(),
            format: cli.format,
            dry_run: cli.dry_run,
            quiet: cli.quiet,
            name_template: NameTemplate::parse(&cli.name_template)?,
            extra_args: cli.ffmpeg_args.clone(),
            tracks: cli.tracks.clone(),
            jobs,
            ffmpeg: cli.ffmpeg.clone(),
        })
    }

    pub fn selects(&self, track_number: u32) -> bool {
        self.tracks.is_empty() || self.tracks.contains(&track_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn builds_from_cli_defaults() {
        let cli = Cli::try_parse_from(["cuesplit", "album.cue"]).unwrap();
        let config = SplitConfig::from_cli(&cli).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.format, OutputFormat::Flac);
        assert!(!config.dry_run);
        assert!(!config.quiet);
        assert!(config.extra_args.is_empty());
        assert!(config.selects(1) && config.selects(42));
    }

    #[test]
    fn keeps_extra_args_in_order() {
        let cli = Cli::try_parse_from([
            "cuesplit",
            "-f",
            "mp3",
            "--arg-ffmpeg",
            "-threads",
            "--arg-ffmpeg",
            "2",
            "-t",
            "3",
            "-t",
            "5",
            "--jobs",
            "2",
        ])
        .unwrap();
        let config = SplitConfig::from_cli(&cli).unwrap();

        assert_eq!(config.format, OutputFormat::Mp3);
        assert_eq!(config.extra_args, vec!["-threads", "2"]);
        assert_eq!(config.jobs.get(), 2);
        assert!(config.selects(3));
        assert!(!config.selects(4));
    }

    #[test]
    fn rejects_invalid_name_template() {
        let cli = Cli::try_parse_from(["cuesplit", "-n", "{bogus}"]).unwrap();
        assert!(SplitConfig::from_cli(&cli).is_err());
    }
}
