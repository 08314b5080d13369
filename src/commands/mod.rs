use crate::config::OutputFormat;
use crate::split::naming::DEFAULT_NAME_TEMPLATE;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// CLI for splitting CUE sheet backed audio images into one file per track.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CUE sheets, audio files or directories to scan, defaults to the current directory
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Output directory
    #[arg(long, short = 'o', value_name = "OUTPUT_DIR", default_value = ".")]
    pub output: PathBuf,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Flac)]
    pub format: OutputFormat,

    /// Print the resolved track files without extracting anything
    #[arg(long, short = 'd', default_value_t = false)]
    pub dry_run: bool,

    /// Only print errors
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,

    /// Dump all inputs as JSON once done
    #[arg(long = "json", short = 'j', default_value_t = false)]
    pub json_dump: bool,

    #[arg(
        long = "name",
        short = 'n',
        value_name = "TEMPLATE",
        default_value = DEFAULT_NAME_TEMPLATE,
        help = "file naming template, fields: {artist} {album} {date} {genre} {title} {number} {disc} {performer} {composer}, [...] is dropped if one of its fields is empty"
    )]
    pub name_template: String,

    /// Add an argument to ffmpeg, can be repeated
    #[arg(long = "arg-ffmpeg", value_name = "ARG", allow_hyphen_values = true)]
    pub ffmpeg_args: Vec<String>,

    /// Extract specific track(s), e.g. "-t 1 -t 2"
    #[arg(long = "track", short = 't', value_name = "NUMBER")]
    pub tracks: Vec<u32>,

    /// Number of tracks extracted in parallel, defaults to the number of CPUs
    #[arg(long, short = 'J', value_name = "JOBS")]
    pub jobs: Option<NonZeroUsize>,

    /// ffmpeg executable used to extract tracks
    #[arg(long, env = "CUESPLIT_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// ffprobe executable used to read sample rates of non FLAC files
    #[arg(long, env = "CUESPLIT_FFPROBE", default_value = "ffprobe")]
    pub ffprobe: PathBuf,
}
