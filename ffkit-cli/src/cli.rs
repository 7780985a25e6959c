// ffkit-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ffkit_core::processing::{DEFAULT_DETECTION_THRESHOLD, DEFAULT_IDET_FRAMES};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "ffkit: ffmpeg toolkit",
    long_about = "Probes, converts, thumbnails and analyses video files using ffmpeg via ffkit-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write a debug-level log to this file
    #[arg(long, global = true, value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

/// Locations and process limits for the external binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the ffmpeg binary
    #[arg(long, global = true, value_name = "PATH", env = "FFKIT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true, value_name = "PATH", env = "FFKIT_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Wall-clock timeout in seconds for every process (0 disables it)
    #[arg(long, global = true, value_name = "SECS", env = "FFKIT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Seconds without any output before a process is killed (0 disables it)
    #[arg(long, global = true, value_name = "SECS", env = "FFKIT_IDLE_TIMEOUT")]
    pub idle_timeout: Option<u64>,

    /// ffmpeg thread count (0 uses every logical CPU)
    #[arg(long, global = true, value_name = "N", env = "FFKIT_THREADS")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prints container and stream information
    Probe(ProbeArgs),
    /// Converts a video with ffmpeg
    Convert(ConvertArgs),
    /// Extracts a single frame as an image
    Thumbnail(ThumbnailArgs),
    /// Detects whether a video is interlaced
    Interlace(InterlaceArgs),
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Files to probe
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Print the raw ffprobe JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Input file
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; the container follows its extension unless --format is set
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output container format (e.g. mp4, webm)
    #[arg(short = 'f', long)]
    pub format: Option<String>,

    // --- Video ---
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Constant rate factor
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u32).range(0..=63))]
    pub crf: Option<u32>,

    /// Target video bitrate (e.g. 750k, 2M)
    #[arg(long, value_name = "BITRATE")]
    pub video_bitrate: Option<String>,

    #[arg(long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Raw ffmpeg video filter expression
    #[arg(long, value_name = "FILTER")]
    pub filter: Option<String>,

    /// Run interlace detection first and deinterlace when needed
    #[arg(long)]
    pub deinterlace: bool,

    // --- Audio ---
    #[arg(long, value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Target audio bitrate (e.g. 128k)
    #[arg(long, value_name = "BITRATE")]
    pub audio_bitrate: Option<String>,

    /// Drop all audio streams
    #[arg(long)]
    pub no_audio: bool,

    // --- Range ---
    /// Start position, as seconds or H:MM:SS[.mmm]
    #[arg(long, value_name = "TIME")]
    pub seek_start: Option<String>,

    /// End position, as seconds or H:MM:SS[.mmm]
    #[arg(long, value_name = "TIME")]
    pub seek_end: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ThumbnailArgs {
    /// Input file
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Output image; the format follows its extension
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Position of the frame, as seconds or H:MM:SS[.mmm]
    #[arg(short, long, value_name = "TIME", default_value = "0")]
    pub time: String,

    /// JPEG quality scale (2 is best, 31 is worst)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub quality: Option<u32>,

    /// Scale to this width, keeping the aspect ratio
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<i32>,
}

#[derive(Parser, Debug)]
pub struct InterlaceArgs {
    /// Input file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Number of frames to analyse
    #[arg(long, default_value_t = DEFAULT_IDET_FRAMES)]
    pub frames: u32,

    /// Proportion of frames a category must reach to count as detected
    #[arg(long, default_value_t = DEFAULT_DETECTION_THRESHOLD)]
    pub threshold: f64,
}
