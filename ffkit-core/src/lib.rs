//! Typed wrapper library for driving ffmpeg and ffprobe.
//!
//! This crate compiles immutable, validated parameter sets into ffmpeg
//! command lines, runs them as supervised child processes with wall-clock
//! and idle timeouts, and turns the results into typed values: probe reports,
//! conversion output, thumbnails and interlace classifications.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ffkit_core::{
//!     ConvertParams, InterlaceDetector, ToolConfig, VideoConverter, VideoProber,
//! };
//! use std::path::Path;
//!
//! let input = Path::new("/path/to/input.mkv");
//!
//! let info = VideoProber::new(ToolConfig::ffprobe()).probe(input).unwrap();
//! println!("duration: {:?}", info.duration());
//!
//! let guess = InterlaceDetector::new(ToolConfig::ffmpeg())
//!     .guess_interlacing(input, 1000)
//!     .unwrap();
//!
//! let params = ConvertParams::new()
//!     .with_video_codec("libx264")
//!     .with_crf(20)
//!     .with_video_filter(guess.deinterlace_filter(None));
//! VideoConverter::new(ToolConfig::ffmpeg())
//!     .convert(input, Path::new("/path/to/output.mp4"), &params, None, None)
//!     .unwrap();
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod filters;
pub mod media;
pub mod params;
pub mod processing;

// Re-exports for public API
pub use config::{BinaryConfig, ToolConfig, ToolConfigBuilder};
pub use error::{CoreError, CoreResult, TimeoutKind};
pub use external::{
    CommandCompiler, CommandSpec, FileChecker, FsFileChecker, OutputSink, ProcessConfig,
    ProcessOutcome, ProcessOutput, ProcessRunner, SystemRunner,
};
pub use filters::{
    EmptyFilter, FilterChain, FilterExpr, Hqdn3dFilter, IdetFilter, NlmeansFilter, RawFilter,
    ScaleFilter, VideoFilter, YadifFilter,
};
pub use media::{MediaInfo, StreamInfo, StreamType, VideoProber};
pub use params::{
    Convert, ConvertParams, Param, ParamValue, ParameterSet, SeekTime, Thumbnail,
    ThumbnailParams, UseCase,
};
pub use processing::{
    FrameCategory, InterlaceDetector, InterlaceGuess, InterlaceSample, ThumbnailGenerator,
    VideoConverter, parse_progress_time,
};
