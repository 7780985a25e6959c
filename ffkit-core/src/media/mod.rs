//! Media information and probing module
//!
//! This module runs ffprobe against media files and exposes the parsed
//! report as [`MediaInfo`], with typed views over video, audio and subtitle
//! streams.

pub mod info;
pub mod probe;

// Re-export commonly used types
pub use info::{AudioStream, FormatInfo, MediaInfo, StreamInfo, StreamType, SubtitleStream, VideoStream};
pub use probe::VideoProber;
