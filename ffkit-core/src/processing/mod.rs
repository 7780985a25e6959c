//! ffmpeg-backed processing services.
//!
//! Each service owns a binary config, a process runner and a file checker.
//! The checker runs first, so a missing input never starts a process.

/// Full transcodes and progress parsing
pub mod convert;

/// idet-based interlace detection service
pub mod detection;

/// Classification of idet statistics
pub mod interlace;

/// Single-frame extraction
pub mod thumbnail;

pub use convert::{VideoConverter, parse_progress_time};
pub use detection::{DEFAULT_IDET_FRAMES, InterlaceDetector};
pub use interlace::{
    DEFAULT_DETECTION_THRESHOLD, FrameCategory, InterlaceGuess, InterlaceSample,
    parse_idet_output,
};
pub use thumbnail::ThumbnailGenerator;
