// ffkit-core/src/params/thumbnail.rs
//
// Parameter table for single-frame thumbnail extraction.

use super::{Param, ParamValue, ParameterSet, SeekTime, UseCase};
use crate::filters::FilterExpr;

/// Use-case marker for thumbnail extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thumbnail;

/// Parameters of a thumbnail extraction.
pub type ThumbnailParams = ParameterSet<Thumbnail>;

const THUMBNAIL_PATTERNS: &[(Param, &str)] = &[
    (Param::SeekTime, "-ss {}"),
    (Param::VideoFilter, "-filter:v {}"),
    (Param::VideoQualityScale, "-qscale:v {}"),
    (Param::OutputFormat, "-f {}"),
    (Param::Overwrite, "-y"),
    (Param::VideoFrames, "-frames:v {}"),
];

impl UseCase for Thumbnail {
    const NAME: &'static str = "thumbnail";

    fn patterns() -> &'static [(Param, &'static str)] {
        THUMBNAIL_PATTERNS
    }

    // a thumbnail is exactly one frame
    fn defaults() -> Vec<(Param, ParamValue)> {
        vec![
            (Param::Overwrite, ParamValue::Bool(true)),
            (Param::VideoFrames, ParamValue::Int(1)),
        ]
    }
}

impl ParameterSet<Thumbnail> {
    /// Position of the extracted frame.
    pub fn with_time(&self, time: SeekTime) -> Self {
        self.with_registered(Param::SeekTime, time)
    }

    pub fn with_video_filter(&self, filter: impl Into<FilterExpr>) -> Self {
        self.with_registered(Param::VideoFilter, filter.into())
    }

    /// JPEG quality, 2 (best) to 31 (worst).
    pub fn with_quality_scale(&self, scale: u32) -> Self {
        self.with_registered(Param::VideoQualityScale, scale)
    }

    pub fn with_output_format(&self, format: impl Into<String>) -> Self {
        self.with_registered(Param::OutputFormat, format.into())
    }

    pub fn with_overwrite(&self, enabled: bool) -> Self {
        self.with_registered(Param::Overwrite, enabled)
    }
}
