// ffkit-core/src/params/convert.rs
//
// Parameter table for full conversions, plus typed helpers on ConvertParams.

use super::{Param, ParamValue, ParameterSet, SeekTime, UseCase};
use crate::error::CoreResult;
use crate::filters::FilterExpr;

/// Use-case marker for video conversions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Convert;

/// Parameters of a conversion.
pub type ConvertParams = ParameterSet<Convert>;

const CONVERT_PATTERNS: &[(Param, &str)] = &[
    (Param::OutputFormat, "-f {}"),
    (Param::VideoCodec, "-c:v {}"),
    (Param::AudioCodec, "-c:a {}"),
    (Param::VideoBitrate, "-b:v {}"),
    (Param::VideoMinBitrate, "-minrate {}"),
    (Param::VideoMaxBitrate, "-maxrate {}"),
    (Param::AudioBitrate, "-b:a {}"),
    (Param::Crf, "-crf {}"),
    (Param::PixFmt, "-pix_fmt {}"),
    (Param::Preset, "-preset {}"),
    (Param::Tune, "-tune {}"),
    (Param::Streamable, "-movflags +faststart"),
    (Param::VideoQualityScale, "-qscale:v {}"),
    (Param::Threads, "-threads {}"),
    (Param::Speed, "-speed {}"),
    (Param::KeyframeSpacing, "-g {}"),
    (Param::TileColumns, "-tile-columns {}"),
    (Param::FrameParallel, "-frame-parallel {}"),
    (Param::AutoAltRef, "-auto-alt-ref {}"),
    (Param::LagInFrames, "-lag-in-frames {}"),
    (Param::Pass, "-pass {}"),
    (Param::PassLogFile, "-passlogfile {}"),
    (Param::SeekStart, "-ss {}"),
    (Param::SeekEnd, "-to {}"),
    (Param::NoAudio, "-an"),
    (Param::VideoFilter, "-filter:v {}"),
    (Param::Overwrite, "-y"),
    (Param::VideoFrames, "-frames:v {}"),
];

impl UseCase for Convert {
    const NAME: &'static str = "convert";

    fn patterns() -> &'static [(Param, &'static str)] {
        CONVERT_PATTERNS
    }

    fn defaults() -> Vec<(Param, ParamValue)> {
        vec![(Param::Overwrite, ParamValue::Bool(true))]
    }
}

impl ParameterSet<Convert> {
    pub fn with_output_format(&self, format: impl Into<String>) -> Self {
        self.with_registered(Param::OutputFormat, format.into())
    }

    pub fn with_video_codec(&self, codec: impl Into<String>) -> Self {
        self.with_registered(Param::VideoCodec, codec.into())
    }

    pub fn with_audio_codec(&self, codec: impl Into<String>) -> Self {
        self.with_registered(Param::AudioCodec, codec.into())
    }

    /// Sets `-b:v`. Fails with `InvalidBitrate` for literals such as `12MK`.
    pub fn with_video_bitrate(&self, bitrate: impl Into<String>) -> CoreResult<Self> {
        self.with(Param::VideoBitrate, bitrate.into())
    }

    pub fn with_video_min_bitrate(&self, bitrate: impl Into<String>) -> CoreResult<Self> {
        self.with(Param::VideoMinBitrate, bitrate.into())
    }

    pub fn with_video_max_bitrate(&self, bitrate: impl Into<String>) -> CoreResult<Self> {
        self.with(Param::VideoMaxBitrate, bitrate.into())
    }

    pub fn with_audio_bitrate(&self, bitrate: impl Into<String>) -> CoreResult<Self> {
        self.with(Param::AudioBitrate, bitrate.into())
    }

    pub fn with_crf(&self, crf: u32) -> Self {
        self.with_registered(Param::Crf, crf)
    }

    pub fn with_pix_fmt(&self, pix_fmt: impl Into<String>) -> Self {
        self.with_registered(Param::PixFmt, pix_fmt.into())
    }

    pub fn with_preset(&self, preset: impl Into<String>) -> Self {
        self.with_registered(Param::Preset, preset.into())
    }

    pub fn with_tune(&self, tune: impl Into<String>) -> Self {
        self.with_registered(Param::Tune, tune.into())
    }

    /// Moves the moov atom to the front so playback can start before the
    /// download completes.
    pub fn with_streamable(&self, enabled: bool) -> Self {
        self.with_registered(Param::Streamable, enabled)
    }

    pub fn with_video_quality_scale(&self, scale: u32) -> Self {
        self.with_registered(Param::VideoQualityScale, scale)
    }

    pub fn with_threads(&self, threads: usize) -> Self {
        self.with_registered(Param::Threads, threads)
    }

    pub fn with_speed(&self, speed: i32) -> Self {
        self.with_registered(Param::Speed, speed)
    }

    pub fn with_keyframe_spacing(&self, frames: u32) -> Self {
        self.with_registered(Param::KeyframeSpacing, frames)
    }

    pub fn with_tile_columns(&self, columns: u32) -> Self {
        self.with_registered(Param::TileColumns, columns)
    }

    pub fn with_frame_parallel(&self, value: u32) -> Self {
        self.with_registered(Param::FrameParallel, value)
    }

    pub fn with_auto_alt_ref(&self, value: u32) -> Self {
        self.with_registered(Param::AutoAltRef, value)
    }

    pub fn with_lag_in_frames(&self, frames: u32) -> Self {
        self.with_registered(Param::LagInFrames, frames)
    }

    pub fn with_pass(&self, pass: u32) -> Self {
        self.with_registered(Param::Pass, pass)
    }

    pub fn with_pass_log_file(&self, prefix: impl Into<String>) -> Self {
        self.with_registered(Param::PassLogFile, prefix.into())
    }

    pub fn with_seek_start(&self, start: SeekTime) -> Self {
        self.with_registered(Param::SeekStart, start)
    }

    pub fn with_seek_end(&self, end: SeekTime) -> Self {
        self.with_registered(Param::SeekEnd, end)
    }

    pub fn with_no_audio(&self, enabled: bool) -> Self {
        self.with_registered(Param::NoAudio, enabled)
    }

    pub fn with_video_filter(&self, filter: impl Into<FilterExpr>) -> Self {
        self.with_registered(Param::VideoFilter, filter.into())
    }

    pub fn with_overwrite(&self, enabled: bool) -> Self {
        self.with_registered(Param::Overwrite, enabled)
    }

    pub fn with_video_frames(&self, frames: u32) -> Self {
        self.with_registered(Param::VideoFrames, frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::YadifFilter;

    #[test]
    fn test_every_pattern_is_unique() {
        let mut params: Vec<Param> = CONVERT_PATTERNS.iter().map(|(p, _)| *p).collect();
        params.sort();
        params.dedup();
        assert_eq!(params.len(), CONVERT_PATTERNS.len());
        assert!(!Convert::supports(Param::SeekTime));
    }

    #[test]
    fn test_typed_helpers_store_values() {
        let params = ConvertParams::new()
            .with_video_codec("libx264")
            .with_crf(20)
            .with_threads(4)
            .with_seek_start(SeekTime::from_millis(12_234))
            .with_video_filter(YadifFilter::default())
            .with_video_bitrate("750k")
            .unwrap();

        assert_eq!(params.get(Param::VideoCodec).unwrap().as_text(), Some("libx264"));
        assert_eq!(params.get(Param::Crf).unwrap().as_int(), Some(20));
        assert_eq!(params.get(Param::SeekStart).unwrap().as_text(), Some("0:00:12.234"));
        assert_eq!(
            params.get(Param::VideoFilter).unwrap().as_filter().map(FilterExpr::render),
            Some("yadif=mode=0:parity=-1:deint=0".to_string())
        );
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_bitrate_helpers_validate() {
        assert!(ConvertParams::new().with_audio_bitrate("128k").is_ok());
        assert!(ConvertParams::new().with_video_max_bitrate("901w").is_err());
    }
}
