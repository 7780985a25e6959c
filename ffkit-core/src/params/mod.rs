// ============================================================================
// ffkit-core/src/params/mod.rs
// ============================================================================
//
// PARAMETERS: Immutable, Validated Option Bags for ffmpeg Invocations
//
// A ParameterSet maps parameter names to values for one use-case. The
// use-case (convert, thumbnail) supplies the table of parameters it accepts,
// the ffmpeg pattern each one compiles to, and the defaults injected at
// compile time. Sets are immutable: `with`/`without` return new instances.
//
// KEY COMPONENTS:
// - Param: closed set of parameter names
// - ParamValue: Bool | Int | Text | Filter
// - UseCase: per-use-case registered key table
// - ParameterSet: the option bag itself

mod convert;
mod seek_time;
mod thumbnail;

use std::fmt;
use std::marker::PhantomData;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::filters::{FilterChain, FilterExpr};

pub use convert::{Convert, ConvertParams};
pub use seek_time::SeekTime;
pub use thumbnail::{Thumbnail, ThumbnailParams};

static BITRATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[0-9]+(k|M)?$").expect("valid bitrate regex"));

/// Every parameter name known to ffkit. Which of them a given set accepts is
/// decided by its [`UseCase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    OutputFormat,
    VideoCodec,
    AudioCodec,
    VideoBitrate,
    VideoMinBitrate,
    VideoMaxBitrate,
    AudioBitrate,
    Crf,
    PixFmt,
    Preset,
    Tune,
    Streamable,
    VideoQualityScale,
    Threads,
    Speed,
    KeyframeSpacing,
    TileColumns,
    FrameParallel,
    AutoAltRef,
    LagInFrames,
    Pass,
    PassLogFile,
    SeekStart,
    SeekEnd,
    SeekTime,
    NoAudio,
    VideoFilter,
    Overwrite,
    VideoFrames,
}

const PARAM_NAMES: &[(Param, &str)] = &[
    (Param::OutputFormat, "output_format"),
    (Param::VideoCodec, "video_codec"),
    (Param::AudioCodec, "audio_codec"),
    (Param::VideoBitrate, "video_bitrate"),
    (Param::VideoMinBitrate, "video_min_bitrate"),
    (Param::VideoMaxBitrate, "video_max_bitrate"),
    (Param::AudioBitrate, "audio_bitrate"),
    (Param::Crf, "crf"),
    (Param::PixFmt, "pix_fmt"),
    (Param::Preset, "preset"),
    (Param::Tune, "tune"),
    (Param::Streamable, "streamable"),
    (Param::VideoQualityScale, "video_quality_scale"),
    (Param::Threads, "threads"),
    (Param::Speed, "speed"),
    (Param::KeyframeSpacing, "keyframe_spacing"),
    (Param::TileColumns, "tile_columns"),
    (Param::FrameParallel, "frame_parallel"),
    (Param::AutoAltRef, "auto_alt_ref"),
    (Param::LagInFrames, "lag_in_frames"),
    (Param::Pass, "pass"),
    (Param::PassLogFile, "pass_log_file"),
    (Param::SeekStart, "seek_start"),
    (Param::SeekEnd, "seek_end"),
    (Param::SeekTime, "seek_time"),
    (Param::NoAudio, "no_audio"),
    (Param::VideoFilter, "video_filter"),
    (Param::Overwrite, "overwrite"),
    (Param::VideoFrames, "video_frames"),
];

impl Param {
    /// Snake-case name, as accepted by [`Param::from_name`].
    #[must_use]
    pub fn name(self) -> &'static str {
        PARAM_NAMES
            .iter()
            .find(|(param, _)| *param == self)
            .map_or("unknown", |(_, name)| name)
    }

    /// Looks up a parameter by its snake-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PARAM_NAMES
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(param, _)| *param)
    }

    fn is_bitrate(self) -> bool {
        matches!(
            self,
            Param::VideoBitrate | Param::VideoMinBitrate | Param::VideoMaxBitrate | Param::AudioBitrate
        )
    }

    fn is_seek(self) -> bool {
        matches!(self, Param::SeekStart | Param::SeekEnd | Param::SeekTime)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value attached to a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Filter(FilterExpr),
}

impl ParamValue {
    /// Short type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Text(_) => "text",
            ParamValue::Filter(_) => "filter",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_filter(&self) -> Option<&FilterExpr> {
        match self {
            ParamValue::Filter(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<SeekTime> for ParamValue {
    fn from(value: SeekTime) -> Self {
        ParamValue::Text(value.to_hms())
    }
}

impl From<FilterExpr> for ParamValue {
    fn from(value: FilterExpr) -> Self {
        ParamValue::Filter(value)
    }
}

impl From<FilterChain> for ParamValue {
    fn from(value: FilterChain) -> Self {
        ParamValue::Filter(FilterExpr::Chain(value))
    }
}

/// Registered key table of one use-case.
pub trait UseCase: fmt::Debug + Clone + Copy + Default + PartialEq + Send + Sync + 'static {
    /// Name used in error messages ("convert", "thumbnail").
    const NAME: &'static str;

    /// Accepted parameters and the ffmpeg pattern each compiles to. `{}` marks
    /// where the value goes; a pattern without `{}` is a flag toggled by a
    /// boolean.
    fn patterns() -> &'static [(Param, &'static str)];

    /// Values injected at compile time for parameters never set explicitly.
    fn defaults() -> Vec<(Param, ParamValue)>;

    #[must_use]
    fn pattern(param: Param) -> Option<&'static str> {
        Self::patterns()
            .iter()
            .find(|(candidate, _)| *candidate == param)
            .map(|(_, pattern)| *pattern)
    }

    #[must_use]
    fn supports(param: Param) -> bool {
        Self::pattern(param).is_some()
    }
}

/// Immutable, insertion-ordered parameter set for use-case `U`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet<U: UseCase> {
    entries: Vec<(Param, ParamValue)>,
    use_case: PhantomData<U>,
}

impl<U: UseCase> Default for ParameterSet<U> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            use_case: PhantomData,
        }
    }
}

impl<U: UseCase> ParameterSet<U> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `(param, value)` pairs, validating each one.
    pub fn from_entries<I, V>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (Param, V)>,
        V: Into<ParamValue>,
    {
        entries
            .into_iter()
            .try_fold(Self::new(), |set, (param, value)| set.with(param, value))
    }

    /// Returns a new set with `param` set to `value`. An existing value is
    /// replaced in place, keeping its position.
    ///
    /// # Errors
    ///
    /// * `UnsupportedParameter` if the use-case does not accept `param`
    /// * `InvalidBitrate` / `InvalidSeekTime` for malformed literals
    pub fn with(&self, param: Param, value: impl Into<ParamValue>) -> CoreResult<Self> {
        if !U::supports(param) {
            return Err(CoreError::UnsupportedParameter {
                param: param.name().to_string(),
                use_case: U::NAME,
            });
        }
        let value = value.into();
        validate_value(param, &value)?;

        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|(existing, _)| *existing == param) {
            Some(entry) => entry.1 = value,
            None => entries.push((param, value)),
        }
        Ok(Self {
            entries,
            use_case: PhantomData,
        })
    }

    /// Like [`ParameterSet::with`], resolving the parameter from its name.
    pub fn with_named(&self, name: &str, value: impl Into<ParamValue>) -> CoreResult<Self> {
        let param = Param::from_name(name).ok_or_else(|| CoreError::UnsupportedParameter {
            param: name.to_string(),
            use_case: U::NAME,
        })?;
        self.with(param, value)
    }

    /// Infallible insert for the typed helpers, whose parameters are known to
    /// be registered and need no literal validation.
    pub(crate) fn with_registered(&self, param: Param, value: impl Into<ParamValue>) -> Self {
        debug_assert!(U::supports(param), "{param} is not registered for {}", U::NAME);
        let value = value.into();
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|(existing, _)| *existing == param) {
            Some(entry) => entry.1 = value,
            None => entries.push((param, value)),
        }
        Self {
            entries,
            use_case: PhantomData,
        }
    }

    /// Returns a new set without `param`. Absent parameters are ignored.
    #[must_use]
    pub fn without(&self, param: Param) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(existing, _)| *existing != param)
                .cloned()
                .collect(),
            use_case: PhantomData,
        }
    }

    /// Returns a new set with every entry of `other` applied over this one.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        other
            .entries
            .iter()
            .fold(self.clone(), |set, (param, value)| {
                set.with_registered(*param, value.clone())
            })
    }

    /// Value of `param`.
    ///
    /// # Errors
    ///
    /// * `RequiredParameterMissing` if the parameter was never set
    pub fn get(&self, param: Param) -> CoreResult<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == param)
            .map(|(_, value)| value)
            .ok_or_else(|| CoreError::RequiredParameterMissing(param.name().to_string()))
    }

    /// Value of `param`, or `default` when it was never set.
    #[must_use]
    pub fn get_or(&self, param: Param, default: ParamValue) -> ParamValue {
        self.get(param).cloned().unwrap_or(default)
    }

    #[must_use]
    pub fn has(&self, param: Param) -> bool {
        self.entries.iter().any(|(existing, _)| *existing == param)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Param, &ParamValue)> {
        self.entries.iter().map(|(param, value)| (*param, value))
    }

    /// Returns a new set with every use-case default that was never set
    /// appended after the explicit entries.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        U::defaults()
            .into_iter()
            .fold(self.clone(), |set, (param, value)| {
                if set.has(param) {
                    set
                } else {
                    set.with_registered(param, value)
                }
            })
    }
}

fn validate_value(param: Param, value: &ParamValue) -> CoreResult<()> {
    if param.is_bitrate() {
        let ok = match value {
            ParamValue::Text(text) => BITRATE_RE.is_match(text),
            ParamValue::Int(number) => *number >= 0,
            _ => true,
        };
        if !ok {
            return Err(CoreError::InvalidBitrate {
                value: literal(value),
            });
        }
    }

    if param.is_seek() {
        let ok = match value {
            ParamValue::Text(text) => SeekTime::parse(text).is_ok(),
            ParamValue::Int(number) => *number >= 0,
            _ => true,
        };
        if !ok {
            return Err(CoreError::InvalidSeekTime {
                value: literal(value),
            });
        }
    }

    Ok(())
}

fn literal(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Text(t) => t.clone(),
        ParamValue::Filter(f) => f.render(),
    }
}

/// True when `text` is a valid bitrate literal (`750k`, `1M`, `2000000`).
#[must_use]
pub fn is_valid_bitrate(text: &str) -> bool {
    BITRATE_RE.is_match(text)
}
