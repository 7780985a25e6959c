use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Media stream types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Attachment,
    Data,
    #[default]
    Unknown,
}

impl From<&str> for StreamType {
    fn from(s: &str) -> Self {
        match s {
            "video" => StreamType::Video,
            "audio" => StreamType::Audio,
            "subtitle" => StreamType::Subtitle,
            "attachment" => StreamType::Attachment,
            "data" => StreamType::Data,
            _ => StreamType::Unknown,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamType::Video => write!(f, "Video"),
            StreamType::Audio => write!(f, "Audio"),
            StreamType::Subtitle => write!(f, "Subtitle"),
            StreamType::Attachment => write!(f, "Attachment"),
            StreamType::Data => write!(f, "Data"),
            StreamType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One stream as reported by `ffprobe -show_streams`.
///
/// ffprobe prints most numeric fields as JSON strings; every numeric field
/// here accepts either form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamInfo {
    pub index: usize,
    #[serde(deserialize_with = "stream_type")]
    pub codec_type: StreamType,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub profile: Option<String>,
    pub time_base: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub bit_rate: Option<u64>,
    #[serde(deserialize_with = "string_tags")]
    pub tags: BTreeMap<String, String>,

    // video
    #[serde(deserialize_with = "lenient_u64")]
    pub width: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub height: Option<u64>,
    pub pix_fmt: Option<String>,
    pub r_frame_rate: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub display_aspect_ratio: Option<String>,
    pub sample_aspect_ratio: Option<String>,
    pub field_order: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub nb_frames: Option<u64>,

    // audio
    #[serde(deserialize_with = "lenient_u64")]
    pub channels: Option<u64>,
    pub channel_layout: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub sample_rate: Option<u64>,
}

impl StreamInfo {
    /// Value of the `language` tag, if present.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.tags.get("language").map(String::as_str)
    }
}

/// Media format information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatInfo {
    pub filename: Option<String>,
    pub format_name: Option<String>,
    pub format_long_name: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub nb_streams: Option<u64>,
    /// Duration in seconds
    #[serde(deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    /// Size in bytes
    #[serde(deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
    /// Bitrate in bits per second
    #[serde(deserialize_with = "lenient_u64")]
    pub bit_rate: Option<u64>,
    #[serde(deserialize_with = "string_tags")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeDocument {
    streams: Vec<StreamInfo>,
    format: FormatInfo,
}

/// Typed view over a video stream.
#[derive(Debug, Clone, Copy)]
pub struct VideoStream<'a>(&'a StreamInfo);

impl VideoStream<'_> {
    #[must_use]
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        Some((self.0.width?, self.0.height?))
    }

    /// Average frame rate, falling back to the real base frame rate.
    #[must_use]
    pub fn frame_rate(&self) -> Option<f64> {
        self.0
            .avg_frame_rate
            .as_deref()
            .and_then(parse_rational)
            .or_else(|| self.0.r_frame_rate.as_deref().and_then(parse_rational))
    }
}

impl Deref for VideoStream<'_> {
    type Target = StreamInfo;

    fn deref(&self) -> &StreamInfo {
        self.0
    }
}

/// Typed view over an audio stream.
#[derive(Debug, Clone, Copy)]
pub struct AudioStream<'a>(&'a StreamInfo);

impl Deref for AudioStream<'_> {
    type Target = StreamInfo;

    fn deref(&self) -> &StreamInfo {
        self.0
    }
}

/// Typed view over a subtitle stream.
#[derive(Debug, Clone, Copy)]
pub struct SubtitleStream<'a>(&'a StreamInfo);

impl Deref for SubtitleStream<'_> {
    type Target = StreamInfo;

    fn deref(&self) -> &StreamInfo {
        self.0
    }
}

/// Parsed ffprobe output for one media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    format: FormatInfo,
    streams: Vec<StreamInfo>,
    raw: Value,
}

impl MediaInfo {
    /// Parses the JSON printed by
    /// `ffprobe -print_format json -show_format -show_streams`.
    ///
    /// # Returns
    ///
    /// * `Ok(MediaInfo)` - The parsed document
    /// * `Err(CoreError::JsonParse)` - Empty output, malformed JSON, or a
    ///   document that is not a JSON object
    pub fn from_json(json: &str) -> CoreResult<Self> {
        if json.trim().is_empty() {
            return Err(CoreError::JsonParse("ffprobe produced no output".to_string()));
        }
        let raw: Value =
            serde_json::from_str(json).map_err(|e| CoreError::JsonParse(e.to_string()))?;
        if !raw.is_object() {
            return Err(CoreError::JsonParse(format!(
                "expected a JSON object, got: {}",
                truncate(json, 80)
            )));
        }
        let document: ProbeDocument =
            serde_json::from_value(raw.clone()).map_err(|e| CoreError::JsonParse(e.to_string()))?;

        Ok(Self {
            format: document.format,
            streams: document.streams,
            raw,
        })
    }

    /// The raw JSON document.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    #[must_use]
    pub fn format(&self) -> &FormatInfo {
        &self.format
    }

    #[must_use]
    pub fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    /// Container duration in seconds, or the longest stream duration when the
    /// container does not report one.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.format.duration.or_else(|| {
            self.streams
                .iter()
                .filter_map(|s| s.duration)
                .reduce(f64::max)
        })
    }

    #[must_use]
    pub fn format_name(&self) -> Option<&str> {
        self.format.format_name.as_deref()
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.format.size
    }

    #[must_use]
    pub fn bit_rate(&self) -> Option<u64> {
        self.format.bit_rate
    }

    pub fn video_streams(&self) -> Vec<VideoStream<'_>> {
        self.of_type(StreamType::Video).map(VideoStream).collect()
    }

    pub fn audio_streams(&self) -> Vec<AudioStream<'_>> {
        self.of_type(StreamType::Audio).map(AudioStream).collect()
    }

    pub fn subtitle_streams(&self) -> Vec<SubtitleStream<'_>> {
        self.of_type(StreamType::Subtitle).map(SubtitleStream).collect()
    }

    /// First video stream
    #[must_use]
    pub fn primary_video_stream(&self) -> Option<VideoStream<'_>> {
        self.of_type(StreamType::Video).next().map(VideoStream)
    }

    #[must_use]
    pub fn width(&self) -> Option<u64> {
        self.primary_video_stream().and_then(|v| v.width)
    }

    #[must_use]
    pub fn height(&self) -> Option<u64> {
        self.primary_video_stream().and_then(|v| v.height)
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        self.primary_video_stream().and_then(|v| v.dimensions())
    }

    /// Frame count of the primary video stream. Containers that do not store
    /// `nb_frames` (Matroska, for one) get an estimate from duration and
    /// frame rate.
    #[must_use]
    pub fn frame_count(&self) -> Option<u64> {
        let video = self.primary_video_stream()?;
        if let Some(frames) = video.nb_frames {
            return Some(frames);
        }
        let duration = video.duration.or_else(|| self.duration())?;
        let fps = video.frame_rate()?;
        Some((duration * fps).round() as u64)
    }

    fn of_type(&self, kind: StreamType) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(move |s| s.codec_type == kind)
    }
}

/// Parses ffprobe rationals such as `30000/1001`; `0/0` yields None.
fn parse_rational(text: &str) -> Option<f64> {
    let (num, den) = match text.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (text.trim().parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

fn truncate(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

// --- Lenient field decoding ---

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64).filter(|v| v.is_finite()))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn stream_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StreamType, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(StreamType::from).unwrap_or_default())
}

fn string_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let tags = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(tags
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}
