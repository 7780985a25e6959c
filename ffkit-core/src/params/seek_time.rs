//! Seek positions rendered in ffmpeg's `H:MM:SS.mmm` time syntax.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};

static HMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+):([0-5][0-9]):([0-5][0-9])(?:\.([0-9]+))?$")
        .expect("valid seek time regex")
});

/// A non-negative position in a media file, held to millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SeekTime {
    millis: u64,
}

impl SeekTime {
    /// Creates a seek time from fractional seconds, rounded to the nearest
    /// millisecond. Negative and non-finite values are rejected.
    pub fn from_seconds(seconds: f64) -> CoreResult<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(CoreError::InvalidSeekTime {
                value: seconds.to_string(),
            });
        }
        Ok(Self {
            millis: (seconds * 1000.0).round() as u64,
        })
    }

    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Parses `H:MM:SS` with an optional fractional part (`H:MM:SS.mmm`).
    /// Fraction digits beyond milliseconds are truncated.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidSeekTime {
            value: text.to_string(),
        };
        let caps = HMS_RE.captures(text.trim()).ok_or_else(invalid)?;

        let hours: u64 = caps[1].parse().map_err(|_| invalid())?;
        let minutes: u64 = caps[2].parse().map_err(|_| invalid())?;
        let seconds: u64 = caps[3].parse().map_err(|_| invalid())?;
        let fraction = caps.get(4).map_or("", |m| m.as_str());

        // ".5" is 500ms, ".05" is 50ms, ".2345" is 234ms
        let mut digits: String = fraction.chars().take(3).collect();
        while digits.len() < 3 {
            digits.push('0');
        }
        let millis: u64 = digits.parse().map_err(|_| invalid())?;

        let total = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .and_then(|s| s.checked_mul(1000))
            .and_then(|ms| ms.checked_add(millis))
            .ok_or_else(invalid)?;

        Ok(Self { millis: total })
    }

    #[must_use]
    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    #[must_use]
    pub fn as_seconds(&self) -> f64 {
        self.millis as f64 / 1000.0
    }

    /// Renders `H:MM:SS.mmm`: hours unpadded, minutes and seconds two digits,
    /// and the millisecond remainder written as a plain integer with no
    /// padding (`.234`, `.500`, `.0` for whole seconds, `.50` for 50ms).
    ///
    /// Remainders under 100ms do not survive [`SeekTime::parse`], which
    /// reads the fraction as a decimal.
    #[must_use]
    pub fn to_hms(&self) -> String {
        let total_secs = self.millis / 1000;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let secs = total_secs % 60;

        let millis = self.millis % 1000;

        format!("{hours}:{minutes:02}:{secs:02}.{millis}")
    }
}

impl fmt::Display for SeekTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hms())
    }
}

impl std::str::FromStr for SeekTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
