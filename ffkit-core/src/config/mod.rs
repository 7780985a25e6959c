//! Configuration for the external binaries driven by ffkit-core.
//!
//! The core never loads configuration itself. Callers hand a [`BinaryConfig`]
//! to each service; [`ToolConfig`] is the stock implementation, built through
//! [`ToolConfigBuilder`] or one of the `ffmpeg()` / `ffprobe()` defaults.

mod builder;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::external::process::{EnvValue, ProcessConfig};

pub use builder::ToolConfigBuilder;

// Default constants

/// Default wall-clock timeout for ffprobe runs, in seconds.
/// Probing reads container headers only and should never take long.
pub const DEFAULT_FFPROBE_TIMEOUT_SECS: u64 = 15;

/// Default wall-clock timeout for ffmpeg runs. Encodes can legitimately run
/// for hours, so none is applied unless the caller asks for one.
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: Option<u64> = None;

/// Default idle timeout for ffmpeg runs, in seconds. ffmpeg prints a progress
/// line at least every second while it is making progress.
pub const DEFAULT_FFMPEG_IDLE_TIMEOUT_SECS: u64 = 60;

/// Source of binary location and process defaults.
///
/// This is the narrow interface through which services read configuration;
/// any type providing these values can be passed in place of [`ToolConfig`].
pub trait BinaryConfig {
    /// Path (or bare name resolved through `PATH`) of the binary.
    fn binary_path(&self) -> &Path;

    /// Thread count injected into conversions that do not set one.
    fn default_threads(&self) -> Option<usize>;

    fn default_timeout(&self) -> Option<Duration>;

    fn default_idle_timeout(&self) -> Option<Duration>;

    /// Environment variables merged over the inherited environment.
    fn default_env(&self) -> &BTreeMap<String, EnvValue>;

    /// Process configuration built from the defaults above.
    fn process_config(&self) -> ProcessConfig {
        ProcessConfig {
            timeout: self.default_timeout(),
            idle_timeout: self.default_idle_timeout(),
            env: self.default_env().clone(),
        }
    }
}

/// Configuration for one external binary (ffmpeg or ffprobe).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    /// Binary to execute
    pub binary: PathBuf,

    /// Optional `-threads` value applied to conversions
    pub threads: Option<usize>,

    /// Wall-clock timeout applied when a call does not bring its own
    pub timeout: Option<Duration>,

    /// Idle timeout applied when a call does not bring its own
    pub idle_timeout: Option<Duration>,

    /// Extra environment for spawned processes
    pub env: BTreeMap<String, EnvValue>,
}

impl ToolConfig {
    /// Defaults for ffmpeg, located the way ffmpeg-sidecar locates it.
    #[must_use]
    pub fn ffmpeg() -> Self {
        Self {
            binary: ffmpeg_sidecar::paths::ffmpeg_path(),
            threads: None,
            timeout: DEFAULT_FFMPEG_TIMEOUT_SECS.map(Duration::from_secs),
            idle_timeout: Some(Duration::from_secs(DEFAULT_FFMPEG_IDLE_TIMEOUT_SECS)),
            env: BTreeMap::new(),
        }
    }

    /// Defaults for ffprobe, located the way ffmpeg-sidecar locates it.
    #[must_use]
    pub fn ffprobe() -> Self {
        Self {
            binary: ffmpeg_sidecar::ffprobe::ffprobe_path(),
            threads: None,
            timeout: Some(Duration::from_secs(DEFAULT_FFPROBE_TIMEOUT_SECS)),
            idle_timeout: None,
            env: BTreeMap::new(),
        }
    }
}

impl BinaryConfig for ToolConfig {
    fn binary_path(&self) -> &Path {
        &self.binary
    }

    fn default_threads(&self) -> Option<usize> {
        self.threads
    }

    fn default_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn default_idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    fn default_env(&self) -> &BTreeMap<String, EnvValue> {
        &self.env
    }
}
