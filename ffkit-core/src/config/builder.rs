// ============================================================================
// ffkit-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ToolConfig
//
// Provides a fluent API for creating ToolConfig instances, starting from the
// ffmpeg or ffprobe defaults and overriding individual settings.

use std::path::PathBuf;
use std::time::Duration;

use super::ToolConfig;
use crate::external::process::EnvValue;

/// Builder for creating ToolConfig instances.
///
/// # Examples
///
/// ```rust
/// use ffkit_core::config::{BinaryConfig, ToolConfigBuilder};
/// use std::time::Duration;
///
/// let config = ToolConfigBuilder::ffmpeg()
///     .binary("/opt/ffmpeg/bin/ffmpeg")
///     .threads(4)
///     .timeout(Duration::from_secs(3600))
///     .env("TMPDIR", "/var/tmp")
///     .build();
///
/// assert_eq!(config.default_threads(), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    /// Starts from the ffmpeg defaults.
    pub fn ffmpeg() -> Self {
        Self {
            config: ToolConfig::ffmpeg(),
        }
    }

    /// Starts from the ffprobe defaults.
    pub fn ffprobe() -> Self {
        Self {
            config: ToolConfig::ffprobe(),
        }
    }

    /// Sets the binary path.
    ///
    /// # Arguments
    ///
    /// * `binary` - Absolute path, or a bare name resolved through `PATH`
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.config.binary = binary.into();
        self
    }

    /// Sets the default thread count for conversions.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    /// Uses one thread per logical processor.
    pub fn threads_auto(mut self) -> Self {
        self.config.threads = Some(num_cpus::get());
        self
    }

    /// Sets the wall-clock timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Removes any wall-clock timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Sets the idle timeout.
    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.config.idle_timeout = Some(idle_timeout);
        self
    }

    /// Removes any idle timeout.
    pub fn no_idle_timeout(mut self) -> Self {
        self.config.idle_timeout = None;
        self
    }

    /// Adds an environment variable for spawned processes.
    pub fn env(mut self, name: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        self.config.env.insert(name.into(), value.into());
        self
    }

    /// Builds the ToolConfig instance.
    pub fn build(self) -> ToolConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BinaryConfig;

    #[test]
    fn test_builder_overrides() {
        let config = ToolConfigBuilder::ffprobe()
            .binary("/usr/local/bin/ffprobe")
            .no_timeout()
            .idle_timeout(Duration::from_secs(5))
            .env("AV_LOG_FORCE_NOCOLOR", 1)
            .build();

        assert_eq!(config.binary_path(), std::path::Path::new("/usr/local/bin/ffprobe"));
        assert_eq!(config.default_timeout(), None);
        assert_eq!(config.default_idle_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            config.default_env().get("AV_LOG_FORCE_NOCOLOR"),
            Some(&EnvValue::Int(1))
        );
    }

    #[test]
    fn test_threads_auto_uses_cpu_count() {
        let config = ToolConfigBuilder::ffmpeg().threads_auto().build();
        assert_eq!(config.default_threads(), Some(num_cpus::get()));
    }
}
