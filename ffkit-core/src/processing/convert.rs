// ============================================================================
// ffkit-core/src/processing/convert.rs
// ============================================================================
//
// VIDEO CONVERSION: Full ffmpeg Transcodes
//
// VideoConverter checks the input, compiles ConvertParams (injecting the
// configured default thread count when the caller did not set one) and runs
// ffmpeg under the per-call or default process configuration.

use std::path::Path;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::BinaryConfig;
use crate::error::CoreResult;
use crate::external::{
    CommandCompiler, CommandSpec, ErrorTranslator, FileChecker, FsFileChecker, OutputCallback,
    ProcessConfig, ProcessOutput, ProcessRunner, SystemRunner, run_to_completion,
};
use crate::params::{ConvertParams, Param, SeekTime};

static PROGRESS_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=([0-9]+:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?)").expect("valid progress regex"));

/// Converts media files with ffmpeg.
#[derive(Debug, Clone)]
pub struct VideoConverter<C, R = SystemRunner, F = FsFileChecker> {
    config: C,
    runner: R,
    files: F,
}

impl<C: BinaryConfig> VideoConverter<C> {
    pub fn new(config: C) -> Self {
        Self::with_collaborators(config, SystemRunner, FsFileChecker)
    }
}

impl<C: BinaryConfig, R: ProcessRunner, F: FileChecker> VideoConverter<C, R, F> {
    pub fn with_collaborators(config: C, runner: R, files: F) -> Self {
        Self {
            config,
            runner,
            files,
        }
    }

    /// Parameters actually compiled for a call: `params` plus the configured
    /// default thread count when `params` has none.
    pub fn effective_params(&self, params: &ConvertParams) -> ConvertParams {
        match self.config.default_threads() {
            Some(threads) if !params.has(Param::Threads) => params.with_threads(threads),
            _ => params.clone(),
        }
    }

    /// Compiles the conversion command without running it.
    pub fn command(
        &self,
        input: &Path,
        output: &Path,
        params: &ConvertParams,
    ) -> CoreResult<CommandSpec> {
        CommandCompiler::new(self.config.binary_path()).compile(
            &self.effective_params(params),
            Some(input),
            output,
        )
    }

    /// Converts `input` into `output`.
    ///
    /// # Arguments
    ///
    /// * `input` - Source file, which must be readable
    /// * `output` - Destination path
    /// * `params` - Conversion parameters
    /// * `config` - Per-call process configuration, or `None` for the defaults
    ///   of the binary config
    /// * `on_output` - Receives ffmpeg's output as it is produced
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessOutput)` - Captured output of the successful run
    /// * `Err(CoreError)` - Missing input, compile error or process failure
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        params: &ConvertParams,
        config: Option<&ProcessConfig>,
        on_output: Option<OutputCallback<'_>>,
    ) -> CoreResult<ProcessOutput> {
        let translator = ErrorTranslator;
        translator.check_input(&self.files, input)?;

        let command = self
            .command(input, output, params)
            .inspect_err(|err| translator.report(err))?;
        let default_config;
        let config = match config {
            Some(config) => config,
            None => {
                default_config = self.config.process_config();
                &default_config
            }
        };

        info!("Converting {} -> {}", input.display(), output.display());
        let result = run_to_completion(&self.runner, &command, config, on_output)?;
        debug!("Conversion finished in {:.2}s", result.elapsed.as_secs_f64());
        Ok(result)
    }
}

/// Latest `time=` position in a chunk of ffmpeg progress output.
///
/// ffmpeg separates progress updates with `\r`, so one chunk can hold several
/// of them; the last one wins. `time=N/A` yields `None`.
#[must_use]
pub fn parse_progress_time(chunk: &str) -> Option<SeekTime> {
    PROGRESS_TIME_RE
        .captures_iter(chunk)
        .last()
        .and_then(|caps| SeekTime::parse(&caps[1]).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ToolConfig, ToolConfigBuilder};
    use crate::error::CoreError;
    use crate::external::mocks::{SpyRunner, StaticFileChecker};
    use std::time::Duration;

    type TestConverter = VideoConverter<ToolConfig, SpyRunner, StaticFileChecker>;

    fn converter(runner: &SpyRunner, threads: Option<usize>) -> TestConverter {
        let mut builder = ToolConfigBuilder::ffmpeg().binary("ffmpeg");
        if let Some(threads) = threads {
            builder = builder.threads(threads);
        }
        VideoConverter::with_collaborators(
            builder.build(),
            runner.clone(),
            StaticFileChecker::allow_all(),
        )
    }

    #[test]
    fn test_injects_default_threads_when_unset() {
        let runner = SpyRunner::new();
        runner.push_success("", "");
        let converter = converter(&runner, Some(4));

        let params = ConvertParams::new().with_video_codec("libx264");
        converter
            .convert(Path::new("in.mp4"), Path::new("out.mp4"), &params, None, None)
            .unwrap();

        assert_eq!(
            runner.last_call().unwrap().command_line,
            "ffmpeg -i in.mp4 -c:v libx264 -threads 4 -y out.mp4"
        );
    }

    #[test]
    fn test_explicit_threads_win() {
        let converter = converter(&SpyRunner::new(), Some(4));
        let params = ConvertParams::new().with_threads(2);
        let command = converter
            .command(Path::new("in.mp4"), Path::new("out.mp4"), &params)
            .unwrap();
        assert_eq!(command.command_line(), "ffmpeg -i in.mp4 -threads 2 -y out.mp4");
    }

    #[test]
    fn test_per_call_config_overrides_defaults() {
        let runner = SpyRunner::new();
        runner.push_success("", "");
        let converter = converter(&runner, None);

        let config = ProcessConfig::new().with_timeout(Duration::from_secs(5));
        converter
            .convert(
                Path::new("in.mp4"),
                Path::new("out.webm"),
                &ConvertParams::new(),
                Some(&config),
                None,
            )
            .unwrap();

        assert_eq!(runner.last_call().unwrap().config, config);
    }

    #[test]
    fn test_compile_error_never_spawns() {
        let runner = SpyRunner::new();
        let converter = converter(&runner, None);
        let err = converter
            .convert(Path::new("in.mp4"), Path::new("in.mp4"), &ConvertParams::new(), None, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandBuild(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_parse_progress_time() {
        let chunk = "frame=  50 fps=25 time=00:00:02.00 bitrate=N/A\rframe= 100 fps=25 time=00:00:04.04 speed=1x";
        assert_eq!(parse_progress_time(chunk), Some(SeekTime::from_millis(4_040)));
        assert_eq!(parse_progress_time("size=N/A time=N/A bitrate=N/A"), None);
        assert_eq!(parse_progress_time(""), None);
    }
}
