use std::ffi::OsString;
use std::path::Path;

use log::debug;

use crate::config::BinaryConfig;
use crate::error::CoreResult;
use crate::external::{
    CommandSpec, ErrorTranslator, FileChecker, FsFileChecker, ProcessRunner, SystemRunner,
    run_to_completion,
};
use crate::media::info::MediaInfo;

/// Arguments placed before the input path.
pub const PROBE_ARGS: [&str; 6] = [
    "-v",
    "quiet",
    "-print_format",
    "json",
    "-show_format",
    "-show_streams",
];

/// Runs ffprobe and parses its JSON report.
#[derive(Debug, Clone)]
pub struct VideoProber<C, R = SystemRunner, F = FsFileChecker> {
    config: C,
    runner: R,
    files: F,
}

impl<C: BinaryConfig> VideoProber<C> {
    pub fn new(config: C) -> Self {
        Self::with_collaborators(config, SystemRunner, FsFileChecker)
    }
}

impl<C: BinaryConfig, R: ProcessRunner, F: FileChecker> VideoProber<C, R, F> {
    /// Creates a prober with explicit runner and file checker.
    pub fn with_collaborators(config: C, runner: R, files: F) -> Self {
        Self {
            config,
            runner,
            files,
        }
    }

    /// The probe command for `input`.
    pub fn command(&self, input: &Path) -> CommandSpec {
        let args = PROBE_ARGS
            .into_iter()
            .map(OsString::from)
            .chain(std::iter::once(input.as_os_str().to_owned()));
        CommandSpec::from_args(self.config.binary_path(), args).with_input(input)
    }

    /// Probes `input`.
    ///
    /// # Returns
    ///
    /// * `Ok(MediaInfo)` - Parsed format and stream information
    /// * `Err(CoreError::MissingInputFile)` - The input is not a readable file
    /// * `Err(CoreError::JsonParse)` - ffprobe printed empty or malformed JSON
    /// * Any process error from the run itself
    pub fn probe(&self, input: &Path) -> CoreResult<MediaInfo> {
        let translator = ErrorTranslator;
        translator.check_input(&self.files, input)?;

        let command = self.command(input);
        let output = run_to_completion(&self.runner, &command, &self.config.process_config(), None)?;
        debug!("ffprobe returned {} bytes for {}", output.stdout.len(), input.display());

        MediaInfo::from_json(&output.stdout).inspect_err(|err| translator.report(err))
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ToolConfig, ToolConfigBuilder};
    use crate::error::CoreError;
    use crate::external::mocks::{SpyRunner, StaticFileChecker};

    fn prober(
        runner: SpyRunner,
        checker: StaticFileChecker,
    ) -> VideoProber<ToolConfig, SpyRunner, StaticFileChecker> {
        let config = ToolConfigBuilder::ffprobe().binary("ffprobe").build();
        VideoProber::with_collaborators(config, runner, checker)
    }

    #[test]
    fn test_probe_command_shape() {
        let runner = SpyRunner::new();
        runner.push_success(r#"{"format":{"format_name":"mp4","duration":"1.5"}}"#, "");
        let prober = prober(runner.clone(), StaticFileChecker::allow_all());

        let info = prober.probe(Path::new("movie.mp4")).unwrap();
        assert_eq!(info.format_name(), Some("mp4"));
        assert_eq!(info.duration(), Some(1.5));

        let call = runner.last_call().unwrap();
        assert_eq!(
            call.command_line,
            "ffprobe -v quiet -print_format json -show_format -show_streams movie.mp4"
        );
        assert_eq!(call.config.timeout, prober.config.default_timeout());
    }

    #[test]
    fn test_missing_input_never_spawns() {
        let runner = SpyRunner::new();
        let prober = prober(runner.clone(), StaticFileChecker::new());

        let err = prober.probe(Path::new("missing.mp4")).unwrap_err();
        assert!(matches!(err, CoreError::MissingInputFile { .. }));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_empty_output_is_json_error() {
        let runner = SpyRunner::new();
        runner.push_success("", "");
        let prober = prober(runner, StaticFileChecker::allow_all());
        assert!(matches!(
            prober.probe(Path::new("movie.mp4")),
            Err(CoreError::JsonParse(_))
        ));
    }

    #[test]
    fn test_process_failure_is_translated() {
        let runner = SpyRunner::new();
        runner.push_failure(1, "movie.mp4: Invalid data found when processing input");
        let prober = prober(runner, StaticFileChecker::allow_all());
        let err = prober.probe(Path::new("movie.mp4")).unwrap_err();
        assert!(matches!(err, CoreError::ProcessFailed { exit_code: 1, .. }));
    }
}
