// ffkit-core/src/processing/thumbnail.rs
//
// Single-frame extraction with ffmpeg.

use std::path::Path;

use log::info;

use crate::config::BinaryConfig;
use crate::error::CoreResult;
use crate::external::{
    CommandCompiler, CommandSpec, ErrorTranslator, FileChecker, FsFileChecker, ProcessConfig,
    ProcessOutput, ProcessRunner, SystemRunner, run_to_completion,
};
use crate::params::ThumbnailParams;

/// Extracts a still frame from a video.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator<C, R = SystemRunner, F = FsFileChecker> {
    config: C,
    runner: R,
    files: F,
}

impl<C: BinaryConfig> ThumbnailGenerator<C> {
    pub fn new(config: C) -> Self {
        Self::with_collaborators(config, SystemRunner, FsFileChecker)
    }
}

impl<C: BinaryConfig, R: ProcessRunner, F: FileChecker> ThumbnailGenerator<C, R, F> {
    pub fn with_collaborators(config: C, runner: R, files: F) -> Self {
        Self {
            config,
            runner,
            files,
        }
    }

    pub fn command(
        &self,
        input: &Path,
        output: &Path,
        params: &ThumbnailParams,
    ) -> CoreResult<CommandSpec> {
        CommandCompiler::new(self.config.binary_path()).compile(params, Some(input), output)
    }

    /// Writes one frame of `input` to `output`. The image format follows the
    /// output extension unless `params` sets one.
    pub fn make_thumbnail(
        &self,
        input: &Path,
        output: &Path,
        params: &ThumbnailParams,
        config: Option<&ProcessConfig>,
    ) -> CoreResult<ProcessOutput> {
        let translator = ErrorTranslator;
        translator.check_input(&self.files, input)?;

        let command = self
            .command(input, output, params)
            .inspect_err(|err| translator.report(err))?;
        let config = config
            .cloned()
            .unwrap_or_else(|| self.config.process_config());

        info!("Extracting thumbnail {} -> {}", input.display(), output.display());
        run_to_completion(&self.runner, &command, &config, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfigBuilder;
    use crate::error::CoreError;
    use crate::external::mocks::{SpyRunner, StaticFileChecker};
    use crate::filters::ScaleFilter;
    use crate::params::SeekTime;

    #[test]
    fn test_thumbnail_command() {
        let runner = SpyRunner::new();
        runner.push_success("", "");
        let generator = ThumbnailGenerator::with_collaborators(
            ToolConfigBuilder::ffmpeg().binary("ffmpeg").build(),
            runner.clone(),
            StaticFileChecker::allow_all(),
        );

        let params = ThumbnailParams::new()
            .with_time(SeekTime::from_seconds(12.234).unwrap())
            .with_video_filter(ScaleFilter::new(320, -2))
            .with_quality_scale(2);
        generator
            .make_thumbnail(Path::new("in.mp4"), Path::new("thumb.jpg"), &params, None)
            .unwrap();

        assert_eq!(
            runner.last_call().unwrap().command_line,
            "ffmpeg -i in.mp4 -ss 0:00:12.234 -filter:v scale=w=320:h=-2 -qscale:v 2 -y -frames:v 1 thumb.jpg"
        );
    }

    #[test]
    fn test_missing_input_never_spawns() {
        let runner = SpyRunner::new();
        let generator = ThumbnailGenerator::with_collaborators(
            ToolConfigBuilder::ffmpeg().build(),
            runner.clone(),
            StaticFileChecker::new(),
        );
        let err = generator
            .make_thumbnail(Path::new("gone.mp4"), Path::new("t.jpg"), &ThumbnailParams::new(), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingInputFile { .. }));
        assert_eq!(runner.call_count(), 0);
    }
}
