// ============================================================================
// ffkit-core/src/processing/detection.rs
// ============================================================================
//
// INTERLACE DETECTION: Running idet and Classifying Its Statistics
//
// InterlaceDetector runs ffmpeg over the first frames of a video with the
// idet filter, discards the decoded frames into the null sink, and hands the
// statistics printed on stderr to the interlace classifier.

use std::path::Path;

use log::{debug, info};

use crate::config::BinaryConfig;
use crate::error::CoreResult;
use crate::external::{
    CommandCompiler, CommandSpec, ErrorTranslator, FileChecker, FsFileChecker, OutputSink,
    ProcessConfig, ProcessRunner, SystemRunner, run_to_completion,
};
use crate::filters::IdetFilter;
use crate::params::ConvertParams;
use crate::processing::interlace::InterlaceGuess;

/// Frames analysed when the caller does not choose.
pub const DEFAULT_IDET_FRAMES: u32 = 1000;

/// Detects whether a video is interlaced.
#[derive(Debug, Clone)]
pub struct InterlaceDetector<C, R = SystemRunner, F = FsFileChecker> {
    config: C,
    runner: R,
    files: F,
}

impl<C: BinaryConfig> InterlaceDetector<C> {
    pub fn new(config: C) -> Self {
        Self::with_collaborators(config, SystemRunner, FsFileChecker)
    }
}

impl<C: BinaryConfig, R: ProcessRunner, F: FileChecker> InterlaceDetector<C, R, F> {
    pub fn with_collaborators(config: C, runner: R, files: F) -> Self {
        Self {
            config,
            runner,
            files,
        }
    }

    /// `ffmpeg -i <input> -filter:v idet -frames:v <max_frames> -an -f null <null-sink>`
    pub fn command(&self, input: &Path, max_frames: u32) -> CoreResult<CommandSpec> {
        let params = ConvertParams::new()
            .with_video_filter(IdetFilter)
            .with_video_frames(max_frames)
            .with_no_audio(true)
            .with_output_format("null")
            .with_overwrite(false);
        CommandCompiler::new(self.config.binary_path()).compile(&params, Some(input), OutputSink::Null)
    }

    /// Analyses up to `max_frames` frames of `input`.
    pub fn guess_interlacing(&self, input: &Path, max_frames: u32) -> CoreResult<InterlaceGuess> {
        self.guess_interlacing_with(input, max_frames, None)
    }

    /// Like [`InterlaceDetector::guess_interlacing`] with a per-call process
    /// configuration.
    pub fn guess_interlacing_with(
        &self,
        input: &Path,
        max_frames: u32,
        config: Option<&ProcessConfig>,
    ) -> CoreResult<InterlaceGuess> {
        let translator = ErrorTranslator;
        translator.check_input(&self.files, input)?;

        let command = self
            .command(input, max_frames)
            .inspect_err(|err| translator.report(err))?;
        let config = config
            .cloned()
            .unwrap_or_else(|| self.config.process_config());

        debug!("Running idet over {} frames of {}", max_frames, input.display());
        let output = run_to_completion(&self.runner, &command, &config, None)?;
        let guess = InterlaceGuess::from_idet_output(&output.stderr);
        info!("Interlace analysis of {}: {}", input.display(), guess);
        Ok(guess)
    }
}
