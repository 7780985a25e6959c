// ffkit-core/src/external/translate.rs
//
// Maps process outcomes and precondition failures onto CoreError, logging
// each failure once at the level the error calls for.

use std::path::Path;

use super::FileChecker;
use super::command::CommandSpec;
use super::process::{
    OutputCallback, ProcessConfig, ProcessOutcome, ProcessOutput, ProcessRunner, outcome_result,
};
use crate::error::{CoreError, CoreResult};

/// Turns low-level results into domain errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Returns the captured output of a successful run, or the matching
    /// process error for any other outcome.
    pub fn translate(&self, outcome: ProcessOutcome) -> CoreResult<ProcessOutput> {
        outcome_result(outcome).inspect_err(|err| self.report(err))
    }

    /// Checks that `input` is readable before anything is spawned.
    pub fn check_input<F: FileChecker + ?Sized>(&self, checker: &F, input: &Path) -> CoreResult<()> {
        checker.ensure_readable(input).inspect_err(|err| self.report(err))
    }

    /// Logs `err` at its own level.
    pub fn report(&self, err: &CoreError) {
        log::log!(err.log_level(), "{err}");
    }
}

/// Runs `command` and translates the outcome, the blocking "run or raise"
/// mode used by every service.
pub fn run_to_completion<R: ProcessRunner + ?Sized>(
    runner: &R,
    command: &CommandSpec,
    config: &ProcessConfig,
    on_output: Option<OutputCallback<'_>>,
) -> CoreResult<ProcessOutput> {
    let translator = ErrorTranslator;
    let outcome = runner
        .run(command, config, on_output)
        .inspect_err(|err| translator.report(err))?;
    translator.translate(outcome)
}
