// ffkit-core/src/external/mocks.rs

// --- Test doubles for the process and filesystem seams ---

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use super::FileChecker;
use super::command::CommandSpec;
use super::process::{OutputCallback, OutputStream, ProcessConfig, ProcessOutcome, ProcessOutput, ProcessRunner};
use crate::error::{CoreResult, TimeoutKind, command_start_error, missing_input_error};

/// One invocation seen by a [`SpyRunner`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub command_line: String,
    pub args: Vec<String>,
    pub config: ProcessConfig,
}

#[derive(Debug, Clone)]
enum ScriptedResult {
    Succeeded,
    Failed(i32),
    TimedOut(TimeoutKind),
    Signaled(i32),
    StartError(io::ErrorKind),
}

#[derive(Debug, Clone)]
struct ScriptedRun {
    result: ScriptedResult,
    stdout: String,
    stderr: String,
}

/// Runner that records every call and replays scripted outcomes in order.
///
/// Scripted output is delivered to the callback as one stdout and one stderr
/// chunk, in that order.
#[derive(Debug, Clone, Default)]
pub struct SpyRunner {
    script: Rc<RefCell<VecDeque<ScriptedRun>>>,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

impl SpyRunner {
    pub fn new() -> Self {
        Default::default()
    }

    fn push(&self, result: ScriptedResult, stdout: &str, stderr: &str) {
        self.script.borrow_mut().push_back(ScriptedRun {
            result,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
    }

    pub fn push_success(&self, stdout: &str, stderr: &str) {
        self.push(ScriptedResult::Succeeded, stdout, stderr);
    }

    pub fn push_failure(&self, exit_code: i32, stderr: &str) {
        self.push(ScriptedResult::Failed(exit_code), "", stderr);
    }

    pub fn push_timeout(&self, kind: TimeoutKind, stderr: &str) {
        self.push(ScriptedResult::TimedOut(kind), "", stderr);
    }

    pub fn push_signal(&self, signal: i32, stderr: &str) {
        self.push(ScriptedResult::Signaled(signal), "", stderr);
    }

    pub fn push_start_error(&self, kind: io::ErrorKind) {
        self.push(ScriptedResult::StartError(kind), "", "");
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Most recent call, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.borrow().last().cloned()
    }
}

impl ProcessRunner for SpyRunner {
    fn run(
        &self,
        command: &CommandSpec,
        config: &ProcessConfig,
        on_output: Option<OutputCallback<'_>>,
    ) -> CoreResult<ProcessOutcome> {
        let command_line = command.command_line();
        self.calls.borrow_mut().push(RecordedCall {
            command_line: command_line.clone(),
            args: command.args_lossy(),
            config: config.clone(),
        });

        let scripted = self.script.borrow_mut().pop_front();
        let Some(run) = scripted else {
            log::error!("SpyRunner: no scripted outcome for {}", command_line);
            panic!("SpyRunner: no scripted outcome for {command_line}");
        };
        log::info!("SpyRunner: replaying {:?} for {}", run.result, command_line);

        if let ScriptedResult::StartError(kind) = run.result {
            return Err(command_start_error(command_line, io::Error::from(kind)));
        }

        if let Some(callback) = on_output {
            if !run.stdout.is_empty() {
                callback(OutputStream::Stdout, run.stdout.as_bytes());
            }
            if !run.stderr.is_empty() {
                callback(OutputStream::Stderr, run.stderr.as_bytes());
            }
        }

        let exit_code = match run.result {
            ScriptedResult::Succeeded => Some(0),
            ScriptedResult::Failed(code) => Some(code),
            _ => None,
        };
        let output = ProcessOutput {
            command_line,
            stdout: run.stdout,
            stderr: run.stderr,
            elapsed: Duration::ZERO,
            exit_code,
        };

        Ok(match run.result {
            ScriptedResult::Succeeded => ProcessOutcome::Succeeded(output),
            ScriptedResult::Failed(exit_code) => ProcessOutcome::Failed { exit_code, output },
            ScriptedResult::TimedOut(kind) => ProcessOutcome::TimedOut { kind, output },
            ScriptedResult::Signaled(signal) => ProcessOutcome::Signaled { signal, output },
            ScriptedResult::StartError(_) => unreachable!("start errors return early"),
        })
    }
}

/// File checker answering from a fixed set of readable paths.
#[derive(Debug, Clone, Default)]
pub struct StaticFileChecker {
    readable: HashSet<PathBuf>,
    allow_all: bool,
}

impl StaticFileChecker {
    pub fn new() -> Self {
        Default::default()
    }

    /// Checker that reports every path as readable.
    pub fn allow_all() -> Self {
        Self {
            readable: HashSet::new(),
            allow_all: true,
        }
    }

    pub fn with_readable(mut self, path: impl Into<PathBuf>) -> Self {
        self.readable.insert(path.into());
        self
    }
}

impl FileChecker for StaticFileChecker {
    fn ensure_readable(&self, path: &Path) -> CoreResult<()> {
        if self.allow_all || self.readable.contains(path) {
            Ok(())
        } else {
            Err(missing_input_error(path))
        }
    }
}
