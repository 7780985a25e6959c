// ============================================================================
// ffkit-core/src/external/process.rs
// ============================================================================
//
// PROCESS EXECUTION: Running Compiled Commands Under Resource Controls
//
// A CommandSpec is executed as a child process with piped stdout/stderr. Two
// reader threads forward output chunks over a channel, so the calling thread
// can enforce the wall-clock timeout and the idle timeout independently while
// still delivering every chunk to the caller's callback.
//
// KEY COMPONENTS:
// - ProcessConfig / EnvValue: per-call resource controls
// - ProcessOutcome: terminal result of one run
// - ProcessRunner: the seam services execute through
// - SystemRunner: std::process implementation
// - PendingProcess -> RunningProcess -> ProcessOutcome: lifecycle typestate

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use super::command::CommandSpec;
use crate::error::{CoreError, CoreResult, TimeoutKind, command_start_error};

/// Upper bound on how long the wait loop sleeps between exit checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep collecting output after the process has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

const READ_CHUNK_SIZE: usize = 8192;

/// Value of an environment variable passed to a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Text(String),
    Int(i64),
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Text(text) => f.write_str(text),
            EnvValue::Int(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::Text(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        EnvValue::Text(value)
    }
}

impl From<i64> for EnvValue {
    fn from(value: i64) -> Self {
        EnvValue::Int(value)
    }
}

impl From<i32> for EnvValue {
    fn from(value: i32) -> Self {
        EnvValue::Int(i64::from(value))
    }
}

/// Resource controls for one process run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessConfig {
    /// Maximum total run time
    pub timeout: Option<Duration>,
    /// Maximum time without any stdout/stderr bytes
    pub idle_timeout: Option<Duration>,
    /// Variables merged over the inherited environment
    pub env: BTreeMap<String, EnvValue>,
}

impl ProcessConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }
}

/// Which pipe a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Lifecycle position of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Created,
    Started,
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Signaled,
}

impl ProcessState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProcessState::Succeeded
                | ProcessState::Failed
                | ProcessState::TimedOut
                | ProcessState::Signaled
        )
    }
}

/// Everything captured from one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub command_line: String,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    /// Exit code, absent when the process was killed or signaled
    pub exit_code: Option<i32>,
}

/// Terminal result of a process run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Succeeded(ProcessOutput),
    Failed {
        exit_code: i32,
        output: ProcessOutput,
    },
    TimedOut {
        kind: TimeoutKind,
        output: ProcessOutput,
    },
    Signaled {
        signal: i32,
        output: ProcessOutput,
    },
}

impl ProcessOutcome {
    #[must_use]
    pub fn output(&self) -> &ProcessOutput {
        match self {
            ProcessOutcome::Succeeded(output)
            | ProcessOutcome::Failed { output, .. }
            | ProcessOutcome::TimedOut { output, .. }
            | ProcessOutcome::Signaled { output, .. } => output,
        }
    }

    #[must_use]
    pub fn into_output(self) -> ProcessOutput {
        match self {
            ProcessOutcome::Succeeded(output)
            | ProcessOutcome::Failed { output, .. }
            | ProcessOutcome::TimedOut { output, .. }
            | ProcessOutcome::Signaled { output, .. } => output,
        }
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        match self {
            ProcessOutcome::Succeeded(_) => ProcessState::Succeeded,
            ProcessOutcome::Failed { .. } => ProcessState::Failed,
            ProcessOutcome::TimedOut { .. } => ProcessState::TimedOut,
            ProcessOutcome::Signaled { .. } => ProcessState::Signaled,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Succeeded(_))
    }
}

/// Callback receiving output chunks as they arrive.
pub type OutputCallback<'a> = &'a mut dyn FnMut(OutputStream, &[u8]);

/// Seam through which services execute commands.
///
/// Implementations only report what happened; turning a non-successful
/// outcome into an error is the translator's job.
pub trait ProcessRunner {
    /// Runs `command` to a terminal outcome.
    ///
    /// # Arguments
    ///
    /// * `command` - Compiled command to execute
    /// * `config` - Timeouts and environment for this run
    /// * `on_output` - Invoked on the calling thread for every output chunk
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessOutcome)` - The process reached a terminal state
    /// * `Err(CoreError::CommandStart)` - The binary could not be spawned
    fn run(
        &self,
        command: &CommandSpec,
        config: &ProcessConfig,
        on_output: Option<OutputCallback<'_>>,
    ) -> CoreResult<ProcessOutcome>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        command: &CommandSpec,
        config: &ProcessConfig,
        on_output: Option<OutputCallback<'_>>,
    ) -> CoreResult<ProcessOutcome> {
        PendingProcess::new(command, config).start()?.wait(on_output)
    }
}

/// A configured process that has not been spawned yet.
#[derive(Debug)]
pub struct PendingProcess {
    command: Command,
    command_line: String,
    config: ProcessConfig,
}

impl PendingProcess {
    pub fn new(spec: &CommandSpec, config: &ProcessConfig) -> Self {
        let mut command = spec.to_command();
        command
            .envs(config.env.iter().map(|(name, value)| (name, value.to_string())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        Self {
            command,
            command_line: spec.command_line(),
            config: config.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        ProcessState::Created
    }

    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Spawns the process and its output reader threads.
    pub fn start(mut self) -> CoreResult<RunningProcess> {
        debug!("Starting process: {}", self.command_line);
        let mut child = self
            .command
            .spawn()
            .map_err(|e| command_start_error(self.command_line.clone(), e))?;
        let started = Instant::now();

        let (tx, rx) = mpsc::channel();
        let mut open_streams = 0;
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, OutputStream::Stdout, tx.clone());
            open_streams += 1;
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, OutputStream::Stderr, tx);
            open_streams += 1;
        }
        debug!("Process {} started: {}", child.id(), self.command_line);

        Ok(RunningProcess {
            child,
            chunks: rx,
            open_streams,
            started,
            last_activity: started,
            command_line: self.command_line,
            config: self.config,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

enum Chunk {
    Data(OutputStream, Vec<u8>),
    Closed,
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R, stream: OutputStream, tx: Sender<Chunk>) {
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK_SIZE];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(Chunk::Data(stream, buf[..n].to_vec())).is_err() {
                        return;
                    }
                }
            }
        }
        let _ = tx.send(Chunk::Closed);
    });
}

/// A spawned process whose output is being collected.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    chunks: Receiver<Chunk>,
    open_streams: usize,
    started: Instant,
    last_activity: Instant,
    command_line: String,
    config: ProcessConfig,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Data(stream, bytes) => write!(f, "Data({stream:?}, {} bytes)", bytes.len()),
            Chunk::Closed => f.write_str("Closed"),
        }
    }
}

impl RunningProcess {
    #[must_use]
    pub fn state(&self) -> ProcessState {
        if self.stdout.is_empty() && self.stderr.is_empty() {
            ProcessState::Started
        } else {
            ProcessState::Running
        }
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the process exits or breaches a deadline.
    pub fn wait(mut self, mut on_output: Option<OutputCallback<'_>>) -> CoreResult<ProcessOutcome> {
        let status = loop {
            if let Some(status) = self.child.try_wait()? {
                break status;
            }

            if let Some(kind) = self.breached_deadline() {
                return Ok(self.kill(kind, &mut on_output));
            }

            let wait_for = self.next_wakeup();
            if self.open_streams == 0 {
                thread::sleep(wait_for);
                continue;
            }
            match self.chunks.recv_timeout(wait_for) {
                Ok(chunk) => self.accept(chunk, &mut on_output),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.open_streams = 0,
            }
        };

        // Output written just before exit may still be in flight. A grandchild
        // holding the pipes open must not block us forever.
        let drain_deadline = Instant::now() + DRAIN_TIMEOUT;
        while self.open_streams > 0 {
            let remaining = drain_deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.chunks.recv_timeout(remaining) {
                Ok(chunk) => self.accept(chunk, &mut on_output),
                Err(_) => break,
            }
        }

        Ok(self.finish(status))
    }

    fn accept(&mut self, chunk: Chunk, on_output: &mut Option<OutputCallback<'_>>) {
        match chunk {
            Chunk::Data(stream, bytes) => {
                self.last_activity = Instant::now();
                trace!("{:?}: {}", stream, String::from_utf8_lossy(&bytes).trim_end());
                if let Some(callback) = on_output.as_mut() {
                    callback(stream, &bytes);
                }
                match stream {
                    OutputStream::Stdout => self.stdout.extend_from_slice(&bytes),
                    OutputStream::Stderr => self.stderr.extend_from_slice(&bytes),
                }
            }
            Chunk::Closed => self.open_streams = self.open_streams.saturating_sub(1),
        }
    }

    fn breached_deadline(&self) -> Option<TimeoutKind> {
        if let Some(limit) = self.config.timeout {
            if self.started.elapsed() >= limit {
                return Some(TimeoutKind::WallClock(limit));
            }
        }
        if let Some(limit) = self.config.idle_timeout {
            if self.last_activity.elapsed() >= limit {
                return Some(TimeoutKind::Idle(limit));
            }
        }
        None
    }

    fn next_wakeup(&self) -> Duration {
        let wall = self
            .config
            .timeout
            .map(|limit| limit.saturating_sub(self.started.elapsed()));
        let idle = self
            .config
            .idle_timeout
            .map(|limit| limit.saturating_sub(self.last_activity.elapsed()));

        [Some(POLL_INTERVAL), wall, idle]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(POLL_INTERVAL)
    }

    fn kill(mut self, kind: TimeoutKind, on_output: &mut Option<OutputCallback<'_>>) -> ProcessOutcome {
        debug!("Killing process {} after {}: {}", self.child.id(), kind, self.command_line);
        let _ = self.child.kill();
        let _ = self.child.wait();

        // Collect what already arrived without waiting on the reader threads.
        loop {
            match self.chunks.try_recv() {
                Ok(chunk) => self.accept(chunk, on_output),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        let output = self.output(None);
        ProcessOutcome::TimedOut { kind, output }
    }

    fn finish(self, status: ExitStatus) -> ProcessOutcome {
        let outcome = match (status.code(), exit_signal(&status)) {
            (Some(0), _) => ProcessOutcome::Succeeded(self.output(Some(0))),
            (Some(code), _) => ProcessOutcome::Failed {
                exit_code: code,
                output: self.output(Some(code)),
            },
            (None, signal) => ProcessOutcome::Signaled {
                signal: signal.unwrap_or(-1),
                output: self.output(None),
            },
        };
        debug!(
            "Process finished as {:?} in {:.2}s: {}",
            outcome.state(),
            outcome.output().elapsed.as_secs_f64(),
            outcome.output().command_line
        );
        outcome
    }

    fn output(&self, exit_code: Option<i32>) -> ProcessOutput {
        ProcessOutput {
            command_line: self.command_line.clone(),
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            elapsed: self.started.elapsed(),
            exit_code,
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

impl From<&ProcessOutcome> for ProcessState {
    fn from(outcome: &ProcessOutcome) -> Self {
        outcome.state()
    }
}

/// Output of a successful outcome, or the process error matching any other.
pub(crate) fn outcome_result(outcome: ProcessOutcome) -> CoreResult<ProcessOutput> {
    match outcome {
        ProcessOutcome::Succeeded(output) => Ok(output),
        ProcessOutcome::Failed { exit_code, output } => Err(CoreError::ProcessFailed {
            command_line: output.command_line,
            exit_code,
            stderr: output.stderr,
        }),
        ProcessOutcome::TimedOut { kind, output } => Err(CoreError::ProcessTimedOut {
            command_line: output.command_line,
            kind,
            stderr: output.stderr,
        }),
        ProcessOutcome::Signaled { signal, output } => Err(CoreError::ProcessSignaled {
            command_line: output.command_line,
            signal,
            stderr: output.stderr,
        }),
    }
}
