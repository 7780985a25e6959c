// ============================================================================
// ffkit-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Domain Error Taxonomy for ffkit-core
//
// Every failure produced by the parameter model, the command compiler, the
// process runner or the output parsers is expressed as a `CoreError`. Process
// errors carry the exact command line and the captured stderr so that a
// failure can be diagnosed without re-running the tool.
//
// KEY COMPONENTS:
// - CoreError: the error enum
// - CoreResult: result alias used throughout the crate
// - Helper constructors for the process-layer variants

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Which deadline a timed-out process exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// Total elapsed time exceeded the configured timeout.
    WallClock(Duration),
    /// No stdout/stderr bytes arrived within the configured window.
    Idle(Duration),
}

impl std::fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutKind::WallClock(limit) => write!(f, "timeout of {:.3}s", limit.as_secs_f64()),
            TimeoutKind::Idle(limit) => {
                write!(f, "idle timeout of {:.3}s", limit.as_secs_f64())
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    /// A parameter name is not registered for the use-case.
    #[error("Unsupported parameter '{param}' for {use_case} parameters")]
    UnsupportedParameter { param: String, use_case: &'static str },

    /// A bitrate literal does not match `^[0-9]+(k|M)?$`.
    #[error("Invalid bitrate '{value}': expected digits optionally followed by 'k' or 'M'")]
    InvalidBitrate { value: String },

    /// A seek time literal is malformed or negative.
    #[error("Invalid seek time '{value}': expected H:MM:SS[.mmm] or non-negative seconds")]
    InvalidSeekTime { value: String },

    /// A value of the wrong shape reached the compiler.
    #[error("Unsupported value of type {value_type} for parameter '{param}'")]
    UnsupportedParamValue { param: String, value_type: &'static str },

    #[error("Required parameter '{0}' is missing")]
    RequiredParameterMissing(String),

    /// The input file does not exist or cannot be read. Checked before any
    /// process is spawned.
    #[error("Missing or unreadable input file: {path}")]
    MissingInputFile { path: String },

    #[error("Command failed with exit code {exit_code}: {command_line}\n{stderr}")]
    ProcessFailed {
        command_line: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Command exceeded its {kind}: {command_line}\n{stderr}")]
    ProcessTimedOut {
        command_line: String,
        kind: TimeoutKind,
        stderr: String,
    },

    #[error("Command terminated by signal {signal}: {command_line}\n{stderr}")]
    ProcessSignaled {
        command_line: String,
        signal: i32,
        stderr: String,
    },

    /// The binary could not be started at all (not found, not executable).
    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to parse JSON output: {0}")]
    JsonParse(String),

    #[error("Cannot build command: {0}")]
    CommandBuild(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Log level the error translator reports this error at.
    ///
    /// A missing input is a caller mistake and is reported as a warning; every
    /// other failure is an error.
    #[must_use]
    pub fn log_level(&self) -> log::Level {
        match self {
            CoreError::MissingInputFile { .. } => log::Level::Warn,
            _ => log::Level::Error,
        }
    }

    /// Command line attached to process-layer errors.
    #[must_use]
    pub fn command_line(&self) -> Option<&str> {
        match self {
            CoreError::ProcessFailed { command_line, .. }
            | CoreError::ProcessTimedOut { command_line, .. }
            | CoreError::ProcessSignaled { command_line, .. } => Some(command_line),
            _ => None,
        }
    }

    /// Captured stderr attached to process-layer errors.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CoreError::ProcessFailed { stderr, .. }
            | CoreError::ProcessTimedOut { stderr, .. }
            | CoreError::ProcessSignaled { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Result type for ffkit-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a binary that could not be spawned.
pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), err)
}

/// Builds a `ProcessFailed` error.
pub fn command_failed_error(
    command_line: impl Into<String>,
    exit_code: i32,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::ProcessFailed {
        command_line: command_line.into(),
        exit_code,
        stderr: stderr.into(),
    }
}

/// Builds a `MissingInputFile` error.
pub fn missing_input_error(path: &std::path::Path) -> CoreError {
    CoreError::MissingInputFile {
        path: path.display().to_string(),
    }
}
