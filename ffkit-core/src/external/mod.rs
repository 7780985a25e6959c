// ============================================================================
// ffkit-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Command Compilation, Process Execution and File Checks
//
// Everything that touches the outside world goes through this module:
// compiling parameter sets into argv, running the resulting command as a
// child process, translating the outcome into CoreError, and checking that
// input files exist before any process starts.
//
// KEY COMPONENTS:
// - CommandCompiler / CommandSpec: argv assembly
// - ProcessRunner / SystemRunner: process execution seam
// - ErrorTranslator / run_to_completion: outcome -> CoreResult
// - FileChecker / FsFileChecker: input precondition seam
// - mocks: SpyRunner and StaticFileChecker for process-free tests

use std::fs;
use std::path::Path;

use crate::error::{CoreResult, missing_input_error};

// ============================================================================
// SUBMODULES
// ============================================================================

pub mod command;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;
pub mod process;
pub mod translate;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::{CommandCompiler, CommandSpec, NULL_SINK, OutputSink};
pub use process::{
    EnvValue, OutputCallback, OutputStream, PendingProcess, ProcessConfig, ProcessOutcome,
    ProcessOutput, ProcessRunner, ProcessState, RunningProcess, SystemRunner,
};
pub use translate::{ErrorTranslator, run_to_completion};

// ============================================================================
// FILE CHECKS
// ============================================================================

/// Trait for abstracting the input precondition check.
///
/// Services call this before compiling or spawning anything, so a missing
/// input never starts a process.
///
/// # Examples
///
/// ```rust
/// use ffkit_core::external::FileChecker;
/// use ffkit_core::CoreResult;
/// use std::path::Path;
///
/// struct AlwaysReadable;
///
/// impl FileChecker for AlwaysReadable {
///     fn ensure_readable(&self, _path: &Path) -> CoreResult<()> {
///         Ok(())
///     }
/// }
///
/// assert!(AlwaysReadable.ensure_readable(Path::new("/fake/path")).is_ok());
/// ```
pub trait FileChecker {
    /// Succeeds when `path` is an existing, readable regular file.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The file can be opened for reading
    /// * `Err(CoreError::MissingInputFile)` - Otherwise
    fn ensure_readable(&self, path: &Path) -> CoreResult<()>;
}

/// FileChecker backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileChecker;

impl FileChecker for FsFileChecker {
    fn ensure_readable(&self, path: &Path) -> CoreResult<()> {
        let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        if is_file && fs::File::open(path).is_ok() {
            Ok(())
        } else {
            Err(missing_input_error(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_fs_file_checker() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("input.mp4");
        fs::write(&file, b"not really a video").unwrap();

        assert!(FsFileChecker.ensure_readable(&file).is_ok());
        assert!(matches!(
            FsFileChecker.ensure_readable(&dir.path().join("missing.mp4")),
            Err(CoreError::MissingInputFile { .. })
        ));
        // directories are not inputs
        assert!(FsFileChecker.ensure_readable(dir.path()).is_err());
    }
}
