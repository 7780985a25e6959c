// ============================================================================
// ffkit-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern Dispatch for Console and File Output
//
// The core library only emits through the `log` facade; this module decides
// where records go. The console gets colored, level-tagged messages at info
// (debug with --verbose). An optional log file receives every record at
// debug with a local timestamp and the emitting module.

use std::path::Path;

use console::style;
use log::{Level, LevelFilter};

/// Returns the current local timestamp formatted as "YYYY-MM-DD HH:MM:SS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Console verbosity for the `--verbose` flag.
pub fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
///
/// # Arguments
///
/// * `verbose` - Log debug records on the console
/// * `log_file` - Optional file receiving every record at debug level
///
/// # Returns
///
/// * `Ok(())` - The logger is installed
/// * `Err(fern::InitError)` - The log file could not be opened, or a logger
///   was already installed
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let console = fern::Dispatch::new()
        .level(console_level(verbose))
        .format(|out, message, record| {
            let tag = match record.level() {
                Level::Error => style("error").red().bold(),
                Level::Warn => style("warn").yellow().bold(),
                Level::Info => style("info").green(),
                Level::Debug => style("debug").cyan(),
                Level::Trace => style("trace").dim(),
            };
            out.finish(format_args!("{tag}: {message}"))
        })
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::Dispatch::new()
            .level(LevelFilter::Debug)
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    get_timestamp(),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(path)?);
        root = root.chain(file);
    }

    root.apply()?;
    Ok(())
}
