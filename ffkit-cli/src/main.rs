// ffkit-cli/src/main.rs
//
// Entry point for the `ffkit` binary.
//
// Responsibilities include:
// - Parsing user-provided arguments.
// - Setting up logging to the console and, optionally, a file.
// - Dispatching to the selected command.
// - Managing process exit codes based on success or failure.

use std::process;

use clap::Parser;
use log::debug;

use ffkit::Cli;
use ffkit::logging::init_logging;
use ffkit::output::print_error;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        print_error(&format!("Error: failed to initialize logging: {err}"));
        process::exit(1);
    }
    debug!("Parsed arguments: {:?}", cli);

    if let Err(err) = ffkit::run(&cli) {
        print_error(&format!("Error: {err}"));
        if let Some(stderr) = err.stderr().filter(|s| !s.trim().is_empty()) {
            debug!("Process stderr:\n{stderr}");
        }
        process::exit(1);
    }
}
