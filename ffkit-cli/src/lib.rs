// ffkit-cli/src/lib.rs
//
// Library portion of the ffkit CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

use ffkit_core::CoreResult;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ConvertArgs, InterlaceArgs, ProbeArgs, ThumbnailArgs, ToolArgs};
pub use commands::convert::{build_convert_params, run_convert};
pub use commands::interlace::run_interlace;
pub use commands::probe::run_probe;
pub use commands::thumbnail::{build_thumbnail_params, run_thumbnail};

/// Dispatches the parsed command line.
pub fn run(cli: &Cli) -> CoreResult<()> {
    match &cli.command {
        Commands::Probe(args) => run_probe(args, &cli.tools),
        Commands::Convert(args) => run_convert(args, &cli.tools),
        Commands::Thumbnail(args) => run_thumbnail(args, &cli.tools),
        Commands::Interlace(args) => run_interlace(args, &cli.tools),
    }
}
