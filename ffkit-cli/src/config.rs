// ffkit-cli/src/config.rs
//
// Turns the global tool flags into ffkit-core tool configurations.

use std::time::Duration;

use ffkit_core::{ToolConfig, ToolConfigBuilder};

use crate::cli::ToolArgs;

/// ffmpeg configuration for the given flags.
pub fn ffmpeg_config(args: &ToolArgs) -> ToolConfig {
    let mut builder = ToolConfigBuilder::ffmpeg();
    if let Some(binary) = &args.ffmpeg {
        builder = builder.binary(binary);
    }
    builder = match args.threads {
        Some(0) => builder.threads_auto(),
        Some(threads) => builder.threads(threads),
        None => builder,
    };
    apply_limits(builder, args).build()
}

/// ffprobe configuration for the given flags. The thread flag does not apply.
pub fn ffprobe_config(args: &ToolArgs) -> ToolConfig {
    let mut builder = ToolConfigBuilder::ffprobe();
    if let Some(binary) = &args.ffprobe {
        builder = builder.binary(binary);
    }
    apply_limits(builder, args).build()
}

fn apply_limits(builder: ToolConfigBuilder, args: &ToolArgs) -> ToolConfigBuilder {
    let builder = match args.timeout {
        Some(0) => builder.no_timeout(),
        Some(secs) => builder.timeout(Duration::from_secs(secs)),
        None => builder,
    };
    match args.idle_timeout {
        Some(0) => builder.no_idle_timeout(),
        Some(secs) => builder.idle_timeout(Duration::from_secs(secs)),
        None => builder,
    }
}
