// ffkit-cli/src/commands/thumbnail.rs

use ffkit_core::{CoreResult, ScaleFilter, ThumbnailGenerator, ThumbnailParams};

use crate::cli::{ThumbnailArgs, ToolArgs};
use crate::commands::parse_seek_time;
use crate::config::ffmpeg_config;
use crate::output::print_success;

pub fn build_thumbnail_params(args: &ThumbnailArgs) -> CoreResult<ThumbnailParams> {
    let mut params = ThumbnailParams::new().with_time(parse_seek_time(&args.time)?);
    if let Some(width) = args.width {
        // -2 keeps the height even, as most encoders require
        params = params.with_video_filter(ScaleFilter::new(width, -2));
    }
    if let Some(quality) = args.quality {
        params = params.with_quality_scale(quality);
    }
    Ok(params)
}

pub fn run_thumbnail(args: &ThumbnailArgs, tools: &ToolArgs) -> CoreResult<()> {
    let params = build_thumbnail_params(args)?;
    ThumbnailGenerator::new(ffmpeg_config(tools)).make_thumbnail(
        &args.input,
        &args.output,
        &params,
        None,
    )?;
    print_success(&format!("Wrote {}", args.output.display()));
    Ok(())
}
