// ============================================================================
// ffkit-cli/src/commands/convert.rs
// ============================================================================
//
// CONVERT COMMAND: Flags -> ConvertParams -> VideoConverter
//
// The input is probed first so the spinner can show a percentage; a failed
// probe only costs the percentage. With --deinterlace an idet pass runs
// before the conversion and its suggested filter is placed ahead of any
// --filter expression.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use ffkit_core::external::{OutputCallback, OutputStream};
use ffkit_core::processing::DEFAULT_IDET_FRAMES;
use ffkit_core::{
    ConvertParams, CoreResult, FilterChain, InterlaceDetector, RawFilter, VideoConverter,
    VideoProber, parse_progress_time,
};

use crate::cli::{ConvertArgs, ToolArgs};
use crate::commands::parse_seek_time;
use crate::config::{ffmpeg_config, ffprobe_config};
use crate::output::{format_duration_seconds, print_success};

/// Builds the conversion parameters for the given flags, without any
/// deinterlace filter.
pub fn build_convert_params(args: &ConvertArgs) -> CoreResult<ConvertParams> {
    let mut params = ConvertParams::new();

    if let Some(format) = &args.format {
        params = params.with_output_format(format);
    }
    if let Some(codec) = &args.video_codec {
        params = params.with_video_codec(codec);
    }
    if let Some(crf) = args.crf {
        params = params.with_crf(crf);
    }
    if let Some(bitrate) = &args.video_bitrate {
        params = params.with_video_bitrate(bitrate)?;
    }
    if let Some(preset) = &args.preset {
        params = params.with_preset(preset);
    }
    if let Some(codec) = &args.audio_codec {
        params = params.with_audio_codec(codec);
    }
    if let Some(bitrate) = &args.audio_bitrate {
        params = params.with_audio_bitrate(bitrate)?;
    }
    if args.no_audio {
        params = params.with_no_audio(true);
    }
    if let Some(start) = &args.seek_start {
        params = params.with_seek_start(parse_seek_time(start)?);
    }
    if let Some(end) = &args.seek_end {
        params = params.with_seek_end(parse_seek_time(end)?);
    }
    if let Some(filter) = &args.filter {
        params = params.with_video_filter(RawFilter::new(filter));
    }

    Ok(params)
}

pub fn run_convert(args: &ConvertArgs, tools: &ToolArgs) -> CoreResult<()> {
    let mut params = build_convert_params(args)?;

    if args.deinterlace {
        let detector = InterlaceDetector::new(ffmpeg_config(tools));
        let guess = detector.guess_interlacing(&args.input, DEFAULT_IDET_FRAMES)?;
        let mut chain = FilterChain::new().add_filter(guess.deinterlace_filter(None));
        if let Some(filter) = &args.filter {
            chain = chain.add_filter(RawFilter::new(filter));
        }
        info!("Deinterlace decision: {}", guess.best_guess());
        params = params.with_video_filter(chain);
    }

    let total_secs = VideoProber::new(ffprobe_config(tools))
        .probe(&args.input)
        .inspect_err(|err| debug!("Could not probe input for duration: {err}"))
        .ok()
        .and_then(|info| info.duration())
        .filter(|secs| *secs > 0.0);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Converting {}", args.input.display()));

    let mut on_output = |stream: OutputStream, chunk: &[u8]| {
        if stream != OutputStream::Stderr {
            return;
        }
        let Some(position) = parse_progress_time(&String::from_utf8_lossy(chunk)) else {
            return;
        };
        let done = position.as_seconds();
        let message = match total_secs {
            Some(total) => format!(
                "{} / {} ({:.1}%)",
                format_duration_seconds(done),
                format_duration_seconds(total),
                (done / total * 100.0).min(100.0)
            ),
            None => format_duration_seconds(done),
        };
        spinner.set_message(message);
    };
    let callback: OutputCallback<'_> = &mut on_output;

    let started = Instant::now();
    let converter = VideoConverter::new(ffmpeg_config(tools));
    let result = converter.convert(&args.input, &args.output, &params, None, Some(callback));
    spinner.finish_and_clear();
    result?;

    print_success(&format!(
        "Wrote {} in {}",
        args.output.display(),
        format_duration_seconds(started.elapsed().as_secs_f64())
    ));
    Ok(())
}
