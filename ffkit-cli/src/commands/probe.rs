// ffkit-cli/src/commands/probe.rs

use std::path::{Path, PathBuf};

use log::error;
use rayon::prelude::*;

use ffkit_core::{CoreResult, MediaInfo, VideoProber};

use crate::cli::{ProbeArgs, ToolArgs};
use crate::config::ffprobe_config;
use crate::output::{format_bytes, format_duration_seconds, print_heading, print_info};

/// Probes every file concurrently and prints the reports in argument order.
///
/// All files are attempted. The first failure is returned after the rest have
/// been printed; later failures are logged.
pub fn run_probe(args: &ProbeArgs, tools: &ToolArgs) -> CoreResult<()> {
    let prober = VideoProber::new(ffprobe_config(tools));

    let results: Vec<(&PathBuf, CoreResult<MediaInfo>)> = args
        .files
        .par_iter()
        .map(|file| (file, prober.probe(file)))
        .collect();

    let mut first_error = None;
    for (file, result) in results {
        match result {
            Ok(info) if args.json => match serde_json::to_string_pretty(info.raw()) {
                Ok(json) => println!("{json}"),
                Err(err) => error!("{}: {err}", file.display()),
            },
            Ok(info) => print_summary(file, &info),
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(err) => error!("{}: {err}", file.display()),
        }
    }

    first_error.map_or(Ok(()), Err)
}

fn print_summary(file: &Path, info: &MediaInfo) {
    print_heading(&file.display().to_string());

    if let Some(format) = info.format_name() {
        print_info("Format", format);
    }
    if let Some(duration) = info.duration() {
        print_info("Duration", format_duration_seconds(duration));
    }
    if let Some(size) = info.size() {
        print_info("Size", format_bytes(size));
    }
    if let Some(bit_rate) = info.bit_rate() {
        print_info("Bitrate", format!("{} kb/s", bit_rate / 1000));
    }

    for video in info.video_streams() {
        let mut line = video.codec_name.clone().unwrap_or_else(|| "unknown".to_string());
        if let Some((width, height)) = video.dimensions() {
            line.push_str(&format!(" {width}x{height}"));
        }
        if let Some(fps) = video.frame_rate() {
            line.push_str(&format!(" {fps:.3} fps"));
        }
        print_info(&format!("Video #{}", video.index), line);
    }
    for audio in info.audio_streams() {
        let mut line = audio.codec_name.clone().unwrap_or_else(|| "unknown".to_string());
        if let Some(channels) = audio.channels {
            line.push_str(&format!(" {channels}ch"));
        }
        if let Some(rate) = audio.sample_rate {
            line.push_str(&format!(" {rate} Hz"));
        }
        if let Some(language) = audio.language() {
            line.push_str(&format!(" [{language}]"));
        }
        print_info(&format!("Audio #{}", audio.index), line);
    }
    for subtitle in info.subtitle_streams() {
        let codec = subtitle.codec_name.as_deref().unwrap_or("unknown");
        let language = subtitle.language().unwrap_or("und");
        print_info(&format!("Subtitle #{}", subtitle.index), format!("{codec} [{language}]"));
    }
}
