// ffkit-core/tests/services_tests.rs

use std::fs;
use std::path::Path;

use ffkit_core::external::mocks::{SpyRunner, StaticFileChecker};
use ffkit_core::{
    ConvertParams, CoreError, FrameCategory, FsFileChecker, InterlaceDetector, SeekTime,
    ThumbnailGenerator, ThumbnailParams, TimeoutKind, ToolConfigBuilder, VideoConverter,
    VideoProber,
};
use std::time::Duration;
use tempfile::tempdir;

const IDET_STDERR: &str = "\
frame=  16 fps=0.0 q=-0.0 Lsize=N/A time=00:00:00.64 bitrate=N/A speed=2.1x
[Parsed_idet_0 @ 0x7f] Repeated Fields: Neither:    16 Top:     0 Bottom:     0
[Parsed_idet_0 @ 0x7f] Multi frame detection: TFF:    10 BFF:     3 Progressive:     2 Undetermined:     1
";

const PROBE_JSON: &str = r#"{
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
         "r_frame_rate": "25/1", "nb_frames": "250", "duration": "10.000000"},
        {"index": 1, "codec_type": "audio", "codec_name": "aac", "channels": 2,
         "sample_rate": "48000", "tags": {"language": "eng"}}
    ],
    "format": {"filename": "in.mp4", "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
               "duration": "10.000000", "size": "1048576", "bit_rate": "838860"}
}"#;

#[test]
fn test_missing_input_spawns_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let missing = tmp.path().join("missing.mkv");
    let output = tmp.path().join("out.mp4");
    let runner = SpyRunner::new();

    let ffmpeg = ToolConfigBuilder::ffmpeg().build();
    let converter =
        VideoConverter::with_collaborators(ffmpeg.clone(), runner.clone(), FsFileChecker);
    let thumbnails =
        ThumbnailGenerator::with_collaborators(ffmpeg.clone(), runner.clone(), FsFileChecker);
    let detector = InterlaceDetector::with_collaborators(ffmpeg, runner.clone(), FsFileChecker);
    let prober = VideoProber::with_collaborators(
        ToolConfigBuilder::ffprobe().build(),
        runner.clone(),
        FsFileChecker,
    );

    let results = [
        converter
            .convert(&missing, &output, &ConvertParams::new(), None, None)
            .map(|_| ()),
        thumbnails
            .make_thumbnail(&missing, &output, &ThumbnailParams::new(), None)
            .map(|_| ()),
        detector.guess_interlacing(&missing, 100).map(|_| ()),
        prober.probe(&missing).map(|_| ()),
    ];
    for result in results {
        assert!(matches!(result, Err(CoreError::MissingInputFile { .. })));
    }
    assert_eq!(runner.call_count(), 0);
    Ok(())
}

#[test]
fn test_probe_real_file_through_spy() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("in.mp4");
    fs::write(&input, b"placeholder")?;

    let runner = SpyRunner::new();
    runner.push_success(PROBE_JSON, "");
    let prober = VideoProber::with_collaborators(
        ToolConfigBuilder::ffprobe().binary("ffprobe").build(),
        runner.clone(),
        FsFileChecker,
    );

    let info = prober.probe(&input)?;
    assert_eq!(info.duration(), Some(10.0));
    assert_eq!(info.dimensions(), Some((1920, 1080)));
    assert_eq!(info.frame_count(), Some(250));
    assert_eq!(info.audio_streams().len(), 1);
    assert_eq!(info.audio_streams()[0].language(), Some("eng"));
    assert_eq!(runner.call_count(), 1);
    Ok(())
}

#[test]
fn test_interlace_detection_end_to_end() {
    let runner = SpyRunner::new();
    runner.push_success("", IDET_STDERR);
    let detector = InterlaceDetector::with_collaborators(
        ToolConfigBuilder::ffmpeg().binary("ffmpeg").build(),
        runner.clone(),
        StaticFileChecker::allow_all(),
    );

    let guess = detector.guess_interlacing(Path::new("tape.mkv"), 1000).unwrap();
    assert_eq!(guess.total_frames(), 16);
    assert_eq!(guess.best_guess(), FrameCategory::Tff);
    assert!(guess.is_interlaced());
    assert!(!guess.is_progressive());

    let params = ConvertParams::new()
        .with_video_codec("libx264")
        .with_video_filter(guess.deinterlace_filter(None));
    let converter_runner = SpyRunner::new();
    converter_runner.push_success("", "");
    VideoConverter::with_collaborators(
        ToolConfigBuilder::ffmpeg().binary("ffmpeg").build(),
        converter_runner.clone(),
        StaticFileChecker::allow_all(),
    )
    .convert(Path::new("tape.mkv"), Path::new("out.mp4"), &params, None, None)
    .unwrap();

    assert_eq!(
        converter_runner.last_call().unwrap().command_line,
        "ffmpeg -i tape.mkv -c:v libx264 -filter:v yadif=mode=0:parity=0:deint=0 -y out.mp4"
    );
}

#[test]
fn test_progressive_material_gets_no_filter() {
    let runner = SpyRunner::new();
    runner.push_success(
        "",
        "[Parsed_idet_0 @ 0x1] Multi frame detection: TFF: 0 BFF: 0 Progressive: 120 Undetermined: 4\n",
    );
    let detector = InterlaceDetector::with_collaborators(
        ToolConfigBuilder::ffmpeg().build(),
        runner,
        StaticFileChecker::allow_all(),
    );

    let guess = detector.guess_interlacing(Path::new("film.mkv"), 1000).unwrap();
    assert!(guess.is_progressive());
    assert!(guess.deinterlace_filter(None).render().is_empty());
}

#[test]
fn test_timeouts_surface_as_errors() {
    let runner = SpyRunner::new();
    runner.push_timeout(TimeoutKind::Idle(Duration::from_secs(60)), "frame= 10");
    let converter = VideoConverter::with_collaborators(
        ToolConfigBuilder::ffmpeg().build(),
        runner,
        StaticFileChecker::allow_all(),
    );

    let err = converter
        .convert(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &ConvertParams::new(),
            None,
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::ProcessTimedOut {
            kind: TimeoutKind::Idle(_),
            ..
        }
    ));
}

#[test]
fn test_thumbnail_at_time() {
    let runner = SpyRunner::new();
    runner.push_success("", "");
    let generator = ThumbnailGenerator::with_collaborators(
        ToolConfigBuilder::ffmpeg().binary("ffmpeg").build(),
        runner.clone(),
        StaticFileChecker::allow_all(),
    );

    let params = ThumbnailParams::new().with_time(SeekTime::parse("00:01:05.5").unwrap());
    generator
        .make_thumbnail(Path::new("in.mp4"), Path::new("frame.png"), &params, None)
        .unwrap();

    assert_eq!(
        runner.last_call().unwrap().args,
        vec!["-i", "in.mp4", "-ss", "0:01:05.500", "-y", "-frames:v", "1", "frame.png"]
    );
}
