// ffkit-core/tests/params_tests.rs

use std::path::Path;

use ffkit_core::external::command::compile_params;
use ffkit_core::params::is_valid_bitrate;
use ffkit_core::{
    CommandCompiler, ConvertParams, CoreError, EmptyFilter, FilterChain, Hqdn3dFilter, Param,
    ParamValue, SeekTime, ThumbnailParams, YadifFilter,
};

#[test]
fn test_bitrate_acceptance() {
    for accepted in ["750k", "1M", "2000000", "128K", "1m"] {
        assert!(is_valid_bitrate(accepted), "{accepted} should be accepted");
        assert!(ConvertParams::new().with_video_bitrate(accepted).is_ok());
    }
    for rejected in ["901w", "", "12M1", "12MM", "12MK", "k", "-5k", "\u{0661}\u{0662}k"] {
        assert!(!is_valid_bitrate(rejected), "{rejected} should be rejected");
        assert!(matches!(
            ConvertParams::new().with_audio_bitrate(rejected),
            Err(CoreError::InvalidBitrate { .. })
        ));
    }
}

#[test]
fn test_with_never_mutates_receiver() {
    let base = ConvertParams::new().with_video_codec("libvpx-vp9");
    let derived = base.with_crf(31).with_video_codec("libx264");

    assert_eq!(base.len(), 1);
    assert_eq!(base.get(Param::VideoCodec).unwrap(), &ParamValue::from("libvpx-vp9"));
    assert_eq!(derived.get(Param::VideoCodec).unwrap(), &ParamValue::from("libx264"));
    assert!(!base.has(Param::Crf));
}

#[test]
fn test_thumbnail_rejects_convert_only_keys() {
    let err = ThumbnailParams::new()
        .with(Param::VideoCodec, "libx264")
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::UnsupportedParameter {
            use_case: "thumbnail",
            ..
        }
    ));

    let err = ThumbnailParams::new()
        .with_named("no_such_option", true)
        .unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedParameter { .. }));
}

#[test]
fn test_missing_parameter_lookup() {
    let params = ConvertParams::new();
    assert!(matches!(
        params.get(Param::Preset),
        Err(CoreError::RequiredParameterMissing(_))
    ));
    assert_eq!(
        params.get_or(Param::Preset, ParamValue::from("medium")),
        ParamValue::from("medium")
    );
}

#[test]
fn test_compile_follows_insertion_order() {
    let params = ConvertParams::new()
        .with_crf(18)
        .with_video_codec("libx264")
        .with_preset("slow")
        .with_crf(20);

    assert_eq!(
        compile_params(&params).unwrap(),
        vec!["-crf", "20", "-c:v", "libx264", "-preset", "slow", "-y"]
    );
}

#[test]
fn test_boolean_flags() {
    let params = ConvertParams::new()
        .with_no_audio(true)
        .with_overwrite(false)
        .with_streamable(false);
    assert_eq!(compile_params(&params).unwrap(), vec!["-an"]);
}

#[test]
fn test_filters_compile() {
    let chain = FilterChain::new()
        .add_filter(YadifFilter::with_parity(YadifFilter::PARITY_BFF))
        .add_filter(EmptyFilter)
        .add_filter(Hqdn3dFilter::default());
    let params = ConvertParams::new().with_video_filter(chain);
    assert_eq!(
        compile_params(&params).unwrap(),
        vec!["-filter:v", "yadif=mode=0:parity=1:deint=0,hqdn3d=4:3:6:4.5", "-y"]
    );

    // a filter rendering to nothing drops the option entirely
    let params = ConvertParams::new().with_video_filter(EmptyFilter);
    assert_eq!(compile_params(&params).unwrap(), vec!["-y"]);
}

#[test]
fn test_merge_prefers_other() {
    let defaults = ConvertParams::new().with_video_codec("libx264").with_crf(23);
    let overrides = ConvertParams::new().with_crf(17);
    let merged = defaults.merge(&overrides);

    assert_eq!(merged.get(Param::Crf).unwrap(), &ParamValue::Int(17));
    assert_eq!(merged.get(Param::VideoCodec).unwrap(), &ParamValue::from("libx264"));
}

#[test]
fn test_compile_is_deterministic() {
    let chain = FilterChain::new()
        .add_filter(YadifFilter::default())
        .add_filter(Hqdn3dFilter::default());
    let params = ConvertParams::new()
        .with_video_codec("libx264")
        .with_crf(20)
        .with_seek_start(SeekTime::from_millis(90_500))
        .with_video_filter(chain);
    let compiler = CommandCompiler::new("ffmpeg");

    let first = compiler
        .compile(&params, Some(Path::new("in.mp4")), Path::new("out.mp4"))
        .unwrap();
    let second = compiler
        .compile(&params, Some(Path::new("in.mp4")), Path::new("out.mp4"))
        .unwrap();

    assert_eq!(first.args(), second.args());
    assert_eq!(first.command_line(), second.command_line());
    // the overwrite default is injected on every compile
    assert!(first.args_lossy().contains(&"-y".to_string()));
    assert!(first.command_line().contains("-ss 0:01:30.500"));
}
