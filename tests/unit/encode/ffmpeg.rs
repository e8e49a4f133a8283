use super::*;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32, audio_path: Option<PathBuf>) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        audio_path,
    }
}

#[test]
fn odd_or_zero_dimensions_are_rejected() {
    assert!(validate_sink_config(&cfg(0, 10, None)).is_err());
    assert!(validate_sink_config(&cfg(11, 10, None)).is_err());
    assert!(validate_sink_config(&cfg(10, 7, None)).is_err());
    assert!(validate_sink_config(&cfg(320, 240, None)).is_ok());
}

#[test]
fn silent_output_disables_audio() {
    let args = ffmpeg_args(&cfg(64, 32, None), Path::new("out/a.mp4"), true);
    assert_eq!(args[0], "-y");
    assert!(args.iter().any(|a| a == "rgb24"));
    assert!(args.iter().any(|a| a == "64x32"));
    assert!(args.iter().any(|a| a == "30/1"));
    assert!(args.iter().any(|a| a == "-an"));
    assert!(!args.iter().any(|a| a == "-shortest"));
    assert_eq!(args.last().map(String::as_str), Some("out/a.mp4"));
}

#[test]
fn audio_track_is_muxed_as_aac() {
    let args = ffmpeg_args(
        &cfg(64, 32, Some(PathBuf::from("song.wav"))),
        Path::new("v.mp4"),
        false,
    );
    assert_eq!(args[0], "-n");
    let second_input = args.iter().position(|a| a == "song.wav").unwrap();
    assert_eq!(args[second_input - 1], "-i");
    assert!(args.iter().any(|a| a == "aac"));
    assert!(args.iter().any(|a| a == "-shortest"));
    assert!(!args.iter().any(|a| a == "-an"));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new("never.mp4");
    let frame = Frame::new(crate::foundation::core::Canvas {
        width: 2,
        height: 2,
    });
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_ok());
}
