//! Setup failures: an error comes back and no output is left behind.

mod common;

use transcoder::{Error, StreamSelection, Transcoder};

use common::{Fixture, config, h264_encoder_available};

#[test]
fn missing_input_is_an_error_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("does-not-exist.mp4");
    let output = dir.path().join("out.mp4");

    let err = Transcoder::new(config(&input, &output)).unwrap_err();
    assert!(err.is_not_found(), "{}", err);
    assert!(!output.exists());
}

#[test]
fn garbage_input_is_an_error_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.mp4");
    let output = dir.path().join("out.mp4");
    std::fs::write(&input, b"this is not a media file at all").unwrap();

    assert!(Transcoder::new(config(&input, &output)).is_err());
    assert!(!output.exists());
}

#[test]
fn missing_stream_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    Fixture::mpeg4(3).write(&input);

    let mut config = config(&input, &output);
    config.stream = StreamSelection::Index(4);

    let err = Transcoder::new(config).unwrap_err();
    assert!(matches!(err, Error::StreamNotFound(_)), "{}", err);
    assert!(!output.exists());
}

#[test]
fn unknown_output_container_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.unknowncontainer");
    Fixture::mpeg4(3).write(&input);

    let err = Transcoder::new(config(&input, &output)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)), "{}", err);
    assert!(!output.exists());
}

#[test]
fn encoder_failure_removes_the_output() {
    if !h264_encoder_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    Fixture::mpeg4(3).write(&input);

    // libx264 has no packed RGB input
    let mut config = config(&input, &output);
    config.video.pixel_format = transcode_types::PixelFormat::Bgra;

    let err = Transcoder::new(config).unwrap_err();
    assert!(matches!(err, Error::Codec(_)), "{}", err);
    assert!(!output.exists());
}
