//! End-to-end transcodes of generated fixtures.

mod common;

use ffmpeg_next::{codec::Id, format::Pixel};

use transcoder::{TranscodeState, Transcoder};

use common::{Fixture, config, h264_encoder_available, summarize};

#[test]
fn transcodes_every_frame_to_h264() {
    if !h264_encoder_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    Fixture::mpeg4(30).write(&input);

    let report = Transcoder::new(config(&input, &output))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.state, TranscodeState::Finished);
    assert_eq!(report.packets_read, 30);
    assert_eq!(report.packets_skipped, 0);
    assert_eq!(report.frames_decoded, 30);
    assert_eq!(report.frames_scaled, 0);

    let summary = summarize(&output);
    assert_eq!(summary.codec, Id::H264);
    assert_eq!(summary.frames, 30);
    assert_eq!(summary.packets, report.packets_written);
}

#[test]
fn end_of_input_drains_decoder_and_encoder() {
    if !h264_encoder_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    Fixture::mpeg4(12).write(&input);

    let mut config = config(&input, &output);
    config.video.b_frames = 0;
    let report = Transcoder::new(config).unwrap().run().unwrap();

    assert_eq!(report.frames_decoded, 12);
    assert_eq!(report.frames_encoded, report.frames_decoded);
    assert_eq!(report.packets_written, report.frames_encoded);
}

#[test]
fn output_keeps_size_and_is_420_from_444_input() {
    if !h264_encoder_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mkv");
    let output = dir.path().join("out.mp4");
    Fixture::ffv1_444(8).write(&input);

    let before = summarize(&input);
    assert_eq!(before.pixel_format, Pixel::YUV444P);

    let report = Transcoder::new(config(&input, &output))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(report.frames_decoded, 8);
    assert_eq!(report.frames_scaled, 8);

    let after = summarize(&output);
    assert_eq!((after.width, after.height), (before.width, before.height));
    assert_eq!(after.pixel_format, Pixel::YUV420P);
    assert_eq!(after.frames, 8);
}

#[test]
fn packets_of_other_streams_are_dropped() {
    if !h264_encoder_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    let counts = Fixture::mpeg4(10).with_streams(2).write(&input);

    let report = Transcoder::new(config(&input, &output))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.packets_read, counts[0]);
    assert_eq!(report.packets_skipped, counts[1]);
    assert_eq!(summarize(&output).frames, 10);
    assert_eq!(transcode_source::probe(&output).unwrap().stream_count, 1);
}

#[test]
fn fast_start_output_is_readable() {
    if !h264_encoder_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    Fixture::mpeg4(10).write(&input);

    let mut config = config(&input, &output);
    config.fast_start = true;
    Transcoder::new(config).unwrap().run().unwrap();

    assert_eq!(summarize(&output).frames, 10);
}
