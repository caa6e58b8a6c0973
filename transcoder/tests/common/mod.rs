//! Fixture files and read-back helpers shared by the pipeline tests.

#![allow(dead_code)]

use std::path::Path;

use ffmpeg_next::{
    self as ffmpeg, Packet, Rational,
    codec::{self, Id},
    format::{self, Pixel},
    frame, media,
};

use transcoder::TranscodeConfig;

/**
    A synthetic input file.
*/
#[derive(Clone, Debug)]
pub struct Fixture {
    pub codec: Id,
    pub pixel_format: Pixel,
    pub width: u32,
    pub height: u32,
    pub frames: usize,
    pub time_base: Rational,
    /// Number of identical video streams in the file.
    pub streams: usize,
}

impl Fixture {
    /**
        MPEG-4 Part 2 in 4:2:0, 25 fps.
    */
    pub fn mpeg4(frames: usize) -> Self {
        Self {
            codec: Id::MPEG4,
            pixel_format: Pixel::YUV420P,
            width: 64,
            height: 48,
            frames,
            time_base: Rational::new(1, 25),
            streams: 1,
        }
    }

    /**
        Lossless FFV1 in 4:4:4; needs a container that takes FFV1, like mkv.
    */
    pub fn ffv1_444(frames: usize) -> Self {
        Self {
            codec: Id::FFV1,
            pixel_format: Pixel::YUV444P,
            ..Self::mpeg4(frames)
        }
    }

    pub fn with_streams(mut self, streams: usize) -> Self {
        self.streams = streams;
        self
    }

    /**
        Encode the fixture into `path` and return the packet count per stream.
    */
    pub fn write(&self, path: &Path) -> Vec<u64> {
        ffmpeg::init().unwrap();

        let mut output = format::output(&path).unwrap();
        let global_header = output
            .format()
            .flags()
            .contains(format::flag::Flags::GLOBAL_HEADER);

        let mut encoders = Vec::with_capacity(self.streams);
        for _ in 0..self.streams {
            let codec = ffmpeg::encoder::find(self.codec).expect("encoder built into FFmpeg");
            let mut encoder = codec::context::Context::new_with_codec(codec)
                .encoder()
                .video()
                .unwrap();
            encoder.set_width(self.width);
            encoder.set_height(self.height);
            encoder.set_format(self.pixel_format);
            encoder.set_time_base(self.time_base);
            encoder.set_frame_rate(Some(Rational::new(
                self.time_base.denominator(),
                self.time_base.numerator(),
            )));
            encoder.set_max_b_frames(0);
            if global_header {
                unsafe {
                    (*encoder.as_mut_ptr()).flags |=
                        codec::flag::Flags::GLOBAL_HEADER.bits() as i32;
                }
            }
            let encoder = encoder.open().unwrap();

            let codec = ffmpeg::encoder::find(self.codec).unwrap();
            let mut stream = output.add_stream(codec).unwrap();
            stream.set_parameters(&encoder);
            stream.set_time_base(self.time_base);
            encoders.push(encoder);
        }

        output.write_header().unwrap();

        let mut counts = vec![0u64; self.streams];
        for index in 0..self.frames {
            for (stream, encoder) in encoders.iter_mut().enumerate() {
                let mut picture = frame::Video::new(self.pixel_format, self.width, self.height);
                paint(&mut picture, index);
                picture.set_pts(Some(index as i64));
                encoder.send_frame(&picture).unwrap();
                counts[stream] += write_packets(encoder, &mut output, stream, self.time_base);
            }
        }
        for (stream, encoder) in encoders.iter_mut().enumerate() {
            encoder.send_eof().unwrap();
            counts[stream] += write_packets(encoder, &mut output, stream, self.time_base);
        }

        output.write_trailer().unwrap();
        counts
    }
}

/**
    Gradient that moves with the frame index, so every frame differs.
*/
fn paint(picture: &mut frame::Video, index: usize) {
    for plane in 0..picture.planes() {
        let stride = picture.stride(plane);
        let width = picture.plane_width(plane) as usize;
        let height = picture.plane_height(plane) as usize;
        let data = picture.data_mut(plane);
        for y in 0..height {
            for x in 0..width {
                data[y * stride + x] = ((x + 2 * y + 3 * index) % 256) as u8;
            }
        }
    }
}

/**
    Write `frames` raw 4:2:0 pictures to `path` as a 25 fps YUV4MPEG2 file.

    If `damaged` names a frame, that frame's header is corrupted. The demuxer
    reads every earlier frame normally and fails with an error there.
*/
pub fn write_y4m(path: &Path, width: u32, height: u32, frames: usize, damaged: Option<usize>) {
    ffmpeg::init().unwrap();

    let mut file = format!("YUV4MPEG2 W{} H{} F25:1 Ip A1:1 C420jpeg\n", width, height)
        .into_bytes();
    for index in 0..frames {
        if damaged == Some(index) {
            file.extend_from_slice(b"FRAMX\n");
        } else {
            file.extend_from_slice(b"FRAME\n");
        }

        let mut picture = frame::Video::new(Pixel::YUV420P, width, height);
        paint(&mut picture, index);
        for plane in 0..picture.planes() {
            let stride = picture.stride(plane);
            let plane_width = picture.plane_width(plane) as usize;
            for row in picture
                .data(plane)
                .chunks(stride)
                .take(picture.plane_height(plane) as usize)
            {
                file.extend_from_slice(&row[..plane_width]);
            }
        }
    }
    std::fs::write(path, file).unwrap();
}

fn write_packets(
    encoder: &mut codec::encoder::Video,
    output: &mut format::context::Output,
    stream: usize,
    time_base: Rational,
) -> u64 {
    let stream_time_base = output.stream(stream).unwrap().time_base();
    let mut packet = Packet::empty();
    let mut written = 0;
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream);
        packet.rescale_ts(time_base, stream_time_base);
        packet.write_interleaved(output).unwrap();
        written += 1;
    }
    written
}

/**
    True if FFmpeg was built with libx264, which the pipeline tests need.
*/
pub fn h264_encoder_available() -> bool {
    ffmpeg::init().unwrap();
    let available = ffmpeg::encoder::find_by_name("libx264").is_some();
    if !available {
        eprintln!("skipping: FFmpeg has no libx264 encoder");
    }
    available
}

/**
    A config that transcodes `input` to `output` with the defaults.
*/
pub fn config(input: &Path, output: &Path) -> TranscodeConfig {
    TranscodeConfig {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        ..TranscodeConfig::default()
    }
}

/**
    What a media file's best video stream looks like once written.
*/
#[derive(Debug)]
pub struct Summary {
    pub codec: Id,
    pub width: u32,
    pub height: u32,
    pub pixel_format: Pixel,
    pub time_base: Rational,
    pub packets: u64,
    pub frames: u64,
    pub max_pts: Option<i64>,
}

/**
    Demux and decode the best video stream of `path`.
*/
pub fn summarize(path: &Path) -> Summary {
    ffmpeg::init().unwrap();
    let mut input = format::input(&path).unwrap();

    let (index, time_base, parameters) = {
        let stream = input.streams().best(media::Type::Video).unwrap();
        (stream.index(), stream.time_base(), stream.parameters())
    };
    let mut decoder = codec::context::Context::from_parameters(parameters)
        .unwrap()
        .decoder()
        .video()
        .unwrap();

    let mut summary = Summary {
        codec: decoder.id(),
        width: decoder.width(),
        height: decoder.height(),
        pixel_format: decoder.format(),
        time_base,
        packets: 0,
        frames: 0,
        max_pts: None,
    };

    let mut picture = frame::Video::empty();
    for (stream, packet) in input.packets() {
        if stream.index() != index {
            continue;
        }
        summary.packets += 1;
        summary.max_pts = summary.max_pts.max(packet.pts());

        decoder.send_packet(&packet).unwrap();
        while decoder.receive_frame(&mut picture).is_ok() {
            summary.frames += 1;
        }
    }
    decoder.send_eof().unwrap();
    while decoder.receive_frame(&mut picture).is_ok() {
        summary.frames += 1;
    }

    summary
}
