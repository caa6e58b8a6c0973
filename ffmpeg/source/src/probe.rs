/*!
    Probing functionality for extracting stream metadata.
*/

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{Stream, format::context::Input as InputContext, media::Type};

use transcode_types::{Error, MediaInfo, Result, VideoStreamInfo};

use crate::convert::{
    codec_id_from_ffmpeg, known_rational_from_ffmpeg, open_error, pixel_format_from_ffmpeg,
    rational_from_ffmpeg,
};

/**
    Probe a media file and describe its container and video streams.

    # Example

    ```ignore
    let info = probe("in.mp4")?;
    for video in &info.video_streams {
        println!("#{}: {}x{}", video.index, video.width, video.height);
    }
    ```
*/
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

    let path = path.as_ref();
    let input_ctx = ffmpeg_next::format::input(&path).map_err(|e| open_error(path, e))?;

    let video_streams = input_ctx
        .streams()
        .filter(|stream| stream.parameters().medium() == Type::Video)
        .filter_map(|stream| match video_stream_info(&input_ctx, &stream) {
            Ok(info) => Some(info),
            Err(e) => {
                log::warn!("[source] skipping stream {}: {}", stream.index(), e);
                None
            }
        })
        .collect();

    Ok(MediaInfo {
        format_name: input_ctx.format().name().to_string(),
        duration: container_duration(&input_ctx),
        stream_count: input_ctx.streams().count(),
        video_streams,
    })
}

/**
    Describe a video stream of an opened input.

    Fails with `UnsupportedFormat` if the stream is not video.
*/
pub(crate) fn video_stream_info(
    input_ctx: &InputContext,
    stream: &Stream,
) -> Result<VideoStreamInfo> {
    let parameters = stream.parameters();
    let medium = parameters.medium();
    if medium != Type::Video {
        return Err(Error::unsupported_format(format!(
            "stream {} is {:?}, not video",
            stream.index(),
            medium
        )));
    }

    let time_base = rational_from_ffmpeg(stream.time_base());

    let duration = if stream.duration() > 0 && time_base.is_positive() {
        let seconds = stream.duration() as f64 * time_base.to_f64();
        Some(Duration::from_secs_f64(seconds))
    } else {
        container_duration(input_ctx)
    };

    // Average rate first, then the lowest common rate, as av_guess_frame_rate does
    let frame_rate = known_rational_from_ffmpeg(stream.avg_frame_rate())
        .or_else(|| known_rational_from_ffmpeg(stream.rate()));

    let codec_id = codec_id_from_ffmpeg(parameters.id());

    // Unopened codec context: fields are copied from the stream parameters
    let context = ffmpeg_next::codec::context::Context::from_parameters(parameters)
        .map_err(|e| Error::codec(format!("failed to read stream parameters: {}", e)))?;

    // SAFETY: the context was just allocated and filled from valid parameters
    let (width, height, pixel_format, bitrate, sample_aspect_ratio) = unsafe {
        let ptr = context.as_ptr();
        (
            (*ptr).width,
            (*ptr).height,
            ffmpeg_next::format::Pixel::from((*ptr).pix_fmt),
            (*ptr).bit_rate,
            ffmpeg_next::Rational::from((*ptr).sample_aspect_ratio),
        )
    };

    if width <= 0 || height <= 0 {
        return Err(Error::invalid_data(format!(
            "stream {} has no frame size ({}x{})",
            stream.index(),
            width,
            height
        )));
    }

    Ok(VideoStreamInfo {
        index: stream.index(),
        width: width as u32,
        height: height as u32,
        pixel_format: pixel_format_from_ffmpeg(pixel_format),
        frame_rate,
        time_base,
        duration,
        codec_id,
        bitrate: (bitrate > 0).then_some(bitrate as u64),
        sample_aspect_ratio: known_rational_from_ffmpeg(sample_aspect_ratio),
    })
}

fn container_duration(input_ctx: &InputContext) -> Option<Duration> {
    (input_ctx.duration() > 0).then(|| Duration::from_micros(input_ctx.duration() as u64))
}
