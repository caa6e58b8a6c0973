/*!
    Video encoding for the transcoder.

    This crate turns raw frames into compressed packets. It is the inverse
    of decode: frames in, H.264 (or H.265) bitstream out.

    # Video Encoding

    ```ignore
    use transcode_encode::{EncoderPreset, VideoEncoder, VideoEncoderConfig};
    use transcode_types::{Rational, Received};

    let config = VideoEncoderConfig::h264(1920, 1080, Rational::new(1, 12800))
        .with_crf(23)
        .with_preset(EncoderPreset::Fast)
        .with_max_b_frames(1);

    let mut encoder = VideoEncoder::new(config)?;
    let mut packet = ffmpeg_next::Packet::empty();

    encoder.send_frame(&frame)?;
    while encoder.receive_packet(&mut packet)? == Received::Ready {
        // hand the packet to the muxer
    }
    ```

    # Rate Control

    The encoder is opened with a constant rate factor (`crf`, 0-51, lower is
    better, 23 by default). A bitrate copied from the input is passed along
    as well; x264 treats it as a hint when CRF is set.

    # Presets

    Presets trade speed for compression efficiency:

    - `Ultrafast`: Fastest, largest files
    - `Fast`: The default here
    - `Medium`: x264's own default
    - `Slow`/`Veryslow`: Best compression, slowest

    # Frame Requirements

    Frames must match the encoder's size and [pixel
    format](VideoEncoder::frame_format). Use `transcode-transform` to
    convert decoded frames first.
*/

pub use transcode_types::{CodecId, Error, PixelFormat, Rational, Received, Result, Sent};

mod config;
mod video;

pub use config::{DEFAULT_CRF, EncoderPreset, MAX_CRF, VideoEncoderConfig};
pub use video::{VideoEncoder, pixel_format_to_ffmpeg};
