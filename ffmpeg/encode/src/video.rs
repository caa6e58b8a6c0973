/*!
    Video encoder implementation.
*/

use ffmpeg_next::{
    Dictionary, Packet, Rational as FFmpegRational,
    codec::{self, Id as CodecIdFFmpeg, encoder::Video as VideoEncoderFFmpeg},
    ffi,
    format::Pixel,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use transcode_types::{CodecId, Error, PixelFormat, Rational, Received, Result, Sent};

use crate::config::VideoEncoderConfig;

/**
    Video encoder.

    Encodes frames into compressed packets. Packets are written into a
    buffer the caller passes in and carry timestamps in the encoder's
    [time base](Self::time_base).
*/
pub struct VideoEncoder {
    encoder: VideoEncoderFFmpeg,
    codec_id: CodecId,
    time_base: Rational,
}

impl VideoEncoder {
    /**
        Create a new video encoder with the given configuration.

        Fails if the codec has no encoder in this FFmpeg build or the encoder
        rejects the settings.
    */
    pub fn new(config: VideoEncoderConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid_data(format!(
                "cannot encode {}x{} frames",
                config.width, config.height
            )));
        }
        if !config.time_base.is_positive() {
            return Err(Error::invalid_data(format!(
                "invalid encoder time base {}",
                config.time_base
            )));
        }

        // x264 and x265 understand the preset and crf options; other
        // encoders of the same codec are the fallback
        let codec_id = codec_id_to_ffmpeg(config.codec)?;
        let codec = preferred_encoder(config.codec)
            .and_then(ffmpeg_next::encoder::find_by_name)
            .or_else(|| ffmpeg_next::encoder::find(codec_id))
            .ok_or_else(|| {
                Error::unsupported_format(format!("no {} encoder available", config.codec))
            })?;
        let codec_name = codec.name().to_string();

        let mut encoder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| Error::codec(e.to_string()))?;

        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(pixel_format_to_ffmpeg(config.pixel_format)?);
        encoder.set_time_base(to_ffmpeg(config.time_base));
        encoder.set_frame_rate(config.frame_rate.map(to_ffmpeg));
        encoder.set_max_b_frames(config.max_b_frames as usize);

        if let Some(sar) = config.sample_aspect_ratio {
            encoder.set_aspect_ratio(to_ffmpeg(sar));
        }
        if let Some(bitrate) = config.bitrate {
            encoder.set_bit_rate(bitrate as usize);
        }

        if config.global_header {
            // SAFETY: the context is allocated and not yet opened
            unsafe {
                (*encoder.as_mut_ptr()).flags |= codec::flag::Flags::GLOBAL_HEADER.bits() as i32;
            }
        }

        let mut opts = Dictionary::new();
        for (key, value) in config.codec_options() {
            opts.set(key, &value);
        }

        let encoder = encoder.open_with(opts).map_err(|e| {
            Error::codec(format!("failed to open {} encoder: {}", codec_name, e))
        })?;

        // The encoder may adjust the time base while opening
        // SAFETY: reading a plain field of the opened context
        let time_base = unsafe { FFmpegRational::from((*encoder.as_ptr()).time_base) };
        let time_base = Rational::new(time_base.numerator(), time_base.denominator());

        log::info!(
            "[encode] opened {} {}x{} {} tb={} preset={} crf={:?} bframes={}",
            codec_name,
            config.width,
            config.height,
            config.pixel_format,
            time_base,
            config.preset,
            config.crf,
            config.max_b_frames,
        );

        Ok(Self {
            encoder,
            codec_id: config.codec,
            time_base,
        })
    }

    /**
        Get the time base for submitted frames and encoded packets.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn width(&self) -> u32 {
        self.encoder.width()
    }

    pub fn height(&self) -> u32 {
        self.encoder.height()
    }

    /**
        Pixel format frames must be in when submitted.
    */
    pub fn frame_format(&self) -> Pixel {
        self.encoder.format()
    }

    /**
        Codec parameters for the output stream.
    */
    pub fn parameters(&self) -> codec::Parameters {
        codec::Parameters::from(&self.encoder)
    }

    /**
        Submit one frame.

        Returns [`Sent::Full`] if pending packets must be received first; the
        frame was not consumed and must be sent again.
    */
    pub fn send_frame(&mut self, frame: &VideoFrameFFmpeg) -> Result<Sent> {
        sent(self.encoder.send_frame(frame), "failed to send frame to encoder")
    }

    /**
        Signal end of input so the encoder releases its buffered packets.
    */
    pub fn send_eof(&mut self) -> Result<Sent> {
        match self.encoder.send_eof() {
            Err(ffmpeg_next::Error::Eof) => Ok(Sent::Accepted),
            result => sent(result, "failed to flush encoder"),
        }
    }

    /**
        Receive one encoded packet into `packet`.
    */
    pub fn receive_packet(&mut self, packet: &mut Packet) -> Result<Received> {
        match self.encoder.receive_packet(packet) {
            Ok(()) => Ok(Received::Ready),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(Received::NeedsInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(Received::EndOfStream),
            Err(e) => Err(Error::codec(format!(
                "failed to receive packet from encoder: {}",
                e
            ))),
        }
    }
}

fn sent(result: Result<(), ffmpeg_next::Error>, context: &str) -> Result<Sent> {
    match result {
        Ok(()) => Ok(Sent::Accepted),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => Ok(Sent::Full),
        Err(e) => Err(Error::codec(format!("{}: {}", context, e))),
    }
}

fn to_ffmpeg(r: Rational) -> FFmpegRational {
    FFmpegRational::new(r.num, r.den)
}

/**
    Convert our CodecId to FFmpeg's codec ID.
*/
fn codec_id_to_ffmpeg(codec: CodecId) -> Result<CodecIdFFmpeg> {
    match codec {
        CodecId::H264 => Ok(CodecIdFFmpeg::H264),
        CodecId::H265 => Ok(CodecIdFFmpeg::HEVC),
        _ => Err(Error::unsupported_format(format!(
            "video codec {} not supported for encoding",
            codec
        ))),
    }
}

fn preferred_encoder(codec: CodecId) -> Option<&'static str> {
    match codec {
        CodecId::H264 => Some("libx264"),
        CodecId::H265 => Some("libx265"),
        _ => None,
    }
}

/**
    Convert our PixelFormat to FFmpeg's Pixel format.
*/
pub fn pixel_format_to_ffmpeg(format: PixelFormat) -> Result<Pixel> {
    match format {
        PixelFormat::Yuv420p => Ok(Pixel::YUV420P),
        PixelFormat::Nv12 => Ok(Pixel::NV12),
        PixelFormat::Bgra => Ok(Pixel::BGRA),
        PixelFormat::Rgba => Ok(Pixel::RGBA),
        PixelFormat::Rgb24 => Ok(Pixel::RGB24),
        PixelFormat::Bgr24 => Ok(Pixel::BGR24),
        PixelFormat::Yuv422p => Ok(Pixel::YUV422P),
        PixelFormat::Yuv444p => Ok(Pixel::YUV444P),
        PixelFormat::Yuv420p10 => Ok(Pixel::YUV420P10LE),
        PixelFormat::P010le => Ok(Pixel::P010LE),
        _ => Err(Error::unsupported_format(format!(
            "pixel format {} not supported",
            format
        ))),
    }
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("codec_id", &self.codec_id)
            .field("width", &self.encoder.width())
            .field("height", &self.encoder.height())
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}
