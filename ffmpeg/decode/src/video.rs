/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    Packet,
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use transcode_source::CodecConfig;
use transcode_types::{Error, Rational, Received, Result, Sent, VideoStreamInfo};

/**
    Video decoder.

    Decodes packets of one input stream into frames. Frames are written into
    a buffer the caller passes in, which is overwritten on every receive.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
}

impl VideoDecoder {
    /**
        Open a decoder for the stream described by `stream`.

        # Arguments

        * `codec_config` - Codec parameters from the source
        * `stream` - Description of the same stream, for its time base and rate
    */
    pub fn new(codec_config: CodecConfig, stream: &VideoStreamInfo) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let codec_id = codec_config.codec_id();
        let parameters = codec_config.into_parameters();

        let mut decoder_ctx = codec::context::Context::from_parameters(parameters)
            .map_err(|e| Error::codec(format!("failed to copy codec parameters: {}", e)))?;

        // SAFETY: the context is allocated and not yet opened
        unsafe {
            let ctx = decoder_ctx.as_mut_ptr();
            (*ctx).pkt_timebase = to_ffmpeg(stream.time_base).into();
            if let Some(frame_rate) = stream.frame_rate {
                (*ctx).framerate = to_ffmpeg(frame_rate).into();
            }
        }

        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| Error::codec(format!("failed to open {} decoder: {}", codec_id, e)))?;

        log::debug!(
            "[decode] opened {} decoder {}x{} {:?}",
            codec_id,
            decoder.width(),
            decoder.height(),
            decoder.format()
        );

        Ok(Self { decoder })
    }

    /**
        Submit one compressed packet.

        Returns [`Sent::Full`] if the decoder will not take input until its
        pending frames are received. The packet is not consumed in that case
        and must be sent again.
    */
    pub fn send_packet(&mut self, packet: &Packet) -> Result<Sent> {
        sent(self.decoder.send_packet(packet), "failed to send packet to decoder")
    }

    /**
        Signal end of input so the decoder releases its buffered frames.

        Signalling twice is accepted.
    */
    pub fn send_eof(&mut self) -> Result<Sent> {
        match self.decoder.send_eof() {
            Err(ffmpeg_next::Error::Eof) => Ok(Sent::Accepted),
            result => sent(result, "failed to flush decoder"),
        }
    }

    /**
        Receive one decoded frame into `frame`.

        The frame's previous contents are released. Frame timestamps are in
        the time base of the input stream.
    */
    pub fn receive_frame(&mut self, frame: &mut VideoFrameFFmpeg) -> Result<Received> {
        received(
            self.decoder.receive_frame(frame),
            "failed to receive frame from decoder",
        )
    }
}

fn to_ffmpeg(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}

fn sent(result: Result<(), ffmpeg_next::Error>, context: &str) -> Result<Sent> {
    match result {
        Ok(()) => Ok(Sent::Accepted),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => Ok(Sent::Full),
        Err(e) => Err(Error::codec(format!("{}: {}", context, e))),
    }
}

fn received(result: Result<(), ffmpeg_next::Error>, context: &str) -> Result<Received> {
    match result {
        Ok(()) => Ok(Received::Ready),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
            Ok(Received::NeedsInput)
        }
        Err(ffmpeg_next::Error::Eof) => Ok(Received::EndOfStream),
        Err(e) => Err(Error::codec(format!("{}: {}", context, e))),
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("format", &self.decoder.format())
            .field("width", &self.decoder.width())
            .field("height", &self.decoder.height())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn would_block_is_an_outcome() {
        let eagain = || Err(ffmpeg_next::Error::Other { errno: ffi::EAGAIN });
        assert_eq!(sent(eagain(), "send").unwrap(), Sent::Full);
        assert_eq!(received(eagain(), "receive").unwrap(), Received::NeedsInput);
    }

    #[test]
    fn end_of_stream_is_an_outcome() {
        let eof = received(Err(ffmpeg_next::Error::Eof), "receive").unwrap();
        assert_eq!(eof, Received::EndOfStream);
        assert_eq!(received(Ok(()), "receive").unwrap(), Received::Ready);
    }

    #[test]
    fn codec_failures_carry_context() {
        let err = received(Err(ffmpeg_next::Error::InvalidData), "failed to receive").unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
        assert!(err.to_string().contains("failed to receive"));

        let err = sent(Err(ffmpeg_next::Error::InvalidData), "failed to send").unwrap_err();
        assert!(err.to_string().contains("failed to send"));
    }
}
