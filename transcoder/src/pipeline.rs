/*!
    The decode, convert, encode and mux loop.
*/

use std::fmt;

use ffmpeg_next::{Packet, frame::Video as VideoFrame};

use transcode_decode::VideoDecoder;
use transcode_encode::VideoEncoder;
use transcode_sink::Sink;
use transcode_source::{Read, Source};
use transcode_transform::FrameConverter;
use transcode_types::{Error, Rational, Received, Result, Sent, VideoStreamInfo};

use crate::config::TranscodeConfig;
use crate::state::{Event, TranscodeState};

/**
    Counters collected over one run.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscodeReport {
    /// Packets of the selected stream handed to the decoder.
    pub packets_read: u64,
    /// Packets of other streams that were dropped.
    pub packets_skipped: u64,
    pub frames_decoded: u64,
    /// Frames accepted by the encoder.
    pub frames_encoded: u64,
    pub packets_written: u64,
    /// Frames that went through the software scaler instead of a copy.
    pub frames_scaled: u64,
    /// Frames that carried unregistered SEI data to the encoder.
    pub sei_propagated: u64,
    pub state: TranscodeState,
    pub encoder_time_base: Rational,
    /// Time base the muxer settled on for the output stream.
    pub output_time_base: Option<Rational>,
}

impl fmt::Display for TranscodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} packets read ({} skipped), {} frames decoded, {} encoded, {} packets written",
            self.state,
            self.packets_read,
            self.packets_skipped,
            self.frames_decoded,
            self.frames_encoded,
            self.packets_written,
        )
    }
}

/**
    A run that did not complete.

    The output was still finalized before this was returned. `report` holds
    the counts up to the failure, and its state is `Aborted` unless only the
    trailer failed to write.
*/
#[derive(Debug, thiserror::Error)]
#[error("transcode stopped ({}) after {} packets written", .report.state, .report.packets_written)]
pub struct TranscodeFailure {
    pub report: TranscodeReport,
    #[source]
    pub error: Error,
}

/**
    A single-stream transcode from one file to another.

    Every stage is opened by [`new`](Self::new), so a returned `Transcoder`
    has already written the output header. [`run`](Self::run) then pumps
    packets through to the end of input and finalizes the file.

    The packet and frame buffers are allocated once and reused for the
    whole file.

    # Example

    ```ignore
    let transcoder = Transcoder::new(TranscodeConfig::default())?;
    let report = transcoder.run()?;
    println!("{}", report);
    ```
*/
pub struct Transcoder {
    config: TranscodeConfig,
    source: Source,
    decoder: VideoDecoder,
    converter: FrameConverter,
    encoder: VideoEncoder,
    sink: Sink,
    state: TranscodeState,
    packet_in: Packet,
    frame_in: VideoFrame,
    packet_out: Packet,
    packets_read: u64,
    packets_skipped: u64,
    frames_decoded: u64,
    frames_encoded: u64,
}

impl Transcoder {
    /**
        Open the input, the decoder, the encoder and the output.

        Nothing is left on disk if this fails: an output file created before
        the failure is removed again.
    */
    pub fn new(config: TranscodeConfig) -> Result<Self> {
        config.validate()?;

        let source = Source::open(&config.input, config.source_config())?;
        let stream = source.stream_info().clone();
        let decoder = VideoDecoder::new(source.codec_config().clone(), &stream)?;

        let mut sink = Sink::file(&config.output, config.sink_config())?;
        let (encoder, converter) = match open_output(&config, &stream, &mut sink) {
            Ok(stages) => stages,
            Err(e) => {
                drop(sink);
                if let Err(remove) = std::fs::remove_file(&config.output) {
                    log::warn!(
                        "[pipeline] could not remove {}: {}",
                        config.output.display(),
                        remove
                    );
                }
                return Err(e);
            }
        };

        Ok(Self {
            config,
            source,
            decoder,
            converter,
            encoder,
            sink,
            state: TranscodeState::default(),
            packet_in: Packet::empty(),
            frame_in: VideoFrame::empty(),
            packet_out: Packet::empty(),
            packets_read: 0,
            packets_skipped: 0,
            frames_decoded: 0,
            frames_encoded: 0,
        })
    }

    /**
        The input stream being transcoded.
    */
    pub fn stream_info(&self) -> &VideoStreamInfo {
        self.source.stream_info()
    }

    /**
        Print FFmpeg's description of the input and the output to stderr.
    */
    pub fn dump_formats(&self) {
        self.source.dump_format();
        self.sink.dump_format();
    }

    /**
        Transcode the whole input and finalize the output.

        The trailer is written whether or not the loop succeeded, and the
        report comes back either way. A loop error takes precedence over a
        trailer error.
    */
    pub fn run(mut self) -> Result<TranscodeReport, TranscodeFailure> {
        log::info!(
            "[pipeline] transcoding {} -> {}",
            self.config.input.display(),
            self.config.output.display()
        );

        let outcome = self.drive();
        if let Err(e) = &outcome {
            log::error!("[pipeline] aborted while {}: {}", self.state, e);
            self.state = self.state.on(Event::Failed);
        }

        let teardown = self.sink.finish();
        if let Err(e) = &teardown {
            log::error!("[pipeline] failed to finalize output: {}", e);
        }

        let report = self.report();
        log::info!("[pipeline] {}", report);

        match outcome.and(teardown) {
            Ok(()) => Ok(report),
            Err(error) => Err(TranscodeFailure { report, error }),
        }
    }

    fn report(&self) -> TranscodeReport {
        TranscodeReport {
            packets_read: self.packets_read,
            packets_skipped: self.packets_skipped,
            frames_decoded: self.frames_decoded,
            frames_encoded: self.frames_encoded,
            packets_written: self.sink.packets_written(),
            frames_scaled: self.converter.frames_scaled(),
            sei_propagated: self.converter.sei_propagated(),
            state: self.state,
            encoder_time_base: self.encoder.time_base(),
            output_time_base: self.sink.stream_time_base(),
        }
    }

    fn drive(&mut self) -> Result<()> {
        while !self.state.is_terminal() {
            match self.state {
                TranscodeState::Normal => self.step_input()?,
                TranscodeState::InputEofFlushing => match self.drain_decoder()? {
                    Received::EndOfStream => self.on_decoder_drained()?,
                    other => {
                        return Err(Error::invalid_state(format!(
                            "decoder reported {:?} after end of input",
                            other
                        )));
                    }
                },
                TranscodeState::DecoderEofFlushing => match self.drain_encoder()? {
                    Received::EndOfStream => self.advance(Event::EncoderDrained)?,
                    other => {
                        return Err(Error::invalid_state(format!(
                            "encoder reported {:?} after end of input",
                            other
                        )));
                    }
                },
                TranscodeState::EncoderEofFlushing => {
                    self.sink.flush()?;
                    self.advance(Event::MuxerFlushed)?;
                }
                TranscodeState::Finished | TranscodeState::Aborted => {}
            }
        }
        Ok(())
    }

    fn advance(&mut self, event: Event) -> Result<()> {
        let next = self.state.on(event);
        if next == TranscodeState::Aborted {
            return Err(Error::invalid_state(format!(
                "unexpected {:?} while {}",
                event, self.state
            )));
        }
        log::debug!("[pipeline] {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn step_input(&mut self) -> Result<()> {
        match self.source.read_packet(&mut self.packet_in)? {
            Read::Packet => {
                self.packets_read += 1;
                self.decode_packet()
            }
            Read::Skipped => {
                self.packets_skipped += 1;
                Ok(())
            }
            Read::EndOfInput => {
                log::debug!(
                    "[pipeline] end of input after {} packets",
                    self.packets_read
                );
                if self.decoder.send_eof()? == Sent::Full {
                    self.expect_decoder_input()?;
                    if self.decoder.send_eof()? == Sent::Full {
                        return Err(Error::invalid_state("decoder refused end of stream"));
                    }
                }
                self.advance(Event::InputExhausted)
            }
        }
    }

    fn decode_packet(&mut self) -> Result<()> {
        if self.decoder.send_packet(&self.packet_in)? == Sent::Full {
            self.expect_decoder_input()?;
            if self.decoder.send_packet(&self.packet_in)? == Sent::Full {
                return Err(Error::invalid_state(
                    "decoder refused a packet after draining",
                ));
            }
        }
        self.expect_decoder_input()
    }

    /**
        Drain the decoder while packets are still flowing in.
    */
    fn expect_decoder_input(&mut self) -> Result<()> {
        match self.drain_decoder()? {
            Received::EndOfStream => Err(Error::invalid_state(
                "decoder ended before end of input",
            )),
            _ => Ok(()),
        }
    }

    /**
        Pull every available frame through the encoder.

        Returns how the decoder stopped: `NeedsInput` or `EndOfStream`.
    */
    fn drain_decoder(&mut self) -> Result<Received> {
        loop {
            match self.decoder.receive_frame(&mut self.frame_in)? {
                Received::Ready => {
                    self.frames_decoded += 1;
                    self.encode_frame()?;
                }
                stopped => return Ok(stopped),
            }
        }
    }

    fn encode_frame(&mut self) -> Result<()> {
        let sent = {
            let frame = self.converter.convert(&self.frame_in)?;
            self.encoder.send_frame(frame)?
        };

        if sent == Sent::Full {
            self.expect_encoder_input()?;
            if self.encoder.send_frame(self.converter.output())? == Sent::Full {
                return Err(Error::invalid_state(
                    "encoder refused a frame after draining",
                ));
            }
        }
        self.frames_encoded += 1;

        self.expect_encoder_input()
    }

    fn on_decoder_drained(&mut self) -> Result<()> {
        log::debug!("[pipeline] decoder drained after {} frames", self.frames_decoded);
        self.advance(Event::DecoderDrained)?;

        if self.encoder.send_eof()? == Sent::Full {
            self.expect_encoder_input()?;
            if self.encoder.send_eof()? == Sent::Full {
                return Err(Error::invalid_state("encoder refused end of stream"));
            }
        }
        Ok(())
    }

    fn expect_encoder_input(&mut self) -> Result<()> {
        match self.drain_encoder()? {
            Received::EndOfStream => Err(Error::invalid_state(
                "encoder ended before end of input",
            )),
            _ => Ok(()),
        }
    }

    /**
        Write every available packet to the output.
    */
    fn drain_encoder(&mut self) -> Result<Received> {
        loop {
            match self.encoder.receive_packet(&mut self.packet_out)? {
                Received::Ready => self.sink.write_packet(&mut self.packet_out)?,
                stopped => return Ok(stopped),
            }
        }
    }
}

/**
    Open the encoder for `stream`, register its stream with the sink and
    write the header.
*/
fn open_output(
    config: &TranscodeConfig,
    stream: &VideoStreamInfo,
    sink: &mut Sink,
) -> Result<(VideoEncoder, FrameConverter)> {
    let encoder_config = config.encoder_config(stream, sink.needs_global_header());
    let encoder = VideoEncoder::new(encoder_config)?;

    sink.add_video_stream(&encoder)?;
    sink.write_header()?;

    let converter =
        FrameConverter::new(encoder.frame_format(), encoder.width(), encoder.height())?
            .with_algorithm(config.video.scaling);
    Ok((encoder, converter))
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("source", &self.source)
            .field("encoder", &self.encoder)
            .field("sink", &self.sink)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(state: TranscodeState) -> TranscodeReport {
        TranscodeReport {
            packets_read: 10,
            packets_skipped: 4,
            frames_decoded: 10,
            frames_encoded: 10,
            packets_written: 10,
            frames_scaled: 0,
            sei_propagated: 0,
            state,
            encoder_time_base: Rational::new(1, 25),
            output_time_base: Some(Rational::new(1, 12800)),
        }
    }

    #[test]
    fn report_summarizes_counts() {
        assert_eq!(
            report(TranscodeState::Finished).to_string(),
            "finished: 10 packets read (4 skipped), 10 frames decoded, 10 encoded, \
             10 packets written"
        );
    }

    #[test]
    fn failure_carries_the_report_and_the_cause() {
        let failure = TranscodeFailure {
            report: report(TranscodeState::Aborted),
            error: Error::codec("failed to read packet: Invalid data found"),
        };
        assert_eq!(
            failure.to_string(),
            "transcode stopped (aborted) after 10 packets written"
        );

        let cause = std::error::Error::source(&failure).unwrap();
        assert!(cause.to_string().contains("failed to read packet"));
    }

    #[test]
    fn invalid_config_fails_before_opening_anything() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TranscodeConfig::default();
        config.input = dir.path().join("missing.mp4");
        config.output = dir.path().join("out.mp4");
        config.video.crf = Some(99);

        let err = Transcoder::new(config).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)), "{}", err);
        assert!(!dir.path().join("out.mp4").exists());
    }
}
