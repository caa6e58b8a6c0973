/*!
    Media sink implementation.
*/

use std::ffi::CString;
use std::path::{Path, PathBuf};

use ffmpeg_next::{Dictionary, Packet, ffi, format::context::Output as OutputContext};

use transcode_encode::VideoEncoder;
use transcode_types::{Error, Rational, Result};

use crate::config::{SinkConfig, TimestampMode};

/**
    Media sink for writing to container files.

    The container format is inferred from the file extension. A sink carries
    exactly one video stream, added from the encoder that feeds it.

    # Example

    ```ignore
    let mut sink = Sink::file("out.mp4", SinkConfig::default())?;
    let encoder = VideoEncoder::new(config.with_global_header(sink.needs_global_header()))?;
    sink.add_video_stream(&encoder)?;
    sink.write_header()?;
    // write_packet for every encoded packet, then:
    sink.flush()?;
    sink.finish()?;
    ```
*/
pub struct Sink {
    output: OutputContext,
    path: PathBuf,
    config: SinkConfig,
    stream_index: Option<usize>,
    encoder_time_base: Option<Rational>,
    stream_time_base: Option<Rational>,
    header_written: bool,
    trailer_written: bool,
    packets_written: u64,
}

impl Sink {
    /**
        Create a new sink that writes to a file.

        Fails with `UnsupportedFormat` if no container matches the path's
        extension. The file is created (or truncated) on success.
    */
    pub fn file<P: AsRef<Path>>(path: P, config: SinkConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let path = path.as_ref();
        check_output_format(path)?;

        let output = ffmpeg_next::format::output(&path).map_err(|e| match e {
            ffmpeg_next::Error::Other { errno } => Error::Io(std::io::Error::new(
                std::io::Error::from_raw_os_error(errno).kind(),
                format!("{}: {}", path.display(), e),
            )),
            other => Error::codec(format!("failed to create {}: {}", path.display(), other)),
        })?;

        log::info!(
            "[sink] created {} ({})",
            path.display(),
            output.format().name()
        );

        Ok(Self {
            output,
            path: path.to_path_buf(),
            config,
            stream_index: None,
            encoder_time_base: None,
            stream_time_base: None,
            header_written: false,
            trailer_written: false,
            packets_written: 0,
        })
    }

    /**
        Returns true if the container wants codec headers out-of-band.

        Pass this to the encoder config before opening the encoder.
    */
    pub fn needs_global_header(&self) -> bool {
        self.output
            .format()
            .flags()
            .contains(ffmpeg_next::format::flag::Flags::GLOBAL_HEADER)
    }

    /**
        Add the output video stream, described by an opened encoder.

        Returns the stream index. Only one stream can be added.
    */
    pub fn add_video_stream(&mut self, encoder: &VideoEncoder) -> Result<usize> {
        if self.stream_index.is_some() {
            return Err(Error::invalid_state("output already has a video stream"));
        }
        if self.header_written {
            return Err(Error::invalid_state("cannot add a stream after the header"));
        }

        let parameters = encoder.parameters();
        let time_base = encoder.time_base();

        let mut stream = self
            .output
            .add_stream(parameters.id())
            .map_err(|e| Error::codec(format!("failed to add video stream: {}", e)))?;
        stream.set_parameters(parameters);
        stream.set_time_base(ffmpeg_next::Rational::new(time_base.num, time_base.den));

        let index = stream.index();
        self.stream_index = Some(index);
        self.encoder_time_base = Some(time_base);
        self.stream_time_base = Some(time_base);

        log::debug!("[sink] added video stream {} tb={}", index, time_base);
        Ok(index)
    }

    /**
        Write the container header.

        The muxer may change the stream time base here; read it back with
        [`stream_time_base`](Self::stream_time_base).
    */
    pub fn write_header(&mut self) -> Result<()> {
        let index = self.require_stream()?;
        if self.header_written {
            return Err(Error::invalid_state("header already written"));
        }

        let mut opts = Dictionary::new();
        if self.config.fast_start {
            opts.set("movflags", "+faststart");
        }

        self.output
            .write_header_with(opts)
            .map_err(|e| Error::codec(format!("failed to write header: {}", e)))?;
        self.header_written = true;

        let stream_time_base = self
            .output
            .stream(index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| Error::invalid_state("output stream disappeared"))?;
        let stream_time_base =
            Rational::new(stream_time_base.numerator(), stream_time_base.denominator());
        self.stream_time_base = Some(stream_time_base);

        if self.encoder_time_base != Some(stream_time_base) {
            log::info!(
                "[sink] muxer time base {} differs from encoder time base {} ({} timestamps)",
                stream_time_base,
                self.encoder_time_base.unwrap_or(stream_time_base),
                self.config.timestamps,
            );
        }

        Ok(())
    }

    /**
        Time base of the output stream, as settled by the muxer once the
        header is written.
    */
    pub fn stream_time_base(&self) -> Option<Rational> {
        self.stream_time_base
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /**
        Write one encoded packet through the interleaving queue.

        The packet is routed to the video stream. Its contents are handed to
        the muxer, leaving the buffer blank for reuse.
    */
    pub fn write_packet(&mut self, packet: &mut Packet) -> Result<()> {
        let index = self.require_stream()?;
        if !self.header_written || self.trailer_written {
            return Err(Error::invalid_state("sink is not accepting packets"));
        }

        packet.set_stream(index);

        if self.config.timestamps == TimestampMode::Rescale {
            if let (Some(from), Some(to)) = (self.encoder_time_base, self.stream_time_base) {
                packet.set_pts(packet.pts().map(|ts| Rational::rescale(ts, from, to)));
                packet.set_dts(packet.dts().map(|ts| Rational::rescale(ts, from, to)));
                packet.set_duration(Rational::rescale(packet.duration(), from, to));
            }
        }

        packet
            .write_interleaved(&mut self.output)
            .map_err(|e| Error::codec(format!("failed to write packet: {}", e)))?;

        self.packets_written += 1;
        Ok(())
    }

    /**
        Write out every packet still held in the interleaving queue.
    */
    pub fn flush(&mut self) -> Result<()> {
        if !self.header_written || self.trailer_written {
            return Ok(());
        }

        // SAFETY: a null packet asks the muxer to drain its queue
        let ret = unsafe {
            ffi::av_interleaved_write_frame(self.output.as_mut_ptr(), std::ptr::null_mut())
        };
        if ret < 0 {
            return Err(Error::codec(format!(
                "failed to flush muxer: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }
        Ok(())
    }

    /**
        Write the trailer and finalize the container.

        Safe to call more than once, and a no-op if the header was never
        written. The file may be unplayable if this is not called.
    */
    pub fn finish(&mut self) -> Result<()> {
        if !self.header_written || self.trailer_written {
            return Ok(());
        }
        self.trailer_written = true;

        self.output
            .write_trailer()
            .map_err(|e| Error::codec(format!("failed to write trailer: {}", e)))?;

        log::info!(
            "[sink] finished {} ({} packets)",
            self.path.display(),
            self.packets_written
        );
        Ok(())
    }

    /**
        Print FFmpeg's description of the output to stderr.
    */
    pub fn dump_format(&self) {
        let url = self.path.to_string_lossy();
        ffmpeg_next::format::context::output::dump(&self.output, 0, Some(url.as_ref()));
    }

    fn require_stream(&self) -> Result<usize> {
        self.stream_index
            .ok_or_else(|| Error::invalid_state("no video stream added"))
    }
}

/**
    Check that FFmpeg can infer a container from the path.
*/
fn check_output_format(path: &Path) -> Result<()> {
    let c_path = CString::new(path.to_string_lossy().as_bytes())
        .map_err(|_| Error::invalid_data(format!("invalid output path {}", path.display())))?;

    // SAFETY: only the file name is inspected; the result is a static descriptor
    let format =
        unsafe { ffi::av_guess_format(std::ptr::null(), c_path.as_ptr(), std::ptr::null()) };
    if format.is_null() {
        return Err(Error::unsupported_format(format!(
            "cannot infer a container format from {}",
            path.display()
        )));
    }
    Ok(())
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("header_written", &self.header_written)
            .field("trailer_written", &self.trailer_written)
            .finish_non_exhaustive()
    }
}
