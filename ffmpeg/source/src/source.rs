/*!
    Media source implementation.
*/

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ffmpeg_next::{Packet, format::context::Input as InputContext, media::Type};
use serde::Deserialize;

use transcode_types::{Error, ParseError, Result, VideoStreamInfo};

use crate::codec_config::CodecConfig;
use crate::convert::open_error;
use crate::probe::video_stream_info;

/**
    Which stream of the input to transcode.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SelectionRepr")]
pub enum StreamSelection {
    /// The stream at this container index. It must be a video stream.
    Index(usize),
    /// Whatever FFmpeg ranks as the best video stream.
    BestVideo,
}

impl Default for StreamSelection {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl fmt::Display for StreamSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "index {}", index),
            Self::BestVideo => f.write_str("best video"),
        }
    }
}

impl FromStr for StreamSelection {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("best") {
            return Ok(Self::BestVideo);
        }
        s.parse()
            .map(Self::Index)
            .map_err(|_| ParseError::new("stream", s))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    Index(usize),
    Name(String),
}

impl TryFrom<SelectionRepr> for StreamSelection {
    type Error = ParseError;

    fn try_from(value: SelectionRepr) -> std::result::Result<Self, Self::Error> {
        match value {
            SelectionRepr::Index(index) => Ok(Self::Index(index)),
            SelectionRepr::Name(name) => name.parse(),
        }
    }
}

/**
    Configuration for opening a media source.
*/
#[derive(Clone, Debug, Default)]
pub struct SourceConfig {
    /// Stream to transcode.
    pub stream: StreamSelection,
}

impl SourceConfig {
    pub fn with_stream(mut self, stream: StreamSelection) -> Self {
        self.stream = stream;
        self
    }
}

/**
    Outcome of reading one packet from the container.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Read {
    /// The buffer holds a packet of the selected stream.
    Packet,
    /// A packet of some other stream was read and dropped.
    Skipped,
    /// The container has no more packets.
    EndOfInput,
}

/**
    An opened input with one selected video stream.

    Packets are read into a buffer owned by the caller, so the same
    allocation is reused for the whole file.
*/
pub struct Source {
    input: InputContext,
    path: PathBuf,
    stream_index: usize,
    stream_info: VideoStreamInfo,
    codec_config: CodecConfig,
}

impl Source {
    /**
        Open a media file and select the stream to transcode.

        # Example

        ```ignore
        let source = Source::open("in.mp4", SourceConfig::default())?;
        let info = source.stream_info();
        println!("size = {}x{}", info.width, info.height);
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P, config: SourceConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let path = path.as_ref();
        let input = ffmpeg_next::format::input(&path).map_err(|e| open_error(path, e))?;

        let (stream_index, stream_info, codec_config) = {
            let stream = match config.stream {
                StreamSelection::Index(index) => input.stream(index),
                StreamSelection::BestVideo => input.streams().best(Type::Video),
            }
            .ok_or_else(|| Error::stream_not_found(config.stream.to_string()))?;

            let info = video_stream_info(&input, &stream)?;
            (
                stream.index(),
                info,
                CodecConfig::new(stream.parameters()),
            )
        };

        log::info!(
            "[source] opened {} ({}), stream {}: {} {}x{} tb={}",
            path.display(),
            input.format().name(),
            stream_index,
            stream_info.codec_id,
            stream_info.width,
            stream_info.height,
            stream_info.time_base,
        );

        Ok(Self {
            input,
            path: path.to_path_buf(),
            stream_index,
            stream_info,
            codec_config,
        })
    }

    /**
        Description of the selected stream.
    */
    pub fn stream_info(&self) -> &VideoStreamInfo {
        &self.stream_info
    }

    /**
        Codec parameters of the selected stream.

        Pass this to `transcode-decode` to create the decoder.
    */
    pub fn codec_config(&self) -> &CodecConfig {
        &self.codec_config
    }

    /**
        Read the next packet of the container into `packet`.

        Whatever the buffer held before is released first. Packets of other
        streams are read and reported as [`Read::Skipped`]; the buffer
        contents are unspecified in that case.
    */
    pub fn read_packet(&mut self, packet: &mut Packet) -> Result<Read> {
        // SAFETY: the packet owns its AVPacket; unref leaves it blank and reusable
        unsafe {
            ffmpeg_next::ffi::av_packet_unref(packet.as_mut_ptr());
        }

        match packet.read(&mut self.input) {
            Ok(()) if packet.stream() == self.stream_index => Ok(Read::Packet),
            Ok(()) => Ok(Read::Skipped),
            Err(ffmpeg_next::Error::Eof) => Ok(Read::EndOfInput),
            Err(e) => Err(Error::codec(format!("failed to read packet: {}", e))),
        }
    }

    /**
        Print FFmpeg's description of the input to stderr.
    */
    pub fn dump_format(&self) {
        let url = self.path.to_string_lossy();
        ffmpeg_next::format::context::input::dump(&self.input, 0, Some(url.as_ref()));
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("stream_info", &self.stream_info)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_selection_defaults_to_first_stream() {
        assert_eq!(StreamSelection::default(), StreamSelection::Index(0));
        assert_eq!(SourceConfig::default().stream, StreamSelection::Index(0));
    }

    #[test]
    fn stream_selection_parses() {
        assert_eq!("2".parse(), Ok(StreamSelection::Index(2)));
        assert_eq!(" BEST ".parse(), Ok(StreamSelection::BestVideo));
        let err = "video".parse::<StreamSelection>().unwrap_err();
        assert_eq!(err.kind, "stream");
        assert!("-1".parse::<StreamSelection>().is_err());
    }

    #[test]
    fn stream_selection_display_names_the_selection() {
        assert_eq!(StreamSelection::Index(1).to_string(), "index 1");
        assert_eq!(StreamSelection::BestVideo.to_string(), "best video");
    }

    #[test]
    fn missing_input_is_not_found() {
        let err = Source::open("does/not/exist.mp4", SourceConfig::default()).unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {}", err);
    }
}
