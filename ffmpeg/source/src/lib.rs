/*!
    Input opening, probing and demuxing for the transcoder.

    This crate handles the input side of the pipeline. It opens a media file,
    selects the video stream to transcode, describes it, and reads compressed
    packets into a caller-owned buffer, dropping packets of every other stream.
*/

mod codec_config;
mod convert;
mod probe;
mod source;

pub use self::codec_config::CodecConfig;
pub use self::probe::probe;
pub use self::source::{Read, Source, SourceConfig, StreamSelection};

pub use transcode_types::{Error, MediaInfo, Rational, Result, VideoStreamInfo};
