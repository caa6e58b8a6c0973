/*!
    Output container writing for the transcoder.

    This crate handles the output side of the pipeline. It creates the
    container named by the output path, adds the single video stream described
    by the encoder, and writes encoded packets through FFmpeg's interleaving
    queue until the trailer is written.
*/

mod config;
mod sink;

pub use self::config::{SinkConfig, TimestampMode};
pub use self::sink::Sink;

pub use transcode_types::{Error, Rational, Result};
