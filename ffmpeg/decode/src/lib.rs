/*!
    Video decoding for the transcoder.

    This crate turns compressed packets of the selected input stream into
    raw frames. It exposes the codec's send/receive protocol directly:
    the caller owns the packet and frame buffers and decides when to drain.
*/

mod video;

pub use self::video::VideoDecoder;

pub use transcode_types::{Error, Received, Result, Sent};
