/*!
    Shared types for the transcoder crates.

    This crate defines the vocabulary that crosses crate boundaries: errors,
    rationals, pixel formats, codec identifiers, stream descriptions and the
    outcomes of send/receive calls on codecs. It has no dependency on FFmpeg,
    so configuration and CLI code can use it without pulling in the bindings.
*/

mod error;
mod format;
mod outcome;
mod rational;
mod stream;

pub use self::error::{Error, ParseError, Result};
pub use self::format::{CodecId, PixelFormat};
pub use self::outcome::{Received, Sent};
pub use self::rational::Rational;
pub use self::stream::{MediaInfo, VideoStreamInfo};
