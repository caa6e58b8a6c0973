/*!
    Single-stream video transcoding to H.264 or H.265.

    A [`Transcoder`] reads one video stream from an input file, decodes it,
    converts each picture into the encoder's pixel format and writes the
    re-encoded stream to an output container inferred from its extension.
    Other streams in the input are dropped.

    The stages live in their own crates (`transcode-source`,
    `transcode-decode`, `transcode-transform`, `transcode-encode` and
    `transcode-sink`); this crate wires them into a loop driven by
    [`TranscodeState`].
*/

pub mod config;
pub mod pipeline;
pub mod state;

pub use self::config::{TranscodeConfig, VideoSettings};
pub use self::pipeline::{TranscodeFailure, TranscodeReport, Transcoder};
pub use self::state::{Event, TranscodeState};

pub use transcode_sink::TimestampMode;
pub use transcode_source::StreamSelection;
pub use transcode_transform::ScalingAlgorithm;
pub use transcode_types::{Error, Result};
