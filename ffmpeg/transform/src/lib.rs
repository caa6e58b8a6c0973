/*!
    Frame preparation between the decoder and encoder.

    Decoded frames are copied into a single reusable frame in the encoder's
    pixel format and size. Timestamps and unregistered SEI user data travel
    with the picture; a software scaler is brought in only when the decoder
    output does not already match what the encoder expects.
*/

mod video;

pub use self::video::{FrameConverter, ScalingAlgorithm};

pub use transcode_types::{Error, Result};
