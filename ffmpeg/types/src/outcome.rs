/*!
    Outcomes of the send/receive calls on decoders and encoders.
*/

/**
    Result of pulling one unit of output from a decoder or encoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Received {
    /// A frame or packet was written into the caller's buffer.
    Ready,
    /// Nothing is available until more input is sent ("would block").
    NeedsInput,
    /// The codec has been fully drained after end of stream was signalled.
    EndOfStream,
}

/**
    Result of pushing one unit of input into a decoder or encoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sent {
    /// The input was accepted.
    Accepted,
    /// The codec's output must be drained before it accepts more input.
    Full,
}
