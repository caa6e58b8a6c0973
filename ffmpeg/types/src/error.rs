/*!
    Error types shared by every stage of the transcoder.
*/

use thiserror::Error;

/**
    Result alias used throughout the transcoder crates.
*/
pub type Result<T, E = Error> = std::result::Result<T, E>;

/**
    Errors produced while setting up or running a transcode.

    End of stream and "would block" are not errors; they are reported
    through [`Received`](crate::Received) and [`Sent`](crate::Sent).
*/
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no stream matching {0}")]
    StreamNotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat(message.into())
    }

    pub fn stream_not_found(selection: impl Into<String>) -> Self {
        Self::StreamNotFound(selection.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /**
        Returns true if this error means a file did not exist.
    */
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/**
    Error returned by `FromStr` implementations on enumerated options.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
