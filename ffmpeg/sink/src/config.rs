/*!
    Sink configuration types.
*/

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use transcode_types::ParseError;

/**
    How packet timestamps are handled on their way into the container.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    /// Write the encoder's timestamps unchanged, even if the container
    /// stream settled on a different time base.
    #[default]
    Copy,
    /// Rescale timestamps from the encoder time base to the stream's.
    Rescale,
}

impl TimestampMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Rescale => "rescale",
        }
    }
}

impl fmt::Display for TimestampMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "copy" => Ok(Self::Copy),
            "rescale" => Ok(Self::Rescale),
            _ => Err(ParseError::new("timestamp mode", s)),
        }
    }
}

/**
    Configuration for creating a sink.
*/
#[derive(Clone, Debug, Default)]
pub struct SinkConfig {
    /// Timestamp handling for written packets.
    pub timestamps: TimestampMode,
    /// Move the MP4 index to the front of the file when the trailer is written.
    pub fast_start: bool,
}

impl SinkConfig {
    pub fn with_timestamps(mut self, timestamps: TimestampMode) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_fast_start(mut self, fast_start: bool) -> Self {
        self.fast_start = fast_start;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_copied_by_default() {
        assert_eq!(SinkConfig::default().timestamps, TimestampMode::Copy);
        assert!(!SinkConfig::default().fast_start);
    }

    #[test]
    fn timestamp_mode_parses() {
        assert_eq!("Rescale".parse(), Ok(TimestampMode::Rescale));
        assert_eq!(TimestampMode::Copy.to_string(), "copy");
        assert!("drift".parse::<TimestampMode>().is_err());
    }
}
