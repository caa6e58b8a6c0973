/*!
    Pixel format and codec identifier types.
*/

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ParseError;

/**
    Video pixel formats.

    This is the subset of FFmpeg pixel formats the transcoder can describe
    and request from an encoder. Decoded frames in any other format are still
    accepted; they are converted on the way to the encoder.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp
    #[default]
    Yuv420p,
    /// Semi-planar YUV 4:2:0, 12bpp
    Nv12,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit
    Yuv420p10,
    /// Semi-planar YUV 4:2:0, 10-bit little-endian
    P010le,
}

impl PixelFormat {
    /**
        Returns the FFmpeg name of this format.
    */
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Nv12 => "nv12",
            Self::Bgra => "bgra",
            Self::Rgba => "rgba",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuv420p10 => "yuv420p10le",
            Self::P010le => "p010le",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yuv420p" | "i420" => Ok(Self::Yuv420p),
            "nv12" => Ok(Self::Nv12),
            "bgra" => Ok(Self::Bgra),
            "rgba" => Ok(Self::Rgba),
            "rgb24" => Ok(Self::Rgb24),
            "bgr24" => Ok(Self::Bgr24),
            "yuv422p" => Ok(Self::Yuv422p),
            "yuv444p" => Ok(Self::Yuv444p),
            "yuv420p10" | "yuv420p10le" => Ok(Self::Yuv420p10),
            "p010" | "p010le" => Ok(Self::P010le),
            _ => Err(ParseError::new("pixel format", s)),
        }
    }
}

impl TryFrom<String> for PixelFormat {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/**
    Video codec identifiers.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
#[non_exhaustive]
pub enum CodecId {
    /// H.264 / AVC
    #[default]
    H264,
    /// H.265 / HEVC
    H265,
    Vp8,
    Vp9,
    Av1,
    /// MPEG-4 Part 2
    Mpeg4,
    Mpeg2Video,
    /// Anything the transcoder has no name for.
    Unknown,
}

impl CodecId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Mpeg4 => "mpeg4",
            Self::Mpeg2Video => "mpeg2video",
            Self::Unknown => "unknown",
        }
    }

    /**
        Returns true if the transcoder can produce this codec.
    */
    pub const fn is_encodable(self) -> bool {
        matches!(self, Self::H264 | Self::H265)
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h264" | "avc" => Ok(Self::H264),
            "h265" | "hevc" => Ok(Self::H265),
            "vp8" => Ok(Self::Vp8),
            "vp9" => Ok(Self::Vp9),
            "av1" => Ok(Self::Av1),
            "mpeg4" => Ok(Self::Mpeg4),
            "mpeg2video" | "mpeg2" => Ok(Self::Mpeg2Video),
            _ => Err(ParseError::new("codec", s)),
        }
    }
}

impl TryFrom<String> for CodecId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_names_parse_back() {
        for format in [
            PixelFormat::Yuv420p,
            PixelFormat::Yuv444p,
            PixelFormat::Yuv420p10,
            PixelFormat::P010le,
        ] {
            assert_eq!(format.as_str().parse::<PixelFormat>(), Ok(format));
        }
        assert_eq!("I420".parse::<PixelFormat>(), Ok(PixelFormat::Yuv420p));
        assert!("yuv411p".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn codec_aliases() {
        assert_eq!("avc".parse::<CodecId>(), Ok(CodecId::H264));
        assert_eq!("HEVC".parse::<CodecId>(), Ok(CodecId::H265));
        assert_eq!(CodecId::H265.to_string(), "hevc");
        let err = "prores".parse::<CodecId>().unwrap_err();
        assert_eq!(err.kind, "codec");
    }

    #[test]
    fn only_h26x_is_encodable() {
        assert!(CodecId::H264.is_encodable());
        assert!(CodecId::H265.is_encodable());
        assert!(!CodecId::Mpeg4.is_encodable());
        assert!(!CodecId::Unknown.is_encodable());
    }
}
