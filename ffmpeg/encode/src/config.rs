/*!
    Encoder configuration types.
*/

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use transcode_types::{CodecId, ParseError, PixelFormat, Rational};

/**
    x264/x265 speed preset, passed to the encoder as the `preset` option.

    Each step down the list trades encoding time for a smaller file at the
    same CRF.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    #[default]
    Fast,
    /// x264's own default.
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl EncoderPreset {
    pub const ALL: [Self; 9] = [
        Self::Ultrafast,
        Self::Superfast,
        Self::Veryfast,
        Self::Faster,
        Self::Fast,
        Self::Medium,
        Self::Slow,
        Self::Slower,
        Self::Veryslow,
    ];

    /**
        Name as x264 and x265 spell it.
    */
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl fmt::Display for EncoderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncoderPreset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == name)
            .ok_or_else(|| ParseError::new("preset", s))
    }
}

/** Highest quantizer x264 and x265 accept for `crf`. */
pub const MAX_CRF: u8 = 51;

/** Quantizer target used when none is configured. */
pub const DEFAULT_CRF: u8 = 23;

/**
    Configuration for video encoding.

    Size, time base, rate and aspect ratio normally come straight from the
    input stream, so the output matches it frame for frame.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoEncoderConfig {
    /// H.264 or H.265.
    pub codec: CodecId,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format the encoder is opened with.
    pub pixel_format: PixelFormat,
    /// Time base of the frames that will be submitted.
    pub time_base: Rational,
    /// Nominal frame rate, if known.
    pub frame_rate: Option<Rational>,
    /// Target bitrate in bits per second (None = encoder default).
    pub bitrate: Option<u64>,
    /// Sample aspect ratio (None = unknown).
    pub sample_aspect_ratio: Option<Rational>,
    /// Maximum number of consecutive B-frames.
    pub max_b_frames: u32,
    pub preset: EncoderPreset,
    /// Constant rate factor (None = encoder default).
    pub crf: Option<u8>,
    /// Emit codec headers out-of-band, for containers that want them.
    pub global_header: bool,
}

impl VideoEncoderConfig {
    /**
        Settings for `codec` at the given size, with the default preset and CRF.
    */
    pub fn new(codec: CodecId, width: u32, height: u32, time_base: Rational) -> Self {
        Self {
            codec,
            width,
            height,
            pixel_format: PixelFormat::Yuv420p,
            time_base,
            frame_rate: None,
            bitrate: None,
            sample_aspect_ratio: None,
            max_b_frames: 1,
            preset: EncoderPreset::default(),
            crf: Some(DEFAULT_CRF),
            global_header: false,
        }
    }

    /**
        Create configuration for H.264 encoding.
    */
    pub fn h264(width: u32, height: u32, time_base: Rational) -> Self {
        Self::new(CodecId::H264, width, height, time_base)
    }

    /**
        Create configuration for H.265/HEVC encoding.
    */
    pub fn h265(width: u32, height: u32, time_base: Rational) -> Self {
        Self::new(CodecId::H265, width, height, time_base)
    }

    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: Option<Rational>) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /**
        Set the target bitrate in bits per second.
    */
    pub fn with_bitrate(mut self, bitrate: Option<u64>) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_sample_aspect_ratio(mut self, sar: Option<Rational>) -> Self {
        self.sample_aspect_ratio = sar;
        self
    }

    pub fn with_max_b_frames(mut self, frames: u32) -> Self {
        self.max_b_frames = frames;
        self
    }

    /**
        Set the speed preset.
    */
    pub fn with_preset(mut self, preset: EncoderPreset) -> Self {
        self.preset = preset;
        self
    }

    /**
        Set the constant rate factor. Values above [`MAX_CRF`] are clamped.
    */
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = Some(crf.min(MAX_CRF));
        self
    }

    pub fn without_crf(mut self) -> Self {
        self.crf = None;
        self
    }

    pub fn with_global_header(mut self, global_header: bool) -> Self {
        self.global_header = global_header;
        self
    }

    /**
        Private options passed to the encoder when it is opened.

        For H.264, `udu_sei` makes libx264 write the unregistered SEI side
        data attached to each frame into the bitstream. Without it the
        side data copied by the frame converter is dropped at the encoder.
    */
    pub fn codec_options(&self) -> Vec<(&'static str, String)> {
        let mut options = vec![("preset", self.preset.as_str().to_string())];
        if let Some(crf) = self.crf {
            options.push(("crf", crf.to_string()));
        }
        if self.codec == CodecId::H264 {
            options.push(("udu_sei", "1".to_string()));
        }
        options
    }
}
