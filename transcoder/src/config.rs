/*!
    Transcode settings, loaded from YAML.
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use transcode_encode::{EncoderPreset, MAX_CRF, VideoEncoderConfig};
use transcode_sink::{SinkConfig, TimestampMode};
use transcode_source::{SourceConfig, StreamSelection};
use transcode_transform::ScalingAlgorithm;
use transcode_types::{CodecId, Error, PixelFormat, VideoStreamInfo};

/** Largest B-frame run accepted by x264 and x265. */
const MAX_B_FRAMES: u32 = 16;

/**
    Everything a transcode run needs to know.

    Loaded from YAML (every field optional) and then overridden by CLI flags.
    The defaults transcode `in.mp4` to `out.mp4` with H.264.
*/
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscodeConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Input stream to transcode: an index or `best`.
    pub stream: StreamSelection,
    pub video: VideoSettings,
    /// `copy` writes encoder timestamps unchanged, `rescale` converts them
    /// to the output stream's time base.
    pub timestamps: TimestampMode,
    /// Move the MP4 index to the front of the file.
    pub fast_start: bool,
}

/**
    Encoder settings.
*/
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoSettings {
    pub codec: CodecId,
    pub pixel_format: PixelFormat,
    /// Bits per second; unset inherits the input stream's bitrate.
    pub bitrate: Option<u64>,
    pub preset: EncoderPreset,
    /// Constant rate factor; `null` leaves the encoder default.
    pub crf: Option<u8>,
    pub b_frames: u32,
    /// Resampling used when the decoded pictures are not in the encoder's
    /// pixel format.
    pub scaling: ScalingAlgorithm,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("in.mp4"),
            output: PathBuf::from("out.mp4"),
            stream: StreamSelection::default(),
            video: VideoSettings::default(),
            timestamps: TimestampMode::default(),
            fast_start: false,
        }
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            codec: CodecId::H264,
            pixel_format: PixelFormat::Yuv420p,
            bitrate: None,
            preset: EncoderPreset::Fast,
            crf: Some(transcode_encode::DEFAULT_CRF),
            b_frames: 1,
            scaling: ScalingAlgorithm::default(),
        }
    }
}

impl TranscodeConfig {
    /**
        Parse a YAML document.
    */
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("invalid transcode config")
    }

    /**
        Load a YAML config file.
    */
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&contents).with_context(|| format!("in {}", path.display()))
    }

    /**
        Reject settings that cannot produce an output.
    */
    pub fn validate(&self) -> transcode_types::Result<()> {
        if !self.video.codec.is_encodable() {
            return Err(Error::invalid_data(format!(
                "cannot encode to {}; use h264 or h265",
                self.video.codec
            )));
        }
        if let Some(crf) = self.video.crf {
            if crf > MAX_CRF {
                return Err(Error::invalid_data(format!(
                    "crf {} is out of range 0-{}",
                    crf, MAX_CRF
                )));
            }
        }
        if self.video.b_frames > MAX_B_FRAMES {
            return Err(Error::invalid_data(format!(
                "{} b-frames is more than the maximum of {}",
                self.video.b_frames, MAX_B_FRAMES
            )));
        }
        if self.input == self.output {
            return Err(Error::invalid_data(format!(
                "input and output are the same file: {}",
                self.input.display()
            )));
        }
        Ok(())
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::default().with_stream(self.stream)
    }

    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig::default()
            .with_timestamps(self.timestamps)
            .with_fast_start(self.fast_start)
    }

    /**
        Encoder settings for the given input stream.

        Size, time base, frame rate and aspect ratio are copied from the
        input so frames pass through with their timestamps unchanged.
    */
    pub fn encoder_config(
        &self,
        input: &VideoStreamInfo,
        global_header: bool,
    ) -> VideoEncoderConfig {
        let config = VideoEncoderConfig::new(
            self.video.codec,
            input.width,
            input.height,
            input.time_base,
        )
        .with_pixel_format(self.video.pixel_format)
        .with_frame_rate(input.frame_rate)
        .with_bitrate(self.video.bitrate.or(input.bitrate))
        .with_sample_aspect_ratio(input.sample_aspect_ratio)
        .with_max_b_frames(self.video.b_frames)
        .with_preset(self.video.preset)
        .with_global_header(global_header);

        match self.video.crf {
            Some(crf) => config.with_crf(crf),
            None => config.without_crf(),
        }
    }
}
