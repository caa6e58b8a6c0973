/*!
    Stream information types.
*/

use std::time::Duration;

use crate::{CodecId, PixelFormat, Rational};

/**
    Information about a video stream.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoStreamInfo {
    /// Index of the stream inside its container.
    pub index: usize,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format, if it is one the transcoder has a name for.
    pub pixel_format: Option<PixelFormat>,
    /// Guessed frame rate (may be unavailable).
    pub frame_rate: Option<Rational>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Total duration (may be unavailable for some streams).
    pub duration: Option<Duration>,
    /// Codec used.
    pub codec_id: CodecId,
    /// Bitrate in bits per second (if known).
    pub bitrate: Option<u64>,
    /// Sample aspect ratio (if known).
    pub sample_aspect_ratio: Option<Rational>,
}

impl VideoStreamInfo {
    /**
        Returns the display aspect ratio as a float.
    */
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        let sar = self
            .sample_aspect_ratio
            .map(Rational::to_f64)
            .unwrap_or(1.0);
        self.width as f64 * sar / self.height as f64
    }

    /**
        Returns the frame rate as fps, if available.
    */
    pub fn fps(&self) -> Option<f64> {
        self.frame_rate.map(|r| r.to_f64())
    }
}

/**
    Summary of a media file, as reported by a probe.
*/
#[derive(Clone, Debug, Default)]
pub struct MediaInfo {
    /// Short name of the container format (e.g. "mov,mp4,m4a,3gp,3g2,mj2").
    pub format_name: String,
    /// Total duration of the media (may be unavailable).
    pub duration: Option<Duration>,
    /// Number of streams of any type in the container.
    pub stream_count: usize,
    /// Every video stream, in container order.
    pub video_streams: Vec<VideoStreamInfo>,
}

impl MediaInfo {
    /**
        Returns true if this media has at least one video stream.
    */
    pub fn has_video(&self) -> bool {
        !self.video_streams.is_empty()
    }
}
