/*!
    Decoded frame to encoder frame conversion.
*/

use std::fmt;
use std::str::FromStr;

use ffmpeg_next::{
    ffi,
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use serde::Deserialize;

use transcode_types::{Error, ParseError, Result};

const SEI_UNREGISTERED: ffi::AVFrameSideDataType =
    ffi::AVFrameSideDataType::AV_FRAME_DATA_SEI_UNREGISTERED;

/**
    Scaling algorithm used when the decoder output needs resampling.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    #[default]
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    pub const ALL: [Self; 4] = [Self::Nearest, Self::Bilinear, Self::Bicubic, Self::Lanczos];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Lanczos => "lanczos",
        }
    }

    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

impl fmt::Display for ScalingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingAlgorithm {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == name)
            .ok_or_else(|| ParseError::new("scaling algorithm", s))
    }
}

/**
    Copies decoded frames into one reusable frame the encoder accepts.

    The output frame is allocated once, in the target format and size, and
    overwritten on every [`convert`](Self::convert). Each conversion:

    - makes the output writable again, since the encoder may still hold a
      reference to the previous picture
    - copies the picture, or scales it when format or size differ
    - replaces the output's unregistered SEI side data with the input's
    - copies the presentation timestamp unchanged

    The scaler context is created on the first frame that needs it and
    recreated if the decoder output changes shape.
*/
pub struct FrameConverter {
    output: VideoFrameFFmpeg,
    format: Pixel,
    width: u32,
    height: u32,
    algorithm: ScalingAlgorithm,
    scaler_state: Option<ScalerState>,
    frames_scaled: u64,
    sei_propagated: u64,
}

struct ScalerState {
    context: ScalerContext,
    src_width: u32,
    src_height: u32,
    src_format: Pixel,
}

impl FrameConverter {
    /**
        Allocate the output frame for the given encoder format and size.
    */
    pub fn new(format: Pixel, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_data(format!(
                "cannot convert to a {}x{} frame",
                width, height
            )));
        }
        if format == Pixel::None {
            return Err(Error::unsupported_format("no target pixel format"));
        }

        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        Ok(Self {
            output: VideoFrameFFmpeg::new(format, width, height),
            format,
            width,
            height,
            algorithm: ScalingAlgorithm::default(),
            scaler_state: None,
            frames_scaled: 0,
            sei_propagated: 0,
        })
    }

    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /**
        The most recently converted frame.
    */
    pub fn output(&self) -> &VideoFrameFFmpeg {
        &self.output
    }

    /**
        Number of frames that went through the scaler instead of a copy.
    */
    pub fn frames_scaled(&self) -> u64 {
        self.frames_scaled
    }

    /**
        Number of frames that carried unregistered SEI data across.
    */
    pub fn sei_propagated(&self) -> u64 {
        self.sei_propagated
    }

    /**
        Convert `input` into the reusable output frame and return it.

        A missing presentation timestamp falls back to the decoder's
        best-effort timestamp.
    */
    pub fn convert(&mut self, input: &VideoFrameFFmpeg) -> Result<&VideoFrameFFmpeg> {
        if input.width() == 0 || input.height() == 0 {
            return Err(Error::invalid_data("input frame has zero dimensions"));
        }

        // SAFETY: the output frame was allocated with buffers in `new`
        let ret = unsafe { ffi::av_frame_make_writable(self.output.as_mut_ptr()) };
        if ret < 0 {
            return Err(Error::codec(format!(
                "failed to make frame writable: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        if self.matches(input) {
            // SAFETY: both frames have the same format and size
            let ret = unsafe { ffi::av_frame_copy(self.output.as_mut_ptr(), input.as_ptr()) };
            if ret < 0 {
                return Err(Error::codec(format!(
                    "failed to copy frame: {}",
                    ffmpeg_next::Error::from(ret)
                )));
            }
        } else {
            self.scale(input)?;
        }

        if self.copy_sei_unregistered(input)? {
            self.sei_propagated += 1;
        }

        self.output.set_pts(input.pts().or(input.timestamp()));

        Ok(&self.output)
    }

    fn matches(&self, input: &VideoFrameFFmpeg) -> bool {
        input.format() == self.format
            && input.width() == self.width
            && input.height() == self.height
    }

    fn scale(&mut self, input: &VideoFrameFFmpeg) -> Result<()> {
        let needs_init = match &self.scaler_state {
            None => true,
            Some(state) => {
                state.src_width != input.width()
                    || state.src_height != input.height()
                    || state.src_format != input.format()
            }
        };

        if needs_init {
            let context = ScalerContext::get(
                input.format(),
                input.width(),
                input.height(),
                self.format,
                self.width,
                self.height,
                self.algorithm.to_ffmpeg_flags(),
            )
            .map_err(|e| Error::codec(format!("failed to create scaler: {}", e)))?;

            log::debug!(
                "[transform] scaling {:?} {}x{} -> {:?} {}x{}",
                input.format(),
                input.width(),
                input.height(),
                self.format,
                self.width,
                self.height
            );

            self.scaler_state = Some(ScalerState {
                context,
                src_width: input.width(),
                src_height: input.height(),
                src_format: input.format(),
            });
        }

        let Some(state) = self.scaler_state.as_mut() else {
            return Err(Error::invalid_state("scaler not initialized"));
        };

        state
            .context
            .run(input, &mut self.output)
            .map_err(|e| Error::codec(format!("scaling failed: {}", e)))?;

        self.frames_scaled += 1;
        Ok(())
    }

    /**
        Replace the output's unregistered SEI entries with references to the
        input's. Returns true if the input had any.
    */
    fn copy_sei_unregistered(&mut self, input: &VideoFrameFFmpeg) -> Result<bool> {
        let output = unsafe { self.output.as_mut_ptr() };
        let input = unsafe { input.as_ptr() };
        let mut copied = false;

        // SAFETY: both frames are valid; side data buffers are reference
        // counted, so the output shares the input's payload
        unsafe {
            ffi::av_frame_remove_side_data(output, SEI_UNREGISTERED);

            for i in 0..(*input).nb_side_data.max(0) as usize {
                let side_data = *(*input).side_data.add(i);
                if side_data.is_null() || (*side_data).type_ != SEI_UNREGISTERED {
                    continue;
                }
                if (*side_data).buf.is_null() {
                    continue;
                }

                let mut buf = ffi::av_buffer_ref((*side_data).buf);
                if buf.is_null() {
                    return Err(Error::codec("failed to reference SEI side data"));
                }

                if ffi::av_frame_new_side_data_from_buf(output, SEI_UNREGISTERED, buf).is_null() {
                    ffi::av_buffer_unref(&mut buf);
                    return Err(Error::codec("failed to attach SEI side data"));
                }
                copied = true;
            }
        }

        Ok(copied)
    }
}

impl std::fmt::Debug for FrameConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameConverter")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("algorithm", &self.algorithm)
            .field("scaler", &self.scaler_state.is_some())
            .field("frames_scaled", &self.frames_scaled)
            .finish()
    }
}
