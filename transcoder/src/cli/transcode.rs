use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use transcode_encode::EncoderPreset;
use transcode_types::{CodecId, PixelFormat};
use transcoder::{ScalingAlgorithm, StreamSelection, TimestampMode, TranscodeConfig, Transcoder};

#[derive(Parser, Debug, Default)]
pub struct TranscodeCommand {
    /// Input media file [default: in.mp4]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file; the container follows the extension [default: out.mp4]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// YAML config file; flags given here override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output codec (h264 or h265)
    #[arg(long)]
    pub codec: Option<CodecId>,

    /// Pixel format the encoder is opened with
    #[arg(long)]
    pub pixel_format: Option<PixelFormat>,

    /// Target bitrate in bits per second [default: the input's]
    #[arg(long)]
    pub bitrate: Option<u64>,

    /// Encoder speed preset
    #[arg(long)]
    pub preset: Option<EncoderPreset>,

    /// Constant rate factor
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Maximum consecutive B-frames
    #[arg(long)]
    pub b_frames: Option<u32>,

    /// Resampling for input that is not in the encoder's pixel format
    #[arg(long)]
    pub scaling: Option<ScalingAlgorithm>,

    /// Input stream to transcode: an index or "best"
    #[arg(long)]
    pub stream: Option<StreamSelection>,

    /// Rescale packet timestamps to the output stream's time base
    #[arg(long)]
    pub rescale_timestamps: bool,

    /// Move the MP4 index to the start of the file
    #[arg(long)]
    pub fast_start: bool,

    /// Print FFmpeg's description of the input and output
    #[arg(long)]
    pub dump_format: bool,

    /// Wait for Enter before exiting [default: exit right away]
    #[arg(long)]
    pub pause: bool,
}

impl TranscodeCommand {
    pub fn run(self) -> Result<()> {
        let config = self.config()?;
        let transcoder = Transcoder::new(config).context("failed to set up transcode")?;

        let stream = transcoder.stream_info();
        println!("size = {}x{}", stream.width, stream.height);

        if self.dump_format {
            transcoder.dump_formats();
        }

        let result = transcoder.run();
        println!("finished");

        if self.pause {
            wait_for_enter();
        }

        result.context("transcode failed")?;
        Ok(())
    }

    /**
        The config file (or the defaults) with this command's flags applied.
    */
    pub fn config(&self) -> Result<TranscodeConfig> {
        let mut config = match &self.config {
            Some(path) => TranscodeConfig::load(path)?,
            None => TranscodeConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(stream) = self.stream {
            config.stream = stream;
        }
        if let Some(codec) = self.codec {
            config.video.codec = codec;
        }
        if let Some(pixel_format) = self.pixel_format {
            config.video.pixel_format = pixel_format;
        }
        if let Some(bitrate) = self.bitrate {
            config.video.bitrate = Some(bitrate);
        }
        if let Some(preset) = self.preset {
            config.video.preset = preset;
        }
        if let Some(crf) = self.crf {
            config.video.crf = Some(crf);
        }
        if let Some(b_frames) = self.b_frames {
            config.video.b_frames = b_frames;
        }
        if let Some(scaling) = self.scaling {
            config.video.scaling = scaling;
        }
        if self.rescale_timestamps {
            config.timestamps = TimestampMode::Rescale;
        }
        if self.fast_start {
            config.fast_start = true;
        }

        Ok(config)
    }
}

fn wait_for_enter() {
    println!("press Enter to exit");
    let mut byte = [0u8; 1];
    if let Err(e) = std::io::stdin().read(&mut byte) {
        log::warn!("failed to read stdin: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_keeps_the_defaults() {
        let config = TranscodeCommand::default().config().unwrap();
        assert_eq!(config, TranscodeConfig::default());
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcode.yaml");
        std::fs::write(
            &path,
            "input: from-file.mkv\nvideo:\n  preset: slow\n  crf: 30\n",
        )
        .unwrap();

        let command = TranscodeCommand {
            config: Some(path),
            output: Some(PathBuf::from("flag.mkv")),
            crf: Some(20),
            scaling: Some(ScalingAlgorithm::Bicubic),
            stream: Some(StreamSelection::BestVideo),
            rescale_timestamps: true,
            ..Default::default()
        };
        let config = command.config().unwrap();

        assert_eq!(config.input, PathBuf::from("from-file.mkv"));
        assert_eq!(config.output, PathBuf::from("flag.mkv"));
        assert_eq!(config.video.preset, EncoderPreset::Slow);
        assert_eq!(config.video.crf, Some(20));
        assert_eq!(config.video.scaling, ScalingAlgorithm::Bicubic);
        assert_eq!(config.stream, StreamSelection::BestVideo);
        assert_eq!(config.timestamps, TimestampMode::Rescale);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let command = TranscodeCommand {
            config: Some(PathBuf::from("/nonexistent/transcode.yaml")),
            ..Default::default()
        };
        assert!(command.config().is_err());
    }
}
