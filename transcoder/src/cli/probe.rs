use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ProbeCommand {
    /// Media file to inspect
    pub path: PathBuf,
}

impl ProbeCommand {
    pub fn run(self) -> Result<()> {
        let info = transcode_source::probe(&self.path)
            .with_context(|| format!("failed to probe {}", self.path.display()))?;

        println!("{}: {}", self.path.display(), info.format_name);
        match info.duration {
            Some(duration) => println!("  duration: {:.3}s", duration.as_secs_f64()),
            None => println!("  duration: unknown"),
        }
        println!("  streams: {}", info.stream_count);

        for stream in &info.video_streams {
            let pixel_format = stream
                .pixel_format
                .map(|format| format.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let fps = stream
                .fps()
                .map(|fps| format!("{:.3} fps", fps))
                .unwrap_or_else(|| "unknown rate".to_string());

            println!(
                "  #{}: {} {}x{} dar={:.3} {} {} tb={}",
                stream.index,
                stream.codec_id,
                stream.width,
                stream.height,
                stream.aspect_ratio(),
                pixel_format,
                fps,
                stream.time_base,
            );
            if let Some(bitrate) = stream.bitrate {
                println!("      bitrate: {} kb/s", bitrate / 1000);
            }
        }

        if !info.has_video() {
            println!("  no video streams");
        }
        Ok(())
    }
}
