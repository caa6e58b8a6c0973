use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod probe;
mod transcode;

pub use probe::ProbeCommand;
pub use transcode::TranscodeCommand;

#[derive(Parser, Debug)]
#[command(name = "transcoder")]
#[command(about = "Decode a video stream and re-encode it to H.264")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub transcode: TranscodeCommand,

    /// FFmpeg's own log level (our logs follow RUST_LOG)
    #[arg(long, value_enum, default_value_t = FfmpegLog::Quiet, global = true)]
    pub ffmpeg_log: FfmpegLog,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transcode the input file (default)
    Transcode(TranscodeCommand),
    /// Print the streams of a media file and exit
    Probe(ProbeCommand),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FfmpegLog {
    #[default]
    Quiet,
    Error,
    Warning,
    Info,
    Debug,
}

impl FfmpegLog {
    fn level(self) -> ffmpeg_next::util::log::Level {
        use ffmpeg_next::util::log::Level;

        match self {
            Self::Quiet => Level::Quiet,
            Self::Error => Level::Error,
            Self::Warning => Level::Warning,
            Self::Info => Level::Info,
            Self::Debug => Level::Debug,
        }
    }
}

impl Args {
    pub fn run(self) -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        ffmpeg_next::util::log::set_level(self.ffmpeg_log.level());

        let command = self
            .command
            .unwrap_or(Command::Transcode(self.transcode));

        match command {
            Command::Transcode(cmd) => cmd.run(),
            Command::Probe(cmd) => cmd.run(),
        }
    }
}
