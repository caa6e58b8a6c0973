use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    cli::Args::parse().run()
}
