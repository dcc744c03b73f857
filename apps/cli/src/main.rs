//! tubedigest CLI — channel feed summarizer.
//!
//! Polls a YouTube channel feed, summarizes new videos' transcripts, stores
//! one Markdown summary per video, and emails a digest of the batch.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
