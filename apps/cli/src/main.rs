//! CDP assistant CLI — scrape CDP documentation and answer questions from it.
//!
//! Crawls Segment, mParticle, Lytics and Zeotap docs into a static document
//! set, then answers "how do I…" questions by keyword search over it.

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
