//! CDP assistant TUI — chat with the assistant over the scraped documentation.
//!
//! An optional first argument overrides the configured data directory.

mod app;
mod screens;
mod widgets;

use std::path::PathBuf;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = cdp_assistant_shared::load_config()?;
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.data.dir));

    let (assistant, store) = cdp_assistant_core::load_assistant(&data_dir, &config.search)?;
    app::run(assistant, store)
}
