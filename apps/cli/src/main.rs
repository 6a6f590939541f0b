//! DocHarvest CLI — focused documentation crawler.
//!
//! Crawls a documentation site from a seed URL, converts accepted pages to
//! Markdown, and stores them as a named collection with a visited-URL
//! manifest.

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
