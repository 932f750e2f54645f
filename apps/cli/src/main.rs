//! HelpForge CLI — batch article generation and publishing client.
//!
//! Drives the AI article generator backend: generate help articles for a
//! device's errors from its PDF manual, export them, and publish to the CMS.

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
