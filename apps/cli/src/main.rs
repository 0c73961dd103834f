//! internwatch CLI: keeps a published internship listing in sync with its
//! upstream feed.
//!
//! Fetches the listings, merges them into the archive, writes the current
//! snapshot, and regenerates the README table.

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
