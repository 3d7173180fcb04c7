//! docnav CLI: drive a headless soft-navigation session against a docs site.
//!
//! Loads pages the way the site's own navigation script would, hydrates them,
//! and reports what each navigation did.

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
