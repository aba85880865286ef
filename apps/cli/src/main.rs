//! EAD Bridge CLI: converts EAD finding aids into ArchivesSpace records.
//!
//! Each input file is converted by its own converter; several files are
//! converted concurrently.

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
