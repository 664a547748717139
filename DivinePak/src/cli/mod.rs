//! `DivinePak` CLI - Command-line interface for reading PAK archives

pub mod commands;
mod format;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "divinepak")]
#[command(about = "DivinePak: Divinity: Original Sin 2 PAK archive tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the `DivinePak` CLI
///
/// # Errors
/// Returns an error if the selected command fails.
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
