//! Command-line entry point for the MQDQ migration tool

use clap::Parser;
use mqdq_cli::commands::Commands;

/// MQDQ TEI text and apparatus migration
#[derive(Debug, Parser)]
#[command(name = "mqdq", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.command.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
