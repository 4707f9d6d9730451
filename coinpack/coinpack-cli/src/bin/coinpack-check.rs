//! Validate a coin 3MF package.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Check that a 3MF encodes per-triangle colors through a color group
#[derive(Parser)]
#[command(name = "coinpack-check")]
#[command(about = "Check that a 3MF encodes colors through a color group", long_about = None)]
#[command(version)]
struct Cli {
    /// Package to check (defaults to output/coin_colored.3mf)
    #[arg(name = "PATH")]
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    coinpack_cli::init_tracing();
    coinpack_cli::run_check(cli.path)
}
