//! Write output/coin_project.3mf as a slicer project using palette.json

use anyhow::Result;
use clap::Parser;
use coinpack_3mf::Preset;

/// Write output/coin_project.3mf as a slicer project using palette.json
#[derive(Parser)]
#[command(name = "coinpack-build-project")]
#[command(about = "Write output/coin_project.3mf as a slicer project using palette.json", long_about = None)]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    Cli::parse();
    coinpack_cli::init_tracing();
    coinpack_cli::run_build(&[Preset::Project])
}
