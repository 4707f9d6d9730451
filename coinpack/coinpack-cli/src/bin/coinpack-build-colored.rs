//! Write output/coin_colored.3mf with per-triangle colors and one build item per part

use anyhow::Result;
use clap::Parser;
use coinpack_3mf::Preset;

/// Write output/coin_colored.3mf with per-triangle colors and one build item per part
#[derive(Parser)]
#[command(name = "coinpack-build-colored")]
#[command(about = "Write output/coin_colored.3mf with per-triangle colors and one build item per part", long_about = None)]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    Cli::parse();
    coinpack_cli::init_tracing();
    coinpack_cli::run_build(&[Preset::Colored])
}
