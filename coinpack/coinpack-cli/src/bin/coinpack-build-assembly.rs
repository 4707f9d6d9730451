//! Write output/coin_colored_assembly.3mf with the parts built as one assembly

use anyhow::Result;
use clap::Parser;
use coinpack_3mf::Preset;

/// Write output/coin_colored_assembly.3mf with the parts built as one assembly
#[derive(Parser)]
#[command(name = "coinpack-build-assembly")]
#[command(about = "Write output/coin_colored_assembly.3mf with the parts built as one assembly", long_about = None)]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    Cli::parse();
    coinpack_cli::init_tracing();
    coinpack_cli::run_build(&[Preset::ColoredAssembly])
}
