//! Write every coin package preset from one load of the parts

use anyhow::Result;
use clap::Parser;
use coinpack_3mf::Preset;

/// Write every coin package preset from one load of the parts
#[derive(Parser)]
#[command(name = "coinpack-build-all")]
#[command(about = "Write every coin package preset from one load of the parts", long_about = None)]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    Cli::parse();
    coinpack_cli::init_tracing();
    coinpack_cli::run_build(&Preset::ALL)
}
