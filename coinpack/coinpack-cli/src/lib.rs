//! Shared plumbing for the coinpack executables.
//!
//! Each build executable writes one or more package presets under the
//! project layout (`$COINPACK_ROOT` or the current directory). The checker
//! validates one package and exits with:
//!
//! - `0` - the package passed
//! - `1` - the package failed validation or could not be read
//! - `2` - bad usage or the file does not exist

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use coinpack_3mf::{
    IndexParams, PackageError, PackageResult, Preset, ProjectLayout, ValidationReport,
    build_presets, validate_package,
};
use owo_colors::OwoColorize;

/// Exit code for a passing package.
pub const EXIT_OK: u8 = 0;
/// Exit code for a failing or unreadable package.
pub const EXIT_FAILED: u8 = 1;
/// Exit code for bad usage or a missing file.
pub const EXIT_USAGE: u8 = 2;

/// Install the `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `coinpack=info`. Events
/// go to stderr so stdout carries only results.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinpack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the given presets under the project layout and print each path.
///
/// # Errors
///
/// Returns an error if the layout cannot be resolved or any build fails.
pub fn run_build(presets: &[Preset]) -> Result<()> {
    let layout = ProjectLayout::from_env_or_cwd().context("Failed to resolve project root")?;
    tracing::debug!(root = %layout.root().display(), "Using project layout");

    let outputs = build_presets(&layout, presets, &IndexParams::default())
        .with_context(|| format!("Failed to build {}", preset_list(presets)))?;

    for output in outputs {
        println!(
            "{} {} ({})",
            "Wrote".green().bold(),
            output.path.display(),
            output.preset
        );
    }
    Ok(())
}

/// Validate one package, print the report and return the exit code.
///
/// Without a path, the colored preset output of the project layout is
/// checked.
#[must_use]
pub fn run_check(path: Option<PathBuf>) -> ExitCode {
    let path = match path {
        Some(path) => path,
        None => match ProjectLayout::from_env_or_cwd() {
            Ok(layout) => layout.output_path(Preset::Colored),
            Err(e) => {
                eprintln!("{} {e}", "ERROR:".red().bold());
                return ExitCode::from(EXIT_USAGE);
            }
        },
    };

    let result = validate_package(&path);
    match &result {
        Ok(report) => print_report(report),
        Err(PackageError::MissingInput { .. }) => {
            eprintln!(
                "{} file not found: {}",
                "ERROR:".red().bold(),
                path.display()
            );
        }
        Err(e) => eprintln!("{} {e}", "ERROR:".red().bold()),
    }
    ExitCode::from(check_exit_code(&result))
}

/// Exit code of a validation result.
#[must_use]
pub fn check_exit_code(result: &PackageResult<ValidationReport>) -> u8 {
    match result {
        Ok(report) if report.is_ok() => EXIT_OK,
        Ok(_) => EXIT_FAILED,
        Err(PackageError::MissingInput { .. }) => EXIT_USAGE,
        Err(_) => EXIT_FAILED,
    }
}

fn print_report(report: &ValidationReport) {
    for line in report.to_string().lines() {
        match line {
            "OK" => println!("{}", line.green().bold()),
            "FAIL" => println!("{}", line.red().bold()),
            _ => println!("{line}"),
        }
    }
}

fn preset_list(presets: &[Preset]) -> String {
    presets
        .iter()
        .copied()
        .map(Preset::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
