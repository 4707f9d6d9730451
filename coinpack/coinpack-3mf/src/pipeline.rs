//! End-to-end build: load the coin parts once, write every requested
//! preset, and read each package back through the validator.

use std::path::{Path, PathBuf};

use coinpack_io::IndexParams;
use tracing::info;

use crate::error::{PackageError, PackageResult};
use crate::layout::{Preset, ProjectLayout};
use crate::package::Package;
use crate::palette::Palette;
use crate::part::{check_inputs, load_parts};
use crate::validation::{ValidationReport, validate_package};

/// One written and validated package.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Preset that produced the package.
    pub preset: Preset,
    /// Package path.
    pub path: PathBuf,
    /// Read-back validation report.
    pub report: ValidationReport,
}

/// Build, write and validate the given presets.
///
/// Every input (part STLs, and `palette.json` when a preset needs it) is
/// checked before anything is parsed, and every package is built in memory
/// before the first one is written. A run that fails on its inputs or
/// configuration therefore writes no file.
///
/// # Errors
///
/// Returns [`PackageError::MissingInput`] naming every absent input, any
/// load, palette or configuration error, a write error, or
/// [`PackageError::ValidationFailed`] if a written package does not pass.
pub fn build_presets(
    layout: &ProjectLayout,
    presets: &[Preset],
    params: &IndexParams,
) -> PackageResult<Vec<BuildOutput>> {
    let specs = layout.part_specs();
    let needs_palette_file = presets.iter().any(|p| p.uses_palette_file());
    let palette_path = layout.palette_path();

    let mut inputs: Vec<&Path> = specs.iter().map(|s| s.path.as_path()).collect();
    if needs_palette_file {
        inputs.push(palette_path.as_path());
    }
    check_inputs(inputs)?;

    let parts = load_parts(&specs, params)?;
    let file_palette = if needs_palette_file {
        Some(Palette::load(&palette_path)?)
    } else {
        None
    };
    let default_palette = Palette::coin_default();

    let mut packages = Vec::with_capacity(presets.len());
    for &preset in presets {
        let palette = match (&file_palette, preset.uses_palette_file()) {
            (Some(palette), true) => palette,
            _ => &default_palette,
        };
        let package = Package::build(&parts, palette, &preset.options())?;
        packages.push((preset, package));
    }

    let mut outputs = Vec::with_capacity(packages.len());
    for (preset, package) in packages {
        let path = layout.output_path(preset);
        package.write(&path)?;

        let report = validate_package(&path)?;
        if !report.is_ok() {
            return Err(PackageError::ValidationFailed {
                report: Box::new(report),
            });
        }
        info!(preset = %preset, path = %path.display(), "Built package");
        outputs.push(BuildOutput {
            preset,
            path,
            report,
        });
    }

    Ok(outputs)
}
