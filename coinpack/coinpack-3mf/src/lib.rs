//! Colored 3MF packages for multi-part coin prints.
//!
//! This crate turns per-color part meshes into 3MF packages that a slicer
//! opens with the right filament on every part, and checks produced
//! packages by reading them back.
//!
//! # Overview
//!
//! - [`Palette`] - ordered named colors, written as one color group
//! - [`PartObject`] - a named, colored, indexed mesh with its object id
//! - [`PackageOptions`] - color attachment, build layout and project
//!   metadata, with the `colored`, `colored_assembly` and `project` presets
//! - [`Package`] - the package body, written atomically as a deflated ZIP
//! - [`validate_package`] - read-back checks aggregated into a
//!   [`ValidationReport`]
//! - [`ProjectLayout`] and [`build_presets`] - the coin build over a project
//!   directory
//!
//! # Quick Start
//!
//! ```
//! use coinpack_3mf::{Package, PackageOptions, Palette, PartObject, validate_model_xml};
//! use coinpack_types::{IndexedMesh, Vertex};
//!
//! let mesh = IndexedMesh::from_parts(
//!     vec![
//!         Vertex::from_coords(0.0, 0.0, 0.0),
//!         Vertex::from_coords(1.0, 0.0, 0.0),
//!         Vertex::from_coords(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//! let parts = vec![PartObject::new(2, "inlay_red", 2, mesh)];
//!
//! let package = Package::build(&parts, &Palette::coin_default(), &PackageOptions::colored())?;
//! let report = validate_model_xml(package.model_xml())?;
//! assert!(report.is_ok());
//! # Ok::<(), coinpack_3mf::PackageError>(())
//! ```
//!
//! ## Building the coin
//!
//! ```no_run
//! use coinpack_3mf::{Preset, ProjectLayout, build_presets};
//! use coinpack_io::IndexParams;
//!
//! let layout = ProjectLayout::from_env_or_cwd()?;
//! for output in build_presets(&layout, &Preset::ALL, &IndexParams::default())? {
//!     println!("{}: {}", output.preset, output.path.display());
//! }
//! # Ok::<(), coinpack_3mf::PackageError>(())
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod layout;
mod model;
mod options;
mod package;
mod palette;
mod part;
mod pipeline;
mod project;
mod validation;

pub use error::{PackageError, PackageResult};
pub use layout::{COIN_PARTS, CoinPart, Preset, ProjectLayout, ROOT_ENV};
pub use model::{MATERIAL_PREFIX, NAMESPACE_CORE, NAMESPACE_MATERIAL};
pub use options::{BuildLayout, ColorAttachment, PackageOptions};
pub use package::{
    COLOR_GROUP_ID, CONTENT_TYPES_PATH, MODEL_PATH, ObjectIds, Package, RELS_PATH, resolve_ids,
    write_package,
};
pub use palette::{Palette, PaletteEntry};
pub use part::{FIRST_OBJECT_ID, PartObject, PartSpec, check_inputs, load_parts};
pub use pipeline::{BuildOutput, build_presets};
pub use project::{
    APPLICATION, MODEL_SETTINGS_PATH, NAMESPACE_BAMBU, PROJECT_VERSION, Recognition, recognition,
};
pub use validation::{ValidationReport, validate_model_xml, validate_package};

// Re-export commonly used types for convenience
pub use coinpack_io::IndexParams;
pub use coinpack_types::{IndexedMesh, Rgb, Vertex};
