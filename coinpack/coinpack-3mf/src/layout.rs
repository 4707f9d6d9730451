//! Project directory layout, the coin part table and output presets.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PackageError, PackageResult};
use crate::options::PackageOptions;
use crate::part::PartSpec;

/// Environment variable overriding the project root.
pub const ROOT_ENV: &str = "COINPACK_ROOT";

/// One part of the coin decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinPart {
    /// Part name written to the package.
    pub name: &'static str,
    /// STL file name under the parts directory.
    pub file: &'static str,
    /// Palette index of the part's color.
    pub pindex: u32,
}

/// The coin's parts in package order.
pub const COIN_PARTS: [CoinPart; 4] = [
    CoinPart {
        name: "base_black",
        file: "coin_base_60mm.stl",
        pindex: 0,
    },
    CoinPart {
        name: "inlay_white",
        file: "coin_inlay_white.stl",
        pindex: 1,
    },
    CoinPart {
        name: "inlay_red",
        file: "coin_inlay_red.stl",
        pindex: 2,
    },
    CoinPart {
        name: "inlay_wood",
        file: "coin_inlay_wood.stl",
        pindex: 3,
    },
];

/// A named package variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Triangle colors, one build item per part.
    Colored,
    /// Triangle colors, one assembly build item.
    ColoredAssembly,
    /// Assembly with slicer project metadata and the palette file.
    Project,
}

impl Preset {
    /// Every preset, in build order.
    pub const ALL: [Self; 3] = [Self::Colored, Self::ColoredAssembly, Self::Project];

    /// Package options of this preset.
    #[must_use]
    pub fn options(self) -> PackageOptions {
        match self {
            Self::Colored => PackageOptions::colored(),
            Self::ColoredAssembly => PackageOptions::colored_assembly(),
            Self::Project => PackageOptions::project(),
        }
    }

    /// Output file name under the output directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Colored => "coin_colored.3mf",
            Self::ColoredAssembly => "coin_colored_assembly.3mf",
            Self::Project => "coin_project.3mf",
        }
    }

    /// Whether the preset reads colors from `palette.json` instead of the
    /// built-in palette.
    #[must_use]
    pub const fn uses_palette_file(self) -> bool {
        matches!(self, Self::Project)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Colored => "colored",
            Self::ColoredAssembly => "colored-assembly",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths of one project checkout.
///
/// ```text
/// <root>/output/                 packages
/// <root>/output/print_parts/     part STLs and palette.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at `$COINPACK_ROOT`, or the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset and the current directory
    /// cannot be determined.
    pub fn from_env_or_cwd() -> PackageResult<Self> {
        if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        std::env::current_dir()
            .map(Self::new)
            .map_err(|e| PackageError::io(".", e))
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory receiving packages.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Directory holding the part STLs.
    #[must_use]
    pub fn parts_dir(&self) -> PathBuf {
        self.output_dir().join("print_parts")
    }

    /// Palette document path.
    #[must_use]
    pub fn palette_path(&self) -> PathBuf {
        self.parts_dir().join("palette.json")
    }

    /// Package path of a preset.
    #[must_use]
    pub fn output_path(&self, preset: Preset) -> PathBuf {
        self.output_dir().join(preset.file_name())
    }

    /// Part declarations for the coin.
    #[must_use]
    pub fn part_specs(&self) -> Vec<PartSpec> {
        let dir = self.parts_dir();
        COIN_PARTS
            .iter()
            .map(|part| PartSpec::new(part.name, dir.join(part.file), part.pindex))
            .collect()
    }
}
