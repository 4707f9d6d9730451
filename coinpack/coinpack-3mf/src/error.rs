//! Error types for package operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors that can occur while building, writing or checking a package.
#[derive(Debug, Error)]
pub enum PackageError {
    /// One or more required input files do not exist.
    #[error("missing required input file(s): {}", MissingPaths(.paths))]
    MissingInput {
        /// Every missing path, in declaration order.
        paths: Vec<PathBuf>,
    },

    /// Unrecognized build layout token.
    #[error("unknown build layout '{value}' (expected 'items' or 'assembly')")]
    UnknownBuildLayout {
        /// The rejected token.
        value: String,
    },

    /// Unrecognized color attachment token.
    #[error("unknown color attachment '{value}' (expected 'object' or 'triangle')")]
    UnknownColorAttachment {
        /// The rejected token.
        value: String,
    },

    /// Two resources would share one identifier.
    #[error("resource id {id} is used more than once ({context})")]
    DuplicateObjectId {
        /// The colliding identifier.
        id: u32,
        /// Which identifiers collided.
        context: String,
    },

    /// A part references a palette entry that does not exist.
    #[error("part '{part}' uses palette index {index}, but the palette has {len} entries")]
    InvalidPaletteIndex {
        /// Part name.
        part: String,
        /// Requested palette index.
        index: u32,
        /// Palette length.
        len: usize,
    },

    /// The palette has no entries.
    #[error("color palette is empty")]
    EmptyPalette,

    /// No part objects were supplied.
    #[error("no part objects to package")]
    NoParts,

    /// Palette JSON could not be read or parsed.
    #[error("invalid palette file '{path}': {source}")]
    Palette {
        /// Palette file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A part STL could not be loaded.
    #[error("failed to load part '{part}': {source}")]
    Mesh {
        /// Part name.
        part: String,
        /// The underlying loader error.
        #[source]
        source: coinpack_io::IoError,
    },

    /// I/O error during file operations.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Zip container error.
    #[error("zip error: {message}")]
    Zip {
        /// Error message.
        message: String,
    },

    /// XML generation or parse error.
    #[error("XML error: {message}")]
    Xml {
        /// Error message.
        message: String,
    },

    /// The archive is readable but is not a usable 3MF package.
    #[error("invalid package '{path}': {message}")]
    InvalidPackage {
        /// Package path.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    /// A written package did not pass validation.
    #[error("package '{}' failed validation: {}", .report.source_label(), .report.failures().join("; "))]
    ValidationFailed {
        /// The full validation report.
        report: Box<ValidationReport>,
    },
}

impl PackageError {
    /// Whether this error is a configuration problem (bad layout token,
    /// identifier collision) rather than an input or I/O problem.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownBuildLayout { .. }
                | Self::UnknownColorAttachment { .. }
                | Self::DuplicateObjectId { .. }
        )
    }

    pub(crate) fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    pub(crate) fn zip(message: impl Into<String>) -> Self {
        Self::Zip {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Formats a path list as `a, b, c`.
struct MissingPaths<'a>(&'a [PathBuf]);

impl fmt::Display for MissingPaths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}
