//! Error types for mesh loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh loading operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while loading and indexing STL data.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Buffer too short to hold the 80-byte header and triangle count.
    #[error("invalid STL header: expected at least {expected} bytes, got {got}")]
    InvalidHeader {
        /// Minimum size of header plus count.
        expected: usize,
        /// Actual buffer size.
        got: usize,
    },

    /// Buffer shorter than the declared triangle count requires.
    #[error(
        "truncated binary STL: {triangles} triangles need {expected} bytes, got {got}"
    )]
    Truncated {
        /// Declared triangle count.
        triangles: u32,
        /// Bytes required by the declared count.
        expected: u64,
        /// Actual buffer size.
        got: u64,
    },

    /// A facet corner holds a NaN or infinite coordinate.
    #[error("binary STL triangle {triangle} has a non-finite corner coordinate")]
    NonFiniteCoordinate {
        /// Zero-based index of the offending triangle.
        triangle: u32,
    },

    /// Input looks like ASCII STL, which is not supported.
    #[error("ASCII STL is not supported; export the part as binary STL")]
    AsciiStl,

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Whether this error describes malformed STL content rather than a
    /// filesystem problem.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader { .. }
                | Self::Truncated { .. }
                | Self::NonFiniteCoordinate { .. }
                | Self::AsciiStl
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_errors_are_grouped() {
        assert!(IoError::AsciiStl.is_format_error());
        assert!(IoError::NonFiniteCoordinate { triangle: 0 }.is_format_error());
        assert!(
            IoError::Truncated {
                triangles: 1,
                expected: 134,
                got: 100
            }
            .is_format_error()
        );
        assert!(
            !IoError::FileNotFound {
                path: PathBuf::from("a.stl")
            }
            .is_format_error()
        );
    }

    #[test]
    fn truncated_message_names_sizes() {
        let msg = IoError::Truncated {
            triangles: 2,
            expected: 184,
            got: 150,
        }
        .to_string();
        assert!(msg.contains("184"));
        assert!(msg.contains("150"));
    }
}
