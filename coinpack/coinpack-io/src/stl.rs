//! Binary STL (Stereolithography) loading.
//!
//! Only the binary variant is supported. ASCII input is rejected instead of
//! being misread as binary.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! All values are little-endian.

use std::fs;
use std::path::Path;

use coinpack_types::RawTriangle;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of the header plus the triangle count.
pub const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
pub const TRIANGLE_SIZE: usize = 50;

/// Number of bytes a binary STL with `triangles` facets occupies.
#[must_use]
pub const fn binary_stl_size(triangles: u32) -> u64 {
    PREAMBLE_SIZE as u64 + triangles as u64 * TRIANGLE_SIZE as u64
}

/// Parse a binary STL held in memory into raw triangles.
///
/// Returns exactly as many triangles as the header declares. Bytes past the
/// last declared triangle are ignored.
///
/// # Errors
///
/// Returns a format error if:
/// - The buffer is shorter than 84 bytes ([`IoError::InvalidHeader`])
/// - The buffer is shorter than `84 + 50 * N` bytes ([`IoError::Truncated`])
/// - A corner coordinate is NaN or infinite ([`IoError::NonFiniteCoordinate`])
/// - The buffer is ASCII STL ([`IoError::AsciiStl`])
///
/// # Example
///
/// ```
/// use coinpack_io::parse_binary_stl;
///
/// let mut bytes = vec![0u8; 80];
/// bytes.extend_from_slice(&0u32.to_le_bytes());
/// assert!(parse_binary_stl(&bytes).unwrap().is_empty());
///
/// bytes.truncate(83);
/// assert!(parse_binary_stl(&bytes).is_err());
/// ```
pub fn parse_binary_stl(bytes: &[u8]) -> IoResult<Vec<RawTriangle>> {
    if bytes.len() < PREAMBLE_SIZE {
        if looks_like_ascii(bytes) {
            return Err(IoError::AsciiStl);
        }
        return Err(IoError::InvalidHeader {
            expected: PREAMBLE_SIZE,
            got: bytes.len(),
        });
    }

    let count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);
    let expected = binary_stl_size(count);
    let got = bytes.len() as u64;

    if got < expected {
        // Binary exporters may also start the header with "solid"; only a
        // size mismatch marks it as text.
        if looks_like_ascii(bytes) {
            return Err(IoError::AsciiStl);
        }
        return Err(IoError::Truncated {
            triangles: count,
            expected,
            got,
        });
    }

    let mut triangles = Vec::with_capacity(count as usize);
    for (index, facet) in (0..count).zip(bytes[PREAMBLE_SIZE..].chunks_exact(TRIANGLE_SIZE)) {
        // Skip normal (12 bytes), read 3 vertices (36 bytes total)
        let corners = [
            read_corner(&facet[12..24]),
            read_corner(&facet[24..36]),
            read_corner(&facet[36..48]),
        ];
        if !corners.iter().flatten().all(|v| v.is_finite()) {
            return Err(IoError::NonFiniteCoordinate { triangle: index });
        }
        triangles.push(RawTriangle::from(corners));
    }

    debug!(triangles = triangles.len(), bytes = got, "Parsed binary STL");
    Ok(triangles)
}

/// Load a binary STL file into raw triangles.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist, an I/O
/// error if it cannot be read, or any error of [`parse_binary_stl`].
///
/// # Example
///
/// ```no_run
/// use coinpack_io::load_stl;
///
/// let triangles = load_stl("output/print_parts/coin_base_60mm.stl").unwrap();
/// println!("Loaded {} triangles", triangles.len());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<Vec<RawTriangle>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    parse_binary_stl(&bytes)
}

/// Serialize raw triangles as binary STL.
///
/// Normals are written as zero vectors; consumers recompute them from
/// winding. Used to build fixtures and by the benchmarks.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: binary STL stores the count as u32
pub fn encode_binary_stl(triangles: &[RawTriangle]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(PREAMBLE_SIZE + triangles.len() * TRIANGLE_SIZE);

    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL written by coinpack";
    header[..text.len()].copy_from_slice(text);
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());

    for tri in triangles {
        bytes.extend_from_slice(&[0u8; 12]);
        for corner in tri.corners() {
            for value in corner {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }

    bytes
}

/// Read a corner from 12 bytes (3 f32s).
fn read_corner(buf: &[u8]) -> [f32; 3] {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    [x, y, z]
}

/// ASCII STL starts with "solid" after optional whitespace and has no NUL
/// bytes in what would be the binary header.
fn looks_like_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let text = String::from_utf8_lossy(head);
    text.trim_start().starts_with("solid") && !head.contains(&0)
}
