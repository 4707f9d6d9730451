//! Binary STL loading and vertex indexing for coinpack.
//!
//! This crate turns the per-color STL parts into indexed meshes:
//!
//! - [`parse_binary_stl`] / [`load_stl`] - binary STL into raw triangles
//! - [`index_triangles`] - triangle soup into an [`IndexedMesh`] with shared
//!   vertices, merged by rounded coordinate key
//! - [`load_indexed_stl`] - both steps in one call
//!
//! ASCII STL is out of scope and rejected with a format error.
//!
//! # Example
//!
//! ```no_run
//! use coinpack_io::{load_indexed_stl, IndexParams};
//!
//! let (mesh, stats) = load_indexed_stl("part.stl", &IndexParams::default()).unwrap();
//! println!("{} corners -> {} vertices", stats.corner_count, stats.vertex_count);
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
mod index;
mod stl;

pub use error::{IoError, IoResult};
pub use index::{
    DEFAULT_PRECISION, IndexParams, IndexStats, MAX_PRECISION, index_triangles,
    index_triangles_with_stats,
};
pub use stl::{
    HEADER_SIZE, PREAMBLE_SIZE, TRIANGLE_SIZE, binary_stl_size, encode_binary_stl, load_stl,
    parse_binary_stl,
};

use std::path::Path;

use coinpack_types::IndexedMesh;

/// Load a binary STL file and index its triangles.
///
/// # Errors
///
/// Returns any error of [`load_stl`].
pub fn load_indexed_stl<P: AsRef<Path>>(
    path: P,
    params: &IndexParams,
) -> IoResult<(IndexedMesh, IndexStats)> {
    let triangles = load_stl(path)?;
    Ok(index_triangles_with_stats(&triangles, params))
}
