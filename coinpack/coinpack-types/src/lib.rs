//! Core mesh types for coinpack.
//!
//! This crate provides the foundational types shared by the loader, the
//! indexer and the 3MF package writer:
//!
//! - [`RawTriangle`] - Three corners exactly as read from a binary STL
//! - [`Vertex`] - A unique point in an indexed vertex list
//! - [`IndexedMesh`] - A triangle mesh with shared, indexed vertices
//! - [`Rgb`] - An 8-bit RGB color as written into a 3MF color group
//!
//! # Layer 0 Crate
//!
//! This crate has no I/O and no knowledge of file formats. It can be used
//! by the CLI tools, by tests, or by anything else that needs the types.
//!
//! # Units
//!
//! Coordinates are millimeters. STL stores `f32`; indexed vertices keep the
//! widened `f64` value so formatting never loses what the file contained.
//!
//! # Winding
//!
//! Face winding is preserved from the input. A face `[a, b, c]` lists its
//! corners in the same order as the STL facet it came from.
//!
//! # Example
//!
//! ```
//! use coinpack_types::{IndexedMesh, MeshTopology, Vertex};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(mesh.indices_in_range());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod color;
mod mesh;
mod traits;
mod triangle;
mod vertex;

pub use color::{ParseRgbError, Rgb};
pub use mesh::IndexedMesh;
pub use traits::MeshTopology;
pub use triangle::RawTriangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;
