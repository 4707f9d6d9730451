//! Loader and indexer behaviour on files written to disk.
//!
//! To run: cargo test -p coinpack-io --test stl_indexing

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::assert_relative_eq;
use coinpack_io::{
    IndexParams, IoError, binary_stl_size, encode_binary_stl, load_indexed_stl, load_stl,
    parse_binary_stl,
};
use coinpack_types::{MeshTopology, RawTriangle};
use tempfile::tempdir;

/// A closed tetrahedron: 4 facets, 12 corners, 4 unique points.
fn tetrahedron() -> Vec<RawTriangle> {
    let a = [0.0, 0.0, 0.0];
    let b = [20.0, 0.0, 0.0];
    let c = [0.0, 20.0, 0.0];
    let d = [0.0, 0.0, 3.5];
    vec![
        RawTriangle::new(a, c, b),
        RawTriangle::new(a, b, d),
        RawTriangle::new(b, c, d),
        RawTriangle::new(c, a, d),
    ]
}

#[test]
fn returns_exactly_declared_count() {
    for n in [0_usize, 1, 4, 37] {
        let soup: Vec<RawTriangle> = tetrahedron().into_iter().cycle().take(n).collect();
        let bytes = encode_binary_stl(&soup);
        assert_eq!(bytes.len() as u64, binary_stl_size(n as u32));
        assert_eq!(parse_binary_stl(&bytes).unwrap().len(), n);
    }
}

#[test]
fn every_truncation_is_a_format_error() {
    let bytes = encode_binary_stl(&tetrahedron());
    for len in [0, 10, 83, 84, 133, bytes.len() - 1] {
        let err = parse_binary_stl(&bytes[..len]).unwrap_err();
        assert!(err.is_format_error(), "len {len}: {err}");
    }
}

#[test]
fn closed_solid_indexes_to_unique_points() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tetra.stl");
    std::fs::write(&path, encode_binary_stl(&tetrahedron())).unwrap();

    let (mesh, stats) = load_indexed_stl(&path, &IndexParams::default()).unwrap();
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(stats.merged_count(), 8);
    assert!(mesh.indices_in_range());

    let apex = mesh.vertex(3).unwrap();
    assert_relative_eq!(apex.position.z, 3.5);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.stl");
    match load_stl(&path) {
        Err(IoError::FileNotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}
