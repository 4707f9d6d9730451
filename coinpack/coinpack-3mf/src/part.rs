//! Part objects: one named, colored mesh per STL input.
//!
//! A [`PartSpec`] declares an input (name, STL path, palette index). Loading
//! a set of specs checks that every file exists, then parses and indexes
//! each STL into a [`PartObject`] with a package-unique object id.

use std::path::{Path, PathBuf};

use coinpack_io::{IndexParams, load_indexed_stl};
use coinpack_types::{IndexedMesh, MeshTopology};
use tracing::{info, warn};

use crate::error::{PackageError, PackageResult};

/// First object id handed to parts. Id 1 belongs to the color group.
pub const FIRST_OBJECT_ID: u32 = 2;

/// Declaration of one part input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    /// Part name written to the package (e.g. `"inlay_red"`).
    pub name: String,
    /// Binary STL path.
    pub path: PathBuf,
    /// Palette index of the part's color.
    pub pindex: u32,
}

impl PartSpec {
    /// Create a part declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, pindex: u32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            pindex,
        }
    }
}

/// A named mesh with its color and object id.
///
/// # Example
///
/// ```
/// use coinpack_types::{IndexedMesh, Vertex};
/// use coinpack_3mf::PartObject;
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(1.0, 0.0, 0.0),
///         Vertex::from_coords(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// let part = PartObject::new(2, "inlay_red", 2, mesh);
///
/// assert_eq!(part.id(), 2);
/// assert_eq!(part.extruder(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PartObject {
    id: u32,
    name: String,
    pindex: u32,
    mesh: IndexedMesh,
}

impl PartObject {
    /// Create a part object.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, pindex: u32, mesh: IndexedMesh) -> Self {
        Self {
            id,
            name: name.into(),
            pindex,
            mesh,
        }
    }

    /// Object id, unique within a package.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Part name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Palette index.
    #[must_use]
    pub const fn pindex(&self) -> u32 {
        self.pindex
    }

    /// 1-based extruder / filament channel (`pindex + 1`, saturating).
    #[must_use]
    pub const fn extruder(&self) -> u32 {
        self.pindex.saturating_add(1)
    }

    /// Indexed geometry.
    #[must_use]
    pub const fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }
}

/// Check that every path exists.
///
/// # Errors
///
/// Returns [`PackageError::MissingInput`] listing all missing paths, not
/// just the first.
pub fn check_inputs<'a, I>(paths: I) -> PackageResult<()>
where
    I: IntoIterator<Item = &'a Path>,
{
    let missing: Vec<PathBuf> = paths
        .into_iter()
        .filter(|p| !p.is_file())
        .map(Path::to_path_buf)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PackageError::MissingInput { paths: missing })
    }
}

/// Load and index every declared part.
///
/// All inputs are checked for existence before any file is parsed. Object
/// ids are assigned from [`FIRST_OBJECT_ID`] in declaration order.
///
/// # Errors
///
/// Returns [`PackageError::NoParts`] for an empty list,
/// [`PackageError::MissingInput`] if any file is absent, or
/// [`PackageError::Mesh`] if an STL is malformed.
pub fn load_parts(specs: &[PartSpec], params: &IndexParams) -> PackageResult<Vec<PartObject>> {
    if specs.is_empty() {
        return Err(PackageError::NoParts);
    }
    check_inputs(specs.iter().map(|s| s.path.as_path()))?;

    let mut parts = Vec::with_capacity(specs.len());
    for (id, spec) in (FIRST_OBJECT_ID..).zip(specs) {
        let (mesh, stats) =
            load_indexed_stl(&spec.path, params).map_err(|source| PackageError::Mesh {
                part: spec.name.clone(),
                source,
            })?;

        if mesh.is_empty() {
            warn!(part = %spec.name, path = %spec.path.display(), "Part has no triangles");
        }
        info!(
            part = %spec.name,
            id,
            triangles = stats.face_count,
            vertices = stats.vertex_count,
            "Loaded part"
        );

        parts.push(PartObject::new(id, spec.name.clone(), spec.pindex, mesh));
    }

    Ok(parts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use coinpack_io::encode_binary_stl;
    use coinpack_types::RawTriangle;
    use std::fs;

    fn write_square(path: &Path) {
        let soup = [
            RawTriangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            RawTriangle::new([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        fs::write(path, encode_binary_stl(&soup)).unwrap();
    }

    #[test]
    fn ids_start_after_color_group() {
        let dir = tempfile::tempdir().unwrap();
        let specs: Vec<PartSpec> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let path = dir.path().join(format!("{name}.stl"));
                write_square(&path);
                PartSpec::new(*name, path, u32::try_from(i).unwrap())
            })
            .collect();

        let parts = load_parts(&specs, &IndexParams::default()).unwrap();
        let ids: Vec<u32> = parts.iter().map(PartObject::id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(parts[1].name(), "b");
        assert_eq!(parts[2].pindex(), 2);
        assert_eq!(parts[0].mesh().vertex_count(), 4);
    }

    #[test]
    fn all_missing_inputs_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.stl");
        write_square(&present);
        let specs = vec![
            PartSpec::new("gone1", dir.path().join("gone1.stl"), 0),
            PartSpec::new("present", present, 1),
            PartSpec::new("gone2", dir.path().join("gone2.stl"), 2),
        ];

        match load_parts(&specs, &IndexParams::default()) {
            Err(PackageError::MissingInput { paths }) => {
                assert_eq!(
                    paths,
                    vec![dir.path().join("gone1.stl"), dir.path().join("gone2.stl")]
                );
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn malformed_stl_names_the_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.stl");
        fs::write(&path, [0u8; 30]).unwrap();
        let err = load_parts(&[PartSpec::new("bad_part", &path, 0)], &IndexParams::default())
            .unwrap_err();
        match err {
            PackageError::Mesh { part, source } => {
                assert_eq!(part, "bad_part");
                assert!(source.is_format_error());
            }
            other => panic!("expected Mesh error, got {other}"),
        }
    }

    #[test]
    fn extruder_is_one_based_and_saturates() {
        assert_eq!(PartObject::new(2, "a", 0, IndexedMesh::new()).extruder(), 1);
        assert_eq!(PartObject::new(2, "a", 4, IndexedMesh::new()).extruder(), 5);
        assert_eq!(PartObject::new(2, "a", u32::MAX, IndexedMesh::new()).extruder(), u32::MAX);
    }

    #[test]
    fn empty_spec_list_is_rejected() {
        assert!(matches!(
            load_parts(&[], &IndexParams::default()),
            Err(PackageError::NoParts)
        ));
    }
}
