//! Triangle-soup to indexed-mesh conversion.
//!
//! STL stores every corner of every facet separately. The indexer merges
//! corners whose coordinates agree after rounding to a fixed number of
//! decimal places, producing shared vertices and index triples.
//!
//! # Precision
//!
//! Rounding is lossy on purpose: exporters emit the "same" point with tiny
//! float differences across facets, and merging them closes those seams.
//! Too coarse a precision merges distinct vertices; too fine a precision
//! leaves seams open. The default is 6 decimal places (1 nm at millimeter
//! scale). Above about 8 mm the `f32` spacing is coarser than that step, so
//! there only bit-identical corners merge.

use coinpack_types::{IndexedMesh, RawTriangle, Vertex};
use hashbrown::HashMap;
use tracing::debug;

/// Default number of fractional decimal digits used for vertex keys.
pub const DEFAULT_PRECISION: u32 = 6;

/// Largest supported precision. Finer steps sit below `f32` resolution for
/// any coordinate a print uses.
pub const MAX_PRECISION: u32 = 12;

/// Parameters for vertex indexing.
///
/// # Example
///
/// ```
/// use coinpack_io::IndexParams;
///
/// let params = IndexParams::default();
/// assert_eq!(params.precision(), 6);
///
/// let coarse = IndexParams::new(3);
/// assert_eq!(coarse.precision(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexParams {
    precision: u32,
}

impl IndexParams {
    /// Create parameters with the given rounding precision.
    ///
    /// Precision is clamped to [`MAX_PRECISION`].
    #[must_use]
    pub fn new(precision: u32) -> Self {
        Self {
            precision: precision.min(MAX_PRECISION),
        }
    }

    /// Number of fractional decimal digits kept in vertex keys.
    #[must_use]
    pub const fn precision(&self) -> u32 {
        self.precision
    }

    /// Scale factor applied before rounding.
    #[allow(clippy::cast_possible_wrap)]
    // Wrap: precision is clamped to MAX_PRECISION
    fn scale(self) -> f64 {
        10f64.powi(self.precision as i32)
    }
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Counts reported by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    /// Corners read from the triangle soup (3 per triangle).
    pub corner_count: usize,
    /// Unique vertices after merging.
    pub vertex_count: usize,
    /// Triangles emitted.
    pub face_count: usize,
}

impl IndexStats {
    /// Number of corners that reused an existing vertex.
    #[must_use]
    pub const fn merged_count(&self) -> usize {
        self.corner_count - self.vertex_count
    }
}

/// Rounded coordinate key identifying a vertex.
///
/// Each axis is the bit pattern of the rounded, scaled `f64`. Distinct
/// `f32` inputs stay distinct after scaling, so keys never saturate, and
/// large or infinite values keep their own identity.
type VertexKey = [u64; 3];

fn vertex_key(corner: [f32; 3], scale: f64) -> VertexKey {
    let quantize = |v: f32| {
        let rounded = (f64::from(v) * scale).round();
        if rounded == 0.0 {
            // -0.0 and 0.0 share a key
            0.0_f64.to_bits()
        } else if rounded.is_nan() {
            f64::NAN.to_bits()
        } else {
            rounded.to_bits()
        }
    };
    [quantize(corner[0]), quantize(corner[1]), quantize(corner[2])]
}

/// Convert raw triangles into an indexed mesh.
///
/// Vertices are created in first-seen order and keep the exact position of
/// the corner that introduced them. Each output face lists its corners in
/// the same order as the input triangle, so winding is preserved. Identical
/// input and precision always give identical output.
///
/// # Example
///
/// ```
/// use coinpack_io::{index_triangles, IndexParams};
/// use coinpack_types::{MeshTopology, RawTriangle};
///
/// let soup = [
///     RawTriangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
///     RawTriangle::new([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
/// ];
/// let mesh = index_triangles(&soup, &IndexParams::default());
///
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
/// ```
#[must_use]
pub fn index_triangles(triangles: &[RawTriangle], params: &IndexParams) -> IndexedMesh {
    index_triangles_with_stats(triangles, params).0
}

/// Convert raw triangles into an indexed mesh and report merge statistics.
///
/// See [`index_triangles`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
pub fn index_triangles_with_stats(
    triangles: &[RawTriangle],
    params: &IndexParams,
) -> (IndexedMesh, IndexStats) {
    let scale = params.scale();
    let mut vertex_map: HashMap<VertexKey, u32> = HashMap::with_capacity(triangles.len());
    let mut mesh = IndexedMesh::with_capacity(triangles.len(), triangles.len());

    for tri in triangles {
        let mut face = [0_u32; 3];
        for (slot, &corner) in face.iter_mut().zip(tri.corners()) {
            *slot = *vertex_map
                .entry(vertex_key(corner, scale))
                .or_insert_with(|| {
                    mesh.vertices.push(Vertex::from_f32(corner));
                    (mesh.vertices.len() - 1) as u32
                });
        }
        mesh.faces.push(face);
    }

    let stats = IndexStats {
        corner_count: triangles.len() * 3,
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
    };
    debug!(
        corners = stats.corner_count,
        vertices = stats.vertex_count,
        merged = stats.merged_count(),
        precision = params.precision(),
        "Indexed triangle soup"
    );

    (mesh, stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use coinpack_types::MeshTopology;
    use hashbrown::HashSet;

    fn square_at(x: f32, y: f32) -> Vec<RawTriangle> {
        vec![
            RawTriangle::new([x, y, 0.0], [x + 1.0, y, 0.0], [x + 1.0, y + 1.0, 0.0]),
            RawTriangle::new([x, y, 0.0], [x + 1.0, y + 1.0, 0.0], [x, y + 1.0, 0.0]),
        ]
    }

    #[test]
    fn shared_corners_merge() {
        let (mesh, stats) = index_triangles_with_stats(&square_at(0.0, 0.0), &IndexParams::default());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(stats.corner_count, 6);
        assert_eq!(stats.merged_count(), 2);
        assert_eq!(stats.face_count, 2);
        assert!(mesh.indices_in_range());
    }

    #[test]
    fn winding_is_preserved() {
        let soup = [
            RawTriangle::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
            RawTriangle::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        let mesh = index_triangles(&soup, &IndexParams::default());
        assert_eq!(mesh.faces, vec![[0, 1, 2], [2, 1, 3]]);
        for (face, tri) in mesh.faces.iter().zip(&soup) {
            for (&index, corner) in face.iter().zip(tri.corners()) {
                assert_eq!(mesh.vertices[index as usize], Vertex::from_f32(*corner));
            }
        }
    }

    #[test]
    fn indexing_is_deterministic() {
        let mut soup = square_at(0.0, 0.0);
        soup.extend(square_at(0.5, 0.25));
        soup.extend(square_at(-3.0, 7.0));
        let params = IndexParams::default();
        let first = index_triangles(&soup, &params);
        let second = index_triangles(&soup, &params);
        assert_eq!(first, second);
    }

    #[test]
    fn vertex_count_equals_unique_rounded_corners() {
        let mut soup = square_at(0.0, 0.0);
        soup.extend(square_at(1.0, 0.0));
        soup.extend(square_at(0.0, 1.0));
        let params = IndexParams::default();

        let unique: HashSet<VertexKey> = soup
            .iter()
            .flat_map(|t| t.corners().iter().copied())
            .map(|c| vertex_key(c, params.scale()))
            .collect();

        let mesh = index_triangles(&soup, &params);
        assert_eq!(mesh.vertex_count(), unique.len());
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn same_key_same_index_distinct_key_distinct_index() {
        let soup = [
            RawTriangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            RawTriangle::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        let mesh = index_triangles(&soup, &IndexParams::default());
        // corner [1,0,0] appears in both triangles
        assert_eq!(mesh.faces[0][1], mesh.faces[1][0]);
        assert_ne!(mesh.faces[1][2], mesh.faces[0][0]);
    }

    #[test]
    fn export_noise_merges_at_default_precision() {
        // Exporters write near-zero coordinates as tiny non-zero values and
        // drift a few ULPs on sub-millimeter coordinates.
        let half_ulp_up = f32::from_bits(0.5_f32.to_bits() + 1);
        let soup = [
            RawTriangle::new([0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 1.0, 0.0]),
            RawTriangle::new([3e-8, -2e-8, 0.0], [half_ulp_up, 0.0, 1e-9], [0.0, 1.0, 0.0]),
        ];
        let mesh = index_triangles(&soup, &IndexParams::default());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[0], mesh.faces[1]);
    }

    #[test]
    fn distinct_nearby_vertices_stay_distinct() {
        // 10 µm apart: well above the rounding step, below print resolution.
        let soup = [
            RawTriangle::new([0.0, 0.0, 0.0], [30.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            RawTriangle::new([30.01, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        let mesh = index_triangles(&soup, &IndexParams::default());
        assert_eq!(mesh.vertex_count(), 5);
    }

    #[test]
    fn coarse_precision_merges_more() {
        let soup = [
            RawTriangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            RawTriangle::new([1.004, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        assert_eq!(index_triangles(&soup, &IndexParams::new(6)).vertex_count(), 5);
        assert_eq!(index_triangles(&soup, &IndexParams::new(2)).vertex_count(), 4);
    }

    #[test]
    fn signed_zero_shares_a_vertex() {
        let soup = [RawTriangle::new([0.0, 0.0, 0.0], [-0.0, 0.0, 0.0], [1.0, 0.0, 0.0])];
        let mesh = index_triangles(&soup, &IndexParams::default());
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.faces[0], [0, 0, 1]);
    }

    #[test]
    fn coin_scale_ulp_noise_needs_coarser_precision() {
        // At 30 mm one f32 step is ~1.9e-6, larger than the 1e-6 rounding
        // step: adjacent floats stay apart at precision 6 and merge at 5.
        let next_up = f32::from_bits(30.0_f32.to_bits() + 1);
        let soup = [
            RawTriangle::new([30.0, 0.0, 0.0], [31.0, 0.0, 0.0], [30.0, 1.0, 0.0]),
            RawTriangle::new([next_up, 0.0, 0.0], [31.0, 0.0, 0.0], [30.0, 1.0, 0.0]),
        ];
        assert_eq!(index_triangles(&soup, &IndexParams::new(6)).vertex_count(), 4);

        let coarse = index_triangles(&soup, &IndexParams::new(5));
        assert_eq!(coarse.vertex_count(), 3);
        assert_eq!(coarse.faces[0], coarse.faces[1]);
    }

    #[test]
    fn large_and_infinite_coordinates_stay_distinct() {
        let soup = [RawTriangle::new(
            [f32::INFINITY, 0.0, 0.0],
            [f32::MAX, 0.0, 0.0],
            [1e13, 0.0, 0.0],
        )];
        let mesh = index_triangles(&soup, &IndexParams::default());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[0], [0, 1, 2]);

        let huge = [RawTriangle::new([1e13, 0.0, 0.0], [-1e13, 0.0, 0.0], [2e13, 0.0, 0.0])];
        let mesh = index_triangles(&huge, &IndexParams::new(MAX_PRECISION));
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn nan_corner_does_not_merge_with_origin() {
        let soup = [
            RawTriangle::new([f32::NAN; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            RawTriangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let mesh = index_triangles(&soup, &IndexParams::default());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 1, 2]]);
        assert_eq!(mesh.vertices[3], Vertex::from_coords(0.0, 0.0, 0.0));
    }

    #[test]
    fn precision_is_clamped() {
        assert_eq!(IndexParams::new(40).precision(), MAX_PRECISION);
    }

    #[test]
    fn empty_input_gives_empty_mesh() {
        let (mesh, stats) = index_triangles_with_stats(&[], &IndexParams::default());
        assert!(mesh.is_empty());
        assert_eq!(stats, IndexStats::default());
    }
}
