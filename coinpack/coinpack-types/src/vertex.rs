//! Indexed vertex type.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unique point in an indexed vertex list.
///
/// The position is stored as a `Point3<f64>`. Vertices produced from STL
/// data hold the exact widened `f32` value of the first corner that
/// introduced them.
///
/// # Example
///
/// ```
/// use coinpack_types::{Vertex, Point3};
///
/// let v1 = Vertex::new(Point3::new(1.0, 2.0, 3.0));
/// let v2 = Vertex::from_coords(1.0, 2.0, 3.0);
///
/// assert_eq!(v1, v2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position in millimeters.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use coinpack_types::Vertex;
    ///
    /// let v = Vertex::from_coords(1.0, 2.0, 3.0);
    /// assert_eq!(v.position.x, 1.0);
    /// assert_eq!(v.position.z, 3.0);
    /// ```
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }

    /// Create a vertex from a single-precision STL corner.
    ///
    /// # Example
    ///
    /// ```
    /// use coinpack_types::Vertex;
    ///
    /// let v = Vertex::from_f32([0.5, 1.5, -2.0]);
    /// assert_eq!(v.position.y, 1.5);
    /// ```
    #[inline]
    #[must_use]
    pub fn from_f32(corner: [f32; 3]) -> Self {
        Self::from_coords(
            f64::from(corner[0]),
            f64::from(corner[1]),
            f64::from(corner[2]),
        )
    }

    /// Coordinates as an `[x, y, z]` array.
    #[inline]
    #[must_use]
    pub fn coords(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }
}

impl From<[f32; 3]> for Vertex {
    fn from(corner: [f32; 3]) -> Self {
        Self::from_f32(corner)
    }
}
