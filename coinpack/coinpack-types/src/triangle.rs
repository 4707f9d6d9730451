//! Raw triangle as read from a binary STL facet.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete single-precision corner positions.
///
/// This is the triangle-soup form produced by the STL loader: no shared
/// vertices, no identity beyond position. The facet normal is not kept;
/// corner order carries the orientation.
///
/// # Example
///
/// ```
/// use coinpack_types::RawTriangle;
///
/// let tri = RawTriangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
/// assert_eq!(tri.corners()[1], [1.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawTriangle {
    /// Corner positions in file order.
    pub corners: [[f32; 3]; 3],
}

impl RawTriangle {
    /// Create a triangle from three corners.
    #[inline]
    #[must_use]
    pub const fn new(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Self {
        Self {
            corners: [a, b, c],
        }
    }

    /// Corner positions in file order.
    #[inline]
    #[must_use]
    pub const fn corners(&self) -> &[[f32; 3]; 3] {
        &self.corners
    }
}

impl From<[[f32; 3]; 3]> for RawTriangle {
    fn from(corners: [[f32; 3]; 3]) -> Self {
        Self { corners }
    }
}
