//! Definition of the quadrilateral shape.

use crate::math::{Point, Real};
use crate::shape::Triangle;

/// A quadrilateral, possibly non-planar (warped).
///
/// The vertices are given in order around the quad: `a`-`b`, `b`-`c`, `c`-`d` and `d`-`a`
/// are its edges.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Quad {
    /// The quad first point.
    pub a: Point<Real>,
    /// The quad second point.
    pub b: Point<Real>,
    /// The quad third point.
    pub c: Point<Real>,
    /// The quad fourth point.
    pub d: Point<Real>,
}

impl Quad {
    /// Creates a quad from its four vertices, in order.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>, d: Point<Real>) -> Quad {
        Quad { a, b, c, d }
    }

    /// The two triangulations of this quad.
    ///
    /// The first one cuts the quad along the diagonal `a`-`c`, the second one along the
    /// diagonal `b`-`d`. Both are identical surfaces only if the quad is planar.
    #[inline]
    pub fn triangulations(&self) -> [[Triangle; 2]; 2] {
        [
            [
                Triangle::new(self.a, self.b, self.c),
                Triangle::new(self.c, self.d, self.a),
            ],
            [
                Triangle::new(self.b, self.c, self.d),
                Triangle::new(self.d, self.a, self.b),
            ],
        ]
    }
}
