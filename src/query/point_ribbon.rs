use crate::math::{Point, Real};
use crate::query::{vertical_ray_crosses_triangle, vertical_ray_quad_crossings};
use crate::shape::RibbonPolyhedron;

/// The result of a point-in-ribbon test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// The point is outside of the column.
    Outside = 0,
    /// The test ray passes through the warp of a side wall: the point is counted as half
    /// inside.
    Ambiguous = 1,
    /// The point is inside the column.
    Inside = 2,
}

impl Containment {
    /// The weight of this result out of 2: `0`, `1` or `2`.
    #[inline]
    pub fn weight(self) -> u32 {
        self as u32
    }
}

impl RibbonPolyhedron {
    /// Tests if `pt` lies inside this column by casting a ray toward `+Z`.
    ///
    /// Each side wall is tested through both of its triangulations. If any wall gives an
    /// ambiguous answer the test stops and returns [`Containment::Ambiguous`]. Otherwise the
    /// parity of the number of crossed faces decides between inside and outside.
    ///
    /// Self-intersecting columns (e.g., from folded surfaces) are not detected: the parity
    /// answer is returned as is.
    pub fn contains_point(&self, pt: &Point<Real>) -> Containment {
        let mut crossings = 0;

        for quad in &self.quads {
            match vertical_ray_quad_crossings(quad, pt) {
                1 => return Containment::Ambiguous,
                n => crossings += n,
            }
        }

        for tri in &self.triangles {
            if vertical_ray_crosses_triangle(tri, pt) {
                crossings += 2;
            }
        }

        if (crossings / 2) % 2 == 1 {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }
}
