//! Parity tests of the vertical ray `{ pt + t * z, t > 0 }` against triangles and warped quads.

use crate::math::{Point, Real};
use crate::shape::{Quad, Triangle};
use crate::utils;
use na::Point2;

/// Does the ray going from `pt` toward `+Z` cross the triangle `tri`?
///
/// The crossing is decided on the projection onto the XY plane (with half-open edges, see
/// [`utils::point_in_poly2d`]) combined with a strict depth test: the triangle's plane
/// must lie above `pt`. Triangles whose plane is vertical are never crossed.
pub fn vertical_ray_crosses_triangle(tri: &Triangle, pt: &Point<Real>) -> bool {
    let normal = tri.scaled_normal();

    if normal.z == 0.0 {
        return false;
    }

    let plane_z = tri.a.z - (normal.x * (pt.x - tri.a.x) + normal.y * (pt.y - tri.a.y)) / normal.z;

    if !(plane_z > pt.z) {
        return false;
    }

    let projected = tri.vertices().map(|v| Point2::new(v.x, v.y));
    utils::point_in_poly2d(&Point2::new(pt.x, pt.y), &projected)
}

/// The number of crossings, out of 2, between the ray going from `pt` toward `+Z` and the
/// (possibly warped) quad `quad`.
///
/// The quad is tested through both of its triangulations, each of them crossing the ray
/// either once or not at all. The result is `0` if neither does, `2` if both do, and `1`
/// if they disagree: the ray then passes through the warp of the quad, and whether it
/// crosses the actual surface is undecidable.
pub fn vertical_ray_quad_crossings(quad: &Quad, pt: &Point<Real>) -> u32 {
    quad.triangulations()
        .iter()
        .map(|[t1, t2]| {
            let crossed =
                vertical_ray_crosses_triangle(t1, pt) != vertical_ray_crosses_triangle(t2, pt);
            crossed as u32
        })
        .sum()
}
