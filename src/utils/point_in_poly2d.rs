use crate::math::Real;
use na::Point2;

/// Tests if the given point is inside an arbitrary closed polygon with arbitrary orientation,
/// using a crossing-count strategy.
///
/// The polygon is assumed to be closed, i.e., first and last point of the polygon are implicitly
/// assumed to be connected by an edge.
///
/// Edges are half-open along `y`: an edge vertex lying exactly at the height of `pt` only counts
/// as a crossing if it is the lower end of that edge.
pub fn point_in_poly2d(pt: &Point2<Real>, poly: &[Point2<Real>]) -> bool {
    if poly.is_empty() {
        return false;
    }

    let mut crossings = 0u32;

    for (i, a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        let seg_dir = b - a;
        let dpt = pt - a;
        let perp = dpt.perp(&seg_dir);
        crossings += match (dpt.y >= 0.0, b.y > pt.y) {
            (true, true) if perp < 0.0 => 1,
            (false, false) if perp > 0.0 => 1,
            _ => 0,
        };
    }

    crossings % 2 == 1
}
