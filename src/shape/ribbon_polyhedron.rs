use crate::shape::{Quad, TriSurface, Triangle};

/// The closed column of tissue spanned by the triangles around one surface vertex,
/// between two surfaces in vertex correspondence.
///
/// The column is stored as a soup of faces: planar triangular caps on the inner and
/// outer surfaces, and (generally warped) quads for the side walls. Walls shared by two
/// triangles around the vertex are interior to the column and are omitted.
///
/// Two constructions exist:
/// - **thick** columns cover every triangle incident to the vertex, so each point of the
///   ribbon lies in the columns of the three vertices of its triangle;
/// - **thin** columns cover only the part of each incident triangle closer to the vertex
///   (cut at the edge midpoints and the triangle centroid), so the columns of all
///   vertices tile the ribbon without overlap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RibbonPolyhedron {
    /// The planar caps.
    pub triangles: Vec<Triangle>,
    /// The side walls.
    pub quads: Vec<Quad>,
}

impl RibbonPolyhedron {
    /// Builds the column of `vertex`, thin or thick.
    ///
    /// The surfaces must be in vertex correspondence and `vertex` must be a valid vertex
    /// index. The triangles of `inner` are used for both surfaces. Faces are built from
    /// each triangle's own vertex ordering, so the result does not depend on which vertex
    /// the triangle is visited from.
    pub fn new(vertex: usize, inner: &TriSurface, outer: &TriSurface, thin: bool) -> Self {
        if thin {
            Self::thin(vertex, inner, outer)
        } else {
            Self::thick(vertex, inner, outer)
        }
    }

    /// Builds the thick column of `vertex`.
    pub fn thick(vertex: usize, inner: &TriSurface, outer: &TriSurface) -> Self {
        let mut result = Self::default();

        for (tri_id, a, b) in incident_triangles(vertex, inner) {
            let tri = &inner.indices()[tri_id];
            result.triangles.push(triangle_at(inner, tri));
            result.triangles.push(triangle_at(outer, tri));

            let (ia, ib) = (inner.vertices()[a], inner.vertices()[b]);
            let (oa, ob) = (outer.vertices()[a], outer.vertices()[b]);
            result.quads.push(Quad::new(oa, ob, ib, ia));
        }

        result
    }

    /// Builds the thin column of `vertex`.
    pub fn thin(vertex: usize, inner: &TriSurface, outer: &TriSurface) -> Self {
        let mut result = Self::default();

        for (tri_id, a, b) in incident_triangles(vertex, inner) {
            let tri = &inner.indices()[tri_id];
            let [inner_parts, outer_parts] = [inner, outer].map(|surface| {
                let pts = surface.vertices();
                let center = triangle_at(surface, tri).center();
                let v = pts[vertex];
                (v, na::center(&v, &pts[a]), center, na::center(&v, &pts[b]))
            });

            for (v, mid_a, center, mid_b) in [inner_parts, outer_parts] {
                result.triangles.push(Triangle::new(v, mid_a, center));
                result.triangles.push(Triangle::new(v, center, mid_b));
            }

            let (_, inner_mid_a, inner_center, inner_mid_b) = inner_parts;
            let (_, outer_mid_a, outer_center, outer_mid_b) = outer_parts;
            result.quads.push(Quad::new(
                outer_mid_a,
                outer_center,
                inner_center,
                inner_mid_a,
            ));
            result.quads.push(Quad::new(
                outer_center,
                outer_mid_b,
                inner_mid_b,
                inner_center,
            ));
        }

        result
    }
}

/// The triangles containing `vertex`, as `(triangle, a, b)` where `(vertex, a, b)` is the
/// triangle's vertex cycle starting at `vertex`.
fn incident_triangles(
    vertex: usize,
    surface: &TriSurface,
) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    surface.vertex_triangles(vertex).iter().filter_map(move |tri_id| {
        let tri = surface.indices()[*tri_id as usize];
        let k = tri.iter().position(|v| *v as usize == vertex)?;
        Some((
            *tri_id as usize,
            tri[(k + 1) % 3] as usize,
            tri[(k + 2) % 3] as usize,
        ))
    })
}

fn triangle_at(surface: &TriSurface, tri: &[u32; 3]) -> Triangle {
    let pts = surface.vertices();
    Triangle::new(
        pts[tri[0] as usize],
        pts[tri[1] as usize],
        pts[tri[2] as usize],
    )
}
