use crate::math::{Point, Real};

/// Indicated an inconsistency in the topology of a triangulated surface.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// Found a triangle with two or three identical vertices.
    #[error("the triangle {0} has at least two identical vertices.")]
    BadTriangle(u32),
    /// Found a triangle referencing a vertex that does not exist.
    #[error("the triangle {triangle} references the vertex {vertex} of a surface with {num_vertices} vertices.")]
    VertexOutOfBounds {
        /// The offending triangle.
        triangle: u32,
        /// The vertex index out of bounds.
        vertex: u32,
        /// The number of vertices of the surface.
        num_vertices: usize,
    },
}

/// A triangulated surface with its vertex-triangle and vertex-vertex adjacency.
///
/// Two surfaces sharing the same triangles (e.g., the inner and outer boundary of the
/// cortical ribbon) are said to be in vertex correspondence: vertex `i` is the same
/// anatomical location on both.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct TriSurface {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
    vertex_triangles: Vec<Vec<u32>>,
    vertex_neighbors: Vec<Vec<u32>>,
}

impl TriSurface {
    /// Creates a surface from a vertex buffer and an index buffer.
    ///
    /// Vertices referenced by no triangle are allowed: they have no neighbors.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Result<Self, TopologyError> {
        let num_vertices = vertices.len();
        let mut vertex_triangles = vec![Vec::new(); num_vertices];
        let mut vertex_neighbors = vec![Vec::new(); num_vertices];

        for (tri_id, tri) in indices.iter().enumerate() {
            let triangle = tri_id as u32;

            if let Some(vertex) = tri.iter().find(|v| **v as usize >= num_vertices) {
                return Err(TopologyError::VertexOutOfBounds {
                    triangle,
                    vertex: *vertex,
                    num_vertices,
                });
            }

            if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
                return Err(TopologyError::BadTriangle(triangle));
            }

            for k in 0..3 {
                let v = tri[k] as usize;
                vertex_triangles[v].push(triangle);
                vertex_neighbors[v].push(tri[(k + 1) % 3]);
                vertex_neighbors[v].push(tri[(k + 2) % 3]);
            }
        }

        for neighbors in &mut vertex_neighbors {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Ok(Self {
            vertices,
            indices,
            vertex_triangles,
            vertex_neighbors,
        })
    }

    /// Creates a surface with the same triangles as `self` but different vertex positions.
    ///
    /// The adjacency is shared with `self`, so the result is in vertex correspondence with
    /// it. Returns `None` if the number of vertices differs.
    pub fn with_vertices(&self, vertices: Vec<Point<Real>>) -> Option<Self> {
        if vertices.len() != self.vertices.len() {
            return None;
        }

        Some(Self {
            vertices,
            indices: self.indices.clone(),
            vertex_triangles: self.vertex_triangles.clone(),
            vertex_neighbors: self.vertex_neighbors.clone(),
        })
    }

    /// The vertex buffer of this surface.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer of this surface.
    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The number of vertices of this surface.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The number of triangles of this surface.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// The triangles containing the vertex `vertex`, in increasing order.
    #[inline]
    pub fn vertex_triangles(&self, vertex: usize) -> &[u32] {
        &self.vertex_triangles[vertex]
    }

    /// The vertices sharing an edge with `vertex`, in increasing order.
    #[inline]
    pub fn vertex_neighbors(&self, vertex: usize) -> &[u32] {
        &self.vertex_neighbors[vertex]
    }

    /// Do `self` and `other` have the same vertex count and triangulation?
    ///
    /// Identical index buffers are accepted right away. Otherwise every vertex must have
    /// the same set of neighbors on both surfaces, so a surface whose triangles were
    /// reordered or rotated still corresponds.
    pub fn has_vertex_correspondence(&self, other: &TriSurface) -> bool {
        if self.num_vertices() != other.num_vertices()
            || self.num_triangles() != other.num_triangles()
        {
            return false;
        }

        if self.indices == other.indices {
            return true;
        }

        self.vertex_neighbors == other.vertex_neighbors
    }
}
