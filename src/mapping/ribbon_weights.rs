use crate::bounding_volume::Aabb;
use crate::mapping::error::check_len;
use crate::mapping::{MappingError, RibbonParameters};
use crate::math::{Point, Real, Vector};
use crate::shape::{RibbonPolyhedron, TriSurface, VolumeSpace};
use crate::utils::parallel;

/// The fraction of one voxel covered by the ribbon column of a vertex.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoxelWeight {
    /// The voxel index.
    pub ijk: [usize; 3],
    /// The covered fraction, in `(0, 1]`.
    pub weight: Real,
}

/// The sparse voxel weights of every vertex of a surface.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct VertexWeights {
    dims: [usize; 3],
    weights: Vec<Vec<VoxelWeight>>,
}

/// A sample point inside the ribbon column of a vertex.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointWeight {
    /// The sample position.
    pub point: Point<Real>,
    /// `1` for samples inside the column, `0.5` for samples hitting the warp of a side wall.
    pub weight: Real,
}

/// The per-voxel view of [`VertexWeights`]: for each voxel, the vertices whose column
/// covers it, with their weights.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelContributions {
    offsets: Vec<usize>,
    entries: Vec<(usize, Real)>,
    num_vertices: usize,
}

impl VoxelContributions {
    /// The `(vertex, weight)` pairs of the voxel at linear index `voxel`, in increasing
    /// vertex order.
    #[inline]
    pub fn voxel(&self, voxel: usize) -> &[(usize, Real)] {
        &self.entries[self.offsets[voxel]..self.offsets[voxel + 1]]
    }

    /// The number of voxels.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.offsets.len() - 1
    }

    /// The number of vertices of the inverted weights, contributing or not.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }
}

impl VertexWeights {
    /// Wraps already computed per-vertex weight lists for a volume of dimensions `dims`.
    ///
    /// Fails if a voxel index lies outside of `dims`.
    pub fn new(
        dims: [usize; 3],
        weights: Vec<Vec<VoxelWeight>>,
    ) -> Result<Self, MappingError> {
        if let Some(w) = weights
            .iter()
            .flatten()
            .find(|w| (0..3).any(|axis| w.ijk[axis] >= dims[axis]))
        {
            return Err(MappingError::VoxelOutOfBounds { ijk: w.ijk, dims });
        }

        Ok(Self { dims, weights })
    }

    /// The dimensions of the volume the weights refer to.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// The number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.weights.len()
    }

    /// The voxel weights of `vertex`, in scan order (not sorted).
    #[inline]
    pub fn vertex(&self, vertex: usize) -> &[VoxelWeight] {
        &self.weights[vertex]
    }

    /// All the per-vertex weight lists.
    #[inline]
    pub fn as_slice(&self) -> &[Vec<VoxelWeight>] {
        &self.weights
    }

    /// Mutable access to all the per-vertex weight lists.
    ///
    /// Voxel indices must stay inside `dims`.
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Vec<VoxelWeight>] {
        &mut self.weights
    }

    /// The position of voxel `ijk` in a frame.
    #[inline]
    pub fn linear_index(&self, ijk: [usize; 3]) -> usize {
        ijk[0] + self.dims[0] * (ijk[1] + self.dims[1] * ijk[2])
    }

    /// The number of voxels of the volume.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// A dense frame holding the weights of `vertex` and zero elsewhere.
    pub fn to_frame(&self, vertex: usize) -> Result<Vec<Real>, MappingError> {
        let weights = self
            .weights
            .get(vertex)
            .ok_or(MappingError::InvalidVertex {
                vertex,
                num_vertices: self.num_vertices(),
            })?;

        let mut frame = vec![0.0; self.num_voxels()];
        for w in weights {
            frame[self.linear_index(w.ijk)] = w.weight;
        }

        Ok(frame)
    }

    /// Inverts these weights into per-voxel lists of contributing vertices.
    pub fn invert(&self) -> VoxelContributions {
        let num_voxels = self.num_voxels();
        let mut offsets = vec![0; num_voxels + 1];

        for w in self.weights.iter().flatten() {
            offsets[self.linear_index(w.ijk) + 1] += 1;
        }

        for i in 0..num_voxels {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut entries = vec![(0, 0.0); offsets[num_voxels]];

        for (vertex, weights) in self.weights.iter().enumerate() {
            for w in weights {
                let slot = &mut cursor[self.linear_index(w.ijk)];
                entries[*slot] = (vertex, w.weight);
                *slot += 1;
            }
        }

        VoxelContributions {
            offsets,
            entries,
            num_vertices: self.num_vertices(),
        }
    }
}

/// Computes, for every vertex, the fraction of each nearby voxel lying inside the ribbon
/// column of that vertex.
///
/// `inner` and `outer` must be in vertex correspondence. Voxels whose `roi` value is not
/// positive are skipped, as are the vertices whose `vertex_mask` entry is `false`.
///
/// Each voxel is sampled at the centers of `subdivisions³` sub-cells. A sample inside the
/// column counts for one, a sample hitting the warp of a side wall counts for one half.
pub fn compute_ribbon_weights(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    roi: Option<&[Real]>,
    vertex_mask: Option<&[bool]>,
    params: &RibbonParameters,
) -> Result<VertexWeights, MappingError> {
    check_ribbon_inputs(space, inner, outer, roi, params)?;

    if let Some(mask) = vertex_mask {
        check_len("vertex mask", mask.len(), inner.num_vertices())?;
    }

    let sampler = VoxelSampler::new(space, params.subdivisions);
    let weights = parallel::map_indexed(inner.num_vertices(), |vertex| {
        let mut result = Vec::new();

        if vertex_mask.map_or(false, |mask| !mask[vertex]) {
            return result;
        }

        let Some((column, range)) = column_and_voxels(vertex, space, inner, outer, params) else {
            return result;
        };

        for_each_voxel(&range, |ijk| {
            if in_roi(space, roi, ijk) {
                let weight = sampler.covered_fraction(space, &column, ijk);
                if weight > 0.0 {
                    result.push(VoxelWeight { ijk, weight });
                }
            }
        });

        result
    });

    let num_missed = (0..inner.num_vertices())
        .filter(|v| weights[*v].is_empty() && !inner.vertex_triangles(*v).is_empty())
        .filter(|v| vertex_mask.map_or(true, |mask| mask[*v]))
        .count();

    if num_missed > 0 {
        log::warn!(
            "{} vertices have a ribbon column touching no voxel.",
            num_missed
        );
    }

    log::debug!(
        "Ribbon weights computed for {} vertices ({} voxel weights).",
        weights.len(),
        weights.iter().map(Vec::len).sum::<usize>()
    );

    Ok(VertexWeights {
        dims: space.dims(),
        weights,
    })
}

/// Collects, for every vertex, the voxel sub-samples lying inside its ribbon column.
///
/// The samples are the ones of [`compute_ribbon_weights`]: the centers of the
/// `subdivisions³` sub-cells of every voxel near the column, skipping voxels whose `roi`
/// value is not positive. Each kept sample is weighted `1` if it is inside the column and
/// `0.5` if it hits the warp of a side wall.
pub fn compute_ribbon_points(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    roi: Option<&[Real]>,
    params: &RibbonParameters,
) -> Result<Vec<Vec<PointWeight>>, MappingError> {
    check_ribbon_inputs(space, inner, outer, roi, params)?;

    let sampler = VoxelSampler::new(space, params.subdivisions);
    let points = parallel::map_indexed(inner.num_vertices(), |vertex| {
        let mut result = Vec::new();

        let Some((column, range)) = column_and_voxels(vertex, space, inner, outer, params) else {
            return result;
        };

        for_each_voxel(&range, |ijk| {
            if in_roi(space, roi, ijk) {
                sampler.for_each_sample(space, ijk, |point| {
                    let weight = column.contains_point(&point).weight() as Real * 0.5;
                    if weight > 0.0 {
                        result.push(PointWeight { point, weight });
                    }
                });
            }
        });

        result
    });

    log::debug!(
        "Ribbon points computed for {} vertices ({} points).",
        points.len(),
        points.iter().map(Vec::len).sum::<usize>()
    );

    Ok(points)
}

fn check_ribbon_inputs(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    roi: Option<&[Real]>,
    params: &RibbonParameters,
) -> Result<(), MappingError> {
    if !inner.has_vertex_correspondence(outer) {
        return Err(MappingError::NoVertexCorrespondence);
    }

    if params.subdivisions < 1 {
        return Err(MappingError::InvalidSubdivisions);
    }

    if let Some(roi) = roi {
        check_len("ROI frame", roi.len(), space.num_voxels())?;
    }

    Ok(())
}

#[inline]
fn in_roi(space: &VolumeSpace, roi: Option<&[Real]>, ijk: [usize; 3]) -> bool {
    roi.map_or(true, |roi| roi[space.linear_index(ijk)] > 0.0)
}

/// The column of `vertex` and the range of voxels it may overlap, or `None` for isolated
/// vertices and columns outside of the volume.
fn column_and_voxels(
    vertex: usize,
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    params: &RibbonParameters,
) -> Option<(RibbonPolyhedron, [[usize; 3]; 2])> {
    if inner.vertex_triangles(vertex).is_empty() {
        return None;
    }

    // The column lies within the neighborhood of the vertex on both surfaces.
    let neighborhood = std::iter::once(vertex)
        .chain(inner.vertex_neighbors(vertex).iter().map(|v| *v as usize))
        .flat_map(|v| [inner.vertices()[v], outer.vertices()[v]]);
    let index_bounds = Aabb::from_points(neighborhood.map(|pt| space.space_to_index(&pt)));
    let range = voxel_range(&index_bounds, space.dims())?;

    let column = RibbonPolyhedron::new(vertex, inner, outer, params.thin_columns);
    Some((column, range))
}

fn for_each_voxel(range: &[[usize; 3]; 2], mut f: impl FnMut([usize; 3])) {
    for k in range[0][2]..=range[1][2] {
        for j in range[0][1]..=range[1][1] {
            for i in range[0][0]..=range[1][0] {
                f([i, j, k]);
            }
        }
    }
}

/// The inclusive range of voxels overlapping `index_bounds`, expanded by half a voxel and
/// clamped to the volume, or `None` if it is empty.
fn voxel_range(index_bounds: &Aabb, dims: [usize; 3]) -> Option<[[usize; 3]; 2]> {
    let mut range = [[0; 3]; 2];

    for axis in 0..3 {
        let lo = index_bounds.mins[axis];
        let hi = index_bounds.maxs[axis];

        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }

        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi + 0.5).floor().min(dims[axis] as Real - 1.0);

        if start > end {
            return None;
        }

        range[0][axis] = start as usize;
        range[1][axis] = end as usize;
    }

    Some(range)
}

/// Samples voxels at the centers of a regular grid of sub-cells.
struct VoxelSampler {
    subdivisions: usize,
    sub_steps: [Vector<Real>; 3],
    denominator: Real,
}

impl VoxelSampler {
    fn new(space: &VolumeSpace, subdivisions: usize) -> Self {
        let n = subdivisions as Real;
        Self {
            subdivisions,
            sub_steps: [0, 1, 2].map(|axis| space.step(axis) / n),
            denominator: 2.0 * n * n * n,
        }
    }

    /// Calls `f` on the center of every sub-cell of the voxel `ijk`.
    fn for_each_sample(
        &self,
        space: &VolumeSpace,
        ijk: [usize; 3],
        mut f: impl FnMut(Point<Real>),
    ) {
        let corner = space.index_to_space(&Point::new(
            ijk[0] as Real - 0.5,
            ijk[1] as Real - 0.5,
            ijk[2] as Real - 0.5,
        ));
        let [di, dj, dk] = self.sub_steps;

        for a in 0..self.subdivisions {
            let pa = corner + di * (a as Real + 0.5);
            for b in 0..self.subdivisions {
                let pb = pa + dj * (b as Real + 0.5);
                for c in 0..self.subdivisions {
                    f(pb + dk * (c as Real + 0.5));
                }
            }
        }
    }

    /// The fraction of the voxel `ijk` inside `column`.
    fn covered_fraction(
        &self,
        space: &VolumeSpace,
        column: &RibbonPolyhedron,
        ijk: [usize; 3],
    ) -> Real {
        let mut total = 0;
        self.for_each_sample(space, ijk, |pt| total += column.contains_point(&pt).weight());
        total as Real / self.denominator
    }
}
