use crate::mapping::error::check_len;
use crate::mapping::{
    compute_ribbon_points, compute_ribbon_weights, MappingError, PointWeight, VertexWeights,
    VolumeToSurfaceParameters,
};
use crate::math::Real;
use crate::shape::{TriSurface, VolumeSpace};
use crate::utils::parallel;

/// The result of [`map_volume_to_surface_ribbon`].
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonMapping {
    /// One vector of per-vertex values for each input frame.
    pub values: Vec<Vec<Real>>,
    /// The vertices whose column received no weight at all, and got `0`.
    pub bad_vertices: Vec<bool>,
    /// The voxel weights used for the mapping.
    pub weights: VertexWeights,
}

/// The result of [`map_volume_to_surface_points`].
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonPointMapping {
    /// One vector of per-vertex values for each input frame.
    pub values: Vec<Vec<Real>>,
    /// The vertices without any weighted sample inside the volume, which got `0`.
    pub bad_vertices: Vec<bool>,
    /// The ribbon samples of every vertex.
    pub points: Vec<Vec<PointWeight>>,
}

/// Maps volume frames onto the vertices of a surface, averaging each frame over the ribbon
/// column of every vertex.
///
/// Voxels whose `roi` value is not positive are ignored. With
/// [`VolumeToSurfaceParameters::roi_weighted`], each voxel weight is also multiplied by its
/// ROI value, which then becomes mandatory.
pub fn map_volume_to_surface_ribbon(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    frames: &[&[Real]],
    roi: Option<&[Real]>,
    params: &VolumeToSurfaceParameters,
) -> Result<RibbonMapping, MappingError> {
    for frame in frames {
        check_len("volume frame", frame.len(), space.num_voxels())?;
    }

    if params.roi_weighted && roi.is_none() {
        return Err(MappingError::MissingRoi);
    }

    let mut weights = compute_ribbon_weights(space, inner, outer, roi, None, &params.ribbon)?;

    if let (true, Some(roi)) = (params.roi_weighted, roi) {
        parallel::for_each_indexed_mut(weights.as_mut_slice(), |_, vertex_weights| {
            for w in vertex_weights {
                w.weight *= roi[space.linear_index(w.ijk)];
            }
        });
    }

    let bad_vertices: Vec<bool> = weights
        .as_slice()
        .iter()
        .map(|vertex_weights| vertex_weights.iter().map(|w| w.weight).sum::<Real>() == 0.0)
        .collect();

    let values = frames
        .iter()
        .map(|frame| average_frame(&weights, frame))
        .collect::<Result<_, _>>()?;

    let num_bad = bad_vertices.iter().filter(|bad| **bad).count();
    log::debug!(
        "{} frames mapped onto {} vertices, {} without any voxel weight.",
        frames.len(),
        weights.num_vertices(),
        num_bad
    );

    Ok(RibbonMapping {
        values,
        bad_vertices,
        weights,
    })
}

/// The weighted average of `frame` over the voxels of every vertex, or `0` for vertices
/// with a zero total weight.
///
/// `frame` must hold one value per voxel of the volume the weights refer to.
pub fn average_frame(
    weights: &VertexWeights,
    frame: &[Real],
) -> Result<Vec<Real>, MappingError> {
    check_len("volume frame", frame.len(), weights.num_voxels())?;

    let mut result = vec![0.0; weights.num_vertices()];

    parallel::for_each_indexed_mut(&mut result, |vertex, out| {
        let mut total = 0.0;
        let mut sum = 0.0;

        for w in weights.vertex(vertex) {
            total += w.weight;
            sum += w.weight * frame[weights.linear_index(w.ijk)];
        }

        if total != 0.0 {
            *out = sum / total;
        }
    });

    Ok(result)
}

/// Maps volume frames onto the vertices of a surface, averaging each frame over the voxel
/// sub-samples inside the ribbon column of every vertex.
///
/// Unlike [`map_volume_to_surface_ribbon`], which weights whole voxels by their covered
/// fraction, every sample reads the value of its enclosing voxel with its own weight (see
/// [`compute_ribbon_points`]). Samples outside of the volume are ignored. The ROI is used
/// as in [`map_volume_to_surface_ribbon`], read at the enclosing voxel of each sample.
pub fn map_volume_to_surface_points(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    frames: &[&[Real]],
    roi: Option<&[Real]>,
    params: &VolumeToSurfaceParameters,
) -> Result<RibbonPointMapping, MappingError> {
    for frame in frames {
        check_len("volume frame", frame.len(), space.num_voxels())?;
    }

    if params.roi_weighted && roi.is_none() {
        return Err(MappingError::MissingRoi);
    }

    let points = compute_ribbon_points(space, inner, outer, roi, &params.ribbon)?;

    // The frame position and weight of every sample, resolved once for all frames.
    let samples = parallel::map_indexed(points.len(), |vertex| {
        points[vertex]
            .iter()
            .filter_map(|sample| {
                let voxel = space.linear_index(space.enclosing_voxel(&sample.point)?);
                let weight = match (params.roi_weighted, roi) {
                    (true, Some(roi)) => sample.weight * roi[voxel],
                    _ => sample.weight,
                };
                Some((voxel, weight))
            })
            .collect::<Vec<_>>()
    });

    let bad_vertices: Vec<bool> = samples
        .iter()
        .map(|vertex_samples| vertex_samples.iter().map(|s| s.1).sum::<Real>() == 0.0)
        .collect();

    let values = frames
        .iter()
        .map(|frame| {
            let mut result = vec![0.0; samples.len()];
            parallel::for_each_indexed_mut(&mut result, |vertex, out| {
                let mut total = 0.0;
                let mut sum = 0.0;

                for (voxel, weight) in &samples[vertex] {
                    total += *weight;
                    sum += *weight * frame[*voxel];
                }

                if total != 0.0 {
                    *out = sum / total;
                }
            });
            result
        })
        .collect();

    log::debug!(
        "{} frames mapped onto {} vertices from ribbon samples, {} without any sample.",
        frames.len(),
        samples.len(),
        bad_vertices.iter().filter(|bad| **bad).count()
    );

    Ok(RibbonPointMapping {
        values,
        bad_vertices,
        points,
    })
}
