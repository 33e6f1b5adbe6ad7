use crate::mapping::error::check_len;
use crate::mapping::{
    compute_ribbon_weights, MappingError, MappingFlags, SurfaceToVolumeParameters,
    VoxelContributions,
};
use crate::math::Real;
use crate::shape::{TriSurface, VolumeSpace};
use crate::utils::parallel;

/// Maps per-vertex values into a volume frame, as a weighted average over the ribbon
/// columns covering each voxel.
///
/// The weighted sum of a voxel is divided by its total weight in greedy mode, and otherwise
/// by the total weight expected for a voxel fully inside the ribbon (`1` for thin columns,
/// `3` for thick ones) or the actual total if it is larger. Voxels covered by no column
/// get `0`.
pub fn map_surface_to_volume(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    values: &[Real],
    roi: Option<&[Real]>,
    params: &SurfaceToVolumeParameters,
) -> Result<Vec<Real>, MappingError> {
    check_len("vertex values", values.len(), inner.num_vertices())?;

    let weights = compute_ribbon_weights(space, inner, outer, roi, None, &params.ribbon())?;
    aggregate_values(&weights.invert(), values, params.flags)
}

/// Maps per-vertex label keys into a volume frame by weighted majority vote.
///
/// See [`vote_label`] for the voting rule. Voxels without a label get `None`.
pub fn map_labels_to_volume(
    space: &VolumeSpace,
    inner: &TriSurface,
    outer: &TriSurface,
    labels: &[i32],
    roi: Option<&[Real]>,
    params: &SurfaceToVolumeParameters,
) -> Result<Vec<Option<i32>>, MappingError> {
    check_len("vertex labels", labels.len(), inner.num_vertices())?;

    let weights = compute_ribbon_weights(space, inner, outer, roi, None, &params.ribbon())?;
    aggregate_labels(&weights.invert(), labels, params.flags)
}

/// Weighted average of `values` in every voxel of `contributions`.
///
/// `values` must hold one value per vertex of the inverted weights.
pub fn aggregate_values(
    contributions: &VoxelContributions,
    values: &[Real],
    flags: MappingFlags,
) -> Result<Vec<Real>, MappingError> {
    check_len("vertex values", values.len(), contributions.num_vertices())?;

    let expected = flags.expected_coverage();
    let mut result = vec![0.0; contributions.num_voxels()];

    parallel::for_each_indexed_mut(&mut result, |voxel, out| {
        let mut total: Real = 0.0;
        let mut sum = 0.0;

        for (vertex, weight) in contributions.voxel(voxel) {
            total += *weight;
            sum += values[*vertex] * *weight;
        }

        if total > 0.0 {
            let denominator = if flags.contains(MappingFlags::GREEDY) {
                total
            } else {
                total.max(expected)
            };
            *out = sum / denominator;
        }
    });

    Ok(result)
}

/// Weighted majority vote of `labels` in every voxel of `contributions`.
pub fn aggregate_labels(
    contributions: &VoxelContributions,
    labels: &[i32],
    flags: MappingFlags,
) -> Result<Vec<Option<i32>>, MappingError> {
    check_len("vertex labels", labels.len(), contributions.num_vertices())?;

    let mut result = vec![None; contributions.num_voxels()];

    parallel::for_each_indexed_mut(&mut result, |voxel, out| {
        let votes = contributions
            .voxel(voxel)
            .iter()
            .map(|(vertex, weight)| (labels[*vertex], *weight));
        *out = vote_label(votes, flags);
    });

    Ok(result)
}

/// Picks the label with the largest summed weight among `(label, weight)` votes.
///
/// Ties go to the lowest label key. Unless `flags` contains [`MappingFlags::GREEDY`], a
/// voxel whose total weight is below half the expected coverage (`0.5` for thin columns,
/// `1.5` for thick ones) gets no label.
pub fn vote_label(
    votes: impl IntoIterator<Item = (i32, Real)>,
    flags: MappingFlags,
) -> Option<i32> {
    let mut sums: Vec<(i32, Real)> = Vec::new();
    let mut total = 0.0;

    for (label, weight) in votes {
        total += weight;
        match sums.binary_search_by_key(&label, |(l, _)| *l) {
            Ok(i) => sums[i].1 += weight,
            Err(i) => sums.insert(i, (label, weight)),
        }
    }

    if sums.is_empty() {
        return None;
    }

    if !flags.contains(MappingFlags::GREEDY) && total < flags.label_coverage_threshold() {
        return None;
    }

    let mut best = sums[0];
    for candidate in &sums[1..] {
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }

    Some(best.0)
}
