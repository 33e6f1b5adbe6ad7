use crate::mapping::error::check_len;
use crate::mapping::MappingError;
use crate::math::{Point, Real};
use crate::partitioning::PointLocator;
use crate::shape::{TriSurface, VolumeSpace};
use crate::utils::parallel;
use arrayvec::ArrayVec;

/// The six face neighbors of a voxel, in search order.
const FACE_NEIGHBORS: [[i64; 3]; 6] = [
    [0, 0, -1],
    [0, -1, 0],
    [-1, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
];

/// For every voxel of `space`, the surface vertex closest to the voxel center.
///
/// With `max_dist`, voxels without any vertex within that distance get `None`. Scanlines
/// are processed in parallel over a shared read-only locator.
pub fn nearest_vertices(
    space: &VolumeSpace,
    surface: &TriSurface,
    max_dist: Option<Real>,
) -> Result<Vec<Option<usize>>, MappingError> {
    if let Some(dist) = max_dist {
        if !(dist >= 0.0) {
            return Err(MappingError::InvalidDistance(dist));
        }
    }

    let locator = PointLocator::new(surface.vertices())?;
    let mut result = vec![None; space.num_voxels()];
    let row_len = space.dims()[0];

    parallel::for_each_chunk_mut(&mut result, row_len, |row, out| {
        let first = space.voxel_index(row * row_len);

        for (i, slot) in out.iter_mut().enumerate() {
            let center = space.voxel_center([i, first[1], first[2]]);
            let hit = match max_dist {
                Some(dist) => locator.closest_point_limited(&center, dist).ok().flatten(),
                None => locator.closest_point(&center),
            };
            *slot = hit.map(|hit| hit.index);
        }
    });

    Ok(result)
}

/// Maps per-vertex values into a volume frame, giving each voxel the value of the surface
/// vertex closest to its center.
///
/// Voxels without any vertex within `max_dist` get `0`.
pub fn map_nearest_vertex(
    space: &VolumeSpace,
    surface: &TriSurface,
    values: &[Real],
    max_dist: Option<Real>,
) -> Result<Vec<Real>, MappingError> {
    check_len("vertex values", values.len(), surface.num_vertices())?;

    let nearest = nearest_vertices(space, surface, max_dist)?;
    let num_unmapped = nearest.iter().filter(|v| v.is_none()).count();

    log::debug!(
        "Nearest-vertex mapping: {} of {} voxels without a vertex in range.",
        num_unmapped,
        nearest.len()
    );

    Ok(nearest
        .into_iter()
        .map(|vertex| vertex.map_or(0.0, |v| values[v]))
        .collect())
}

/// How [`dilate_volume`] computes the new value of a bad voxel.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum DilateMethod {
    /// The value of the nearest good voxel.
    #[default]
    Nearest,
    /// The average of the nearby good voxels, weighted by `1 / distance^exponent`.
    ///
    /// For labels, the key with the largest summed weight wins.
    Weighted {
        /// The exponent of the distance in the weighting function.
        exponent: Real,
    },
}

impl DilateMethod {
    /// The usual exponent of [`DilateMethod::Weighted`].
    pub const DEFAULT_EXPONENT: Real = 7.0;
}

/// Controls [`dilate_volume`].
#[derive(Copy, Clone, Debug, Default)]
pub struct DilateOptions<'a> {
    /// The way replacement values are computed.
    pub method: DilateMethod,
    /// Voxels with a positive value here are the ones to replace. Without it, the voxels
    /// with a zero value (or the unassigned key `0` for labels) inside `data_roi` are.
    pub bad_roi: Option<&'a [Real]>,
    /// Only voxels with a positive value here can provide data.
    pub data_roi: Option<&'a [Real]>,
    /// The frame holds label keys: values are rounded to the nearest integer.
    pub labels: bool,
}

/// Replaces the bad voxels of `frame` by values computed from the good voxels within
/// `distance`.
///
/// If no good voxel lies within `distance` but `distance` is less than 1% above the length
/// of a voxel step, the good face neighbors are used instead. Bad voxels left without a
/// value get `0`.
///
/// In weighted mode the search radius is not `distance` itself: it is chosen from the
/// distance to the closest good voxel so that the ignored voxels would carry about 2% of
/// the total weight, kept between 1.5 and 2 voxel steps (or twice `distance` if larger).
pub fn dilate_volume(
    space: &VolumeSpace,
    frame: &[Real],
    distance: Real,
    options: &DilateOptions,
) -> Result<Vec<Real>, MappingError> {
    if !(distance >= 0.0) {
        return Err(MappingError::InvalidDistance(distance));
    }

    let num_voxels = space.num_voxels();
    check_len("volume frame", frame.len(), num_voxels)?;
    if let Some(roi) = options.bad_roi {
        check_len("bad voxel ROI", roi.len(), num_voxels)?;
    }
    if let Some(roi) = options.data_roi {
        check_len("data ROI", roi.len(), num_voxels)?;
    }

    let value_at = |voxel: usize| {
        if options.labels {
            round_label(frame[voxel])
        } else {
            frame[voxel]
        }
    };
    let is_data = |voxel: usize| options.data_roi.map_or(true, |roi| roi[voxel] > 0.0);
    let is_bad = |voxel: usize| match options.bad_roi {
        Some(roi) => roi[voxel] > 0.0,
        None => is_data(voxel) && value_at(voxel) == 0.0,
    };

    let mut result = vec![0.0; num_voxels];
    let mut good_voxels = Vec::new();
    let mut good_centers = Vec::new();
    let mut to_replace = Vec::new();

    for voxel in 0..num_voxels {
        if is_bad(voxel) {
            to_replace.push(voxel);
            continue;
        }

        result[voxel] = value_at(voxel);

        if is_data(voxel) {
            good_voxels.push(voxel);
            good_centers.push(space.voxel_center(space.voxel_index(voxel)));
        }
    }

    if to_replace.is_empty() {
        return Ok(result);
    }

    let step_lengths = [0, 1, 2].map(|axis| space.step(axis).norm());
    let min_step = step_lengths[0].min(step_lengths[1]).min(step_lengths[2]);
    let check_neighbors = step_lengths.iter().any(|len| distance <= len * 1.01);
    let locator = PointLocator::new(&good_centers)?;

    let replacements = parallel::map_indexed(to_replace.len(), |i| {
        let ijk = space.voxel_index(to_replace[i]);
        let center = space.voxel_center(ijk);
        let closest = locator.closest_point_limited(&center, distance).ok().flatten();

        let value = match options.method {
            DilateMethod::Nearest => match closest {
                Some(hit) => frame[good_voxels[hit.index]],
                None if check_neighbors => closest_good_neighbor(space, ijk, &is_bad)
                    .map_or(0.0, |(neighbor, _)| frame[neighbor]),
                None => 0.0,
            },
            DilateMethod::Weighted { exponent } => {
                let closest_dist = match closest {
                    Some(hit) => Some(na::distance(&hit.coords, &center)),
                    None if check_neighbors => {
                        closest_good_neighbor(space, ijk, &is_bad).map(|(_, dist)| dist)
                    }
                    None => None,
                };

                match closest_dist {
                    Some(closest_dist) => {
                        let limits = KernelLimits {
                            base: (2.0 * distance).max(2.0 * min_step),
                            min: 1.5 * min_step,
                        };
                        let radius = limits.radius(closest_dist, exponent);
                        let in_range = locator
                            .points_in_range(&center, radius)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|hit| {
                                let dist = na::distance(&hit.coords, &center);
                                (value_at(good_voxels[hit.index]), 1.0 / dist.powf(exponent))
                            });

                        if options.labels {
                            weighted_label(in_range)
                        } else {
                            weighted_average(in_range)
                        }
                    }
                    None => 0.0,
                }
            }
        };

        if options.labels {
            round_label(value)
        } else {
            value
        }
    });

    for (voxel, value) in to_replace.iter().zip(replacements) {
        result[*voxel] = value;
    }

    log::debug!(
        "Dilated {} voxels ({:?}).",
        to_replace.len(),
        options.method
    );
    Ok(result)
}

/// Bounds on the search radius of the weighted dilation.
struct KernelLimits {
    base: Real,
    min: Real,
}

impl KernelLimits {
    /// The radius beyond which good voxels would carry at most about 2% of the weight of
    /// an infinite kernel, given the distance of the closest good voxel.
    ///
    /// This assumes farther voxels cover at most the same solid angle as closer ones.
    fn radius(&self, closest_dist: Real, exponent: Real) -> Real {
        // 49 = 98 / (100 - 98)
        let ratio = Real::max(1.1, Real::powf(49.0, 1.0 / (exponent - 3.0)));

        if exponent > 3.0 && ratio > 1.0 && ratio < 100.0 {
            (ratio * closest_dist).min(self.base).max(self.min)
        } else {
            self.base
        }
    }
}

fn weighted_average(samples: impl Iterator<Item = (Real, Real)>) -> Real {
    let mut sum = 0.0;
    let mut total = 0.0;

    for (value, weight) in samples {
        sum += value * weight;
        total += weight;
    }

    if total > 0.0 {
        sum / total
    } else {
        0.0
    }
}

/// The key with the largest summed weight, the lowest key on ties, or `0` without samples.
fn weighted_label(samples: impl Iterator<Item = (Real, Real)>) -> Real {
    let mut sums: Vec<(i64, Real)> = Vec::new();

    for (value, weight) in samples {
        let key = value as i64;
        match sums.binary_search_by_key(&key, |(k, _)| *k) {
            Ok(i) => sums[i].1 += weight,
            Err(i) => sums.insert(i, (key, weight)),
        }
    }

    let mut best: Option<(i64, Real)> = None;
    for (key, weight) in sums {
        if best.map_or(true, |(_, best_weight)| weight > best_weight) {
            best = Some((key, weight));
        }
    }

    best.map_or(0.0, |(key, _)| key as Real)
}

/// The closest face neighbor of `ijk` that is not bad, with its distance, first in search
/// order on ties.
fn closest_good_neighbor(
    space: &VolumeSpace,
    ijk: [usize; 3],
    is_bad: &impl Fn(usize) -> bool,
) -> Option<(usize, Real)> {
    let candidates: ArrayVec<(usize, Real), 6> = FACE_NEIGHBORS
        .iter()
        .filter_map(|offset| {
            let neighbor = [0, 1, 2].map(|axis| ijk[axis] as i64 + offset[axis]);
            if !space.contains_index(neighbor) {
                return None;
            }

            let voxel = space.linear_index(neighbor.map(|x| x as usize));
            if is_bad(voxel) {
                return None;
            }

            // Computed from the offset alone, so all voxels round the same way.
            let shift = Point::new(offset[0] as Real, offset[1] as Real, offset[2] as Real);
            let dist = (space.index_to_space(&shift) - space.origin()).norm();
            Some((voxel, dist))
        })
        .collect();

    let mut best: Option<(usize, Real)> = None;
    for (voxel, dist) in candidates {
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((voxel, dist));
        }
    }

    best
}

fn round_label(value: Real) -> Real {
    (value + 0.5).floor()
}
