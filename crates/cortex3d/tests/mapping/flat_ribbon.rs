use approx::assert_relative_eq;
use cortex3d::mapping::{
    compute_ribbon_weights, map_labels_to_volume, map_surface_to_volume,
    map_volume_to_surface_ribbon, MappingError, MappingFlags, RibbonParameters,
    SurfaceToVolumeParameters, VolumeToSurfaceParameters,
};
use cortex3d::math::{Point, Real, Vector};
use cortex3d::shape::{TriSurface, VolumeSpace};

const GRID: usize = 18;
const STEP: Real = 0.71;

/// Two parallel triangulated grids at z = 0 and z = 1, covering the volume footprint.
///
/// The grid is offset so that no voxel sample falls on a column boundary.
fn flat_ribbon() -> (TriSurface, TriSurface) {
    flat_ribbon_between(0.0, 1.0)
}

fn flat_ribbon_between(inner_z: Real, outer_z: Real) -> (TriSurface, TriSurface) {
    let mut vertices = Vec::new();
    for j in 0..GRID {
        for i in 0..GRID {
            vertices.push(Point::new(
                -2.03 + i as Real * STEP,
                -1.97 + j as Real * STEP,
                inner_z,
            ));
        }
    }

    let mut triangles = Vec::new();
    for j in 0..GRID as u32 - 1 {
        for i in 0..GRID as u32 - 1 {
            let v = j * GRID as u32 + i;
            let up = v + GRID as u32;
            triangles.push([v, v + 1, up + 1]);
            triangles.push([v, up + 1, up]);
        }
    }

    let inner = TriSurface::new(vertices, triangles).unwrap();
    let outer = inner
        .with_vertices(
            inner
                .vertices()
                .iter()
                .map(|p| Point::new(p.x, p.y, outer_z))
                .collect(),
        )
        .unwrap();

    (inner, outer)
}

/// Unit voxels, the first layer spanning exactly z in [0, 1].
fn space() -> VolumeSpace {
    VolumeSpace::from_spacing([8, 8, 3], Vector::repeat(1.0), Point::new(0.0, 0.0, 0.5)).unwrap()
}

fn coverage(thin_columns: bool) -> Vec<Real> {
    let (inner, outer) = flat_ribbon();
    let space = space();
    let params = RibbonParameters {
        subdivisions: 3,
        thin_columns,
    };

    let weights = compute_ribbon_weights(&space, &inner, &outer, None, None, &params).unwrap();
    let mut total = vec![0.0; space.num_voxels()];

    for vertex in 0..weights.num_vertices() {
        for w in weights.vertex(vertex) {
            assert!(w.weight > 0.0 && w.weight <= 1.0);
            total[space.linear_index(w.ijk)] += w.weight;
        }
    }

    total
}

#[test]
fn thin_columns_tile_the_ribbon() {
    let space = space();
    let total = coverage(true);

    for voxel in 0..space.num_voxels() {
        let [_, _, k] = space.voxel_index(voxel);
        let expected = if k == 0 { 1.0 } else { 0.0 };
        assert_relative_eq!(total[voxel], expected, epsilon = 1.0e-4);
    }
}

#[test]
fn thick_columns_cover_the_ribbon_three_times() {
    let space = space();
    let total = coverage(false);

    for voxel in 0..space.num_voxels() {
        let [_, _, k] = space.voxel_index(voxel);
        let expected = if k == 0 { 3.0 } else { 0.0 };
        assert_relative_eq!(total[voxel], expected, epsilon = 1.0e-4);
    }
}

#[test]
fn samples_on_the_caps_are_counted_once() {
    // With two subdivisions, the samples of the first layer are at z = 0.25 and z = 0.75,
    // exactly on the inner and outer caps.
    let (inner, outer) = flat_ribbon_between(0.25, 0.75);
    let space = space();

    for (thin_columns, expected) in [(true, 0.5), (false, 1.5)] {
        let params = RibbonParameters {
            subdivisions: 2,
            thin_columns,
        };
        let weights = compute_ribbon_weights(&space, &inner, &outer, None, None, &params).unwrap();
        let mut total = vec![0.0; space.num_voxels()];

        for vertex in 0..weights.num_vertices() {
            for w in weights.vertex(vertex) {
                total[space.linear_index(w.ijk)] += w.weight;
            }
        }

        // Samples on the inner cap are inside, the ones on the outer cap are outside.
        for voxel in 0..space.num_voxels() {
            let [_, _, k] = space.voxel_index(voxel);
            let expected = if k == 0 { expected } else { 0.0 };
            assert_relative_eq!(total[voxel], expected, epsilon = 1.0e-4);
        }
    }
}

#[test]
fn constant_values_fill_the_ribbon_voxels() {
    let (inner, outer) = flat_ribbon();
    let space = space();
    let values = vec![5.0; inner.num_vertices()];

    for flags in [
        MappingFlags::empty(),
        MappingFlags::THICK_COLUMNS,
        MappingFlags::GREEDY,
    ] {
        let params = SurfaceToVolumeParameters {
            subdivisions: 3,
            flags,
        };
        let volume = map_surface_to_volume(&space, &inner, &outer, &values, None, &params).unwrap();

        for voxel in 0..space.num_voxels() {
            let [_, _, k] = space.voxel_index(voxel);
            let expected = if k == 0 { 5.0 } else { 0.0 };
            assert_relative_eq!(volume[voxel], expected, epsilon = 1.0e-3);
        }
    }
}

#[test]
fn labels_are_voted_per_voxel() {
    let (inner, outer) = flat_ribbon();
    let space = space();
    let labels: Vec<i32> = inner
        .vertices()
        .iter()
        .map(|p| if p.x < 3.5 { 1 } else { 2 })
        .collect();

    let volume = map_labels_to_volume(
        &space,
        &inner,
        &outer,
        &labels,
        None,
        &SurfaceToVolumeParameters::default(),
    )
    .unwrap();

    for j in 0..8 {
        for i in 0..3 {
            assert_eq!(volume[space.linear_index([i, j, 0])], Some(1));
        }
        for i in 5..8 {
            assert_eq!(volume[space.linear_index([i, j, 0])], Some(2));
        }
        for i in 0..8 {
            assert_eq!(volume[space.linear_index([i, j, 1])], None);
        }
    }
}

#[test]
fn volume_ramp_is_averaged_onto_vertices() {
    let (inner, outer) = flat_ribbon();
    let space = space();
    let ramp: Vec<Real> = (0..space.num_voxels())
        .map(|voxel| space.voxel_index(voxel)[0] as Real)
        .collect();

    let mapping = map_volume_to_surface_ribbon(
        &space,
        &inner,
        &outer,
        &[&ramp[..]],
        None,
        &VolumeToSurfaceParameters::default(),
    )
    .unwrap();

    assert_eq!(mapping.values.len(), 1);

    for (vertex, pt) in inner.vertices().iter().enumerate() {
        let inside = (0.0..=7.0).contains(&pt.x) && (0.0..=7.0).contains(&pt.y);
        let far_outside = pt.x < -1.0 || pt.y < -1.0 || pt.x > 8.0 || pt.y > 8.0;

        if inside {
            assert!(!mapping.bad_vertices[vertex]);
            assert!((mapping.values[0][vertex] - pt.x).abs() < 0.75);
        }

        if far_outside {
            assert!(mapping.bad_vertices[vertex]);
            assert_eq!(mapping.values[0][vertex], 0.0);
        }
    }
}

#[test]
fn roi_weighting_scales_the_weights() {
    let (inner, outer) = flat_ribbon();
    let space = space();
    let frame = vec![1.0; space.num_voxels()];
    let roi: Vec<Real> = (0..space.num_voxels())
        .map(|voxel| if space.voxel_index(voxel)[0] < 4 { 0.5 } else { 0.0 })
        .collect();

    let params = VolumeToSurfaceParameters {
        roi_weighted: true,
        ..Default::default()
    };

    assert_eq!(
        map_volume_to_surface_ribbon(&space, &inner, &outer, &[&frame[..]], None, &params)
            .unwrap_err(),
        MappingError::MissingRoi
    );

    let mapping =
        map_volume_to_surface_ribbon(&space, &inner, &outer, &[&frame[..]], Some(&roi[..]), &params)
            .unwrap();

    for (vertex, pt) in inner.vertices().iter().enumerate() {
        let weights = mapping.weights.vertex(vertex);
        assert!(weights.iter().all(|w| w.ijk[0] < 4));

        if pt.x > 4.0 {
            // Only voxels outside of the ROI around this vertex.
            assert!(mapping.bad_vertices[vertex]);
        } else if !weights.is_empty() {
            assert_relative_eq!(mapping.values[0][vertex], 1.0, epsilon = 1.0e-5);
            assert!(weights.iter().all(|w| w.weight <= 0.5));
        }
    }
}

#[test]
fn weights_frame_of_one_vertex() {
    let (inner, outer) = flat_ribbon();
    let space = space();
    let weights = compute_ribbon_weights(
        &space,
        &inner,
        &outer,
        None,
        None,
        &RibbonParameters::default(),
    )
    .unwrap();

    // A vertex near (3.65, 3.71).
    let vertex = 8 * GRID + 8;
    let frame = weights.to_frame(vertex).unwrap();
    let total: Real = frame.iter().sum();
    let expected: Real = weights.vertex(vertex).iter().map(|w| w.weight).sum();

    assert_eq!(frame.len(), space.num_voxels());
    assert_relative_eq!(total, expected, epsilon = 1.0e-5);
    assert!(total > 0.0);
    assert!(weights.to_frame(inner.num_vertices()).is_err());
}
