use approx::assert_relative_eq;
use cortex3d::mapping::{
    aggregate_labels, aggregate_values, average_frame, compute_ribbon_weights,
    map_volume_to_surface_points, map_volume_to_surface_ribbon, MappingError, MappingFlags,
    RibbonParameters, VertexWeights, VolumeToSurfaceParameters, VoxelWeight,
};
use cortex3d::math::{Point, Real, Vector};
use cortex3d::shape::{TriSurface, VolumeSpace};

const GRID: usize = 18;
const STEP: Real = 0.71;

/// A grid on the plane z = 0.31 x - 0.17 y + 0.43, and a copy of it moved up and sideways.
///
/// The side walls of the columns are slanted, and the caps are not horizontal.
fn tilted_ribbon() -> (TriSurface, TriSurface) {
    let mut vertices = Vec::new();
    for j in 0..GRID {
        for i in 0..GRID {
            let x = -2.03 + i as Real * STEP;
            let y = -1.97 + j as Real * STEP;
            vertices.push(Point::new(x, y, 0.31 * x - 0.17 * y + 0.43));
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
                .map(|p| p + Vector::new(0.15, -0.1, 1.2))
                .collect(),
        )
        .unwrap();

    (inner, outer)
}

fn space() -> VolumeSpace {
    VolumeSpace::from_spacing([8, 8, 6], Vector::repeat(1.0), Point::origin()).unwrap()
}

fn coverage(thin_columns: bool) -> Vec<Real> {
    let (inner, outer) = tilted_ribbon();
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
fn coverage_never_exceeds_the_expected_total() {
    let thin = coverage(true);
    let thick = coverage(false);

    for (total, expected) in [(&thin, 1.0), (&thick, 3.0)] {
        assert!(total.iter().all(|t| *t <= expected + 1.0e-4));
        // The ribbon crosses the volume: some voxels are fully inside, others partially.
        assert!(total.iter().any(|t| *t >= expected - 1.0e-4));
        assert!(total.iter().any(|t| *t > 0.1 && *t < expected - 0.1));
    }

    let thin_sum: Real = thin.iter().sum();
    let thick_sum: Real = thick.iter().sum();
    assert_relative_eq!(thick_sum, 3.0 * thin_sum, max_relative = 0.01);
}

#[test]
fn sampled_points_agree_with_voxel_weights() {
    let (inner, outer) = tilted_ribbon();
    let space = space();
    let frame: Vec<Real> = (0..space.num_voxels())
        .map(|voxel| {
            let [i, j, k] = space.voxel_index(voxel);
            (i + 2 * j) as Real - 0.5 * k as Real
        })
        .collect();
    let roi: Vec<Real> = (0..space.num_voxels())
        .map(|voxel| if space.voxel_index(voxel)[1] < 5 { 0.25 } else { 1.0 })
        .collect();

    for roi_weighted in [false, true] {
        let params = VolumeToSurfaceParameters {
            roi_weighted,
            ..Default::default()
        };
        let frames = [&frame[..]];
        let by_voxel =
            map_volume_to_surface_ribbon(&space, &inner, &outer, &frames, Some(&roi[..]), &params)
                .unwrap();
        let by_point =
            map_volume_to_surface_points(&space, &inner, &outer, &frames, Some(&roi[..]), &params)
                .unwrap();

        assert_eq!(by_point.bad_vertices, by_voxel.bad_vertices);
        assert!(by_point.bad_vertices.iter().any(|bad| !bad));

        for vertex in 0..inner.num_vertices() {
            assert_relative_eq!(
                by_point.values[0][vertex],
                by_voxel.values[0][vertex],
                epsilon = 1.0e-3
            );

            for sample in &by_point.points[vertex] {
                assert!(sample.weight == 1.0 || sample.weight == 0.5);
            }
        }
    }

    let params = VolumeToSurfaceParameters {
        roi_weighted: true,
        ..Default::default()
    };
    assert_eq!(
        map_volume_to_surface_points(&space, &inner, &outer, &[&frame[..]], None, &params)
            .unwrap_err(),
        MappingError::MissingRoi
    );
    assert!(
        map_volume_to_surface_points(&space, &inner, &outer, &[&frame[..10]], None, &params)
            .is_err()
    );
}

#[test]
fn public_helpers_fail_fast_on_short_inputs() {
    let weights = VertexWeights::new(
        [2, 2, 1],
        vec![
            vec![VoxelWeight {
                ijk: [1, 1, 0],
                weight: 0.5,
            }],
            vec![],
        ],
    )
    .unwrap();

    assert_eq!(
        average_frame(&weights, &[1.0, 2.0]),
        Err(MappingError::LengthMismatch {
            what: "volume frame",
            expected: 4,
            found: 2
        })
    );
    assert_eq!(
        average_frame(&weights, &[1.0, 2.0, 3.0, 4.0]),
        Ok(vec![4.0, 0.0])
    );

    let contributions = weights.invert();
    assert!(aggregate_values(&contributions, &[1.0], MappingFlags::empty()).is_err());
    assert!(aggregate_labels(&contributions, &[], MappingFlags::GREEDY).is_err());
    assert_eq!(
        aggregate_labels(&contributions, &[6, 2], MappingFlags::GREEDY),
        Ok(vec![None, None, None, Some(6)])
    );

    assert_eq!(
        VertexWeights::new(
            [2, 2, 1],
            vec![vec![VoxelWeight {
                ijk: [0, 0, 1],
                weight: 1.0,
            }]],
        ),
        Err(MappingError::VoxelOutOfBounds {
            ijk: [0, 0, 1],
            dims: [2, 2, 1]
        })
    );
}
