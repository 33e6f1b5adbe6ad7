use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::partitioning::{LocatorPoint, OctNodeData, OctTree, PointLocator};
use oorandom::Rand32;

fn random_points(rng: &mut Rand32, n: usize, scale: Real) -> Vec<Point<Real>> {
    (0..n)
        .map(|_| {
            Point::new(
                rng.rand_float() as Real * scale,
                rng.rand_float() as Real * scale,
                rng.rand_float() as Real * scale,
            )
        })
        .collect()
}

fn brute_force_nearest(points: &[Point<Real>], target: &Point<Real>) -> (usize, Real) {
    let mut best = (usize::MAX, Real::MAX);

    for (i, pt) in points.iter().enumerate() {
        let dist = na::distance_squared(pt, target);
        if dist < best.1 {
            best = (i, dist);
        }
    }

    best
}

fn assert_points_inside_leaves(tree: &OctTree) {
    for node in tree.nodes() {
        if let OctNodeData::Leaf(points) = &node.data {
            for point in points {
                assert!(node.bounds.contains_local_point(&point.coords));
            }
        }
    }
}

#[test]
fn closest_point_matches_linear_scan() {
    let mut rng = Rand32::new(42);
    let points = random_points(&mut rng, 2000, 50.0);
    let locator = PointLocator::new(&points).unwrap();

    assert!(!locator.tree().nodes()[locator.tree().root() as usize].is_leaf());
    assert_points_inside_leaves(locator.tree());

    for _ in 0..500 {
        // Queries also land outside of the points' bounding box.
        let target = Point::new(
            rng.rand_float() as Real * 80.0 - 15.0,
            rng.rand_float() as Real * 80.0 - 15.0,
            rng.rand_float() as Real * 80.0 - 15.0,
        );

        let (expected, expected_dist) = brute_force_nearest(&points, &target);
        let hit = locator.closest_point(&target).unwrap();
        assert_eq!(hit.index, expected);
        assert_eq!(hit.set_id, 0);
        assert_eq!(na::distance_squared(&hit.coords, &target), expected_dist);
    }
}

#[test]
fn limited_query_fails_iff_nearest_is_too_far() {
    let mut rng = Rand32::new(7);
    let points = random_points(&mut rng, 600, 10.0);
    let locator = PointLocator::new(&points).unwrap();

    for _ in 0..500 {
        let target = Point::new(
            rng.rand_float() as Real * 30.0 - 10.0,
            rng.rand_float() as Real * 30.0 - 10.0,
            rng.rand_float() as Real * 30.0 - 10.0,
        );
        let max_dist = rng.rand_float() as Real * 4.0;

        let (expected, expected_dist) = brute_force_nearest(&points, &target);
        let hit = locator.closest_point_limited(&target, max_dist).unwrap();

        if expected_dist > max_dist * max_dist {
            assert!(hit.is_none());
        } else {
            assert_eq!(hit.map(|h| h.index), Some(expected));
        }
    }
}

#[test]
fn coincident_points_do_not_split_forever() {
    let points = vec![Point::new(3.0, -2.0, 1.0); 1000];
    let locator = PointLocator::new(&points).unwrap();

    assert_eq!(locator.num_points(), 1000);
    assert_eq!(locator.tree().nodes().len(), 1);

    let hit = locator.closest_point(&Point::new(0.0, 0.0, 0.0)).unwrap();
    assert_eq!(hit.coords, points[0]);
    assert!(hit.index < 1000);
}

#[test]
fn overfull_degenerate_leaf_tracks_its_point_bounds() {
    let pt = Point::new(-4.0, 0.5, 7.25);
    let mut tree = OctTree::new(Aabb::new(Point::origin(), Point::new(8.0, 8.0, 8.0)));

    for index in 0..20_000 {
        tree.insert(LocatorPoint {
            coords: pt,
            index,
            set_id: 0,
        });
    }

    // The root grew once toward the point, the leaf holding it never split.
    let leaves: Vec<_> = tree.nodes().iter().filter(|node| node.is_leaf()).collect();
    assert_eq!(leaves.len(), 8);

    let full = leaves
        .iter()
        .find(|node| node.points_bounds.is_valid())
        .unwrap();
    assert_eq!(full.points_bounds, Aabb::new(pt, pt));
    assert_eq!(tree.num_points(), 20_000);

    for node in &leaves {
        if let OctNodeData::Leaf(points) = &node.data {
            assert_eq!(points.is_empty(), !node.points_bounds.is_valid());
        }
    }

    // A single spread point is enough to allow the split.
    tree.insert(LocatorPoint {
        coords: pt + na::Vector3::new(3.0, 0.0, 0.0),
        index: 20_000,
        set_id: 0,
    });
    assert!(tree.nodes().len() > 9);
    assert_points_inside_leaves(&tree);
}

#[test]
fn nearly_coincident_cluster_among_spread_points() {
    let mut rng = Rand32::new(3);
    let mut points = random_points(&mut rng, 300, 100.0);
    let cluster: Vec<_> = (0..500)
        .map(|i| Point::new(50.0, 50.0, 50.0 + i as Real * 1.0e-5))
        .collect();
    points.extend_from_slice(&cluster);

    let locator = PointLocator::new(&points).unwrap();
    assert_points_inside_leaves(locator.tree());

    for _ in 0..200 {
        let target = Point::new(
            rng.rand_float() as Real * 100.0,
            rng.rand_float() as Real * 100.0,
            rng.rand_float() as Real * 100.0,
        );
        let (_, expected_dist) = brute_force_nearest(&points, &target);
        let hit = locator.closest_point(&target).unwrap();
        assert_eq!(na::distance_squared(&hit.coords, &target), expected_dist);
    }
}

#[test]
fn collinear_points() {
    let points: Vec<_> = (0..500)
        .map(|i| Point::new(i as Real * 0.5, 0.0, 0.0))
        .collect();
    let locator = PointLocator::new(&points).unwrap();

    for i in 0..100 {
        let target = Point::new(i as Real * 2.6 - 10.0, 3.0, -1.0);
        let (expected, _) = brute_force_nearest(&points, &target);
        assert_eq!(locator.closest_point(&target).unwrap().index, expected);
    }
}

#[test]
fn single_point() {
    let locator = PointLocator::new(&[Point::new(1.0, 2.0, 3.0)]).unwrap();

    for target in [
        Point::new(1.0, 2.0, 3.0),
        Point::new(-100.0, 0.0, 5.0),
        Point::new(1.0e4, 1.0e4, 1.0e4),
    ] {
        let hit = locator.closest_point(&target).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.coords, Point::new(1.0, 2.0, 3.0));
    }
}

#[test]
fn root_grows_toward_outside_points() {
    let bounds = Aabb::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
    let mut locator = PointLocator::with_bounds(bounds).unwrap();

    let mut rng = Rand32::new(11);
    let points = random_points(&mut rng, 400, 200.0)
        .into_iter()
        .map(|pt| pt - na::Vector3::repeat(100.0))
        .collect::<Vec<_>>();

    assert_eq!(locator.add_point_set(&points).unwrap(), 0);

    let root = locator.tree().root_bounds();
    for pt in &points {
        assert!(root.contains_local_point(pt));
    }
    assert_points_inside_leaves(locator.tree());

    for _ in 0..200 {
        let target = random_points(&mut rng, 1, 300.0)[0] - na::Vector3::repeat(150.0);
        let (expected, _) = brute_force_nearest(&points, &target);
        assert_eq!(locator.closest_point(&target).unwrap().index, expected);
    }
}

#[test]
fn points_on_splitting_planes_are_found() {
    // A regular lattice puts many points exactly on the splitting planes.
    let mut points = Vec::new();
    for i in 0..9 {
        for j in 0..9 {
            for k in 0..9 {
                points.push(Point::new(i as Real, j as Real, k as Real));
            }
        }
    }

    let locator = PointLocator::new(&points).unwrap();
    assert_points_inside_leaves(locator.tree());

    for (i, pt) in points.iter().enumerate() {
        let hit = locator.closest_point(pt).unwrap();
        assert_eq!(hit.index, i);
    }
}

#[test]
fn range_query_matches_linear_scan() {
    let mut rng = Rand32::new(5);
    let points = random_points(&mut rng, 1500, 20.0);
    let locator = PointLocator::new(&points).unwrap();

    for _ in 0..50 {
        let target = random_points(&mut rng, 1, 20.0)[0];
        let radius = rng.rand_float() as Real * 3.0;

        let mut found: Vec<_> = locator
            .points_in_range(&target, radius)
            .unwrap()
            .into_iter()
            .map(|hit| hit.index)
            .collect();
        found.sort_unstable();

        let expected: Vec<_> = (0..points.len())
            .filter(|i| na::distance_squared(&points[*i], &target) <= radius * radius)
            .collect();

        assert_eq!(found, expected);
    }
}

#[test]
fn retain_keeps_emptied_leaves() {
    let mut rng = Rand32::new(9);
    let mut tree = OctTree::new(Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));

    for (index, coords) in random_points(&mut rng, 500, 1.0).into_iter().enumerate() {
        tree.insert(LocatorPoint {
            coords,
            index,
            set_id: (index % 2) as u32,
        });
    }

    let num_nodes = tree.nodes().len();
    assert!(num_nodes > 1);

    let removed = tree.retain(|point| point.set_id == 0);
    assert_eq!(removed, 250);
    assert_eq!(tree.num_points(), 250);
    assert_eq!(tree.nodes().len(), num_nodes);

    for node in tree.nodes() {
        if let OctNodeData::Leaf(points) = &node.data {
            let expected = Aabb::from_points(points.iter().map(|p| p.coords));
            assert_eq!(node.points_bounds, expected);
        }
    }
}
