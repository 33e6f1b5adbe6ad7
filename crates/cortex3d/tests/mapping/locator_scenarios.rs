use cortex3d::math::{Point, Real};
use cortex3d::na;
use cortex3d::partitioning::PointLocator;

fn random_points(rng: &mut oorandom::Rand32, n: usize, scale: Real) -> Vec<Point<Real>> {
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

fn brute_force(sets: &[&[Point<Real>]], target: &Point<Real>) -> Real {
    sets.iter()
        .flat_map(|pts| pts.iter())
        .map(|pt| na::distance_squared(pt, target))
        .fold(Real::MAX, Real::min)
}

#[test]
fn sets_added_outside_of_the_bounds_stay_reachable() {
    let mut rng = oorandom::Rand32::new(7);
    let first = random_points(&mut rng, 500, 1.0);
    // Far away from the initial bounds, forcing the root to grow.
    let second: Vec<_> = random_points(&mut rng, 500, 10.0)
        .into_iter()
        .map(|p| p + na::Vector3::repeat(-20.0))
        .collect();

    let mut locator = PointLocator::new(&first).unwrap();
    let second_id = locator.add_point_set(&second).unwrap();
    assert_eq!(locator.point_set_ids(), vec![0, second_id]);
    assert_eq!(locator.num_points(), 1000);

    for target in random_points(&mut rng, 200, 30.0) {
        let target = target + na::Vector3::repeat(-20.0);
        let hit = locator.closest_point(&target).unwrap();
        let expected = brute_force(&[&first[..], &second[..]], &target);
        assert_eq!(na::distance_squared(&hit.coords, &target), expected);

        let set = if hit.set_id == 0 { &first } else { &second };
        assert_eq!(set[hit.index], hit.coords);
    }

    assert_eq!(locator.remove_point_set(second_id), 500);

    for target in random_points(&mut rng, 100, 30.0) {
        let hit = locator.closest_point(&target).unwrap();
        assert_eq!(hit.set_id, 0);
        assert_eq!(
            na::distance_squared(&hit.coords, &target),
            brute_force(&[&first[..]], &target)
        );
    }
}
