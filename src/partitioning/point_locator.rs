use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::partitioning::{LocatorPoint, OctTree};

/// Errors raised by invalid [`PointLocator`] queries or insertions.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq)]
pub enum LocatorError {
    /// The distance limit given to a query was negative or NaN.
    #[error("invalid maximum distance {0}: it must be a non-negative number")]
    InvalidMaxDistance(Real),
    /// A point with a NaN or infinite coordinate was inserted.
    #[error("the point {index} of the inserted set has non-finite coordinates")]
    NonFinitePoint {
        /// Index of the offending point in the inserted slice.
        index: usize,
    },
    /// The explicit bounds of an empty locator are invalid or non-finite.
    #[error("the initial locator bounds must be finite with mins <= maxs")]
    InvalidBounds,
}

/// The result of a point-location query.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocatorHit {
    /// Index of the point inside the slice it was inserted with.
    pub index: usize,
    /// The point set the point belongs to.
    pub set_id: u32,
    /// The point position.
    pub coords: Point<Real>,
}

impl From<&LocatorPoint> for LocatorHit {
    fn from(point: &LocatorPoint) -> Self {
        Self {
            index: point.index,
            set_id: point.set_id,
            coords: point.coords,
        }
    }
}

/// A spatial index answering nearest-point queries over several point sets.
///
/// Every batch of points is inserted as a point set with its own id, so that batches
/// sharing the same index (e.g., several surfaces) can be removed independently. Ids of
/// removed sets are recycled.
///
/// The index is built sequentially (insertion needs `&mut self`) and then queried
/// concurrently: every query takes `&self`.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use cortex3d::partitioning::PointLocator;
/// use nalgebra::Point3;
///
/// let locator = PointLocator::new(&[
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 0.0, 0.0),
///     Point3::new(0.0, 10.0, 0.0),
/// ])
/// .unwrap();
///
/// let hit = locator.closest_point(&Point3::new(1.0, 1.0, 0.0)).unwrap();
/// assert_eq!(hit.index, 0);
/// assert_eq!(hit.set_id, 0);
///
/// let far = Point3::new(100.0, 100.0, 100.0);
/// assert!(locator.closest_point_limited(&far, 5.0).unwrap().is_none());
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PointLocator {
    tree: OctTree,
    next_set_id: u32,
    unused_set_ids: Vec<u32>,
    set_in_use: Vec<bool>,
}

impl PointLocator {
    /// Builds a locator over `points`, inserted as the point set `0`.
    ///
    /// The initial root covers the points' bounding box. An empty slice gives an empty
    /// locator around the origin in which set `0` is still reserved.
    pub fn new(points: &[Point<Real>]) -> Result<Self, LocatorError> {
        check_finite(points)?;

        let bounds = if points.is_empty() {
            Aabb::new(Point::origin(), Point::origin())
        } else {
            Aabb::from_points(points.iter().copied())
        };

        let mut result = Self::from_tree(OctTree::new(bounds));
        let _ = result.add_point_set(points)?;
        Ok(result)
    }

    /// Creates an empty locator whose root initially covers `bounds`.
    ///
    /// Points inserted outside of `bounds` are still accepted: the tree grows to cover
    /// them.
    pub fn with_bounds(bounds: Aabb) -> Result<Self, LocatorError> {
        let finite = bounds.mins.iter().chain(bounds.maxs.iter()).all(|x| x.is_finite());

        if !finite || !bounds.is_valid() {
            return Err(LocatorError::InvalidBounds);
        }

        Ok(Self::from_tree(OctTree::new(bounds)))
    }

    fn from_tree(tree: OctTree) -> Self {
        Self {
            tree,
            next_set_id: 0,
            unused_set_ids: Vec::new(),
            set_in_use: Vec::new(),
        }
    }

    /// Inserts `points` as a new point set and returns its id.
    ///
    /// Point `i` of the slice gets the index `i`. The id is either recycled from a removed
    /// set or a fresh one. An empty slice is legal: it reserves an id without inserting
    /// anything.
    pub fn add_point_set(&mut self, points: &[Point<Real>]) -> Result<u32, LocatorError> {
        check_finite(points)?;

        let set_id = match self.unused_set_ids.pop() {
            Some(id) => id,
            None => {
                let id = self.next_set_id;
                self.next_set_id += 1;
                self.set_in_use.push(false);
                id
            }
        };

        self.set_in_use[set_id as usize] = true;

        if points.is_empty() {
            log::warn!("Empty point set {} added to the locator.", set_id);
        }

        for (index, coords) in points.iter().enumerate() {
            self.tree.insert(LocatorPoint {
                coords: *coords,
                index,
                set_id,
            });
        }

        log::debug!(
            "Point set {} added ({} points, {} total).",
            set_id,
            points.len(),
            self.tree.num_points()
        );

        Ok(set_id)
    }

    /// Removes every point of the set `set_id` and makes its id available again.
    ///
    /// The tree is not rebalanced: emptied leaves stay in place. Removing an id that is
    /// not in use does nothing. Returns the number of removed points.
    pub fn remove_point_set(&mut self, set_id: u32) -> usize {
        if !self.set_in_use.get(set_id as usize).copied().unwrap_or(false) {
            return 0;
        }

        let removed = self.tree.retain(|point| point.set_id != set_id);
        self.set_in_use[set_id as usize] = false;
        self.unused_set_ids.push(set_id);

        log::debug!("Point set {} removed ({} points).", set_id, removed);
        removed
    }

    /// The point closest to `target`, or `None` if the locator is empty.
    pub fn closest_point(&self, target: &Point<Real>) -> Option<LocatorHit> {
        if !is_finite(target) {
            return None;
        }

        self.tree.nearest(target, None).map(|(point, _)| point.into())
    }

    /// The point closest to `target` if it lies at a distance of at most `max_dist`.
    ///
    /// Returns `Ok(None)` if no point lies within `max_dist`, and an error if `max_dist`
    /// is negative or NaN.
    pub fn closest_point_limited(
        &self,
        target: &Point<Real>,
        max_dist: Real,
    ) -> Result<Option<LocatorHit>, LocatorError> {
        check_max_dist(max_dist)?;

        if !is_finite(target) {
            return Ok(None);
        }

        Ok(self
            .tree
            .nearest(target, Some(max_dist * max_dist))
            .map(|(point, _)| point.into()))
    }

    /// The limited query if `max_dist > 0`, the unlimited one otherwise.
    pub fn closest_point_within(&self, target: &Point<Real>, max_dist: Real) -> Option<LocatorHit> {
        if max_dist > 0.0 {
            self.closest_point_limited(target, max_dist).ok().flatten()
        } else {
            self.closest_point(target)
        }
    }

    /// Every point at a distance of at most `max_dist` from `target`, in unspecified order.
    pub fn points_in_range(
        &self,
        target: &Point<Real>,
        max_dist: Real,
    ) -> Result<Vec<LocatorHit>, LocatorError> {
        check_max_dist(max_dist)?;

        let mut result = Vec::new();

        if is_finite(target) {
            self.tree
                .for_each_in_range(target, max_dist * max_dist, |point, _| {
                    result.push(point.into())
                });
        }

        Ok(result)
    }

    /// The total number of points, all sets included.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.tree.num_points()
    }

    /// The ids of the point sets currently in use, in increasing order.
    pub fn point_set_ids(&self) -> Vec<u32> {
        self.set_in_use
            .iter()
            .enumerate()
            .filter(|(_, in_use)| **in_use)
            .map(|(id, _)| id as u32)
            .collect()
    }

    /// The underlying octree.
    #[inline]
    pub fn tree(&self) -> &OctTree {
        &self.tree
    }
}

fn is_finite(pt: &Point<Real>) -> bool {
    pt.iter().all(|x| x.is_finite())
}

fn check_finite(points: &[Point<Real>]) -> Result<(), LocatorError> {
    match points.iter().position(|pt| !is_finite(pt)) {
        Some(index) => Err(LocatorError::NonFinitePoint { index }),
        None => Ok(()),
    }
}

fn check_max_dist(max_dist: Real) -> Result<(), LocatorError> {
    if max_dist >= 0.0 {
        Ok(())
    } else {
        Err(LocatorError::InvalidMaxDistance(max_dist))
    }
}
