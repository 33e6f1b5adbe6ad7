//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector, DIM};

/// An Axis-Aligned Bounding Box (AABB).
///
/// An AABB is defined by its minimum and maximum corners. Its edges are always
/// parallel to the coordinate axes, which makes containment and distance tests
/// a handful of coordinate comparisons.
///
/// - **mins**: The point with the smallest coordinates on each axis.
/// - **maxs**: The point with the largest coordinates on each axis.
/// - **Invariant**: `mins.x ≤ maxs.x`, `mins.y ≤ maxs.y` and `mins.z ≤ maxs.z`,
///   except for the "invalid" AABB returned by [`Aabb::new_invalid`].
///
/// The octree nodes of the point locator and the voxel search boxes of the
/// ribbon mapping are both expressed as AABBs.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use cortex3d::bounding_volume::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::from_points([
///     Point3::new(1.0, 2.0, 3.0),
///     Point3::new(-1.0, 4.0, 2.0),
///     Point3::new(0.0, 0.0, 5.0),
/// ]);
///
/// assert_eq!(aabb.mins, Point3::new(-1.0, 0.0, 2.0));
/// assert_eq!(aabb.maxs, Point3::new(1.0, 4.0, 5.0));
/// assert_eq!(aabb.distance_to_local_point(&Point3::new(0.0, 2.0, 3.0)), 0.0);
/// # }
/// ```
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point<Real>,
    /// The point with maximum coordinates.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its minimum and maximum corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with inverted bounds.
    ///
    /// Useful as the initial value when accumulating points with [`Aabb::take_point`].
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB that tightly encloses a set of points.
    ///
    /// Returns the invalid AABB if the iterator is empty.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut result = Self::new_invalid();

        for pt in pts {
            result.take_point(pt);
        }

        result
    }

    /// Does this AABB have `mins <= maxs` on every axis?
    #[inline]
    pub fn is_valid(&self) -> bool {
        na::partial_le(&self.mins, &self.maxs)
    }

    /// Returns the center point of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// Returns the full extents (width, height and depth) of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// Length of the diagonal of this AABB.
    #[inline]
    pub fn diagonal_length(&self) -> Real {
        self.extents().norm()
    }

    /// Enlarges this `Aabb` so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// The sub-box obtained by cutting this AABB at `mid` and keeping the octant `octant`.
    ///
    /// Bit `i` of `octant` selects the upper half (`[mid[i], maxs[i]]`) along axis `i`,
    /// a cleared bit selects the lower half (`[mins[i], mid[i]]`).
    #[inline]
    pub fn octant(&self, mid: &Point<Real>, octant: usize) -> Aabb {
        let mut result = *self;

        for i in 0..DIM {
            if octant & (1 << i) != 0 {
                result.mins[i] = mid[i];
            } else {
                result.maxs[i] = mid[i];
            }
        }

        result
    }

    /// Tests if the given point is inside this AABB, boundary included.
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        for i in 0..DIM {
            if point[i] < self.mins[i] || point[i] > self.maxs[i] {
                return false;
            }
        }

        true
    }

    /// Squared distance between `pt` and the closest point of this solid AABB.
    ///
    /// This is zero if `pt` is inside the AABB, otherwise the squared distance to the
    /// nearest face, edge or corner.
    #[inline]
    pub fn distance_squared_to_local_point(&self, pt: &Point<Real>) -> Real {
        let mins_pt = self.mins - pt;
        let pt_maxs = pt - self.maxs;
        let shift = mins_pt.sup(&na::zero()) + pt_maxs.sup(&na::zero());
        shift.norm_squared()
    }

    /// Distance between `pt` and the closest point of this solid AABB.
    #[inline]
    pub fn distance_to_local_point(&self, pt: &Point<Real>) -> Real {
        self.distance_squared_to_local_point(pt).sqrt()
    }
}
