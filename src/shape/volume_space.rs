use crate::math::{Matrix, Point, Real, Vector};

/// Errors raised when building an invalid [`VolumeSpace`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum VolumeSpaceError {
    /// One of the volume dimensions is zero.
    #[error("the volume dimensions {0:?} must all be non-zero")]
    ZeroDimension([usize; 3]),
    /// The index-to-space transform cannot be inverted, or has non-finite coefficients.
    #[error("the index-to-space transform must be finite and invertible")]
    SingularTransform,
}

/// The geometry of a voxel grid: its dimensions and the affine transform from
/// voxel indices to space coordinates.
///
/// Voxel `(i, j, k)` is centered at `origin + i * ivec + j * jvec + k * kvec`, where the
/// three step vectors are the columns of the linear part of the transform. Voxels are
/// stored with `i` varying fastest, so one row of constant `(j, k)` is a scanline.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeSpace {
    dims: [usize; 3],
    linear: Matrix<Real>,
    inverse_linear: Matrix<Real>,
    origin: Point<Real>,
}

impl VolumeSpace {
    /// Creates a volume space from its dimensions and its index-to-space affine transform.
    ///
    /// `linear` maps index offsets to space offsets, `origin` is the center of voxel
    /// `(0, 0, 0)`.
    pub fn new(
        dims: [usize; 3],
        linear: Matrix<Real>,
        origin: Point<Real>,
    ) -> Result<Self, VolumeSpaceError> {
        if dims.contains(&0) {
            return Err(VolumeSpaceError::ZeroDimension(dims));
        }

        if !linear.iter().chain(origin.iter()).all(|x| x.is_finite()) {
            return Err(VolumeSpaceError::SingularTransform);
        }

        let inverse_linear = linear
            .try_inverse()
            .filter(|inv| inv.iter().all(|x| x.is_finite()))
            .ok_or(VolumeSpaceError::SingularTransform)?;

        Ok(Self {
            dims,
            linear,
            inverse_linear,
            origin,
        })
    }

    /// Creates an axis-aligned volume space with the given voxel sizes.
    pub fn from_spacing(
        dims: [usize; 3],
        spacing: Vector<Real>,
        origin: Point<Real>,
    ) -> Result<Self, VolumeSpaceError> {
        Self::new(dims, Matrix::from_diagonal(&spacing), origin)
    }

    /// The number of voxels along each axis.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// The total number of voxels.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// The space offset of one step along the index axis `axis`.
    #[inline]
    pub fn step(&self, axis: usize) -> Vector<Real> {
        self.linear.column(axis).into_owned()
    }

    /// The center of voxel `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> &Point<Real> {
        &self.origin
    }

    /// Converts fractional voxel indices to space coordinates.
    #[inline]
    pub fn index_to_space(&self, ijk: &Point<Real>) -> Point<Real> {
        self.origin + self.linear * ijk.coords
    }

    /// Converts space coordinates to fractional voxel indices.
    ///
    /// Voxel `(i, j, k)` covers the indices within `0.5` of `(i, j, k)`.
    #[inline]
    pub fn space_to_index(&self, pt: &Point<Real>) -> Point<Real> {
        Point::from(self.inverse_linear * (pt - self.origin))
    }

    /// The center of the voxel `ijk`.
    #[inline]
    pub fn voxel_center(&self, ijk: [usize; 3]) -> Point<Real> {
        self.index_to_space(&Point::new(ijk[0] as Real, ijk[1] as Real, ijk[2] as Real))
    }

    /// The voxel containing `pt`, or `None` if it lies outside of the volume.
    pub fn enclosing_voxel(&self, pt: &Point<Real>) -> Option<[usize; 3]> {
        let ijk = self.space_to_index(pt);
        let mut result = [0; 3];

        for axis in 0..3 {
            let index = (ijk[axis] + 0.5).floor();
            if !(index >= 0.0 && index < self.dims[axis] as Real) {
                return None;
            }
            result[axis] = index as usize;
        }

        Some(result)
    }

    /// Is `ijk` a valid voxel index of this volume?
    #[inline]
    pub fn contains_index(&self, ijk: [i64; 3]) -> bool {
        (0..3).all(|axis| ijk[axis] >= 0 && (ijk[axis] as u64) < self.dims[axis] as u64)
    }

    /// The position of the voxel `ijk` in a frame of `num_voxels()` values.
    #[inline]
    pub fn linear_index(&self, ijk: [usize; 3]) -> usize {
        ijk[0] + self.dims[0] * (ijk[1] + self.dims[1] * ijk[2])
    }

    /// The voxel stored at position `index` in a frame.
    #[inline]
    pub fn voxel_index(&self, index: usize) -> [usize; 3] {
        let i = index % self.dims[0];
        let jk = index / self.dims[0];
        [i, jk % self.dims[1], jk / self.dims[1]]
    }
}
