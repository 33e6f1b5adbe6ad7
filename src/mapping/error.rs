use crate::math::Real;
use crate::partitioning::LocatorError;

/// Errors raised by invalid mapping inputs.
///
/// Every input is validated before any computation starts.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq)]
pub enum MappingError {
    /// The surfaces do not share the same vertex count and triangulation.
    #[error("the surfaces must have vertex correspondence")]
    NoVertexCorrespondence,
    /// The voxel subdivision count is zero.
    #[error("the number of voxel subdivisions must be at least 1")]
    InvalidSubdivisions,
    /// A per-vertex or per-voxel input does not have the expected length.
    #[error("the {what} has {found} values, expected {expected}")]
    LengthMismatch {
        /// The mismatched input.
        what: &'static str,
        /// The expected number of values.
        expected: usize,
        /// The actual number of values.
        found: usize,
    },
    /// A vertex index is out of bounds.
    #[error("invalid vertex {vertex} for a surface with {num_vertices} vertices")]
    InvalidVertex {
        /// The invalid vertex index.
        vertex: usize,
        /// The number of vertices of the surface.
        num_vertices: usize,
    },
    /// A voxel index lies outside of the volume dimensions.
    #[error("voxel {ijk:?} is outside of a volume of dimensions {dims:?}")]
    VoxelOutOfBounds {
        /// The invalid voxel index.
        ijk: [usize; 3],
        /// The volume dimensions.
        dims: [usize; 3],
    },
    /// A distance parameter is negative or NaN.
    #[error("invalid distance {0}: it must be a non-negative number")]
    InvalidDistance(Real),
    /// ROI weighting was requested without an ROI frame.
    #[error("weighting by the ROI requires an ROI frame")]
    MissingRoi,
    /// A point location query failed.
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

pub(crate) fn check_len(
    what: &'static str,
    found: usize,
    expected: usize,
) -> Result<(), MappingError> {
    if found == expected {
        Ok(())
    } else {
        Err(MappingError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}
