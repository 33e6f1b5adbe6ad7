use crate::math::Real;

/// Controls the ribbon-constrained weight computation.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RibbonParameters {
    /// Each voxel is sampled at the centers of `subdivisions³` equal sub-cells.
    pub subdivisions: usize,
    /// Use thin columns, which tile the ribbon without overlap, instead of thick columns
    /// covering each point three times.
    pub thin_columns: bool,
}

impl Default for RibbonParameters {
    fn default() -> Self {
        Self {
            subdivisions: 3,
            thin_columns: false,
        }
    }
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// Legacy behaviors of the surface-to-volume mapping.
///
/// The empty set (thin columns with partial-volume antialiasing) is the default.
pub struct MappingFlags(u8);

bitflags::bitflags! {
    impl MappingFlags: u8 {
        /// Normalize each voxel by its actual total weight, so any voxel touched by the ribbon
        /// gets a full value or label.
        const GREEDY = 1;
        /// Build thick columns, covering each point of the ribbon three times.
        const THICK_COLUMNS = 1 << 1;
    }
}

impl MappingFlags {
    /// The total weight a voxel fully inside the ribbon is expected to receive.
    #[inline]
    pub fn expected_coverage(self) -> Real {
        if self.contains(Self::THICK_COLUMNS) {
            3.0
        } else {
            1.0
        }
    }

    /// The minimal total weight for a voxel to get a label when not in greedy mode.
    #[inline]
    pub fn label_coverage_threshold(self) -> Real {
        self.expected_coverage() * 0.5
    }
}

/// Controls the surface-to-volume ribbon mapping.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SurfaceToVolumeParameters {
    /// Each voxel is sampled at the centers of `subdivisions³` equal sub-cells.
    pub subdivisions: usize,
    /// Legacy behaviors.
    pub flags: MappingFlags,
}

impl Default for SurfaceToVolumeParameters {
    fn default() -> Self {
        Self {
            subdivisions: 3,
            flags: MappingFlags::empty(),
        }
    }
}

impl SurfaceToVolumeParameters {
    /// The parameters of the underlying ribbon weight computation.
    pub fn ribbon(&self) -> RibbonParameters {
        RibbonParameters {
            subdivisions: self.subdivisions,
            thin_columns: !self.flags.contains(MappingFlags::THICK_COLUMNS),
        }
    }
}

/// Controls the volume-to-surface ribbon mapping.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VolumeToSurfaceParameters {
    /// The weight computation parameters.
    pub ribbon: RibbonParameters,
    /// Multiply each voxel weight by the ROI value of that voxel.
    pub roi_weighted: bool,
}
