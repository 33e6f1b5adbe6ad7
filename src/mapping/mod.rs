//! Surface-to-volume and volume-to-surface data mapping.
//!
//! The ribbon-constrained methods estimate, for every vertex of a surface, the fraction of
//! each nearby voxel lying inside the column of tissue spanned by the triangles around that
//! vertex between an inner and an outer surface. These weights are then used in both
//! directions: averaging voxel values onto vertices, or aggregating vertex values (by
//! weighted average or majority vote) into voxels.

pub use self::error::MappingError;
pub use self::nearest::{
    dilate_volume, map_nearest_vertex, nearest_vertices, DilateMethod, DilateOptions,
};
pub use self::parameters::{
    MappingFlags, RibbonParameters, SurfaceToVolumeParameters, VolumeToSurfaceParameters,
};
pub use self::ribbon_weights::{
    compute_ribbon_points, compute_ribbon_weights, PointWeight, VertexWeights,
    VoxelContributions, VoxelWeight,
};
pub use self::surface_to_volume::{
    aggregate_labels, aggregate_values, map_labels_to_volume, map_surface_to_volume, vote_label,
};
pub use self::volume_to_surface::{
    average_frame, map_volume_to_surface_points, map_volume_to_surface_ribbon, RibbonMapping,
    RibbonPointMapping,
};

mod error;
mod nearest;
mod parameters;
mod ribbon_weights;
mod surface_to_volume;
mod volume_to_surface;
