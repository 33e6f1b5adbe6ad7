//! Spatial partitioning tools.

pub use self::octree::{LocatorPoint, NodeIndex, OctNode, OctNodeData, OctTree};
pub use self::point_locator::{LocatorError, LocatorHit, PointLocator};

mod octree;
mod point_locator;
