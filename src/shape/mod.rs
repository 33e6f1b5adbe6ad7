//! Shapes involved in surface and volume mapping.

pub use self::quad::Quad;
pub use self::ribbon_polyhedron::RibbonPolyhedron;
pub use self::tri_surface::{TopologyError, TriSurface};
pub use self::triangle::Triangle;
pub use self::volume_space::{VolumeSpace, VolumeSpaceError};

mod quad;
mod ribbon_polyhedron;
mod tri_surface;
mod triangle;
mod volume_space;
