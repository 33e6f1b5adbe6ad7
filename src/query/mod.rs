//! Non-persistent geometric queries.
//!
//! The point-in-ribbon test casts a ray toward `+Z` and counts its crossings with the faces
//! of a [`RibbonPolyhedron`](crate::shape::RibbonPolyhedron), see
//! [`RibbonPolyhedron::contains_point`](crate::shape::RibbonPolyhedron::contains_point).

pub use self::point_ribbon::Containment;
pub use self::vertical_ray::{vertical_ray_crosses_triangle, vertical_ray_quad_crossings};

mod point_ribbon;
mod vertical_ray;
