//! Various unsorted geometrical and logical operators.

pub use self::center::center;
pub use self::point_in_poly2d::point_in_poly2d;
pub(crate) use self::weighted_value::WeightedValue;

mod center;
pub mod parallel;
mod point_in_poly2d;
mod weighted_value;
