//! Concrete implementations of the geometry traits.

mod contour;
mod multi_polygon;
mod point;
mod polygon;

pub use contour::{ClosedContour, Contour};
pub use multi_polygon::MultiPolygon;
pub use point::Point2d;
pub use polygon::Polygon;
