//! Trait based planar geometry types.
//!
//! This crate defines the geometric vocabulary consumed by the `polyclip`
//! overlay engine: points, contours, polygons and multipolygons. All
//! algorithms in the engine are written against the traits defined here, so
//! any point or polygon representation can be plugged in without conversion.
//! Concrete implementations are provided in the [`impls`] module for the
//! common case.
//!
//! Coordinates are generic over their numeric type through
//! [`CartesianPoint2d::Num`], bounded by `num_traits` traits rather than
//! concrete floats.

pub mod contour;
pub mod error;
pub mod impls;
pub mod multi_polygon;
pub mod orient;
pub mod point;
pub mod polygon;
pub mod rect;
pub mod segment;

pub use contour::{CartesianContour, ClosedContour, Contour, Winding};
pub use error::PolyclipTypesError;
pub use multi_polygon::MultiPolygon;
pub use orient::Orientation;
pub use point::{CartesianPoint2d, CartesianPoint2dFloat, NewCartesianPoint2d};
pub use polygon::{CartesianPolygon, Polygon};
pub use rect::Rect;
pub use segment::Segment;
