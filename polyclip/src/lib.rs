//! Planar polygon overlay engine.
//!
//! This crate computes boolean operations (intersection, union, difference)
//! between areal geometries. The algorithm is a four stage pipeline:
//!
//! 1. *Turn detection* finds every point where the boundaries of the two
//!    operands interact and classifies the interaction.
//! 2. *Enrichment* links each turn to the next one along its ring, and groups
//!    turns sharing one location into clusters with a deterministic angular
//!    ranking.
//! 3. *Traversal* walks the turn graph, switching between the operands at
//!    each turn according to the requested operation, producing closed output
//!    rings.
//! 4. *Assembly* decides which produced and untouched input rings make it
//!    into the result, and how holes nest inside shells.
//!
//! Geometries are anything implementing the `polyclip-types` traits;
//! exterior rings are expected counterclockwise and holes clockwise.
//!
//! ```
//! use polyclip::{overlay, OverlayOp};
//! use polyclip_types::impls::{MultiPolygon, Point2d, Polygon};
//!
//! let a = MultiPolygon::from(Polygon::from_points(vec![
//!     Point2d::new(0.0, 0.0),
//!     Point2d::new(2.0, 0.0),
//!     Point2d::new(2.0, 2.0),
//!     Point2d::new(0.0, 2.0),
//! ]));
//! let b = MultiPolygon::from(Polygon::from_points(vec![
//!     Point2d::new(1.0, 1.0),
//!     Point2d::new(3.0, 1.0),
//!     Point2d::new(3.0, 3.0),
//!     Point2d::new(1.0, 3.0),
//! ]));
//!
//! let result = overlay(&a, &b, OverlayOp::Intersection);
//! assert_eq!(result.parts.len(), 1);
//! ```
//!
//! The engine never fails: malformed input (open rings, self-intersections,
//! inconsistent winding) degrades to a partial result through the traversal's
//! backtracking guards instead of raising errors.

pub mod overlay;
pub mod strategy;

pub use overlay::{overlay, overlay_with, Operand, OverlayOp};
pub use strategy::{CartesianIntersection, CartesianSide, IntersectStrategy, SideStrategy};
