//! Polygon traits.

use num_traits::Zero;

use crate::contour::{ClosedContour, Contour};
use crate::orient::Orientation;
use crate::point::CartesianPoint2d;
use crate::segment::Segment;

/// Polygon geometry. Polygon consists of one outer contour, and zero or more inner contours.
///
/// Inner contours represent *holes* in a polygon. If one inner contour is inside another inner contour, it represents
/// non-hole area inside a hole.
pub trait Polygon {
    /// Contour type.
    type Contour: ClosedContour;

    /// Outer contour of the polygon.
    fn outer_contour(&self) -> &Self::Contour;
    /// Iterates over inner contours.
    fn inner_contours(&self) -> impl Iterator<Item = &'_ Self::Contour>;

    /// Iterates over all contours of the polygon starting with the outer one.
    fn iter_contours(&self) -> impl Iterator<Item = &'_ Self::Contour> {
        std::iter::once(self.outer_contour()).chain(self.inner_contours())
    }

    /// Iterates over all segments of the polygon contour lines.
    fn iter_segments(
        &self,
    ) -> impl Iterator<Item = Segment<'_, <Self::Contour as ClosedContour>::Point>> {
        self.iter_contours().flat_map(|c| c.iter_segments())
    }
}

/// Polygon in 2d cartesian coordinates. This trait is auto-implemented for all eligible types.
pub trait CartesianPolygon {
    /// Type of the points of the polygon.
    type Point: CartesianPoint2d;

    /// Returns true if the `point` lies inside or on one of the polygon's sides.
    fn contains_point<P>(&self, point: &P) -> bool
    where
        P: CartesianPoint2d<Num = <Self::Point as CartesianPoint2d>::Num>;
}

impl<P, C, T> CartesianPolygon for T
where
    P: CartesianPoint2d,
    C: ClosedContour<Point = P>,
    T: Polygon<Contour = C>,
{
    type Point = P;

    fn contains_point<Point: CartesianPoint2d<Num = P::Num>>(&self, point: &Point) -> bool {
        let mut winding = 0i64;
        for segment in self.iter_segments() {
            if segment.distance_to_point_sq(point) == P::Num::zero() {
                // On the boundary.
                return true;
            }

            if segment.0.y() <= point.y() {
                if segment.1.y() > point.y()
                    && Orientation::triplet(segment.0, segment.1, point)
                        == Orientation::Counterclockwise
                {
                    winding += 1;
                }
            } else if segment.1.y() <= point.y()
                && Orientation::triplet(segment.0, segment.1, point) == Orientation::Clockwise
            {
                winding -= 1;
            }
        }

        winding != 0
    }
}

#[cfg(test)]
mod tests {
    use super::CartesianPolygon;
    use crate::impls::{ClosedContour, Point2d, Polygon};

    fn triangle() -> Polygon<Point2d> {
        Polygon {
            outer_contour: ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
            ]),
            inner_contours: vec![],
        }
    }

    #[test]
    fn contains_point() {
        let polygon = triangle();

        assert!(polygon.contains_point(&Point2d::new(0.0, 0.0)));
        assert!(polygon.contains_point(&Point2d::new(1.0, 1.0)));
        assert!(polygon.contains_point(&Point2d::new(0.5, 0.0)));
        assert!(polygon.contains_point(&Point2d::new(0.8, 0.5)));
        assert!(!polygon.contains_point(&Point2d::new(0.2, 0.3)));
        assert!(!polygon.contains_point(&Point2d::new(0.2, -0.3)));
        assert!(!polygon.contains_point(&Point2d::new(1.1, 0.0)));
    }

    #[test]
    fn contains_point_with_hole() {
        let polygon = Polygon {
            outer_contour: ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(4.0, 0.0),
                Point2d::new(4.0, 4.0),
                Point2d::new(0.0, 4.0),
            ]),
            inner_contours: vec![ClosedContour::new(vec![
                Point2d::new(1.0, 1.0),
                Point2d::new(1.0, 3.0),
                Point2d::new(3.0, 3.0),
                Point2d::new(3.0, 1.0),
            ])],
        };

        assert!(polygon.contains_point(&Point2d::new(0.5, 0.5)));
        assert!(!polygon.contains_point(&Point2d::new(2.0, 2.0)));
        assert!(polygon.contains_point(&Point2d::new(1.0, 2.0)));
    }
}
