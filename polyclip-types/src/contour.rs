//! Contour is a sequence of points.
//!
//! Contours can be:
//! * **open** - meaning that the first and the last points of the contour are not connected.
//! * **closed** - when the first and the last points of the contour are connected. For example, a ring of a polygon
//!   is a closed contour.
//!
//! Both open and closed contours are represented by the [`Contour`] trait, but there is also a separate
//! [`ClosedContour`] trait for situations when only closed contours make sense. A polygon can consist only of closed
//! contours. All closed contours also implement the `Contour` trait automatically.
//!
//! Note that a closed contour should not duplicate its first point at the end of the point sequence. The closing
//! segment is provided by the [`Contour::iter_points_closing`] and [`Contour::iter_segments`] methods instead.

use std::cmp::Ordering;

use num_traits::{One, Zero};

use crate::point::CartesianPoint2d;
use crate::segment::Segment;

/// Sequence of points. See module level documentation for details.
pub trait Contour {
    /// Type of the points the contour is consisted of.
    type Point;

    /// Whether the contour is closed.
    ///
    /// A closed contour has a segment connecting the last and the first points.
    fn is_closed(&self) -> bool;

    /// Iterate over the points of the contour.
    ///
    /// Note, that the last point shall not be the same as the first one even for the closed contours. If you want to
    /// include the first point at the end of iterator for closed contours, use [`Contour::iter_points_closing`]
    /// instead.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point>;

    /// Same as [`Contour::iter_points`] but for closed contours repeats the first point again at the end of the iterator.
    fn iter_points_closing(&self) -> impl Iterator<Item = &Self::Point> {
        ContourPointsIterator::new(self.iter_points(), self.is_closed())
    }

    /// Iterates over segments of the contour. For closed contours this includes the segment between the last and the
    /// first points of the contour.
    fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, Self::Point>> {
        ContourSegmentIterator::new(ContourPointsIterator::new(
            self.iter_points(),
            self.is_closed(),
        ))
    }
}

/// A closed contour. See module documentation for details.
pub trait ClosedContour {
    /// Type of the points the contour is consisted of.
    type Point;

    /// Iterate over the points of the contour.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point>;
}

impl<P, T: ClosedContour<Point = P>> Contour for T {
    type Point = P;

    fn is_closed(&self) -> bool {
        true
    }

    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point> {
        ClosedContour::iter_points(self)
    }
}

/// Winding direction of a closed contour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Winding {
    /// Points of the contour are ordered clockwise (negative signed area).
    Clockwise,
    /// Points of the contour are ordered counterclockwise (positive signed area).
    CounterClockwise,
}

/// Cartesian-specific operations over contours. Auto-implemented for all eligible types.
pub trait CartesianContour<P: CartesianPoint2d>: Contour<Point = P> {
    /// Shortest squared distance from the point to the contour's segments. `None` for an empty contour.
    fn distance_to_point_sq<Point>(&self, point: &Point) -> Option<P::Num>
    where
        Self: Sized,
        Point: CartesianPoint2d<Num = P::Num>,
    {
        self.iter_segments()
            .map(|v| v.distance_to_point_sq(point))
            .min_by(move |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    /// Signed area enclosed by the contour (shoelace sum over the closing segments).
    ///
    /// Positive for counterclockwise contours, negative for clockwise ones. Only meaningful for closed
    /// non-self-intersecting contours.
    fn signed_area(&self) -> P::Num
    where
        Self: Sized,
    {
        let mut doubled = P::Num::zero();
        for segment in self.iter_segments() {
            doubled = doubled + segment.0.x() * segment.1.y() - segment.1.x() * segment.0.y();
        }

        let two = P::Num::one() + P::Num::one();
        doubled / two
    }

    /// Winding direction of the contour. `None` if the signed area is exactly zero.
    fn winding(&self) -> Option<Winding>
    where
        Self: Sized,
    {
        let area = self.signed_area();
        if area > P::Num::zero() {
            Some(Winding::CounterClockwise)
        } else if area < P::Num::zero() {
            Some(Winding::Clockwise)
        } else {
            None
        }
    }
}

impl<T: Contour<Point = P>, P: CartesianPoint2d> CartesianContour<P> for T {}

/// Iterator of contour points.
pub struct ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    points_iter: Iter,
    is_closed: bool,
    first_point: Option<&'a P>,
}

impl<'a, P: 'a, Iter> ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    fn new(points_iter: Iter, is_closed: bool) -> Self {
        Self {
            points_iter,
            is_closed,
            first_point: None,
        }
    }
}

impl<'a, P, Iter> Iterator for ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.points_iter.next();
        if self.is_closed && self.first_point.is_none() {
            self.first_point = next;
        }

        if next.is_none() {
            self.first_point.take()
        } else {
            next
        }
    }
}

/// Iterator of contour segments.
pub struct ContourSegmentIterator<'a, P: 'a, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    points_iter: ContourPointsIterator<'a, P, Iter>,
    prev_point: Option<&'a P>,
}

impl<'a, P, Iter> ContourSegmentIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    fn new(points_iter: ContourPointsIterator<'a, P, Iter>) -> Self {
        Self {
            points_iter,
            prev_point: None,
        }
    }
}

impl<'a, P, Iter> Iterator for ContourSegmentIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    type Item = Segment<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        let next_point = self.points_iter.next()?;
        let prev_point = self.prev_point.replace(next_point);

        match prev_point {
            Some(prev) => Some(Segment(prev, next_point)),
            None => self.next(),
        }
    }
}
