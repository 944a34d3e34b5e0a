//! Geometric strategies injected into the overlay engine.
//!
//! The engine itself never does coordinate arithmetic directly. The two
//! predicates it needs - the orientation test and the segment intersection
//! primitive - are passed in as strategy objects, so coordinate systems other
//! than the planar cartesian one can reuse the whole pipeline by providing
//! their own implementations.

use nalgebra::Scalar;
use num_traits::{Float, One, Zero};
use polyclip_types::{CartesianPoint2d, NewCartesianPoint2d, Orientation};

/// Orientation predicate for a point relative to a directed line.
pub trait SideStrategy<P: CartesianPoint2d> {
    /// Position of point `p` relative to the line directed from `from` to `to`.
    ///
    /// [`Orientation::Counterclockwise`] means `p` is to the left of the line.
    fn side(&self, from: &P, to: &P, p: &P) -> Orientation;
}

/// Side predicate for planar cartesian coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianSide;

impl<P: CartesianPoint2d> SideStrategy<P> for CartesianSide {
    fn side(&self, from: &P, to: &P, p: &P) -> Orientation {
        Orientation::triplet(from, to, p)
    }
}

/// Classified intersection of two segments `a` and `b`.
///
/// Fractions are parametric positions of the shared point along the segment,
/// `0` at the start point and `1` at the end point.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentIntersection<P, N> {
    /// The segments have no common points.
    Disjoint,
    /// Proper crossing in the interior of both segments.
    Crossing {
        /// The crossing point.
        point: P,
        /// Position of the crossing along segment `a`.
        fraction_a: N,
        /// Position of the crossing along segment `b`.
        fraction_b: N,
    },
    /// A single shared point involving an endpoint of at least one segment.
    Touching {
        /// The shared point.
        point: P,
        /// Position of the point along segment `a`.
        fraction_a: N,
        /// Position of the point along segment `b`.
        fraction_b: N,
    },
    /// Collinear segments sharing more than a single point.
    Collinear {
        /// First shared point walking along segment `a`.
        point: P,
        /// Position of `point` along segment `a`.
        fraction_a: N,
        /// Position of `point` along segment `b`.
        fraction_b: N,
        /// Whether the segments point the same way.
        same_direction: bool,
        /// Whether the segments cover exactly the same points.
        equal: bool,
    },
}

/// Segment intersection primitive.
pub trait IntersectStrategy<P: CartesianPoint2d> {
    /// Computes the intersection of segments `(a1, a2)` and `(b1, b2)`.
    ///
    /// Zero-length segments shall not be passed to this function.
    fn intersect(&self, a1: &P, a2: &P, b1: &P, b2: &P) -> SegmentIntersection<P, P::Num>;
}

/// Segment intersection for planar cartesian coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianIntersection;

impl<P, N> IntersectStrategy<P> for CartesianIntersection
where
    P: CartesianPoint2d<Num = N> + NewCartesianPoint2d<N> + Clone,
    N: Float + Scalar,
{
    fn intersect(&self, a1: &P, a2: &P, b1: &P, b2: &P) -> SegmentIntersection<P, P::Num> {
        let zero = P::Num::zero();
        let one = P::Num::one();

        let r = a2.sub(a1);
        let s = b2.sub(b1);
        let qp = b1.sub(a1);

        let denom = r.x * s.y - r.y * s.x;
        if denom != zero {
            let t = (qp.x * s.y - qp.y * s.x) / denom;
            let u = (qp.x * r.y - qp.y * r.x) / denom;
            if t < zero || t > one || u < zero || u > one {
                return SegmentIntersection::Disjoint;
            }

            let point = P::new(a1.x() + t * r.x, a1.y() + t * r.y);
            if t > zero && t < one && u > zero && u < one {
                SegmentIntersection::Crossing {
                    point,
                    fraction_a: t,
                    fraction_b: u,
                }
            } else {
                SegmentIntersection::Touching {
                    point,
                    fraction_a: t,
                    fraction_b: u,
                }
            }
        } else if qp.x * r.y - qp.y * r.x != zero {
            // Parallel but not collinear.
            SegmentIntersection::Disjoint
        } else {
            // Collinear: project b's endpoints onto a.
            let len_sq = r.x * r.x + r.y * r.y;
            let t0 = (qp.x * r.x + qp.y * r.y) / len_sq;
            let t1 = ((b2.x() - a1.x()) * r.x + (b2.y() - a1.y()) * r.y) / len_sq;

            let (b_min, b_max) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
            let start = if b_min > zero { b_min } else { zero };
            let end = if b_max < one { b_max } else { one };

            if start > end {
                return SegmentIntersection::Disjoint;
            }

            let point = P::new(a1.x() + start * r.x, a1.y() + start * r.y);
            let fraction_b = fraction_along(b1, b2, &point);

            if start == end {
                return SegmentIntersection::Touching {
                    point,
                    fraction_a: start,
                    fraction_b,
                };
            }

            SegmentIntersection::Collinear {
                point,
                fraction_a: start,
                fraction_b,
                same_direction: r.x * s.x + r.y * s.y > zero,
                equal: b_min == zero && b_max == one,
            }
        }
    }
}

/// Parametric position of a collinear point `p` along the segment `(from, to)`.
pub(crate) fn fraction_along<N, P>(from: &P, to: &P, p: &P) -> N
where
    N: Float + Scalar,
    P: CartesianPoint2d<Num = N>,
{
    let d = to.sub(from);
    let v = p.sub(from);
    let len_sq = d.x * d.x + d.y * d.y;
    if len_sq == N::zero() {
        N::zero()
    } else {
        (v.x * d.x + v.y * d.y) / len_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use polyclip_types::impls::Point2d;

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    #[test]
    fn crossing() {
        let result = CartesianIntersection.intersect(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(0.0, 2.0),
            &p(2.0, 0.0),
        );
        assert_matches!(
            result,
            SegmentIntersection::Crossing { point, fraction_a, fraction_b }
                if point == p(1.0, 1.0) && fraction_a == 0.5 && fraction_b == 0.5
        );
    }

    #[test]
    fn touching_at_endpoint() {
        let result = CartesianIntersection.intersect(
            &p(0.0, 0.0),
            &p(2.0, 0.0),
            &p(1.0, 0.0),
            &p(1.0, 2.0),
        );
        assert_matches!(
            result,
            SegmentIntersection::Touching { point, .. } if point == p(1.0, 0.0)
        );
    }

    #[test]
    fn disjoint_parallel() {
        let result = CartesianIntersection.intersect(
            &p(0.0, 0.0),
            &p(2.0, 0.0),
            &p(0.0, 1.0),
            &p(2.0, 1.0),
        );
        assert_matches!(result, SegmentIntersection::Disjoint);
    }

    #[test]
    fn collinear_overlap() {
        let result = CartesianIntersection.intersect(
            &p(0.0, 0.0),
            &p(4.0, 0.0),
            &p(2.0, 0.0),
            &p(6.0, 0.0),
        );
        assert_matches!(
            result,
            SegmentIntersection::Collinear { point, fraction_a, same_direction: true, equal: false, .. }
                if point == p(2.0, 0.0) && fraction_a == 0.5
        );
    }

    #[test]
    fn collinear_equal_segments() {
        let result = CartesianIntersection.intersect(
            &p(0.0, 0.0),
            &p(4.0, 0.0),
            &p(0.0, 0.0),
            &p(4.0, 0.0),
        );
        assert_matches!(
            result,
            SegmentIntersection::Collinear { same_direction: true, equal: true, .. }
        );
    }

    #[test]
    fn collinear_touching_at_single_point() {
        let result = CartesianIntersection.intersect(
            &p(0.0, 0.0),
            &p(2.0, 0.0),
            &p(2.0, 0.0),
            &p(4.0, 0.0),
        );
        assert_matches!(
            result,
            SegmentIntersection::Touching { point, .. } if point == p(2.0, 0.0)
        );
    }
}
