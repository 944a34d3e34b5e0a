//! Orientation predicate for point triplets.

use crate::point::CartesianPoint2d;
use serde::{Deserialize, Serialize};

/// Orientation of a triplet of points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Clockwise (the third point is to the right of the directed line).
    Clockwise,
    /// Counterclockwise (the third point is to the left of the directed line).
    Counterclockwise,
    /// Collinear
    Collinear,
}

impl Orientation {
    /// Determines orientation of a triplet of points.
    pub fn triplet<Num: num_traits::Num + PartialOrd>(
        p: &impl CartesianPoint2d<Num = Num>,
        q: &impl CartesianPoint2d<Num = Num>,
        r: &impl CartesianPoint2d<Num = Num>,
    ) -> Self {
        let cross = (q.x() - p.x()) * (r.y() - q.y()) - (q.y() - p.y()) * (r.x() - q.x());
        if cross == Num::zero() {
            Self::Collinear
        } else if cross > Num::zero() {
            Self::Counterclockwise
        } else {
            Self::Clockwise
        }
    }

    /// Mirrors the orientation, as seen when one of the axes is flipped.
    pub fn reversed(&self) -> Self {
        match self {
            Self::Clockwise => Self::Counterclockwise,
            Self::Counterclockwise => Self::Clockwise,
            Self::Collinear => Self::Collinear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::Point2d;

    #[test]
    fn triplet() {
        let p = Point2d::new(0.0, 0.0);
        let q = Point2d::new(1.0, 0.0);

        assert_eq!(
            Orientation::triplet(&p, &q, &Point2d::new(1.0, 1.0)),
            Orientation::Counterclockwise
        );
        assert_eq!(
            Orientation::triplet(&p, &q, &Point2d::new(1.0, -1.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            Orientation::triplet(&p, &q, &Point2d::new(2.0, 0.0)),
            Orientation::Collinear
        );
    }
}
