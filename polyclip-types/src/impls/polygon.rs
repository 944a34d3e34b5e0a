use serde::{Deserialize, Serialize};

use crate::impls::contour::ClosedContour;

/// Polygon with one outer contour and zero or more holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon<P> {
    /// Outer boundary of the polygon.
    pub outer_contour: ClosedContour<P>,
    /// Holes in the polygon.
    pub inner_contours: Vec<ClosedContour<P>>,
}

impl<P> Polygon<P> {
    /// Creates a new polygon without holes.
    pub fn new(outer_contour: ClosedContour<P>) -> Self {
        Self {
            outer_contour,
            inner_contours: vec![],
        }
    }

    /// Creates a new polygon from the points of its outer boundary.
    pub fn from_points(points: Vec<P>) -> Self {
        Self::new(ClosedContour::new(points))
    }

    /// Converts the points of the polygon with the given function.
    pub fn cast_points<T>(&self, cast: impl Fn(&P) -> T) -> Polygon<T> {
        Polygon {
            outer_contour: ClosedContour::new(
                self.outer_contour.points.iter().map(&cast).collect(),
            ),
            inner_contours: self
                .inner_contours
                .iter()
                .map(|c| ClosedContour::new(c.points.iter().map(&cast).collect()))
                .collect(),
        }
    }
}

impl<P> crate::polygon::Polygon for Polygon<P> {
    type Contour = ClosedContour<P>;

    fn outer_contour(&self) -> &Self::Contour {
        &self.outer_contour
    }

    fn inner_contours(&self) -> impl Iterator<Item = &'_ Self::Contour> {
        self.inner_contours.iter()
    }
}

impl<P> From<ClosedContour<P>> for Polygon<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self::new(value)
    }
}
