use serde::{Deserialize, Serialize};

use crate::error::PolyclipTypesError;

/// A sequence of points, either open or closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contour<Point> {
    /// Points of the contour.
    pub points: Vec<Point>,
    /// Whether the contour is closed.
    pub is_closed: bool,
}

impl<Point> Contour<Point> {
    /// Creates a new contour.
    pub fn new(points: Vec<Point>, is_closed: bool) -> Self {
        Self { points, is_closed }
    }

    /// Creates a new open contour.
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            is_closed: false,
        }
    }

    /// Creates a new closed contour.
    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            is_closed: true,
        }
    }

    /// Converts self into a `ClosedContour` instance if the contour is closed, or returns `None` if the contour is
    /// open.
    pub fn into_closed(self) -> Option<ClosedContour<Point>> {
        if self.is_closed {
            Some(ClosedContour {
                points: self.points,
            })
        } else {
            None
        }
    }
}

/// A closed contour (a ring).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedContour<Point> {
    /// Points of the contour. The first point shall not be duplicated at the end.
    pub points: Vec<Point>,
}

impl<Point> ClosedContour<Point> {
    /// Creates a new closed contour.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl<P> From<ClosedContour<P>> for Contour<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            points: value.points,
            is_closed: true,
        }
    }
}

impl<P> TryFrom<Contour<P>> for ClosedContour<P> {
    type Error = PolyclipTypesError;

    fn try_from(value: Contour<P>) -> Result<Self, Self::Error> {
        value
            .into_closed()
            .ok_or_else(|| PolyclipTypesError::Conversion("contour is not closed".into()))
    }
}

impl<P> crate::contour::ClosedContour for ClosedContour<P> {
    type Point = P;

    fn iter_points(&self) -> impl Iterator<Item = &'_ P> {
        self.points.iter()
    }
}

impl<P> crate::contour::Contour for Contour<P> {
    type Point = P;

    fn is_closed(&self) -> bool {
        self.is_closed
    }

    fn iter_points(&self) -> impl Iterator<Item = &P> {
        self.points.iter()
    }
}
