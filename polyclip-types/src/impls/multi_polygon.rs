use serde::{Deserialize, Serialize};

use crate::impls::polygon::Polygon;

/// A set of polygons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiPolygon<P> {
    /// Polygons of the multipolygon.
    pub parts: Vec<Polygon<P>>,
}

impl<P> MultiPolygon<P> {
    /// Creates a new multipolygon.
    pub fn new(parts: Vec<Polygon<P>>) -> Self {
        Self { parts }
    }

    /// Returns true if the multipolygon contains no polygons.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<P> crate::multi_polygon::MultiPolygon for MultiPolygon<P> {
    type Polygon = Polygon<P>;

    fn polygons(&self) -> impl Iterator<Item = &Self::Polygon> {
        self.parts.iter()
    }
}

impl<P> From<Vec<Polygon<P>>> for MultiPolygon<P> {
    fn from(parts: Vec<Polygon<P>>) -> Self {
        Self { parts }
    }
}

impl<P> From<Polygon<P>> for MultiPolygon<P> {
    fn from(value: Polygon<P>) -> Self {
        Self { parts: vec![value] }
    }
}
