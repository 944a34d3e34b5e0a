//! The overlay pipeline.
//!
//! An overlay call runs four stages in order: [`detect`] finds the turns,
//! [`enrich`] links and clusters them, [`traverse`] produces output rings and
//! [`assemble`] builds the final geometry. Each invocation owns all of its
//! intermediate state: the inputs are flattened once into [`Operand`] arenas
//! and everything downstream refers to rings and turns by index.

pub mod assemble;
pub mod detect;
pub mod enrich;
pub mod traverse;
pub mod turns;

use std::collections::HashMap;

use nalgebra::Scalar;
use num_traits::Float;
use polyclip_types::contour::ClosedContour as ClosedContourTrait;
use polyclip_types::multi_polygon::MultiPolygon as MultiPolygonTrait;
use polyclip_types::polygon::Polygon as PolygonTrait;
use polyclip_types::{CartesianPoint2d, NewCartesianPoint2d, Rect};
use serde::{Deserialize, Serialize};

use crate::strategy::{
    CartesianIntersection, CartesianSide, IntersectStrategy, SideStrategy,
};
use turns::{RingId, RingSource, SegmentId};

/// The boolean operation to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayOp {
    /// Area covered by both operands.
    Intersection,
    /// Area covered by at least one operand.
    Union,
    /// Area covered by the first operand but not the second.
    Difference,
}

impl OverlayOp {
    /// The operation tag traversal follows for this overlay.
    ///
    /// Difference is traversed as an intersection with the reversed second
    /// operand.
    pub(crate) fn target_operation(self) -> turns::OperationKind {
        match self {
            OverlayOp::Union => turns::OperationKind::Union,
            OverlayOp::Intersection | OverlayOp::Difference => turns::OperationKind::Intersection,
        }
    }
}

/// One ring of an operand, flattened into an indexed point vector.
#[derive(Debug, Clone)]
pub(crate) struct SourceRing<P: CartesianPoint2d> {
    pub id: RingId,
    /// Ring points without the closing duplicate. Segment `i` runs from
    /// point `i` to point `(i + 1) % len`.
    pub points: Vec<P>,
    pub bbox: Rect<P::Num>,
}

impl<P: CartesianPoint2d> SourceRing<P> {
    /// End point of the given segment.
    pub fn segment_end(&self, segment_index: usize) -> &P {
        &self.points[(segment_index + 1) % self.points.len()]
    }
}

/// Flattened, indexed copy of one overlay operand.
///
/// The overlay stages address edges through [`SegmentId`]s; the operand
/// resolves those to point data. Input geometries are copied in once and
/// never mutated afterwards.
pub struct Operand<P: CartesianPoint2d> {
    source_index: usize,
    rings: Vec<SourceRing<P>>,
    ring_lookup: HashMap<(usize, Option<usize>), usize>,
}

impl<P: CartesianPoint2d + Clone> Operand<P> {
    /// Flattens a multipolygon into an operand arena.
    ///
    /// `source_index` must be `0` for the first operand of an overlay and `1`
    /// for the second. Rings with fewer than 3 points are silently skipped.
    pub fn from_multi_polygon<G>(source_index: usize, geometry: &G) -> Self
    where
        G: MultiPolygonTrait,
        <G::Polygon as PolygonTrait>::Contour: ClosedContourTrait<Point = P>,
    {
        let mut operand = Self {
            source_index,
            rings: Vec::new(),
            ring_lookup: HashMap::new(),
        };
        for (multi_index, polygon) in geometry.polygons().enumerate() {
            operand.push_polygon(multi_index, polygon);
        }

        operand
    }

    /// Flattens a single polygon into an operand arena.
    pub fn from_polygon<G>(source_index: usize, polygon: &G) -> Self
    where
        G: PolygonTrait,
        G::Contour: ClosedContourTrait<Point = P>,
    {
        let mut operand = Self {
            source_index,
            rings: Vec::new(),
            ring_lookup: HashMap::new(),
        };
        operand.push_polygon(0, polygon);

        operand
    }

    fn push_polygon<G>(&mut self, multi_index: usize, polygon: &G)
    where
        G: PolygonTrait,
        G::Contour: ClosedContourTrait<Point = P>,
    {
        self.push_ring(multi_index, None, polygon.outer_contour());
        for (i, inner) in polygon.inner_contours().enumerate() {
            self.push_ring(multi_index, Some(i), inner);
        }
    }

    fn push_ring<C>(&mut self, multi_index: usize, ring_index: Option<usize>, contour: &C)
    where
        C: ClosedContourTrait<Point = P>,
    {
        let points: Vec<P> = contour.iter_points().cloned().collect();
        let Some(bbox) = Rect::from_points(points.iter()) else {
            return;
        };
        if points.len() < 3 {
            log::trace!("skipping degenerate ring with {} points", points.len());
            return;
        }

        let source = if self.source_index == 0 {
            RingSource::First
        } else {
            RingSource::Second
        };
        self.ring_lookup
            .insert((multi_index, ring_index), self.rings.len());
        self.rings.push(SourceRing {
            id: RingId::new(source, multi_index, ring_index),
            points,
            bbox,
        });
    }

    /// Reverses the order of points of every ring.
    ///
    /// Used to realize difference: the reversed second operand turns the
    /// overlay into an intersection with its complement.
    pub fn reverse(&mut self) {
        for ring in &mut self.rings {
            ring.points.reverse();
        }
    }

    /// Whether the operand contains no rings.
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub(crate) fn source_index(&self) -> usize {
        self.source_index
    }

    pub(crate) fn rings(&self) -> &[SourceRing<P>] {
        &self.rings
    }

    pub(crate) fn ring(&self, multi_index: usize, ring_index: Option<usize>) -> Option<&SourceRing<P>> {
        self.ring_lookup
            .get(&(multi_index, ring_index))
            .map(|&i| &self.rings[i])
    }
}

/// Resolves a segment identifier against the two operands of an overlay.
pub(crate) fn ring_for_segment<'a, P: CartesianPoint2d + Clone>(
    operand1: &'a Operand<P>,
    operand2: &'a Operand<P>,
    seg: SegmentId,
) -> Option<&'a SourceRing<P>> {
    let operand = if seg.source_index == 0 {
        operand1
    } else {
        operand2
    };
    operand.ring(seg.multi_index, seg.ring_index)
}

/// Computes the overlay of two multipolygons with the cartesian strategies.
///
/// Exterior rings are expected counterclockwise, holes clockwise. The call
/// never fails: degenerate or malformed input degrades to a partial result.
pub fn overlay<P, N, G1, G2>(
    geometry1: &G1,
    geometry2: &G2,
    operation: OverlayOp,
) -> polyclip_types::impls::MultiPolygon<P>
where
    P: CartesianPoint2d<Num = N> + NewCartesianPoint2d<N> + Clone,
    N: Float + Scalar,
    G1: MultiPolygonTrait,
    <G1::Polygon as PolygonTrait>::Contour: ClosedContourTrait<Point = P>,
    G2: MultiPolygonTrait,
    <G2::Polygon as PolygonTrait>::Contour: ClosedContourTrait<Point = P>,
{
    overlay_with(
        geometry1,
        geometry2,
        operation,
        &CartesianSide,
        &CartesianIntersection,
    )
}

/// Computes the overlay of two multipolygons with the given strategies.
pub fn overlay_with<P, G1, G2, S, I>(
    geometry1: &G1,
    geometry2: &G2,
    operation: OverlayOp,
    side: &S,
    intersect: &I,
) -> polyclip_types::impls::MultiPolygon<P>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    G1: MultiPolygonTrait,
    <G1::Polygon as PolygonTrait>::Contour: ClosedContourTrait<Point = P>,
    G2: MultiPolygonTrait,
    <G2::Polygon as PolygonTrait>::Contour: ClosedContourTrait<Point = P>,
    S: SideStrategy<P>,
    I: IntersectStrategy<P>,
{
    let operand1 = Operand::from_multi_polygon(0, geometry1);
    let mut operand2 = Operand::from_multi_polygon(1, geometry2);
    if operation == OverlayOp::Difference {
        operand2.reverse();
    }

    let mut turns = detect::detect_turns(
        &operand1,
        &operand2,
        side,
        intersect,
        detect::TouchPolicy::default(),
    );
    let clusters = enrich::enrich_turns(&mut turns, &operand1, &operand2, operation, side);
    let rings = traverse::traverse(&operand1, &operand2, operation, &mut turns, &clusters, side);

    assemble::assemble(&rings, &operand1, &operand2, &turns, operation)
}
