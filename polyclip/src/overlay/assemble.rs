//! Ring assembly.
//!
//! Collects the rings produced by traversal together with the input rings
//! untouched by any turn, determines which of them belong to the result of
//! the requested operation, resolves which holes nest inside which shells
//! and builds the output multipolygon.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use num_traits::{Float, Zero};
use polyclip_types::contour::{CartesianContour, ClosedContour as ClosedContourTrait};
use polyclip_types::impls::{ClosedContour, MultiPolygon, Polygon};
use polyclip_types::polygon::{CartesianPolygon, Polygon as PolygonTrait};
use polyclip_types::{CartesianPoint2d, Rect};

use super::turns::{RingId, RingSource, Turn};
use super::{Operand, OverlayOp};

/// Borrowed view of a point slice as a closed ring, giving access to the
/// contour and polygon algorithms.
struct RingView<'a, P>(&'a [P]);

impl<'a, P> ClosedContourTrait for RingView<'a, P> {
    type Point = P;

    fn iter_points(&self) -> impl Iterator<Item = &'_ P> {
        self.0.iter()
    }
}

impl<'a, P> PolygonTrait for RingView<'a, P> {
    type Contour = RingView<'a, P>;

    fn outer_contour(&self) -> &Self::Contour {
        self
    }

    fn inner_contours(&self) -> impl Iterator<Item = &'_ Self::Contour> {
        std::iter::empty()
    }
}

/// Derived, read-only description of one candidate ring.
#[derive(Debug)]
struct RingProperties<P: CartesianPoint2d> {
    ring_id: RingId,
    area: P::Num,
    bbox: Rect<P::Num>,
    /// Representative point used for containment tests.
    point: P,
    produced: bool,
    /// Whether any turn lies on the ring.
    touched: bool,
    /// Smallest enclosing positive ring that is part of the result.
    parent: Option<RingId>,
    /// Signed count of enclosing untouched input rings: positive rings add
    /// one, holes subtract one.
    parent_count: i32,
}

impl<P: CartesianPoint2d> RingProperties<P> {
    fn positive(&self) -> bool {
        self.area > P::Num::zero()
    }

    fn negative(&self) -> bool {
        self.area < P::Num::zero()
    }

    /// Whether the ring belongs to the result of the operation.
    ///
    /// Produced rings always do, because the traversal was already direction
    /// dependent. Touched input rings never do: their relevant pieces were
    /// re-created by the traversal. For the rest the nesting count decides.
    fn included(&self, operation: OverlayOp) -> bool {
        if self.produced {
            return true;
        }
        if self.touched {
            return false;
        }

        if self.positive() {
            match operation {
                OverlayOp::Union => self.parent_count == 0,
                OverlayOp::Intersection => self.parent_count > 0,
                OverlayOp::Difference => {
                    if self.ring_id.source == RingSource::First {
                        self.parent_count == 0
                    } else {
                        // With the second operand reversed, its former holes
                        // are the positive rings; they carve output out of
                        // the first operand wherever they lie inside it.
                        self.parent_count > 0
                    }
                }
            }
        } else if self.negative() {
            match operation {
                OverlayOp::Union => self.parent_count == 1,
                OverlayOp::Intersection => self.parent_count > 1,
                OverlayOp::Difference => self.parent_count == 1,
            }
        } else {
            // Zero area: degenerate, never emitted.
            false
        }
    }

    /// Ring id the output emission groups by: holes group under their
    /// parent shell.
    fn shell_id(&self) -> RingId {
        if self.positive() {
            self.ring_id
        } else {
            self.parent.unwrap_or(self.ring_id)
        }
    }
}

fn properties_of<P>(
    ring_id: RingId,
    points: &[P],
    produced: bool,
    touched: bool,
) -> Option<RingProperties<P>>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
{
    let bbox = Rect::from_points(points.iter())?;
    Some(RingProperties {
        ring_id,
        area: RingView(points).signed_area(),
        bbox,
        point: points.first()?.clone(),
        produced,
        touched,
        parent: None,
        parent_count: 0,
    })
}

/// Resolves a ring id to its point data.
fn resolve_ring<'a, P: CartesianPoint2d + Clone>(
    operand1: &'a Operand<P>,
    operand2: &'a Operand<P>,
    produced: &'a [&'a [P]],
    ring_id: RingId,
) -> &'a [P] {
    match ring_id.source {
        RingSource::First => operand1
            .ring(ring_id.multi_index, ring_id.ring_index)
            .map(|r| r.points.as_slice())
            .unwrap_or(&[]),
        RingSource::Second => operand2
            .ring(ring_id.multi_index, ring_id.ring_index)
            .map(|r| r.points.as_slice())
            .unwrap_or(&[]),
        RingSource::Produced => produced[ring_id.multi_index],
    }
}

/// Strips the closing duplicate point of a traversal-produced ring.
fn open_ring<P: CartesianPoint2d>(points: &[P]) -> &[P] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first.equal(last) => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Builds the output geometry from produced and untouched input rings.
pub fn assemble<P>(
    produced: &[Vec<P>],
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    turns: &[Turn<P>],
    operation: OverlayOp,
) -> MultiPolygon<P>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
{
    let touched: BTreeSet<RingId> = turns
        .iter()
        .filter(|turn| !turn.discarded)
        .flat_map(|turn| turn.operations.iter().map(|op| RingId::from(op.seg_id)))
        .collect();

    let produced_points: Vec<&[P]> = produced.iter().map(|ring| open_ring(ring)).collect();

    let mut props: Vec<RingProperties<P>> = Vec::new();
    for ring in operand1.rings().iter().chain(operand2.rings().iter()) {
        if let Some(p) = properties_of(ring.id, &ring.points, false, touched.contains(&ring.id)) {
            props.push(p);
        }
    }
    for (i, points) in produced_points.iter().enumerate() {
        let id = RingId::new(RingSource::Produced, i, None);
        if let Some(p) = properties_of(id, points, true, false) {
            props.push(p);
        }
    }

    // Containment scan, larger rings first. When the scan reaches a ring as
    // the smaller element of a pair, all containments from even larger rings
    // have already been applied to the larger element, so its inclusion
    // state is final.
    let mut order: Vec<usize> = (0..props.len()).collect();
    order.sort_by(|&l, &r| {
        props[r]
            .area
            .abs()
            .partial_cmp(&props[l].area.abs())
            .unwrap_or(Ordering::Equal)
    });

    for oi in 0..order.len() {
        let i = order[oi];
        let larger_included = props[i].included(operation);
        let larger_id = props[i].ring_id;
        let larger_produced = props[i].produced;
        let larger_positive = props[i].positive();
        let larger_negative = props[i].negative();
        let larger_area = props[i].area.abs();

        for &j in &order[oi + 1..] {
            if !(props[j].area.abs() < larger_area) {
                continue;
            }
            if !props[i].bbox.contains(&props[j].point) {
                continue;
            }
            let larger_ring = resolve_ring(operand1, operand2, &produced_points, larger_id);
            if !RingView(larger_ring).contains_point(&props[j].point) {
                continue;
            }

            if larger_positive {
                if larger_included {
                    props[j].parent = Some(larger_id);
                }
                if !larger_produced {
                    props[j].parent_count += 1;
                }
            } else if larger_negative && !larger_produced {
                props[j].parent_count -= 1;
            }
        }
    }

    // Emit shells with their holes. Holes share their parent's shell id and
    // sort after it because the parent's area is strictly larger.
    order.sort_by(|&l, &r| {
        props[l].shell_id().cmp(&props[r].shell_id()).then_with(|| {
            props[r]
                .area
                .abs()
                .partial_cmp(&props[l].area.abs())
                .unwrap_or(Ordering::Equal)
        })
    });

    let mut polygons: Vec<Polygon<P>> = Vec::new();
    let mut current_shell: Option<RingId> = None;
    for &i in &order {
        let prop = &props[i];
        let points = resolve_ring(operand1, operand2, &produced_points, prop.ring_id);
        if prop.positive() {
            if prop.included(operation) {
                polygons.push(Polygon::new(ClosedContour::new(points.to_vec())));
                current_shell = Some(prop.ring_id);
            } else {
                current_shell = None;
            }
        } else if prop.included(operation) {
            match (current_shell, prop.parent, polygons.last_mut()) {
                (Some(shell), Some(parent), Some(polygon)) if shell == parent => {
                    polygon
                        .inner_contours
                        .push(ClosedContour::new(points.to_vec()));
                }
                _ => {
                    log::debug!("dropping hole {:?} without a matching shell", prop.ring_id);
                }
            }
        }
    }

    MultiPolygon::new(polygons)
}
