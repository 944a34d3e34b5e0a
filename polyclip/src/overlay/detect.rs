//! Turn detection.
//!
//! Finds every point where a segment of one operand intersects a segment of
//! the other and records it as a [`Turn`] with one operation per operand.
//! Rings are first partitioned into monotonic sections (runs of segments with
//! uniform direction signs) so that most segment pairs are pruned by cheap
//! bounding box checks before the intersection primitive runs.

use num_traits::Float;
use polyclip_types::{CartesianPoint2d, Orientation, Rect};

use super::turns::{OperationKind, SegmentId, Turn, TurnMethod, TurnOperation};
use super::{Operand, SourceRing};
use crate::strategy::{IntersectStrategy, SegmentIntersection, SideStrategy};

/// How turns at shared endpoints without a local crossing are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TouchPolicy {
    /// Endpoint touches produce inert turns, discarded before traversal.
    #[default]
    Ignore,
    /// Endpoint touches block traversal through the shared point.
    Block,
}

/// A run of consecutive segments with uniform direction signs, with its
/// bounding box.
#[derive(Debug, Clone)]
struct MonotonicSection<N> {
    /// First segment index covered by the section.
    begin: usize,
    /// One past the last segment index covered by the section.
    end: usize,
    bbox: Rect<N>,
}

fn sign<N: num_traits::Num + PartialOrd>(value: N) -> i8 {
    if value > N::zero() {
        1
    } else if value < N::zero() {
        -1
    } else {
        0
    }
}

fn sectionalize<P: CartesianPoint2d>(points: &[P]) -> Vec<MonotonicSection<P::Num>> {
    let n = points.len();
    let mut sections: Vec<MonotonicSection<P::Num>> = Vec::new();
    let mut current_dir: Option<(i8, i8)> = None;

    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        let seg_box = Rect::from_point(p).merge(Rect::from_point(q));
        let dir = (sign(q.x() - p.x()), sign(q.y() - p.y()));
        let zero_length = dir == (0, 0);

        let extends = !sections.is_empty() && (zero_length || current_dir == Some(dir));
        match sections.last_mut() {
            Some(section) if extends => {
                section.end = i + 1;
                section.bbox = section.bbox.merge(seg_box);
            }
            _ => {
                sections.push(MonotonicSection {
                    begin: i,
                    end: i + 1,
                    bbox: seg_box,
                });
            }
        }
        if !zero_length || current_dir.is_none() {
            current_dir = Some(dir);
        }
    }

    sections
}

fn segment_id<P: CartesianPoint2d>(
    source_index: usize,
    ring: &SourceRing<P>,
    segment_index: usize,
) -> SegmentId {
    SegmentId::new(
        source_index,
        ring.id.multi_index,
        ring.id.ring_index,
        segment_index,
    )
}

/// Builds a turn from a classified segment intersection, or `None` when the
/// segments do not interact.
#[allow(clippy::too_many_arguments)]
fn build_turn<P, S>(
    intersection: SegmentIntersection<P, P::Num>,
    seg_a: SegmentId,
    seg_b: SegmentId,
    a2: &P,
    b1: &P,
    b2: &P,
    side: &S,
    policy: TouchPolicy,
) -> Option<Turn<P>>
where
    P: CartesianPoint2d,
    S: SideStrategy<P>,
{
    match intersection {
        SegmentIntersection::Disjoint => None,
        SegmentIntersection::Crossing {
            point,
            fraction_a,
            fraction_b,
        } => {
            // The operand whose continuation enters the other operand's
            // interior contributes to the intersection boundary; the other
            // one to the union boundary. Interior is left of the edges.
            let (kind_a, kind_b) = if side.side(b1, b2, a2) == Orientation::Counterclockwise {
                (OperationKind::Intersection, OperationKind::Union)
            } else {
                (OperationKind::Union, OperationKind::Intersection)
            };
            Some(Turn::new(
                point,
                TurnMethod::Crosses,
                [
                    TurnOperation::new(kind_a, seg_a, seg_b, fraction_a),
                    TurnOperation::new(kind_b, seg_b, seg_a, fraction_b),
                ],
            ))
        }
        SegmentIntersection::Touching {
            point,
            fraction_a,
            fraction_b,
        } => {
            let kind = match policy {
                TouchPolicy::Ignore => OperationKind::None,
                TouchPolicy::Block => OperationKind::Blocked,
            };
            Some(Turn::new(
                point,
                TurnMethod::Touch,
                [
                    TurnOperation::new(kind, seg_a, seg_b, fraction_a),
                    TurnOperation::new(kind, seg_b, seg_a, fraction_b),
                ],
            ))
        }
        SegmentIntersection::Collinear {
            point,
            fraction_a,
            fraction_b,
            same_direction,
            equal,
        } => {
            let kind = if same_direction {
                OperationKind::Continue
            } else {
                OperationKind::Opposite
            };
            let method = if equal {
                TurnMethod::Equal
            } else {
                TurnMethod::Collinear
            };
            Some(Turn::new(
                point,
                method,
                [
                    TurnOperation::new(kind, seg_a, seg_b, fraction_a),
                    TurnOperation::new(kind, seg_b, seg_a, fraction_b),
                ],
            ))
        }
    }
}

/// Finds all turns between the two operands.
///
/// Turn order is deterministic: operand 1 rings outer, operand 2 rings inner,
/// segments in ring order. The operands are not mutated.
pub fn detect_turns<P, S, I>(
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    side: &S,
    intersect: &I,
    policy: TouchPolicy,
) -> Vec<Turn<P>>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
    I: IntersectStrategy<P>,
{
    let sections2: Vec<_> = operand2
        .rings()
        .iter()
        .map(|r| sectionalize(&r.points))
        .collect();

    let mut turns = Vec::new();
    for ring_a in operand1.rings() {
        let sections_a = sectionalize(&ring_a.points);
        for (bi, ring_b) in operand2.rings().iter().enumerate() {
            if !ring_a.bbox.intersects(&ring_b.bbox) {
                continue;
            }
            for section_a in &sections_a {
                for section_b in &sections2[bi] {
                    if !section_a.bbox.intersects(&section_b.bbox) {
                        continue;
                    }
                    detect_in_sections(
                        ring_a,
                        ring_b,
                        section_a,
                        section_b,
                        operand1.source_index(),
                        operand2.source_index(),
                        side,
                        intersect,
                        policy,
                        &mut turns,
                    );
                }
            }
        }
    }

    log::debug!("detected {} turns", turns.len());
    turns
}

#[allow(clippy::too_many_arguments)]
fn detect_in_sections<P, S, I>(
    ring_a: &SourceRing<P>,
    ring_b: &SourceRing<P>,
    section_a: &MonotonicSection<P::Num>,
    section_b: &MonotonicSection<P::Num>,
    source_a: usize,
    source_b: usize,
    side: &S,
    intersect: &I,
    policy: TouchPolicy,
    turns: &mut Vec<Turn<P>>,
) where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
    I: IntersectStrategy<P>,
{
    for i in section_a.begin..section_a.end {
        let a1 = &ring_a.points[i];
        let a2 = ring_a.segment_end(i);
        if a1.equal(a2) {
            continue;
        }
        let box_a = Rect::from_point(a1).merge(Rect::from_point(a2));
        if !box_a.intersects(&section_b.bbox) {
            continue;
        }

        for j in section_b.begin..section_b.end {
            let b1 = &ring_b.points[j];
            let b2 = ring_b.segment_end(j);
            if b1.equal(b2) {
                continue;
            }
            let box_b = Rect::from_point(b1).merge(Rect::from_point(b2));
            if !box_a.intersects(&box_b) {
                continue;
            }

            let intersection = intersect.intersect(a1, a2, b1, b2);
            if let Some(turn) = build_turn(
                intersection,
                segment_id(source_a, ring_a, i),
                segment_id(source_b, ring_b, j),
                a2,
                b1,
                b2,
                side,
                policy,
            ) {
                turns.push(turn);
            }
        }
    }
}

/// Finds self-intersection turns within a single operand.
///
/// Adjacent segments of a ring share an endpoint by construction; those pairs
/// are skipped. Any returned turn indicates that the operand is not simple.
pub fn detect_self_turns<P, S, I>(
    operand: &Operand<P>,
    side: &S,
    intersect: &I,
    policy: TouchPolicy,
) -> Vec<Turn<P>>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
    I: IntersectStrategy<P>,
{
    let source = operand.source_index();
    let mut turns = Vec::new();

    for (ri, ring_a) in operand.rings().iter().enumerate() {
        let n = ring_a.points.len();

        // Non-adjacent segment pairs within the same ring.
        for i in 0..n {
            let a1 = &ring_a.points[i];
            let a2 = ring_a.segment_end(i);
            if a1.equal(a2) {
                continue;
            }
            let box_a = Rect::from_point(a1).merge(Rect::from_point(a2));

            for j in i + 2..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let b1 = &ring_a.points[j];
                let b2 = ring_a.segment_end(j);
                if b1.equal(b2) {
                    continue;
                }
                let box_b = Rect::from_point(b1).merge(Rect::from_point(b2));
                if !box_a.intersects(&box_b) {
                    continue;
                }

                let intersection = intersect.intersect(a1, a2, b1, b2);
                if let Some(turn) = build_turn(
                    intersection,
                    segment_id(source, ring_a, i),
                    segment_id(source, ring_a, j),
                    a2,
                    b1,
                    b2,
                    side,
                    policy,
                ) {
                    turns.push(turn);
                }
            }
        }

        // Pairs of distinct rings of the same operand.
        for ring_b in operand.rings().iter().skip(ri + 1) {
            if !ring_a.bbox.intersects(&ring_b.bbox) {
                continue;
            }
            for i in 0..n {
                let a1 = &ring_a.points[i];
                let a2 = ring_a.segment_end(i);
                if a1.equal(a2) {
                    continue;
                }
                let box_a = Rect::from_point(a1).merge(Rect::from_point(a2));

                for j in 0..ring_b.points.len() {
                    let b1 = &ring_b.points[j];
                    let b2 = ring_b.segment_end(j);
                    if b1.equal(b2) {
                        continue;
                    }
                    let box_b = Rect::from_point(b1).merge(Rect::from_point(b2));
                    if !box_a.intersects(&box_b) {
                        continue;
                    }

                    let intersection = intersect.intersect(a1, a2, b1, b2);
                    if let Some(turn) = build_turn(
                        intersection,
                        segment_id(source, ring_a, i),
                        segment_id(source, ring_b, j),
                        a2,
                        b1,
                        b2,
                        side,
                        policy,
                    ) {
                        turns.push(turn);
                    }
                }
            }
        }
    }

    turns
}
