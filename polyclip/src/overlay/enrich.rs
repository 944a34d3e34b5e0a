//! Turn enrichment.
//!
//! Prepares a raw turn list for traversal: sorts the turns along each ring
//! and links every operation to its successor, computes the remaining
//! distance used for collinear tie-breaks, discards turns colocated with
//! blocking ones, and groups turns sharing one location into clusters with a
//! deterministic angular ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use num_traits::{Float, Zero};
use polyclip_types::{CartesianPoint2d, CartesianPoint2dFloat, Orientation};

use super::turns::{OperationKind, RingId, SegmentId, Turn};
use super::{ring_for_segment, Operand, OverlayOp, SourceRing};
use crate::strategy::SideStrategy;

/// One operation radiating from a cluster point, with the ring vertex its
/// outgoing direction aims at.
#[derive(Debug, Clone)]
pub struct RankedOperation<P> {
    /// Turn the operation belongs to.
    pub turn_index: usize,
    /// Index of the operation within the turn.
    pub op_index: usize,
    /// First ring vertex past the cluster point along the operation's ring.
    pub target: P,
}

/// A set of turns sharing one location.
///
/// The ranking orders all operations of the cluster by the angle of their
/// outgoing direction around the shared point; at traversal time the
/// operation following the incoming direction in rank order is the
/// topologically correct continuation.
#[derive(Debug, Clone)]
pub struct Cluster<P> {
    /// The shared location.
    pub point: P,
    /// Indices of the turns of the cluster, ascending.
    pub turns: Vec<usize>,
    /// All operations of the cluster in angular rank order.
    pub ranking: Vec<RankedOperation<P>>,
}

/// Enriches the turns in place and returns the cluster list.
///
/// The ranking direction depends on the requested operation: union ranks
/// clockwise-first, intersection (and difference, which traverses as
/// intersection) counterclockwise-first.
pub fn enrich_turns<P, S>(
    turns: &mut [Turn<P>],
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    operation: OverlayOp,
    side: &S,
) -> Vec<Cluster<P>>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
{
    handle_colocations(turns);
    assign_links(turns);
    assign_remaining_distances(turns, operand1, operand2);
    let clusters = build_clusters(turns, operand1, operand2, operation, side);
    for turn in turns.iter_mut() {
        turn.selectable_start = !turn.discarded
            && turn.operations.iter().any(|op| {
                matches!(
                    op.kind,
                    OperationKind::Union | OperationKind::Intersection | OperationKind::Continue
                )
            });
    }

    clusters
}

/// Discards turns colocated with a blocking turn on the same segment.
///
/// When several turns share one position on a segment and the first of them
/// blocks both operands, the others must never be traversed.
fn handle_colocations<P: CartesianPoint2d>(turns: &mut [Turn<P>]) {
    let mut map: BTreeMap<SegmentId, Vec<(usize, usize)>> = BTreeMap::new();
    for (ti, turn) in turns.iter().enumerate() {
        map.entry(turn.operations[0].seg_id).or_default().push((ti, 0));
        map.entry(turn.operations[1].seg_id).or_default().push((ti, 1));
    }

    let mut colocated: Vec<Vec<(usize, usize)>> = map
        .into_values()
        .filter(|ops| ops.len() > 1)
        .collect();
    if colocated.is_empty() {
        return;
    }

    for ops in &mut colocated {
        ops.sort_by(|&(lt, lo), &(rt, ro)| {
            let left = &turns[lt].operations[lo];
            let right = &turns[rt].operations[ro];
            left.fraction
                .partial_cmp(&right.fraction)
                .unwrap_or(Ordering::Equal)
                // Blocking turns sort first so they govern their colocation.
                .then_with(|| {
                    let left_xx = turns[lt].both(OperationKind::Blocked);
                    let right_xx = turns[rt].both(OperationKind::Blocked);
                    right_xx.cmp(&left_xx)
                })
                .then_with(|| left.other_id.cmp(&right.other_id))
        });
    }

    for ops in &colocated {
        let mut leader = ops[0];
        for &(ti, oi) in &ops[1..] {
            let same_fraction =
                turns[leader.0].operations[leader.1].fraction == turns[ti].operations[oi].fraction;
            if same_fraction {
                if ti != leader.0 && turns[leader.0].both(OperationKind::Blocked) {
                    log::debug!("discarding turn {ti} colocated with a blocking turn");
                    turns[ti].discarded = true;
                }
            } else {
                leader = (ti, oi);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexedOperation<N> {
    turn_index: usize,
    op_index: usize,
    segment_index: usize,
    fraction: N,
    other_id: SegmentId,
}

/// Sorts the operations of every ring on (segment, fraction) and assigns the
/// forward links.
///
/// Links are circular along the ring: the last operation travels to the
/// first one. `next_ip_index` is only set between consecutive operations on
/// the same segment, excluding the circular wrap-around pair.
fn assign_links<P: CartesianPoint2d>(turns: &mut [Turn<P>]) {
    let mut per_ring: BTreeMap<RingId, Vec<IndexedOperation<P::Num>>> = BTreeMap::new();
    for (ti, turn) in turns.iter().enumerate() {
        if turn.discarded {
            continue;
        }
        for (oi, op) in turn.operations.iter().enumerate() {
            per_ring
                .entry(RingId::from(op.seg_id))
                .or_default()
                .push(IndexedOperation {
                    turn_index: ti,
                    op_index: oi,
                    segment_index: op.seg_id.segment_index,
                    fraction: op.fraction,
                    other_id: op.other_id,
                });
        }
    }

    for ops in per_ring.values_mut() {
        ops.sort_by(|l, r| {
            l.segment_index
                .cmp(&r.segment_index)
                .then_with(|| l.fraction.partial_cmp(&r.fraction).unwrap_or(Ordering::Equal))
                .then_with(|| l.other_id.cmp(&r.other_id))
        });

        let len = ops.len();
        for i in 0..len {
            let prev = ops[(i + len - 1) % len];
            let cur = ops[i];
            let target = &mut turns[prev.turn_index].operations[prev.op_index];
            target.enriched.travels_to_ip_index = Some(cur.turn_index);
            target.enriched.travels_to_vertex_index = Some(cur.segment_index);
            if i != 0 && prev.segment_index == cur.segment_index {
                target.enriched.next_ip_index = Some(cur.turn_index);
            }
        }
    }
}

/// Computes for every operation the distance from the turn to the end of its
/// segment. Used to prefer the longest collinear run among `Continue`
/// candidates so that spikes collapse correctly.
fn assign_remaining_distances<P>(
    turns: &mut [Turn<P>],
    operand1: &Operand<P>,
    operand2: &Operand<P>,
) where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
{
    for turn in turns.iter_mut() {
        if turn.discarded {
            continue;
        }
        let point = turn.point.clone();
        for op in &mut turn.operations {
            let Some(ring) = ring_for_segment(operand1, operand2, op.seg_id) else {
                continue;
            };
            op.remaining_distance = ring.segment_end(op.seg_id.segment_index).distance(&point);
        }
    }
}

/// Groups turns with equal points into clusters and ranks their operations.
fn build_clusters<P, S>(
    turns: &mut [Turn<P>],
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    operation: OverlayOp,
    side: &S,
) -> Vec<Cluster<P>>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
{
    let mut order: Vec<usize> = (0..turns.len()).filter(|&i| !turns[i].discarded).collect();
    order.sort_by(|&l, &r| {
        let lp = &turns[l].point;
        let rp = &turns[r].point;
        lp.x()
            .partial_cmp(&rp.x())
            .unwrap_or(Ordering::Equal)
            .then_with(|| lp.y().partial_cmp(&rp.y()).unwrap_or(Ordering::Equal))
    });

    let mut clusters = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && turns[order[j]].point.equal(&turns[order[i]].point) {
            j += 1;
        }
        if j - i > 1 {
            let mut members = order[i..j].to_vec();
            members.sort_unstable();
            let cluster_id = clusters.len();
            for &t in &members {
                turns[t].cluster_id = Some(cluster_id);
            }
            let cluster = rank_cluster(turns, members, operand1, operand2, operation, side);
            log::debug!(
                "cluster {cluster_id}: {} turns, {} ranked operations",
                cluster.turns.len(),
                cluster.ranking.len()
            );
            clusters.push(cluster);
        }
        i = j;
    }

    clusters
}

fn rank_cluster<P, S>(
    turns: &[Turn<P>],
    members: Vec<usize>,
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    operation: OverlayOp,
    side: &S,
) -> Cluster<P>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
{
    let point = turns[members[0]].point.clone();
    let mut ranking = Vec::with_capacity(members.len() * 2);
    for &t in &members {
        for (oi, op) in turns[t].operations.iter().enumerate() {
            let Some(ring) = ring_for_segment(operand1, operand2, op.seg_id) else {
                continue;
            };
            ranking.push(RankedOperation {
                turn_index: t,
                op_index: oi,
                target: outgoing_target(ring, op.seg_id.segment_index, &point),
            });
        }
    }

    let clockwise = operation == OverlayOp::Union;
    ranking.sort_by(|l, r| {
        angular_cmp(&point, &l.target, &r.target, side, clockwise).then_with(|| {
            (l.turn_index, l.op_index).cmp(&(r.turn_index, r.op_index))
        })
    });

    Cluster {
        point,
        turns: members,
        ranking,
    }
}

/// First ring vertex past the turn point along the ring, defining the
/// outgoing direction of an operation.
fn outgoing_target<P: CartesianPoint2d + Clone>(
    ring: &SourceRing<P>,
    segment_index: usize,
    from: &P,
) -> P {
    let n = ring.points.len();
    for k in 1..=n {
        let candidate = &ring.points[(segment_index + k) % n];
        if !candidate.equal(from) {
            return candidate.clone();
        }
    }

    from.clone()
}

/// Compares two directions (from `center` towards `a` and `b`) by angle.
///
/// Counterclockwise order starts at the positive x axis; the clockwise
/// variant is the exact reverse. Equal directions compare equal, letting the
/// caller apply a deterministic tie-break.
pub(crate) fn angular_cmp<P, S>(
    center: &P,
    a: &P,
    b: &P,
    side: &S,
    clockwise: bool,
) -> Ordering
where
    P: CartesianPoint2d,
    S: SideStrategy<P>,
{
    let ordering = counterclockwise_cmp(center, a, b, side);
    if clockwise {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Half-plane of the direction from `center` to `p`: `0` covers angles
/// `[0°, 180°)`, `1` covers `[180°, 360°)`.
fn half<P: CartesianPoint2d>(center: &P, p: &P) -> u8 {
    let zero = P::Num::zero();
    let dy = p.y() - center.y();
    let dx = p.x() - center.x();
    if dy > zero || (dy == zero && dx > zero) {
        0
    } else {
        1
    }
}

fn counterclockwise_cmp<P, S>(center: &P, a: &P, b: &P, side: &S) -> Ordering
where
    P: CartesianPoint2d,
    S: SideStrategy<P>,
{
    let half_a = half(center, a);
    let half_b = half(center, b);
    if half_a != half_b {
        return half_a.cmp(&half_b);
    }
    match side.side(center, a, b) {
        Orientation::Counterclockwise => Ordering::Less,
        Orientation::Clockwise => Ordering::Greater,
        Orientation::Collinear => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::detect::{detect_turns, TouchPolicy};
    use crate::strategy::{CartesianIntersection, CartesianSide};
    use polyclip_types::impls::{MultiPolygon, Point2d, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<Point2d> {
        Polygon::from_points(vec![
            Point2d::new(x0, y0),
            Point2d::new(x0 + size, y0),
            Point2d::new(x0 + size, y0 + size),
            Point2d::new(x0, y0 + size),
        ])
    }

    fn enriched_squares() -> (Vec<Turn<Point2d>>, Vec<Cluster<Point2d>>) {
        let op1 = Operand::from_multi_polygon(0, &MultiPolygon::from(square(0.0, 0.0, 2.0)));
        let op2 = Operand::from_multi_polygon(1, &MultiPolygon::from(square(1.0, 1.0, 2.0)));
        let mut turns = detect_turns(
            &op1,
            &op2,
            &CartesianSide,
            &CartesianIntersection,
            TouchPolicy::default(),
        );
        let clusters = enrich_turns(&mut turns, &op1, &op2, OverlayOp::Intersection, &CartesianSide);
        (turns, clusters)
    }

    #[test]
    fn links_are_circular() {
        let (turns, clusters) = enriched_squares();
        assert_eq!(turns.len(), 2);
        assert!(clusters.is_empty());

        for (ti, turn) in turns.iter().enumerate() {
            for op in &turn.operations {
                // Only two turns exist, one per ring position, so every
                // operation travels to the other turn.
                assert_eq!(op.enriched.travels_to_ip_index, Some(1 - ti));
                assert_eq!(op.enriched.next_ip_index, None);
            }
        }
    }

    #[test]
    fn remaining_distance_reaches_segment_end() {
        let (turns, _) = enriched_squares();
        // Both turns sit halfway along both of their segments of length 2.
        for turn in &turns {
            for op in &turn.operations {
                assert_eq!(op.remaining_distance, 1.0);
            }
        }
    }

    /// A bowtie whose self-crossing lies on the right edge of `square(0, 0, 2)`,
    /// so that three segments pass through the point `(2, 1)`.
    fn bowtie_through_edge() -> Polygon<Point2d> {
        Polygon::from_points(vec![
            Point2d::new(1.0, 0.0),
            Point2d::new(3.0, 2.0),
            Point2d::new(3.0, 0.0),
            Point2d::new(1.0, 2.0),
        ])
    }

    #[test]
    fn coincident_crossings_form_cluster() {
        let op1 = Operand::from_multi_polygon(0, &MultiPolygon::from(square(0.0, 0.0, 2.0)));
        let op2 = Operand::from_multi_polygon(1, &MultiPolygon::from(bowtie_through_edge()));
        let mut turns = detect_turns(
            &op1,
            &op2,
            &CartesianSide,
            &CartesianIntersection,
            TouchPolicy::default(),
        );
        let clusters = enrich_turns(&mut turns, &op1, &op2, OverlayOp::Union, &CartesianSide);

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.point, Point2d::new(2.0, 1.0));
        assert_eq!(cluster.turns.len(), 2);
        assert_eq!(cluster.ranking.len(), 4);
        for &t in &cluster.turns {
            assert_eq!(turns[t].cluster_id, Some(0));
        }
    }

    #[test]
    fn cluster_ranking_is_deterministic() {
        let run = || {
            let op1 = Operand::from_multi_polygon(0, &MultiPolygon::from(square(0.0, 0.0, 2.0)));
            let op2 = Operand::from_multi_polygon(1, &MultiPolygon::from(bowtie_through_edge()));
            let mut turns = detect_turns(
                &op1,
                &op2,
                &CartesianSide,
                &CartesianIntersection,
                TouchPolicy::default(),
            );
            let clusters = enrich_turns(&mut turns, &op1, &op2, OverlayOp::Union, &CartesianSide);
            clusters[0]
                .ranking
                .iter()
                .map(|r| (r.turn_index, r.op_index))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn angular_order_is_counterclockwise_from_positive_x() {
        let center = Point2d::new(0.0, 0.0);
        let east = Point2d::new(1.0, 0.0);
        let north = Point2d::new(0.0, 1.0);
        let west = Point2d::new(-1.0, 0.0);
        let south = Point2d::new(0.0, -1.0);

        let mut dirs = vec![south, west, east, north];
        dirs.sort_by(|a, b| angular_cmp(&center, a, b, &CartesianSide, false));
        assert_eq!(dirs, vec![east, north, west, south]);

        let mut dirs = vec![south, west, east, north];
        dirs.sort_by(|a, b| angular_cmp(&center, a, b, &CartesianSide, true));
        assert_eq!(dirs, vec![south, west, north, east]);
    }
}
