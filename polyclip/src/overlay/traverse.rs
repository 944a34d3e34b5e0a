//! Ring traversal.
//!
//! Walks the enriched turn graph and produces closed output rings. The
//! traversal starts at an unvisited operation matching the requested boolean
//! operation, follows the forward links (switching operands at every turn it
//! steps through) and closes the ring when it returns to the start.
//!
//! Correctness is guaranteed for closed, non-self-intersecting, consistently
//! oriented input. Other input cannot be traversed reliably; the dead end,
//! visit-again and step count guards below bound the damage by rejecting the
//! offending start operation and restarting the scan, so that the call
//! always terminates with the rings that could be closed.

use std::cmp::Ordering;

use num_traits::{Float, Zero};
use polyclip_types::{CartesianPoint2d, Orientation};

use super::enrich::{angular_cmp, Cluster};
use super::turns::{OperationKind, SegmentId, Turn, Visited};
use super::{ring_for_segment, Operand, OverlayOp, SourceRing};
use crate::strategy::SideStrategy;

/// Minimum point count of an emitted ring, the closing duplicate included.
const MIN_RING_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraverseFailure {
    DeadEndAtStart,
    DeadEnd,
    VisitAgain,
    EndlessLoop,
}

/// Output ring under construction.
///
/// Consecutive duplicate points are dropped and immediate 180 degree
/// reversal spikes are collapsed as points come in.
struct RingBuilder<P> {
    points: Vec<P>,
}

impl<P: CartesianPoint2d> RingBuilder<P> {
    fn new() -> Self {
        Self { points: Vec::new() }
    }

    fn push<S: SideStrategy<P>>(&mut self, point: P, side: &S) {
        loop {
            let len = self.points.len();
            if len == 0 {
                break;
            }
            if self.points[len - 1].equal(&point) {
                return;
            }
            if len == 1 {
                break;
            }
            let a = &self.points[len - 2];
            let b = &self.points[len - 1];
            if side.side(a, b, &point) == Orientation::Collinear && reverses(a, b, &point) {
                self.points.pop();
            } else {
                break;
            }
        }
        self.points.push(point);
    }

    /// Point before the most recently pushed one.
    fn penultimate(&self) -> Option<&P> {
        self.points.len().checked_sub(2).map(|i| &self.points[i])
    }

    fn into_points(self) -> Vec<P> {
        self.points
    }
}

/// Whether continuing from `b` to `p` doubles back over the segment `(a, b)`.
fn reverses<P: CartesianPoint2d>(a: &P, b: &P, p: &P) -> bool {
    let d1 = b.sub(a);
    let d2 = p.sub(b);
    d1.x * d2.x + d1.y * d2.y < P::Num::zero()
}

/// On a turn where both operations are collinear continuations, stepping
/// through consumes the whole turn for every direction.
fn mark_continue_companions<P: CartesianPoint2d>(turns: &mut [Turn<P>], turn_index: usize) {
    if turns[turn_index].both(OperationKind::Continue) {
        for op in &mut turns[turn_index].operations {
            op.visited.visit();
        }
    }
}

/// Copies the ring vertices passed when travelling from the end of
/// `from_segment` up to and including `to_vertex`.
fn copy_ring_vertices<P, S>(
    ring: &SourceRing<P>,
    from_segment: usize,
    to_vertex: usize,
    output: &mut RingBuilder<P>,
    side: &S,
) where
    P: CartesianPoint2d + Clone,
    S: SideStrategy<P>,
{
    let n = ring.points.len();
    let mut count = (to_vertex + n - from_segment) % n;
    if count == 0 {
        // The next turn sits behind a full loop around the ring.
        count = n;
    }
    for k in 1..=count {
        output.push(ring.points[(from_segment + k) % n].clone(), side);
    }
}

/// Follows the given operation to the next turn, copying the passed vertices
/// into the output ring. Returns the arrived turn and the segment travelled.
fn advance<P, S>(
    turns: &mut [Turn<P>],
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    turn_index: usize,
    op_index: usize,
    output: &mut RingBuilder<P>,
    side: &S,
) -> Result<(usize, SegmentId), TraverseFailure>
where
    P: CartesianPoint2d + Clone,
    S: SideStrategy<P>,
{
    mark_continue_companions(turns, turn_index);
    turns[turn_index].operations[op_index].visited.visit();

    let op = turns[turn_index].operations[op_index].clone();
    let next = match op.enriched.next_ip_index {
        Some(next) => next,
        None => {
            let (Some(to_vertex), Some(next)) = (
                op.enriched.travels_to_vertex_index,
                op.enriched.travels_to_ip_index,
            ) else {
                return Err(TraverseFailure::DeadEnd);
            };
            let Some(ring) = ring_for_segment(operand1, operand2, op.seg_id) else {
                return Err(TraverseFailure::DeadEnd);
            };
            copy_ring_vertices(ring, op.seg_id.segment_index, to_vertex, output, side);
            next
        }
    };

    output.push(turns[next].point.clone(), side);
    Ok((next, op.seg_id))
}

fn select_source(target: OperationKind, source1: usize, source2: usize) -> bool {
    target == OperationKind::Intersection && source1 != source2
}

/// Whether following the operation arrives at the given turn next.
fn leads_to<N>(op: &super::turns::TurnOperation<N>, turn_index: usize) -> bool {
    match op.enriched.next_ip_index {
        Some(next) => next == turn_index,
        None => op.enriched.travels_to_ip_index == Some(turn_index),
    }
}

/// Selects the operation to continue with at a turn outside any cluster.
fn select_at_turn<P: CartesianPoint2d>(
    turns: &[Turn<P>],
    turn_index: usize,
    arrived_seg: SegmentId,
    target: OperationKind,
    start_turn: usize,
) -> Option<usize> {
    let turn = &turns[turn_index];
    if turn.discarded {
        return None;
    }

    // An operation that started the current ring closes it.
    if let Some(i) = turn
        .operations
        .iter()
        .position(|op| op.visited.is_started())
    {
        return Some(i);
    }

    let continues: Vec<usize> = turn
        .operations
        .iter()
        .enumerate()
        .filter(|(_, op)| op.kind == OperationKind::Continue && !op.visited.is_rejected())
        .map(|(i, _)| i)
        .collect();
    if continues.len() == 2 {
        // Both collinear continuations: the one returning to the start turn
        // must win so the ring can close; otherwise the longer remaining run
        // is preferred, which collapses spikes.
        if let Some(&i) = continues
            .iter()
            .find(|&&i| leads_to(&turn.operations[i], start_turn))
        {
            return Some(i);
        }
        return continues.into_iter().max_by(|&l, &r| {
            turn.operations[l]
                .remaining_distance
                .partial_cmp(&turn.operations[r].remaining_distance)
                .unwrap_or(Ordering::Equal)
        });
    }

    let mut selected = None;
    for (i, op) in turn.operations.iter().enumerate() {
        if op.visited.is_rejected() {
            continue;
        }
        if op.kind == OperationKind::Continue {
            if selected.is_none() {
                selected = Some(i);
            }
        } else if op.kind == target
            && (selected.is_none()
                || select_source(target, op.seg_id.source_index, arrived_seg.source_index))
        {
            selected = Some(i);
        }
    }

    selected
}

/// Selects the operation to continue with inside a cluster.
///
/// Candidates are walked in rank order starting at the successor of the
/// incoming direction, skipping operations that were already visited. This
/// keeps the choice locally planar when three or more segments meet in one
/// point.
fn select_in_cluster<P, S>(
    turns: &[Turn<P>],
    cluster: &Cluster<P>,
    came_from: &P,
    target: OperationKind,
    clockwise: bool,
    side: &S,
) -> Option<(usize, usize)>
where
    P: CartesianPoint2d,
    S: SideStrategy<P>,
{
    let len = cluster.ranking.len();
    if len == 0 {
        return None;
    }

    let position = cluster
        .ranking
        .iter()
        .filter(|entry| {
            angular_cmp(&cluster.point, &entry.target, came_from, side, clockwise)
                == Ordering::Less
        })
        .count();

    for k in 0..len {
        let entry = &cluster.ranking[(position + k) % len];
        if turns[entry.turn_index].discarded {
            continue;
        }
        let op = &turns[entry.turn_index].operations[entry.op_index];
        if op.visited.is_started() {
            return Some((entry.turn_index, entry.op_index));
        }
        if op.visited.is_rejected() || op.visited.is_visited() || op.visited == Visited::Finished {
            continue;
        }
        if op.kind.matches(target) {
            return Some((entry.turn_index, entry.op_index));
        }
    }

    None
}

#[allow(clippy::too_many_arguments)]
fn select_next<P, S>(
    turns: &[Turn<P>],
    clusters: &[Cluster<P>],
    arrived: usize,
    arrived_seg: SegmentId,
    target: OperationKind,
    start: (usize, usize),
    came_from: Option<&P>,
    clockwise: bool,
    side: &S,
) -> Option<(usize, usize)>
where
    P: CartesianPoint2d,
    S: SideStrategy<P>,
{
    if let (Some(cluster_id), Some(came_from)) = (turns[arrived].cluster_id, came_from) {
        return select_in_cluster(
            turns,
            &clusters[cluster_id],
            came_from,
            target,
            clockwise,
            side,
        );
    }

    select_at_turn(turns, arrived, arrived_seg, target, start.0).map(|o| (arrived, o))
}

#[allow(clippy::too_many_arguments)]
fn traverse_ring<P, S>(
    turns: &mut [Turn<P>],
    clusters: &[Cluster<P>],
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    target: OperationKind,
    clockwise: bool,
    start_turn: usize,
    start_op: usize,
    max_steps: usize,
    side: &S,
) -> Result<Vec<P>, TraverseFailure>
where
    P: CartesianPoint2d + Clone,
    S: SideStrategy<P>,
{
    let mut ring = RingBuilder::new();
    ring.push(turns[start_turn].point.clone(), side);

    let (arrived, seg) = advance(
        turns, operand1, operand2, start_turn, start_op, &mut ring, side,
    )?;
    let Some((mut current_turn, mut current_op)) = select_next(
        turns,
        clusters,
        arrived,
        seg,
        target,
        (start_turn, start_op),
        ring.penultimate(),
        clockwise,
        side,
    ) else {
        return Err(TraverseFailure::DeadEndAtStart);
    };
    turns[start_turn].operations[start_op].visited.start();

    let mut steps = 0;
    while (current_turn, current_op) != (start_turn, start_op) {
        if turns[current_turn].operations[current_op].visited.is_visited() {
            // A visited operation is reached again without passing the start:
            // suspicious for an endless loop.
            return Err(TraverseFailure::VisitAgain);
        }

        let (arrived, seg) = advance(
            turns,
            operand1,
            operand2,
            current_turn,
            current_op,
            &mut ring,
            side,
        )?;
        let Some((next_turn, next_op)) = select_next(
            turns,
            clusters,
            arrived,
            seg,
            target,
            (start_turn, start_op),
            ring.penultimate(),
            clockwise,
            side,
        ) else {
            return Err(TraverseFailure::DeadEnd);
        };
        current_turn = next_turn;
        current_op = next_op;

        steps += 1;
        if steps > max_steps {
            return Err(TraverseFailure::EndlessLoop);
        }
    }

    turns[start_turn].operations[start_op].visited.finish();
    Ok(ring.into_points())
}

fn clear_visit_info<P: CartesianPoint2d>(turns: &mut [Turn<P>]) {
    for turn in turns.iter_mut() {
        for op in &mut turn.operations {
            op.visited.reset();
        }
    }
}

/// Walks the turn graph and produces all output rings for the operation.
///
/// Emitted rings are closed (first point repeated at the end) and contain at
/// least 3 distinct points. On a dead end or a suspected endless loop the
/// offending start operation is rejected, the rings produced so far are
/// dropped and the scan restarts; every restart rejects one more operation,
/// so the call terminates.
pub fn traverse<P, S>(
    operand1: &Operand<P>,
    operand2: &Operand<P>,
    operation: OverlayOp,
    turns: &mut [Turn<P>],
    clusters: &[Cluster<P>],
    side: &S,
) -> Vec<Vec<P>>
where
    P: CartesianPoint2d + Clone,
    <P as CartesianPoint2d>::Num: Float,
    S: SideStrategy<P>,
{
    let target = operation.target_operation();
    let clockwise = operation == OverlayOp::Union;
    let max_steps = 2 + 2 * turns.len();
    let mut rings: Vec<Vec<P>> = Vec::new();

    'scan: loop {
        for turn_index in 0..turns.len() {
            if turns[turn_index].discarded || !turns[turn_index].selectable_start {
                continue;
            }
            for op_index in 0..2 {
                {
                    let op = &turns[turn_index].operations[op_index];
                    if !op.visited.is_none() || !op.kind.matches(target) {
                        continue;
                    }
                }

                match traverse_ring(
                    turns, clusters, operand1, operand2, target, clockwise, turn_index, op_index,
                    max_steps, side,
                ) {
                    Ok(points) => {
                        if points.len() >= MIN_RING_SIZE {
                            rings.push(points);
                        } else {
                            log::debug!(
                                "discarding degenerate ring with {} points",
                                points.len()
                            );
                        }
                    }
                    Err(failure) => {
                        log::debug!(
                            "backtracking ({failure:?}): rejecting operation {op_index} of turn {turn_index}"
                        );
                        rings.clear();
                        turns[turn_index].operations[op_index].visited.reject();
                        clear_visit_info(turns);
                        continue 'scan;
                    }
                }
            }
        }
        break;
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::detect::{detect_turns, TouchPolicy};
    use crate::overlay::enrich::enrich_turns;
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

    fn run(
        a: Polygon<Point2d>,
        b: Polygon<Point2d>,
        operation: OverlayOp,
    ) -> (Vec<Vec<Point2d>>, Vec<Turn<Point2d>>) {
        let op1 = Operand::from_multi_polygon(0, &MultiPolygon::from(a));
        let mut op2 = Operand::from_multi_polygon(1, &MultiPolygon::from(b));
        if operation == OverlayOp::Difference {
            op2.reverse();
        }
        let mut turns = detect_turns(
            &op1,
            &op2,
            &CartesianSide,
            &CartesianIntersection,
            TouchPolicy::default(),
        );
        let clusters = enrich_turns(&mut turns, &op1, &op2, operation, &CartesianSide);
        let rings = traverse(&op1, &op2, operation, &mut turns, &clusters, &CartesianSide);
        (rings, turns)
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        let (rings, _) = run(
            square(0.0, 0.0, 2.0),
            square(1.0, 1.0, 2.0),
            OverlayOp::Intersection,
        );

        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        for expected in [
            Point2d::new(1.0, 1.0),
            Point2d::new(2.0, 1.0),
            Point2d::new(2.0, 2.0),
            Point2d::new(1.0, 2.0),
        ] {
            assert!(ring.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn union_of_overlapping_squares() {
        let (rings, _) = run(
            square(0.0, 0.0, 2.0),
            square(1.0, 1.0, 2.0),
            OverlayOp::Union,
        );

        assert_eq!(rings.len(), 1);
        // 8 distinct vertices plus the closing duplicate.
        assert_eq!(rings[0].len(), 9);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn difference_of_overlapping_squares() {
        let (rings, _) = run(
            square(0.0, 0.0, 2.0),
            square(1.0, 1.0, 2.0),
            OverlayOp::Difference,
        );

        assert_eq!(rings.len(), 1);
        // The L-shaped remainder has 6 distinct vertices.
        assert_eq!(rings[0].len(), 7);
        assert!(rings[0].contains(&Point2d::new(0.0, 0.0)));
        assert!(!rings[0].contains(&Point2d::new(2.0, 2.0)));
    }

    #[test]
    fn identical_squares_intersect_to_the_same_ring() {
        let (rings, _) = run(
            square(0.0, 0.0, 2.0),
            square(0.0, 0.0, 2.0),
            OverlayOp::Intersection,
        );

        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        for corner in [
            Point2d::new(0.0, 0.0),
            Point2d::new(2.0, 0.0),
            Point2d::new(2.0, 2.0),
            Point2d::new(0.0, 2.0),
        ] {
            assert!(rings[0].contains(&corner));
        }
    }

    #[test]
    fn no_operation_is_left_started() {
        for operation in [OverlayOp::Intersection, OverlayOp::Union] {
            let (_, turns) = run(square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0), operation);
            for turn in &turns {
                for op in &turn.operations {
                    assert!(
                        !op.visited.is_started(),
                        "operation stuck in started state"
                    );
                }
            }
        }
    }

    #[test]
    fn inconsistent_winding_terminates() {
        // The second ring wound clockwise violates the orientation
        // assumption; the traversal must still terminate.
        let reversed = Polygon::from_points(vec![
            Point2d::new(1.0, 3.0),
            Point2d::new(3.0, 3.0),
            Point2d::new(3.0, 1.0),
            Point2d::new(1.0, 1.0),
        ]);
        let (rings, turns) = run(square(0.0, 0.0, 2.0), reversed, OverlayOp::Union);

        // Whatever came out, the state machine finished every operation it
        // touched or rejected it.
        for turn in &turns {
            for op in &turn.operations {
                assert!(!op.visited.is_started());
            }
        }
        for ring in &rings {
            assert!(ring.len() >= MIN_RING_SIZE);
        }
    }

    #[test]
    fn self_intersecting_operand_terminates() {
        let bowtie = Polygon::from_points(vec![
            Point2d::new(1.0, 0.0),
            Point2d::new(3.0, 2.0),
            Point2d::new(3.0, 0.0),
            Point2d::new(1.0, 2.0),
        ]);
        let (rings, _) = run(square(0.0, 0.0, 2.0), bowtie, OverlayOp::Union);
        for ring in &rings {
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn ring_builder_collapses_spikes() {
        let mut builder = RingBuilder::new();
        builder.push(Point2d::new(0.0, 0.0), &CartesianSide);
        builder.push(Point2d::new(2.0, 0.0), &CartesianSide);
        // Doubles straight back: the spike vertex disappears.
        builder.push(Point2d::new(1.0, 0.0), &CartesianSide);
        assert_eq!(
            builder.into_points(),
            vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)]
        );

        let mut builder = RingBuilder::new();
        builder.push(Point2d::new(0.0, 0.0), &CartesianSide);
        builder.push(Point2d::new(1.0, 1.0), &CartesianSide);
        builder.push(Point2d::new(1.0, 1.0), &CartesianSide);
        assert_eq!(builder.into_points().len(), 2);
    }
}
