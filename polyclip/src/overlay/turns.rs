//! Data model of the turn graph.
//!
//! A *turn* is a point where the boundaries of the two operands interact.
//! Every turn carries exactly two *operations*, one per operand, describing
//! what the traversal may do when it arrives at the turn along that operand's
//! segment. Turns are stored in one contiguous vector and reference each
//! other by index, so that backtracking can reset state with plain truncation
//! instead of walking a pointer graph.

use polyclip_types::CartesianPoint2d;
use serde::{Deserialize, Serialize};

/// Identifies one directed edge of one ring of one overlay operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    /// Operand the segment belongs to: `0` for the first, `1` for the second.
    pub source_index: usize,
    /// Index of the polygon within the operand.
    pub multi_index: usize,
    /// `None` for the exterior ring, hole number otherwise.
    pub ring_index: Option<usize>,
    /// Index of the segment within the ring.
    pub segment_index: usize,
}

impl SegmentId {
    /// Creates a new segment identifier.
    pub fn new(
        source_index: usize,
        multi_index: usize,
        ring_index: Option<usize>,
        segment_index: usize,
    ) -> Self {
        Self {
            source_index,
            multi_index,
            ring_index,
            segment_index,
        }
    }
}

/// Origin of a ring considered during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RingSource {
    /// Ring of the first operand.
    First,
    /// Ring of the second operand.
    Second,
    /// Ring produced by the traversal.
    Produced,
}

/// Identifies a ring of one of the operands or a produced ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RingId {
    /// Where the ring comes from.
    pub source: RingSource,
    /// Index of the polygon within the operand, or of the produced ring.
    pub multi_index: usize,
    /// `None` for the exterior ring, hole number otherwise.
    pub ring_index: Option<usize>,
}

impl RingId {
    /// Creates a new ring identifier.
    pub fn new(source: RingSource, multi_index: usize, ring_index: Option<usize>) -> Self {
        Self {
            source,
            multi_index,
            ring_index,
        }
    }
}

impl From<SegmentId> for RingId {
    fn from(seg: SegmentId) -> Self {
        let source = if seg.source_index == 0 {
            RingSource::First
        } else {
            RingSource::Second
        };
        Self {
            source,
            multi_index: seg.multi_index,
            ring_index: seg.ring_index,
        }
    }
}

/// Which boolean result an operation contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// The operation contributes to no boolean result.
    None,
    /// Taking this operation keeps the traversal on the union boundary.
    Union,
    /// Taking this operation keeps the traversal on the intersection boundary.
    Intersection,
    /// Traversal must not continue through this operation.
    Blocked,
    /// Collinear continuation: valid for any operation.
    Continue,
    /// Collinear with the other operand's segment pointing the opposite way.
    Opposite,
}

impl OperationKind {
    /// Whether an operation of this kind may start or continue a traversal
    /// aiming for `target`.
    pub fn matches(self, target: OperationKind) -> bool {
        self == target || self == OperationKind::Continue
    }
}

/// How the two segments of a turn meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnMethod {
    /// The segments cross in their interiors.
    Crosses,
    /// The segments share a single point involving at least one endpoint.
    Touch,
    /// The segments are collinear and share more than one point.
    Collinear,
    /// The segments are identical.
    Equal,
}

/// Visit state of an operation.
///
/// States are reached in the order `None` → `Started` → `Visited` →
/// `Finished`; `Rejected` is terminal and excludes the operation from being
/// used as a traversal start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visited {
    /// Not visited yet.
    #[default]
    None,
    /// A traversal started at this operation and has not closed its ring yet.
    Started,
    /// The operation was consumed while a ring was being traversed.
    Visited,
    /// The operation's ring was closed.
    Finished,
    /// The operation caused a backtrack and is permanently excluded.
    Rejected,
}

impl Visited {
    /// Whether the operation has not been visited.
    pub fn is_none(self) -> bool {
        self == Visited::None
    }

    /// Whether a traversal started here and is still open.
    pub fn is_started(self) -> bool {
        self == Visited::Started
    }

    /// Whether the operation was consumed mid-ring.
    pub fn is_visited(self) -> bool {
        self == Visited::Visited
    }

    /// Whether the operation is permanently excluded.
    pub fn is_rejected(self) -> bool {
        self == Visited::Rejected
    }

    /// Marks the start of a traversal.
    pub fn start(&mut self) {
        if matches!(self, Visited::None | Visited::Visited) {
            *self = Visited::Started;
        }
    }

    /// Marks the operation consumed.
    pub fn visit(&mut self) {
        if matches!(self, Visited::None) {
            *self = Visited::Visited;
        }
    }

    /// Marks the operation's ring closed.
    pub fn finish(&mut self) {
        if !self.is_rejected() {
            *self = Visited::Finished;
        }
    }

    /// Permanently excludes the operation.
    pub fn reject(&mut self) {
        *self = Visited::Rejected;
    }

    /// Clears the visit state, keeping rejections.
    pub fn reset(&mut self) {
        if !self.is_rejected() {
            *self = Visited::None;
        }
    }
}

/// Links from an operation to the next turn, filled in by enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Next turn reached by walking forward along the operation's segment,
    /// `None` if no other turn lies on the segment past this one.
    pub next_ip_index: Option<usize>,
    /// Turn reached when continuing past the segment's end along the ring.
    pub travels_to_ip_index: Option<usize>,
    /// Last ring vertex passed on the way to `travels_to_ip_index`.
    pub travels_to_vertex_index: Option<usize>,
}

/// One operand's half of a turn.
#[derive(Debug, Clone)]
pub struct TurnOperation<N> {
    /// What taking this operation means for the boolean results.
    pub kind: OperationKind,
    /// Segment of this operand entering the turn.
    pub seg_id: SegmentId,
    /// Segment of the other operand participating in the turn.
    pub other_id: SegmentId,
    /// Parametric position of the turn along `seg_id`.
    pub fraction: N,
    /// Distance from the turn to the end point of `seg_id`, used to break
    /// ties between collinear continuations.
    pub remaining_distance: N,
    /// Forward links along the ring.
    pub enriched: Enrichment,
    /// Traversal state.
    pub visited: Visited,
}

impl<N: num_traits::Zero> TurnOperation<N> {
    /// Creates a new operation in the initial visit state.
    pub fn new(kind: OperationKind, seg_id: SegmentId, other_id: SegmentId, fraction: N) -> Self {
        Self {
            kind,
            seg_id,
            other_id,
            fraction,
            remaining_distance: N::zero(),
            enriched: Enrichment::default(),
            visited: Visited::default(),
        }
    }
}

/// A point where the boundaries of the two operands interact.
#[derive(Debug, Clone)]
pub struct Turn<P: CartesianPoint2d> {
    /// Location of the interaction.
    pub point: P,
    /// Exactly two operations: index 0 for the first operand, 1 for the
    /// second.
    pub operations: [TurnOperation<P::Num>; 2],
    /// How the segments meet.
    pub method: TurnMethod,
    /// Artifact turns are never chosen as traversal starts or steps.
    pub discarded: bool,
    /// Index into the cluster list if this turn's point coincides with other
    /// turns' points.
    pub cluster_id: Option<usize>,
    /// Whether this turn may serve as a traversal starting point.
    pub selectable_start: bool,
}

impl<P: CartesianPoint2d> Turn<P> {
    /// Creates a new turn.
    pub fn new(
        point: P,
        method: TurnMethod,
        operations: [TurnOperation<P::Num>; 2],
    ) -> Self {
        let inert = operations
            .iter()
            .all(|op| matches!(op.kind, OperationKind::None));
        let selectable = !inert
            && operations.iter().any(|op| {
                matches!(
                    op.kind,
                    OperationKind::Union | OperationKind::Intersection | OperationKind::Continue
                )
            });
        Self {
            point,
            operations,
            method,
            discarded: inert,
            cluster_id: None,
            selectable_start: selectable,
        }
    }

    /// Whether both operations are of the given kind.
    pub fn both(&self, kind: OperationKind) -> bool {
        self.operations.iter().all(|op| op.kind == kind)
    }

    /// Whether at least one operation is of the given kind.
    pub fn any(&self, kind: OperationKind) -> bool {
        self.operations.iter().any(|op| op.kind == kind)
    }
}
