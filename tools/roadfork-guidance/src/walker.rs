//! Road traversal: a walker driven by pluggable selectors and accumulators.
//!
//! The walker recomputes the connected roads at every hop, hands them to an
//! accumulator and lets a selector pick the edge to continue on. It stops
//! when the accumulator declares completion, the selector finds no
//! continuation, or the walk arrives back at its origin.

use crate::builder::IntersectionBuilder;
use crate::coordinates::CoordinateExtractor;
use crate::geo::{angular_deviation, Coordinate, STRAIGHT_ANGLE};
use crate::graph::{EdgeId, NameId, NodeBasedGraph, NodeId, EMPTY_NAME, SPECIAL_EDGE};
use crate::intersection::Intersection;

/// Absorbs per-hop state during a traversal
pub trait Accumulate {
    fn update(&mut self, from_node: NodeId, via_edge: EdgeId, intersection: &Intersection);
    fn is_done(&self) -> bool;
}

/// Picks the road to continue on, as an index into the intersection
pub trait SelectRoad {
    fn select(
        &self,
        from_node: NodeId,
        via_edge: EdgeId,
        intersection: &Intersection,
        graph: &NodeBasedGraph,
    ) -> Option<usize>;
}

pub struct GraphWalker<'a> {
    graph: &'a NodeBasedGraph,
    builder: &'a IntersectionBuilder<'a>,
}

impl<'a> GraphWalker<'a> {
    pub fn new(graph: &'a NodeBasedGraph, builder: &'a IntersectionBuilder<'a>) -> Self {
        Self { graph, builder }
    }

    pub fn traverse<A: Accumulate, S: SelectRoad>(
        &self,
        origin: NodeId,
        entry_edge: EdgeId,
        accumulator: &mut A,
        selector: &S,
    ) {
        let mut current_node = origin;
        let mut current_edge = entry_edge;
        loop {
            let intersection = self.builder.connected_roads(current_node, current_edge);
            accumulator.update(current_node, current_edge, &intersection);
            if accumulator.is_done() {
                return;
            }
            let Some(choice) =
                selector.select(current_node, current_edge, &intersection, self.graph)
            else {
                return;
            };
            current_node = self.graph.target(current_edge);
            current_edge = intersection[choice].turn.eid;
            if current_node == origin {
                return;
            }
        }
    }
}

/// Follows the straightest road carrying a given name. Exact-name matches
/// win; anonymous roads are only eligible as a fallback, and not at all when
/// `ignore_unnamed` is set. The u-turn entry is never followed.
pub struct StraightNameSelector {
    name_id: NameId,
    ignore_unnamed: bool,
}

impl StraightNameSelector {
    pub fn new(name_id: NameId, ignore_unnamed: bool) -> Self {
        Self {
            name_id,
            ignore_unnamed,
        }
    }
}

impl SelectRoad for StraightNameSelector {
    fn select(
        &self,
        _from_node: NodeId,
        _via_edge: EdgeId,
        intersection: &Intersection,
        graph: &NodeBasedGraph,
    ) -> Option<usize> {
        let by_name = |wanted: NameId| {
            intersection
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, road)| graph.edge_data(road.turn.eid).name_id == wanted)
                .min_by(|(_, a), (_, b)| {
                    angular_deviation(a.turn.angle, STRAIGHT_ANGLE)
                        .total_cmp(&angular_deviation(b.turn.angle, STRAIGHT_ANGLE))
                })
                .map(|(index, _)| index)
        };

        if let Some(index) = by_name(self.name_id) {
            return Some(index);
        }
        if self.ignore_unnamed || self.name_id == EMPTY_NAME {
            return None;
        }
        by_name(EMPTY_NAME)
    }
}

/// Remembers the most recent intersection of a walk; done once the walk
/// reaches a junction with more than two roads or the hop budget runs out.
pub struct IntersectionFinderAccumulator {
    hops_remaining: u32,
    pub intersection: Intersection,
    pub via_edge: EdgeId,
}

impl IntersectionFinderAccumulator {
    pub fn new(hop_budget: u32) -> Self {
        Self {
            hops_remaining: hop_budget,
            intersection: Intersection::default(),
            via_edge: SPECIAL_EDGE,
        }
    }
}

impl Accumulate for IntersectionFinderAccumulator {
    fn update(&mut self, _from_node: NodeId, via_edge: EdgeId, intersection: &Intersection) {
        self.hops_remaining = self.hops_remaining.saturating_sub(1);
        self.intersection = intersection.clone();
        self.via_edge = via_edge;
    }

    fn is_done(&self) -> bool {
        self.hops_remaining == 0 || self.intersection.len() > 2
    }
}

/// Collects shape coordinates along the walk until a length budget is spent
pub struct LengthLimitedCoordinateAccumulator<'a> {
    extractor: &'a CoordinateExtractor,
    max_length_m: f64,
    accumulated_m: f64,
    pub coordinates: Vec<Coordinate>,
}

impl<'a> LengthLimitedCoordinateAccumulator<'a> {
    pub fn new(extractor: &'a CoordinateExtractor, max_length_m: f64) -> Self {
        Self {
            extractor,
            max_length_m,
            accumulated_m: 0.0,
            coordinates: Vec::new(),
        }
    }
}

impl Accumulate for LengthLimitedCoordinateAccumulator<'_> {
    fn update(&mut self, _from_node: NodeId, via_edge: EdgeId, _intersection: &Intersection) {
        let geometry = self.extractor.forward_coordinates(via_edge);
        let remaining = self.max_length_m - self.accumulated_m;
        let mut trimmed = CoordinateExtractor::trim_to_length(geometry, remaining);
        self.accumulated_m += CoordinateExtractor::polyline_length(&trimmed);

        // drop the duplicated joint coordinate between consecutive edges
        if let (Some(last), Some(first)) = (self.coordinates.last(), trimmed.first()) {
            if last == first {
                trimmed.remove(0);
            }
        }
        self.coordinates.extend(trimmed);
    }

    fn is_done(&self) -> bool {
        // trimming re-measures the cut segment, so allow for float error
        self.accumulated_m >= self.max_length_m - 1e-6
    }
}
