//! Connected-roads construction: the raw intersection model.
//!
//! For an arrival `from_node --via_edge--> turn_node` the builder lists
//! every edge adjacent to `turn_node`, reversed placeholders included; those
//! placeholders are needed to capture the shape of incoming one-ways even
//! though they are never valid turns. The result is sorted by angle with the
//! u-turn pinned at slot 0.

use rustc_hash::FxHashSet;

use crate::coordinates::CoordinateExtractor;
use crate::geo::{bearing, compute_angle};
use crate::geojson::GeojsonSink;
use crate::graph::{EdgeId, NodeBasedGraph, NodeId, SPECIAL_EDGE};
use crate::intersection::{ConnectedRoad, Intersection, TurnOperation};
use crate::names::{NameTable, SuffixTable};
use crate::restrictions::RestrictionMap;

pub struct IntersectionBuilder<'a> {
    pub(crate) graph: &'a NodeBasedGraph,
    pub(crate) extractor: &'a CoordinateExtractor,
    pub(crate) restrictions: &'a RestrictionMap,
    pub(crate) barriers: &'a FxHashSet<NodeId>,
    pub(crate) names: &'a NameTable,
    pub(crate) suffixes: &'a SuffixTable,
    pub(crate) debug_sink: Option<&'a GeojsonSink>,
}

impl<'a> IntersectionBuilder<'a> {
    pub fn new(
        graph: &'a NodeBasedGraph,
        extractor: &'a CoordinateExtractor,
        restrictions: &'a RestrictionMap,
        barriers: &'a FxHashSet<NodeId>,
        names: &'a NameTable,
        suffixes: &'a SuffixTable,
    ) -> Self {
        Self {
            graph,
            extractor,
            restrictions,
            barriers,
            names,
            suffixes,
            debug_sink: None,
        }
    }

    /// Attach a best-effort geojson sink receiving a snapshot whenever a
    /// segregated merge fires
    pub fn with_debug_sink(mut self, sink: &'a GeojsonSink) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn coordinate_extractor(&self) -> &CoordinateExtractor {
        self.extractor
    }

    /// The full intersection model for one arrival edge: raw connected
    /// roads, segregated carriageways merged, joining roads adjusted.
    pub fn intersection(&self, from_node: NodeId, via_edge: EdgeId) -> Intersection {
        let raw = self.connected_roads(from_node, via_edge);
        let turn_node = self.graph.target(via_edge);
        self.adjust_for_joining_roads(turn_node, self.merge_segregated_roads(turn_node, raw))
    }

    /// All roads connected to the target of `via_edge`, with angle, bearing
    /// and turn validity, sorted by angle. Reversed edges appear with
    /// `entry_allowed = false`; a synthetic u-turn is appended when no
    /// physical reverse edge exists.
    pub fn connected_roads(&self, from_node: NodeId, via_edge: EdgeId) -> Intersection {
        let mut intersection = Intersection::default();
        let turn_node = self.graph.target(via_edge);

        // An only-restriction whose target is not reachable from here is
        // ignored; refusing every turn over a broken relation would cut the
        // road network apart.
        let only_turn_to = self
            .restrictions
            .only_turn_target(from_node, turn_node)
            .filter(|&target| {
                self.graph
                    .adjacent_edges(turn_node)
                    .any(|edge| self.graph.target(edge) == target)
            });

        let is_barrier = self.barriers.contains(&turn_node);
        let turn_coordinate = self.extractor.node_coordinate(turn_node);
        let intersection_lanes = self.graph.lane_count_at(turn_node);

        let first_coordinate = self.extractor.coordinate_along_road(
            from_node,
            via_edge,
            true,
            turn_node,
            intersection_lanes,
        );

        let mut has_uturn_edge = false;
        let mut uturn_could_be_valid = false;

        for onto_edge in self.graph.adjacent_edges(turn_node) {
            let to_node = self.graph.target(onto_edge);
            let onto_data = self.graph.edge_data(onto_edge);

            let mut turn_is_valid = !onto_data.reversed
                && (!is_barrier || from_node == to_node)
                && only_turn_to.map_or(true, |target| target == to_node)
                && !self.restrictions.is_restricted(from_node, turn_node, to_node);

            let angle;
            let road_bearing;
            if to_node == from_node {
                road_bearing = bearing(turn_coordinate, first_coordinate);
                angle = 0.0;
                uturn_could_be_valid = turn_is_valid;
                if turn_is_valid && !is_barrier && self.graph.out_degree(turn_node) > 1 {
                    // u-turns are only offered at dead ends: more than one
                    // road emitting traffic means there is somewhere else
                    // to go
                    let emitting_bidirectional = self
                        .graph
                        .adjacent_edges(turn_node)
                        .filter(|&edge| {
                            let reverse = self
                                .graph
                                .find_edge(self.graph.target(edge), turn_node);
                            debug_assert_ne!(reverse, SPECIAL_EDGE);
                            reverse != SPECIAL_EDGE && !self.graph.edge_data(reverse).reversed
                        })
                        .count();
                    turn_is_valid = emitting_bidirectional <= 1;
                }
                has_uturn_edge = true;
            } else {
                let third_coordinate = self.extractor.coordinate_along_road(
                    turn_node,
                    onto_edge,
                    false,
                    to_node,
                    intersection_lanes,
                );
                angle = compute_angle(first_coordinate, turn_coordinate, third_coordinate);
                road_bearing = bearing(turn_coordinate, third_coordinate);
                if angle.abs() < f64::EPSILON {
                    has_uturn_edge = true;
                }
            }

            intersection.push(ConnectedRoad {
                turn: TurnOperation {
                    eid: onto_edge,
                    angle,
                    bearing: road_bearing,
                },
                entry_allowed: turn_is_valid,
            });
        }

        // A street leading into nothingness: add an artificial u-turn so
        // slot 0 exists for every caller.
        if !has_uturn_edge {
            let lanes = self.graph.edge_data(via_edge).classification.lanes;
            let first =
                self.extractor
                    .coordinate_along_road(from_node, via_edge, true, turn_node, lanes);
            intersection.push(ConnectedRoad {
                turn: TurnOperation {
                    eid: via_edge,
                    angle: 0.0,
                    bearing: bearing(turn_coordinate, first),
                },
                entry_allowed: false,
            });
        }

        intersection.sort_by_angle();
        debug_assert!(intersection[0].turn.angle < f64::EPSILON);

        if intersection.valid_count() == 0 && uturn_could_be_valid {
            // the u-turn that set the flag is back at slot 0 after sorting;
            // with parallel edges it may sit a step further in
            for road in intersection.iter_mut() {
                if road.turn.angle >= f64::EPSILON {
                    break;
                }
                if self.graph.target(road.turn.eid) == from_node {
                    road.entry_allowed = true;
                    break;
                }
            }
        }

        intersection
    }

    /// Skips over traffic lights and compression artefacts to find the next
    /// real intersection along `via_edge`. Returns the intersection together
    /// with the `(from_node, via_edge)` pair that produced it.
    pub fn next_actual_intersection(
        &self,
        starting_node: NodeId,
        via_edge: EdgeId,
    ) -> (Intersection, NodeId, EdgeId) {
        let mut result = self.connected_roads(starting_node, via_edge);
        let mut node_at_intersection = starting_node;
        let mut incoming_edge = via_edge;

        // arriving here again means we ran a full loop
        let termination_node = self.graph.target(via_edge);

        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        while !visited.contains(&node_at_intersection)
            && result.len() == 2
            && self
                .graph
                .edge_data_compatible(via_edge, result[1].turn.eid)
        {
            visited.insert(node_at_intersection);
            node_at_intersection = self.graph.target(incoming_edge);
            incoming_edge = result[1].turn.eid;
            result = self.connected_roads(node_at_intersection, incoming_edge);

            if termination_node == self.graph.target(incoming_edge) {
                break;
            }
        }

        (result, node_at_intersection, incoming_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::graph::{
        EdgeData, EdgeInput, RoadClass, RoadClassification, TravelMode,
    };

    fn car_edge(reversed: bool) -> EdgeData {
        EdgeData {
            reversed,
            travel_mode: TravelMode::Car,
            roundabout: false,
            name_id: 0,
            classification: RoadClassification {
                class: RoadClass::Residential,
                lanes: 1,
            },
        }
    }

    /// A single one-way edge 0 -> 1 without any reverse edge
    fn street_into_nothingness() -> (NodeBasedGraph, CoordinateExtractor) {
        let nodes = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0009)];
        let edges = [EdgeInput {
            source: 0,
            target: 1,
            data: car_edge(false),
        }];
        let geometry = vec![vec![nodes[0], nodes[1]]];
        (
            NodeBasedGraph::from_sorted_edges(2, &edges),
            CoordinateExtractor::new(nodes, geometry),
        )
    }

    #[test]
    fn nothingness_gets_a_synthetic_uturn() {
        let (graph, extractor) = street_into_nothingness();
        let restrictions = RestrictionMap::default();
        let barriers = FxHashSet::default();
        let names = NameTable::default();
        let suffixes = SuffixTable::default();
        let builder = IntersectionBuilder::new(
            &graph, &extractor, &restrictions, &barriers, &names, &suffixes,
        );

        let intersection = builder.connected_roads(0, 0);
        assert_eq!(intersection.len(), 1);
        assert_eq!(intersection[0].turn.eid, 0);
        assert!(intersection[0].turn.angle.abs() < f64::EPSILON);
        assert!(!intersection[0].entry_allowed);
        // the synthetic entry points back the way we came
        assert!((intersection[0].turn.bearing - 270.0).abs() < 1.0);
    }
}
