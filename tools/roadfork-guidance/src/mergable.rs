//! Mergeability heuristics for segregated carriageways.
//!
//! Two entries of an intersection may be folded into one road when they are
//! the opposite-direction halves of the same physical street. The decision
//! stacks several guards; the geometric core is the sampled-parallelism
//! test. The narrow-triangle and connect-again probes are kept callable but
//! disabled in the dispatcher, pending evaluation on real-world junctions.

use crate::coordinates::{CoordinateExtractor, ASSUMED_LANE_WIDTH_M};
use crate::geo::{angular_deviation, haversine_distance, STRAIGHT_ANGLE};
use crate::graph::{EdgeData, EdgeId, NodeId, EMPTY_NAME, SPECIAL_NODE};
use crate::intersection::{ConnectedRoad, Intersection};
use crate::names::requires_name_announced;
use crate::builder::IntersectionBuilder;
use crate::walker::{
    GraphWalker, IntersectionFinderAccumulator, LengthLimitedCoordinateAccumulator,
    StraightNameSelector,
};

pub const MERGE_ANGLE_LIMIT: f64 = 60.0;
pub const NARROW_TURN_ANGLE: f64 = 35.0;

/// Coordinate window and spacing of the parallelism sampling
pub const SAME_DIRECTION_WINDOW_M: f64 = 100.0;
pub const SAMPLE_SPACING_M: f64 = 5.0;
pub const MIN_PARALLEL_SAMPLES: usize = 8;
pub const PARALLEL_TOLERANCE_COEFF: f64 = 4.0;

const TRIANGLE_HOP_BUDGET: u32 = 5;
const CONNECT_AGAIN_HOP_BUDGET: usize = 10;

// Alternative direction probes, disabled pending evaluation on real-world
// junctions. The predicates stay callable on their own.
const USE_NARROW_TRIANGLE: bool = false;
const USE_CONNECT_AGAIN: bool = false;

/// Opposite-direction halves of one street: one edge reversed, one not,
/// same travel mode, same classification.
pub fn have_compatible_road_data(lhs: &EdgeData, rhs: &EdgeData) -> bool {
    lhs.reversed != rhs.reversed
        && lhs.travel_mode == rhs.travel_mode
        && lhs.classification == rhs.classification
}

impl IntersectionBuilder<'_> {
    /// Whether two entries of `intersection` represent the same physical
    /// street and may be merged.
    pub fn can_merge(
        &self,
        node_at_intersection: NodeId,
        intersection: &Intersection,
        first_index: usize,
        second_index: usize,
    ) -> bool {
        // degree two is a bollard or a compression artefact, not a dual
        // carriageway
        if intersection.len() <= 2 {
            return false;
        }

        let first_data = self.graph.edge_data(intersection[first_index].turn.eid);
        let second_data = self.graph.edge_data(intersection[second_index].turn.eid);

        if first_data.name_id == EMPTY_NAME || second_data.name_id == EMPTY_NAME {
            return false;
        }
        if requires_name_announced(
            first_data.name_id,
            second_data.name_id,
            self.names,
            self.suffixes,
        ) {
            return false;
        }

        self.can_merge_road(
            node_at_intersection,
            &intersection[first_index],
            &intersection[second_index],
        )
    }

    fn can_merge_road(
        &self,
        node_at_intersection: NodeId,
        lhs: &ConnectedRoad,
        rhs: &ConnectedRoad,
    ) -> bool {
        let lhs_data = self.graph.edge_data(lhs.turn.eid);
        let rhs_data = self.graph.edge_data(rhs.turn.eid);

        // roundabouts are special; hiding one of their arms is never safe
        if lhs_data.roundabout || rhs_data.roundabout {
            return false;
        }

        // two enterable roads are a real fork, merging would hide a choice
        if lhs.entry_allowed && rhs.entry_allowed {
            return false;
        }

        if !have_compatible_road_data(lhs_data, rhs_data) {
            return false;
        }

        if angular_deviation(lhs.turn.angle, rhs.turn.angle) > MERGE_ANGLE_LIMIT {
            return false;
        }

        if USE_NARROW_TRIANGLE && self.is_narrow_triangle(node_at_intersection, lhs, rhs) {
            return true;
        }

        if self.have_same_direction(node_at_intersection, lhs, rhs) {
            return true;
        }

        if USE_CONNECT_AGAIN && self.connect_again(node_at_intersection, lhs, rhs) {
            return true;
        }

        false
    }

    /// Sampled-parallelism test: both roads are walked along their name for
    /// up to 100 m, resampled every 5 m, and compared by mean lateral
    /// deviation. Lane count widens the tolerance.
    pub fn have_same_direction(
        &self,
        node_at_intersection: NodeId,
        lhs: &ConnectedRoad,
        rhs: &ConnectedRoad,
    ) -> bool {
        if angular_deviation(lhs.turn.angle, rhs.turn.angle) > 90.0 {
            return false;
        }

        let walker = GraphWalker::new(self.graph, self);
        let coordinates_along = |edge: EdgeId| {
            let mut accumulator =
                LengthLimitedCoordinateAccumulator::new(self.extractor, SAME_DIRECTION_WINDOW_M);
            let selector =
                StraightNameSelector::new(self.graph.edge_data(edge).name_id, false);
            walker.traverse(node_at_intersection, edge, &mut accumulator, &selector);
            CoordinateExtractor::sample_coordinates(
                &accumulator.coordinates,
                SAME_DIRECTION_WINDOW_M,
                SAMPLE_SPACING_M,
            )
        };

        let coordinates_to_the_left = coordinates_along(lhs.turn.eid);
        let coordinates_to_the_right = coordinates_along(rhs.turn.eid);

        // below eight samples (35 m of road) the comparison says nothing
        if coordinates_to_the_left.len() < MIN_PARALLEL_SAMPLES
            || coordinates_to_the_right.len() < MIN_PARALLEL_SAMPLES
        {
            return false;
        }

        let lanes = |road: &ConnectedRoad| {
            self.graph.edge_data(road.turn.eid).classification.lanes
        };
        let lane_count = lanes(lhs).max(lanes(rhs)).max(2);
        let max_deviation = PARALLEL_TOLERANCE_COEFF * f64::from(lane_count).sqrt();

        crate::geo::are_parallel(
            &coordinates_to_the_left,
            &coordinates_to_the_right,
            max_deviation,
        )
    }

    /// Narrow-triangle test: both arms are walked a few hops; if the left
    /// arm offers a rightward connector that reaches the right arm's
    /// endpoint within a lane-scaled gap, the arms form the mouth of a
    /// single street.
    pub fn is_narrow_triangle(
        &self,
        node_at_intersection: NodeId,
        lhs: &ConnectedRoad,
        rhs: &ConnectedRoad,
    ) -> bool {
        let walker = GraphWalker::new(self.graph, self);
        let selector =
            StraightNameSelector::new(self.graph.edge_data(lhs.turn.eid).name_id, false);

        let mut left = IntersectionFinderAccumulator::new(TRIANGLE_HOP_BUDGET);
        let mut right = IntersectionFinderAccumulator::new(TRIANGLE_HOP_BUDGET);
        walker.traverse(node_at_intersection, lhs.turn.eid, &mut left, &selector);
        walker.traverse(node_at_intersection, rhs.turn.eid, &mut right, &selector);

        if left.intersection.is_empty() || right.intersection.is_empty() {
            return false;
        }

        let Some(connector) = left.intersection.find_closest_turn(90.0) else {
            return false;
        };
        // the connector has to head somewhat to the right
        if angular_deviation(connector.turn.angle, 90.0) > NARROW_TURN_ANGLE {
            return false;
        }

        let assumed_lane_width =
            0.5 * f64::from(self.graph.lane_count_at(node_at_intersection)) * ASSUMED_LANE_WIDTH_M;
        let left_end = self
            .extractor
            .node_coordinate(self.graph.target(left.via_edge));
        let right_end = self
            .extractor
            .node_coordinate(self.graph.target(right.via_edge));
        if haversine_distance(left_end, right_end) > 2.0 * assumed_lane_width + 8.0 {
            return false;
        }

        let mut connect = IntersectionFinderAccumulator::new(TRIANGLE_HOP_BUDGET);
        walker.traverse(
            self.graph.target(left.via_edge),
            connector.turn.eid,
            &mut connect,
            &selector,
        );
        self.graph.target(connect.via_edge) == self.graph.target(right.via_edge)
    }

    /// Connect-again test: walk both arms up to ten intersections looking
    /// for a node where the street name shows up on at least two roads;
    /// merge is allowed when both walks converge on the same node.
    pub fn connect_again(
        &self,
        node_at_intersection: NodeId,
        lhs: &ConnectedRoad,
        rhs: &ConnectedRoad,
    ) -> bool {
        let meet_up_candidate = |road: &ConnectedRoad| -> NodeId {
            let searched_name = self.graph.edge_data(road.turn.eid).name_id;
            let has_name = |candidate: &ConnectedRoad| {
                self.graph.edge_data(candidate.turn.eid).name_id == searched_name
            };

            let mut current_node = node_at_intersection;
            let mut current_eid = road.turn.eid;
            for _ in 0..CONNECT_AGAIN_HOP_BUDGET {
                let next_intersection = self.connected_roads(current_node, current_eid);
                let count = next_intersection.iter().skip(1).filter(|r| has_name(r)).count();

                if count >= 2 {
                    return self.graph.target(current_eid);
                }
                if count == 0 {
                    return SPECIAL_NODE;
                }

                current_node = self.graph.target(current_eid);
                if next_intersection.len() == 2 {
                    // skip over bridges and similar compression artefacts
                    current_eid = next_intersection[1].turn.eid;
                } else {
                    let Some(next_turn) =
                        next_intersection.iter().skip(1).find(|r| has_name(r))
                    else {
                        return SPECIAL_NODE;
                    };
                    if angular_deviation(next_turn.turn.angle, STRAIGHT_ANGLE)
                        > NARROW_TURN_ANGLE
                    {
                        return current_node;
                    }
                    current_eid = next_turn.turn.eid;
                }
            }
            SPECIAL_NODE
        };

        let left_candidate = meet_up_candidate(lhs);
        let right_candidate = meet_up_candidate(rhs);

        left_candidate == right_candidate
            && left_candidate != SPECIAL_NODE
            && left_candidate != node_at_intersection
    }
}
