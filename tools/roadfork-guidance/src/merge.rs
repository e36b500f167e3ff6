//! Segregated-road merging.
//!
//! Physically separated one-way carriageways of the same street show up as
//! two entries of an intersection with nonsensical turn angles between
//! them. Merging folds each pair into a single logical road. A merge that
//! involves slot 0 moves the perceived arrival direction, so every other
//! angle shifts along with it.

use crate::builder::IntersectionBuilder;
use crate::geo::angle_between;
use crate::graph::{NodeId, SPECIAL_EDGE};
use crate::intersection::{ConnectedRoad, Intersection};

/// Combine two entries: identity comes from the enterable one, geometry is
/// the angular midpoint on the shorter arc.
fn merge_roads(first: &ConnectedRoad, second: &ConnectedRoad) -> ConnectedRoad {
    let mut result = if first.entry_allowed { *first } else { *second };
    result.turn.angle = angle_between(first.turn.angle, second.turn.angle);
    result.turn.bearing = angle_between(first.turn.bearing, second.turn.bearing);
    debug_assert!((0.0..=360.0).contains(&result.turn.angle));
    debug_assert!((0.0..=360.0).contains(&result.turn.bearing));
    result
}

impl IntersectionBuilder<'_> {
    /// Fold segregated carriageways of `intersection` into single roads,
    /// preserving the angle sort and the u-turn-at-slot-0 invariant.
    pub fn merge_segregated_roads(
        &self,
        intersection_node: NodeId,
        mut intersection: Intersection,
    ) -> Intersection {
        if intersection.len() <= 1 {
            return intersection;
        }

        let pre_merge_shape = intersection.clone();
        let mut merged = false;

        let is_connected_to_roundabout = intersection
            .iter()
            .any(|road| self.graph.edge_data(road.turn.eid).roundabout);

        // Merges touching slot 0 first: they move the perceived arrival
        // direction, and with it the reference every other angle was
        // computed against.
        let mut merged_first = false;
        let last = intersection.len() - 1;
        if self.can_merge(intersection_node, &intersection, 0, last) {
            merged = true;
            merged_first = true;
            // the arrival direction moves to the left; right-hand traffic
            // assumed for the side choice
            let correction_factor = (360.0 - intersection[last].turn.angle) / 2.0;
            for index in 1..last {
                intersection[index].turn.angle += correction_factor;
            }
            intersection[0] = merge_roads(&intersection[0], &intersection[last]);
            intersection[0].turn.angle = 0.0;
            intersection.pop();
        } else if self.can_merge(intersection_node, &intersection, 0, 1) {
            merged = true;
            merged_first = true;
            // the arrival direction moves to the right
            let correction_factor = intersection[1].turn.angle / 2.0;
            for index in 2..intersection.len() {
                intersection[index].turn.angle -= correction_factor;
            }
            intersection[0] = merge_roads(&intersection[0], &intersection[1]);
            intersection[0].turn.angle = 0.0;
            intersection.remove(1);
        }

        if merged_first && is_connected_to_roundabout {
            // a u-turn folded against the rotation of a roundabout cannot
            // be driven, relation or no relation
            intersection[0].entry_allowed = false;
        }

        for index in 2..intersection.len() {
            let previous_index = index - 1;
            if intersection[previous_index].turn.eid != SPECIAL_EDGE
                && self.can_merge(intersection_node, &intersection, index, previous_index)
            {
                merged = true;
                intersection[previous_index] =
                    merge_roads(&intersection[previous_index], &intersection[index]);
                intersection[index].turn.eid = SPECIAL_EDGE;
            }
        }

        intersection.retain(|road| road.turn.eid != SPECIAL_EDGE);

        if merged {
            if let Some(sink) = self.debug_sink {
                sink.write_intersection(
                    intersection_node,
                    self.extractor.node_coordinate(intersection_node),
                    pre_merge_shape.iter().map(|road| {
                        (
                            *road,
                            self.extractor
                                .node_coordinate(self.graph.target(road.turn.eid)),
                        )
                    }),
                );
            }
        }

        intersection.sort_by_angle();
        intersection
    }
}
