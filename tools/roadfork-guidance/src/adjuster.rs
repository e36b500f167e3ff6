//! Perceived-angle adjustment for roads joining a merged pair downstream.
//!
//! A road that forks into two carriageways a few metres after the
//! intersection carries an exaggerated turn angle at the fork mouth. When
//! the downstream intersection admits a u-turn merge, the road is rotated
//! towards where a driver perceives it to run.

use crate::builder::IntersectionBuilder;
use crate::geo::{angular_deviation, haversine_distance};
use crate::graph::NodeId;
use crate::intersection::{ConnectedRoad, Intersection};

/// Joins further away than this leave the perceived angle alone
pub const SHORT_JOIN_DISTANCE_M: f64 = 30.0;

/// Deviation below which a turn reads as "no turn"; used as the clamp
/// buffer so an offset never pushes a road onto its neighbour
pub const MAXIMAL_ALLOWED_NO_TURN_DEVIATION: f64 = 3.0;

fn adjust_angle(angle: f64, offset: f64) -> f64 {
    let adjusted = angle + offset;
    if adjusted > 360.0 {
        adjusted - 360.0
    } else if adjusted < 0.0 {
        adjusted + 360.0
    } else {
        adjusted
    }
}

fn offset_between(lhs: &ConnectedRoad, rhs: &ConnectedRoad) -> f64 {
    0.5 * angular_deviation(lhs.turn.angle, rhs.turn.angle)
}

/// Limit an offset to at most half the angular distance to the next road in
/// the offset direction
fn corrected_offset(
    offset: f64,
    road: &ConnectedRoad,
    next_road_in_offset_direction: &ConnectedRoad,
) -> f64 {
    let offset_limit =
        angular_deviation(road.turn.angle, next_road_in_offset_direction.turn.angle);
    if offset + MAXIMAL_ALLOWED_NO_TURN_DEVIATION > offset_limit {
        0.5 * offset_limit
    } else {
        offset
    }
}

impl IntersectionBuilder<'_> {
    /// Rotate roads whose next intersection (within 30 m) admits a u-turn
    /// merge, so angles reflect post-merge perception. The u-turn itself is
    /// never adjusted.
    pub fn adjust_for_joining_roads(
        &self,
        node_at_intersection: NodeId,
        mut intersection: Intersection,
    ) -> Intersection {
        // nothing to do for dead ends
        if intersection.len() <= 1 {
            return intersection;
        }

        let coordinate_at_intersection = self.extractor.node_coordinate(node_at_intersection);

        for index in 1..intersection.len() {
            let road = intersection[index];
            let next_intersection =
                self.connected_roads(node_at_intersection, road.turn.eid);
            if next_intersection.len() <= 1 {
                continue;
            }

            let node_at_next_intersection = self.graph.target(road.turn.eid);
            let coordinate_at_next =
                self.extractor.node_coordinate(node_at_next_intersection);
            if haversine_distance(coordinate_at_intersection, coordinate_at_next)
                > SHORT_JOIN_DISTANCE_M
            {
                continue;
            }
            if self.graph.out_degree(node_at_next_intersection) <= 1 {
                continue;
            }

            let next_len = next_intersection.len();
            if self.can_merge(node_at_next_intersection, &next_intersection, 0, 1) {
                // the downstream merge folds to the right, so this road is
                // perceived further to the left
                let offset = offset_between(&next_intersection[0], &next_intersection[1]);
                let right_neighbour = intersection[(index + 1) % intersection.len()];
                let corrected = corrected_offset(offset, &road, &right_neighbour);

                let road = &mut intersection[index];
                road.turn.angle = adjust_angle(road.turn.angle, corrected);
                road.turn.bearing = adjust_angle(road.turn.bearing, corrected);
            } else if self.can_merge(
                node_at_next_intersection,
                &next_intersection,
                0,
                next_len - 1,
            ) {
                // downstream merge to the left; shift this road to the right
                let offset = offset_between(
                    &next_intersection[0],
                    &next_intersection[next_len - 1],
                );
                let left_neighbour = intersection[index - 1];
                let corrected = corrected_offset(offset, &road, &left_neighbour);

                let road = &mut intersection[index];
                road.turn.angle = adjust_angle(road.turn.angle, -corrected);
                road.turn.bearing = adjust_angle(road.turn.bearing, -corrected);
            }
        }

        intersection
    }
}
