//! Coordinate extraction along edge geometry.
//!
//! Turn angles computed from the node coordinates alone are hostage to the
//! last metre of mapped geometry. The extractor therefore anchors angle
//! computation a lane-dependent distance away from the intersection and
//! offers equidistant resampling for the parallelism heuristics.

use crate::geo::{haversine_distance, Coordinate};
use crate::graph::{EdgeId, NodeId};

/// Assumed width of a single lane in meters
pub const ASSUMED_LANE_WIDTH_M: f64 = 3.25;

/// Base lookahead for angle anchors; one lane width is added per lane
pub const LOOKAHEAD_BASE_M: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct CoordinateExtractor {
    node_coordinates: Vec<Coordinate>,
    /// Per directed edge, the full shape from edge source to edge target
    edge_geometry: Vec<Vec<Coordinate>>,
}

impl CoordinateExtractor {
    pub fn new(node_coordinates: Vec<Coordinate>, edge_geometry: Vec<Vec<Coordinate>>) -> Self {
        Self {
            node_coordinates,
            edge_geometry,
        }
    }

    pub fn node_coordinate(&self, node: NodeId) -> Coordinate {
        self.node_coordinates[node as usize]
    }

    /// Anchor coordinate for angle computation: the point on `edge` at a
    /// lane-dependent distance from the intersection-side endpoint. With
    /// `invert` the edge is walked backwards from its target (the incoming
    /// side of a turn), otherwise forwards from its source. Short edges
    /// clamp to the far endpoint, `other_end`.
    pub fn coordinate_along_road(
        &self,
        _origin: NodeId,
        edge: EdgeId,
        invert: bool,
        other_end: NodeId,
        lanes: u8,
    ) -> Coordinate {
        let lookahead = LOOKAHEAD_BASE_M + ASSUMED_LANE_WIDTH_M * lanes as f64;
        let geometry = &self.edge_geometry[edge as usize];
        if geometry.len() < 2 {
            return self.node_coordinate(other_end);
        }
        if invert {
            let backwards: Vec<Coordinate> = geometry.iter().rev().copied().collect();
            interpolate_along(&backwards, lookahead)
        } else {
            interpolate_along(geometry, lookahead)
        }
    }

    /// Full shape of `edge` in travel direction
    pub fn forward_coordinates(&self, edge: EdgeId) -> &[Coordinate] {
        &self.edge_geometry[edge as usize]
    }

    /// Equidistant samples every `spacing_m` along `coords`, up to
    /// `max_length_m` of accumulated arc length. The first coordinate is
    /// always included.
    pub fn sample_coordinates(
        coords: &[Coordinate],
        max_length_m: f64,
        spacing_m: f64,
    ) -> Vec<Coordinate> {
        let mut samples = Vec::new();
        let Some(&first) = coords.first() else {
            return samples;
        };
        samples.push(first);

        let mut next_sample_at = spacing_m;
        let mut walked = 0.0;
        for pair in coords.windows(2) {
            let segment = haversine_distance(pair[0], pair[1]);
            if segment <= f64::EPSILON {
                continue;
            }
            while next_sample_at <= walked + segment {
                if next_sample_at > max_length_m {
                    return samples;
                }
                let fraction = (next_sample_at - walked) / segment;
                samples.push(lerp(pair[0], pair[1], fraction));
                next_sample_at += spacing_m;
            }
            walked += segment;
        }
        samples
    }

    /// Arc length of a polyline in meters
    pub fn polyline_length(coords: &[Coordinate]) -> f64 {
        coords
            .windows(2)
            .map(|pair| haversine_distance(pair[0], pair[1]))
            .sum()
    }

    /// Prefix of `coords` trimmed to at most `max_length_m` of arc length,
    /// ending in an interpolated point when the limit cuts a segment.
    pub fn trim_to_length(coords: &[Coordinate], max_length_m: f64) -> Vec<Coordinate> {
        let mut trimmed = Vec::new();
        let Some(&first) = coords.first() else {
            return trimmed;
        };
        trimmed.push(first);

        let mut walked = 0.0;
        for pair in coords.windows(2) {
            let segment = haversine_distance(pair[0], pair[1]);
            if walked + segment >= max_length_m {
                let remaining = max_length_m - walked;
                if segment > f64::EPSILON && remaining > f64::EPSILON {
                    trimmed.push(lerp(pair[0], pair[1], remaining / segment));
                }
                return trimmed;
            }
            trimmed.push(pair[1]);
            walked += segment;
        }
        trimmed
    }
}

/// Point at `distance_m` along the polyline, clamped to its far end
fn interpolate_along(coords: &[Coordinate], distance_m: f64) -> Coordinate {
    let mut walked = 0.0;
    for pair in coords.windows(2) {
        let segment = haversine_distance(pair[0], pair[1]);
        if walked + segment >= distance_m && segment > f64::EPSILON {
            return lerp(pair[0], pair[1], (distance_m - walked) / segment);
        }
        walked += segment;
    }
    *coords.last().expect("polyline has at least two points")
}

fn lerp(from: Coordinate, to: Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        from.lat + (to.lat - from.lat) * fraction,
        from.lon + (to.lon - from.lon) * fraction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ~111 m per 0.001 degree at the equator
    const DEG_100M: f64 = 0.0009;

    fn straight_east(length_deg: f64) -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, length_deg),
        ]
    }

    #[test]
    fn anchor_sits_at_the_lane_dependent_lookahead() {
        let geometry = straight_east(DEG_100M);
        let extractor = CoordinateExtractor::new(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, DEG_100M)],
            vec![geometry],
        );

        let anchor = extractor.coordinate_along_road(0, 0, false, 1, 1);
        let from_start = haversine_distance(Coordinate::new(0.0, 0.0), anchor);
        assert!((from_start - (LOOKAHEAD_BASE_M + ASSUMED_LANE_WIDTH_M)).abs() < 0.5);

        // inverted: anchored at the target side, walking backwards
        let inverted = extractor.coordinate_along_road(1, 0, true, 0, 1);
        let from_end = haversine_distance(Coordinate::new(0.0, DEG_100M), inverted);
        assert!((from_end - (LOOKAHEAD_BASE_M + ASSUMED_LANE_WIDTH_M)).abs() < 0.5);
    }

    #[test]
    fn short_edges_clamp_to_the_far_endpoint() {
        let geometry = straight_east(0.00005);
        let extractor = CoordinateExtractor::new(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.00005)],
            vec![geometry],
        );
        let anchor = extractor.coordinate_along_road(0, 0, false, 1, 1);
        assert!((anchor.lon - 0.00005).abs() < 1e-12);
    }

    #[test]
    fn sampling_is_equidistant() {
        let samples =
            CoordinateExtractor::sample_coordinates(&straight_east(DEG_100M), 100.0, 5.0);
        // 100 m of geometry at 5 m spacing: the start plus 20 samples
        assert_eq!(samples.len(), 21);
        for pair in samples.windows(2) {
            let spacing = haversine_distance(pair[0], pair[1]);
            assert!((spacing - 5.0).abs() < 0.1, "spacing {spacing}");
        }
    }

    #[test]
    fn sampling_respects_the_window() {
        let samples =
            CoordinateExtractor::sample_coordinates(&straight_east(4.0 * DEG_100M), 100.0, 5.0);
        assert_eq!(samples.len(), 21);
    }

    #[test]
    fn trimming_interpolates_the_cut() {
        let trimmed = CoordinateExtractor::trim_to_length(&straight_east(DEG_100M), 40.0);
        let length = CoordinateExtractor::polyline_length(&trimmed);
        assert!((length - 40.0).abs() < 0.1, "length {length}");
    }
}
