//! Coordinate and angle arithmetic for intersection geometry.
//!
//! Angles follow the turn convention: 0 is a u-turn back onto the arrival
//! road, 180 is straight ahead, 90 a sharp right, 270 a sharp left. Bearings
//! are compass bearings, 0 = North. Both live in `[0, 360)`.

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

pub const STRAIGHT_ANGLE: f64 = 180.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance between two points in meters
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let p1 = Point::new(from.lon, from.lat);
    let p2 = Point::new(to.lon, to.lat);
    p1.haversine_distance(&p2)
}

/// Compass bearing from `from` towards `to` in degrees, 0 = North
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    normalize_angle(y.atan2(x).to_degrees())
}

/// Turn angle at `via` between the road towards `first` and the road towards
/// `third`, in `[0, 360)`. `first` lies on the incoming side, so identical
/// `first` and `third` mean a u-turn (angle 0).
pub fn compute_angle(first: Coordinate, via: Coordinate, third: Coordinate) -> f64 {
    // equirectangular scaling keeps local angles usable at high latitudes
    let scale = via.lat.to_radians().cos();
    let v1x = (first.lon - via.lon) * scale;
    let v1y = first.lat - via.lat;
    let v2x = (third.lon - via.lon) * scale;
    let v2y = third.lat - via.lat;

    normalize_angle((v2y.atan2(v2x) - v1y.atan2(v1x)).to_degrees())
}

/// Fold an angle into `[0, 360)`
pub fn normalize_angle(angle: f64) -> f64 {
    let folded = angle % 360.0;
    if folded < 0.0 {
        // adding 360 to a tiny negative rounds up to exactly 360.0
        let wrapped = folded + 360.0;
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    } else {
        folded
    }
}

/// Cyclic distance between two angles, in `[0, 180]`
pub fn angular_deviation(lhs: f64, rhs: f64) -> f64 {
    let diff = (lhs - rhs).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Midpoint of the shorter arc between two angles. For exactly opposite
/// angles the clockwise midpoint seen from `lhs` is returned.
pub fn angle_between(lhs: f64, rhs: f64) -> f64 {
    let clockwise = (rhs - lhs).rem_euclid(360.0);
    if clockwise <= 180.0 {
        normalize_angle(lhs + clockwise / 2.0)
    } else {
        normalize_angle(lhs - (360.0 - clockwise) / 2.0)
    }
}

/// Mean lateral deviation between two polylines sampled at equal arc-length
/// spacing. Samples are paired up by index, so both series must start at the
/// same intersection.
pub fn are_parallel(lhs: &[Coordinate], rhs: &[Coordinate], max_deviation_m: f64) -> bool {
    let shared = lhs.len().min(rhs.len());
    if shared == 0 {
        return false;
    }
    let total: f64 = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(l, r)| haversine_distance(*l, *r))
        .sum();
    total / shared as f64 <= max_deviation_m
}
