//! Roadfork-Guidance: intersection model builder for routing preprocessing
//!
//! For any arrival edge into a junction the builder produces an
//! angle-sorted list of outgoing roads, each tagged with turn validity,
//! geometric angle and compass bearing. Three passes run per request:
//! - connected roads: enumerate every adjacent edge with angle, bearing and
//!   turn validity against barriers and restrictions
//! - segregated merge: fold the two carriageways of a physically split
//!   street into a single logical road
//! - joining adjustment: rotate roads that fork into a merged pair shortly
//!   downstream, so angles match driver perception
//!
//! The builder is a pure function over an immutable map bundle; distinct
//! `(from, via)` requests may run in parallel on shared data. The only
//! mutable side channel is the optional geojson debug sink.

pub mod adjuster;
pub mod builder;
pub mod cli;
pub mod coordinates;
pub mod formats;
pub mod geo;
pub mod geojson;
pub mod graph;
pub mod intersection;
pub mod merge;
pub mod mergable;
pub mod names;
pub mod restrictions;
pub mod walker;

pub use builder::IntersectionBuilder;
pub use coordinates::CoordinateExtractor;
pub use formats::{MapBundle, MapDocument};
pub use geo::Coordinate;
pub use graph::{EdgeId, NodeBasedGraph, NodeId};
pub use intersection::{ConnectedRoad, Intersection, TurnOperation};
