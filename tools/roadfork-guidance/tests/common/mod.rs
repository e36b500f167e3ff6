//! Fixture helpers shared by the integration suites.

use roadfork_guidance::formats::{MapDocument, NodeRecord, WayRecord};
use roadfork_guidance::graph::{NodeId, RoadClass, TravelMode};

/// Degrees per meter along a great circle
pub const M2D: f64 = 1.0 / 111_194.93;

/// A node placed `north_m` / `east_m` meters from the equatorial origin
pub fn at(north_m: f64, east_m: f64) -> NodeRecord {
    NodeRecord {
        lat: north_m * M2D,
        lon: east_m * M2D,
        barrier: false,
    }
}

/// A bidirectional residential single-lane car way
pub fn way(from: NodeId, to: NodeId, name: &str) -> WayRecord {
    WayRecord {
        from,
        to,
        name: Some(name.to_string()),
        class: RoadClass::Residential,
        lanes: 1,
        mode: TravelMode::Car,
        oneway: false,
        roundabout: false,
        shape: Vec::new(),
    }
}

pub fn oneway(from: NodeId, to: NodeId, name: &str) -> WayRecord {
    WayRecord {
        oneway: true,
        ..way(from, to, name)
    }
}

pub fn document(nodes: Vec<NodeRecord>, ways: Vec<WayRecord>) -> MapDocument {
    MapDocument {
        nodes,
        ways,
        restrictions: Vec::new(),
        name_suffixes: ["street", "st", "road", "rd", "avenue", "ave"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}
