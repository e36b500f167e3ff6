//! Best-effort geojson snapshots of merged intersections.
//!
//! The sink is the one mutable side channel of the builder; it is
//! internally synchronised and swallows its own I/O failures, so snapshot
//! writing never disturbs intersection construction.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use log::warn;
use serde_json::json;

use crate::geo::Coordinate;
use crate::graph::NodeId;
use crate::intersection::ConnectedRoad;

pub struct GeojsonSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl GeojsonSink {
    pub fn create<P: AsRef<Path>>(path: P) -> roadfork_common::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(Box::new(BufWriter::new(file))))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(writer),
        }
    }

    /// Write one intersection as a feature collection: a line from the
    /// intersection node to each road's target, tagged with angle, bearing
    /// and validity. `roads` pairs every entry with its target coordinate.
    pub fn write_intersection<I>(&self, node: NodeId, at: Coordinate, roads: I)
    where
        I: Iterator<Item = (ConnectedRoad, Coordinate)>,
    {
        let features: Vec<_> = roads
            .map(|(road, target)| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[at.lon, at.lat], [target.lon, target.lat]],
                    },
                    "properties": {
                        "node": node,
                        "edge": road.turn.eid,
                        "angle": road.turn.angle,
                        "bearing": road.turn.bearing,
                        "entry_allowed": road.entry_allowed,
                    },
                })
            })
            .collect();
        let collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });

        match self.out.lock() {
            Ok(mut out) => {
                if let Err(err) = writeln!(out, "{collection}") {
                    warn!("dropping geojson snapshot for node {node}: {err}");
                }
            }
            Err(_) => warn!("geojson sink poisoned, dropping snapshot for node {node}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::TurnOperation;
    use std::sync::{Arc, Mutex as StdMutex};

    struct SharedBuffer(Arc<StdMutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn snapshots_are_one_feature_collection_per_line() {
        let buffer = Arc::new(StdMutex::new(Vec::new()));
        let sink = GeojsonSink::from_writer(Box::new(SharedBuffer(buffer.clone())));

        let road = ConnectedRoad {
            turn: TurnOperation {
                eid: 7,
                angle: 180.0,
                bearing: 90.0,
            },
            entry_allowed: true,
        };
        sink.write_intersection(
            3,
            Coordinate::new(0.0, 0.0),
            std::iter::once((road, Coordinate::new(0.0, 0.001))),
        );

        let written = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"][0]["properties"]["edge"], 7);
    }
}
