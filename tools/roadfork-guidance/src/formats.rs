//! JSON map bundles: the ingest surface of the inspector tool.
//!
//! A bundle document declares nodes, ways and restrictions in a compact
//! human-writable form. Loading produces the immutable collaborator set the
//! intersection builder works on: graph, coordinate extractor, restriction
//! map, barrier set and name tables.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use roadfork_common::{Error, Result};

use crate::builder::IntersectionBuilder;
use crate::coordinates::CoordinateExtractor;
use crate::geo::Coordinate;
use crate::graph::{
    EdgeData, EdgeInput, NodeBasedGraph, NodeId, RoadClass, RoadClassification, TravelMode,
    EMPTY_NAME,
};
use crate::names::{NameTable, SuffixTable};
use crate::restrictions::RestrictionMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDocument {
    pub nodes: Vec<NodeRecord>,
    pub ways: Vec<WayRecord>,
    #[serde(default)]
    pub restrictions: Vec<RestrictionRecord>,
    #[serde(default)]
    pub name_suffixes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeRecord {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub barrier: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WayRecord {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    pub class: RoadClass,
    #[serde(default = "default_lanes")]
    pub lanes: u8,
    #[serde(default = "default_mode")]
    pub mode: TravelMode,
    #[serde(default)]
    pub oneway: bool,
    #[serde(default)]
    pub roundabout: bool,
    /// Intermediate shape points as `[lat, lon]`, in travel direction
    #[serde(default)]
    pub shape: Vec<[f64; 2]>,
}

fn default_lanes() -> u8 {
    1
}

fn default_mode() -> TravelMode {
    TravelMode::Car
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestrictionRecord {
    pub kind: RestrictionKind,
    pub from: NodeId,
    pub via: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionKind {
    Only,
    Ban,
}

/// The immutable inputs of the intersection builder, owned together
pub struct MapBundle {
    pub graph: NodeBasedGraph,
    pub extractor: CoordinateExtractor,
    pub restrictions: RestrictionMap,
    pub barriers: FxHashSet<NodeId>,
    pub names: NameTable,
    pub suffixes: SuffixTable,
}

impl MapBundle {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let document: MapDocument = serde_json::from_reader(reader)?;
        Self::from_document(&document)
    }

    pub fn from_document(document: &MapDocument) -> Result<Self> {
        let n_nodes = document.nodes.len() as u32;
        let check_node = |id: NodeId| -> Result<()> {
            if id >= n_nodes {
                return Err(Error::UnknownNode(id));
            }
            Ok(())
        };

        let node_coordinates: Vec<Coordinate> = document
            .nodes
            .iter()
            .map(|node| Coordinate::new(node.lat, node.lon))
            .collect();

        let mut names = NameTable::default();
        let mut edges: Vec<(EdgeInput, Vec<Coordinate>)> = Vec::new();

        for (way_index, way) in document.ways.iter().enumerate() {
            check_node(way.from)?;
            check_node(way.to)?;
            if way.from == way.to {
                return Err(Error::InvalidBundle(format!(
                    "way {way_index} is a self loop at node {}",
                    way.from
                )));
            }
            if way.lanes == 0 {
                return Err(Error::InvalidBundle(format!(
                    "way {way_index} has zero lanes"
                )));
            }

            let name_id = match &way.name {
                Some(name) if !name.is_empty() => names.intern(name),
                _ => EMPTY_NAME,
            };
            let data = |reversed: bool| EdgeData {
                reversed,
                travel_mode: way.mode,
                roundabout: way.roundabout,
                name_id,
                classification: RoadClassification {
                    class: way.class,
                    lanes: way.lanes,
                },
            };

            let mut forward_shape = Vec::with_capacity(way.shape.len() + 2);
            forward_shape.push(node_coordinates[way.from as usize]);
            forward_shape.extend(
                way.shape
                    .iter()
                    .map(|point| Coordinate::new(point[0], point[1])),
            );
            forward_shape.push(node_coordinates[way.to as usize]);
            let backward_shape: Vec<Coordinate> =
                forward_shape.iter().rev().copied().collect();

            edges.push((
                EdgeInput {
                    source: way.from,
                    target: way.to,
                    data: data(false),
                },
                forward_shape,
            ));
            // the backward direction of a one-way stays in the graph as a
            // reversed placeholder
            edges.push((
                EdgeInput {
                    source: way.to,
                    target: way.from,
                    data: data(way.oneway),
                },
                backward_shape,
            ));
        }

        edges.sort_by_key(|(edge, _)| (edge.source, edge.target));
        let (inputs, geometry): (Vec<EdgeInput>, Vec<Vec<Coordinate>>) =
            edges.into_iter().unzip();
        let graph = NodeBasedGraph::from_sorted_edges(n_nodes, &inputs);
        let extractor = CoordinateExtractor::new(node_coordinates, geometry);

        let mut restrictions = RestrictionMap::default();
        for restriction in &document.restrictions {
            check_node(restriction.from)?;
            check_node(restriction.via)?;
            check_node(restriction.to)?;
            match restriction.kind {
                RestrictionKind::Only => {
                    restrictions.add_only(restriction.from, restriction.via, restriction.to)
                }
                RestrictionKind::Ban => {
                    restrictions.add_ban(restriction.from, restriction.via, restriction.to)
                }
            }
        }

        let barriers: FxHashSet<NodeId> = document
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.barrier)
            .map(|(index, _)| index as NodeId)
            .collect();

        Ok(Self {
            graph,
            extractor,
            restrictions,
            barriers,
            names,
            suffixes: SuffixTable::new(&document.name_suffixes),
        })
    }

    /// An intersection builder borrowing this bundle
    pub fn builder(&self) -> IntersectionBuilder<'_> {
        IntersectionBuilder::new(
            &self.graph,
            &self.extractor,
            &self.restrictions,
            &self.barriers,
            &self.names,
            &self.suffixes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_document(oneway: bool) -> MapDocument {
        MapDocument {
            nodes: vec![
                NodeRecord {
                    lat: 0.0,
                    lon: 0.0,
                    barrier: false,
                },
                NodeRecord {
                    lat: 0.0,
                    lon: 0.001,
                    barrier: false,
                },
            ],
            ways: vec![WayRecord {
                from: 0,
                to: 1,
                name: Some("Main Street".into()),
                class: RoadClass::Residential,
                lanes: 1,
                mode: TravelMode::Car,
                oneway,
                roundabout: false,
                shape: Vec::new(),
            }],
            restrictions: Vec::new(),
            name_suffixes: vec!["street".into()],
        }
    }

    #[test]
    fn every_way_yields_both_directions() {
        let bundle = MapBundle::from_document(&two_node_document(false)).unwrap();
        assert_eq!(bundle.graph.edge_count(), 2);
        let forward = bundle.graph.find_edge(0, 1);
        let backward = bundle.graph.find_edge(1, 0);
        assert!(!bundle.graph.edge_data(forward).reversed);
        assert!(!bundle.graph.edge_data(backward).reversed);
    }

    #[test]
    fn oneways_keep_a_reversed_placeholder() {
        let bundle = MapBundle::from_document(&two_node_document(true)).unwrap();
        let backward = bundle.graph.find_edge(1, 0);
        assert!(bundle.graph.edge_data(backward).reversed);
    }

    #[test]
    fn unknown_nodes_are_rejected() {
        let mut document = two_node_document(false);
        document.ways[0].to = 9;
        assert!(matches!(
            MapBundle::from_document(&document),
            Err(Error::UnknownNode(9))
        ));
    }

    #[test]
    fn documents_round_trip_through_json() {
        let document = two_node_document(true);
        let text = serde_json::to_string(&document).unwrap();
        let reparsed: MapDocument = serde_json::from_str(&text).unwrap();
        assert!(reparsed.ways[0].oneway);
        assert!(MapBundle::from_document(&reparsed).is_ok());
    }
}
