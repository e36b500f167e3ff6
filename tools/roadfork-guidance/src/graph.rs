//! Compact node-based road graph with CSR adjacency.
//!
//! Every way contributes a directed edge in each direction. The backward
//! edge of a one-way exists as a placeholder with `reversed = true`; the
//! intersection builder needs those placeholders to classify incoming
//! one-ways, they are never valid turn targets themselves.

use serde::{Deserialize, Serialize};

pub type NodeId = u32;
pub type EdgeId = u32;
pub type NameId = u32;

pub const SPECIAL_NODE: NodeId = NodeId::MAX;
pub const SPECIAL_EDGE: EdgeId = EdgeId::MAX;
pub const EMPTY_NAME: NameId = NameId::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Car,
    Bike,
    Foot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadClassification {
    pub class: RoadClass,
    pub lanes: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeData {
    pub reversed: bool,
    pub travel_mode: TravelMode,
    pub roundabout: bool,
    pub name_id: NameId,
    pub classification: RoadClassification,
}

/// One directed edge before CSR packing
#[derive(Debug, Clone, Copy)]
pub struct EdgeInput {
    pub source: NodeId,
    pub target: NodeId,
    pub data: EdgeData,
}

#[derive(Debug, Clone)]
pub struct NodeBasedGraph {
    offsets: Vec<u32>,
    targets: Vec<NodeId>,
    data: Vec<EdgeData>,
}

impl NodeBasedGraph {
    /// Pack edges into CSR form. The input must already be sorted by source
    /// node; edge ids are the positions in the given slice.
    pub fn from_sorted_edges(n_nodes: u32, edges: &[EdgeInput]) -> Self {
        debug_assert!(edges.windows(2).all(|w| w[0].source <= w[1].source));

        let mut offsets = vec![0u32; n_nodes as usize + 1];
        for edge in edges {
            offsets[edge.source as usize + 1] += 1;
        }
        for i in 0..n_nodes as usize {
            offsets[i + 1] += offsets[i];
        }

        Self {
            offsets,
            targets: edges.iter().map(|e| e.target).collect(),
            data: edges.iter().map(|e| e.data).collect(),
        }
    }

    pub fn node_count(&self) -> u32 {
        self.offsets.len() as u32 - 1
    }

    pub fn edge_count(&self) -> u32 {
        self.targets.len() as u32
    }

    /// Outgoing edge ids of `node`, reversed placeholders included
    pub fn adjacent_edges(&self, node: NodeId) -> std::ops::Range<EdgeId> {
        self.offsets[node as usize]..self.offsets[node as usize + 1]
    }

    pub fn out_degree(&self, node: NodeId) -> u32 {
        self.offsets[node as usize + 1] - self.offsets[node as usize]
    }

    pub fn target(&self, edge: EdgeId) -> NodeId {
        self.targets[edge as usize]
    }

    pub fn edge_data(&self, edge: EdgeId) -> &EdgeData {
        &self.data[edge as usize]
    }

    /// First edge from `source` to `target`, or `SPECIAL_EDGE`
    pub fn find_edge(&self, source: NodeId, target: NodeId) -> EdgeId {
        self.adjacent_edges(source)
            .find(|&e| self.target(e) == target)
            .unwrap_or(SPECIAL_EDGE)
    }

    /// Whether two edges describe a continuation of the same road: equal
    /// name, travel mode and classification.
    pub fn edge_data_compatible(&self, lhs: EdgeId, rhs: EdgeId) -> bool {
        let l = self.edge_data(lhs);
        let r = self.edge_data(rhs);
        l.name_id == r.name_id
            && l.travel_mode == r.travel_mode
            && l.classification == r.classification
    }

    /// Highest lane count over the edges meeting at `node`
    pub fn lane_count_at(&self, node: NodeId) -> u8 {
        self.adjacent_edges(node)
            .map(|e| self.edge_data(e).classification.lanes)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_data(lanes: u8) -> EdgeData {
        EdgeData {
            reversed: false,
            travel_mode: TravelMode::Car,
            roundabout: false,
            name_id: 0,
            classification: RoadClassification {
                class: RoadClass::Residential,
                lanes,
            },
        }
    }

    fn triangle() -> NodeBasedGraph {
        // 0 -> 1, 0 -> 2, 1 -> 2, 2 -> 0
        let edges = [
            EdgeInput { source: 0, target: 1, data: edge_data(1) },
            EdgeInput { source: 0, target: 2, data: edge_data(2) },
            EdgeInput { source: 1, target: 2, data: edge_data(1) },
            EdgeInput { source: 2, target: 0, data: edge_data(3) },
        ];
        NodeBasedGraph::from_sorted_edges(3, &edges)
    }

    #[test]
    fn adjacency_ranges_follow_sources() {
        let graph = triangle();
        assert_eq!(graph.adjacent_edges(0), 0..2);
        assert_eq!(graph.adjacent_edges(1), 2..3);
        assert_eq!(graph.adjacent_edges(2), 3..4);
        assert_eq!(graph.out_degree(0), 2);
        assert_eq!(graph.target(1), 2);
    }

    #[test]
    fn find_edge_hits_and_misses() {
        let graph = triangle();
        assert_eq!(graph.find_edge(0, 2), 1);
        assert_eq!(graph.find_edge(1, 0), SPECIAL_EDGE);
    }

    #[test]
    fn lane_count_takes_the_maximum() {
        let graph = triangle();
        assert_eq!(graph.lane_count_at(0), 2);
        assert_eq!(graph.lane_count_at(2), 3);
    }

    #[test]
    fn compatibility_requires_equal_classification() {
        let graph = triangle();
        // edges 0 and 2 share name, mode and one lane
        assert!(graph.edge_data_compatible(0, 2));
        // edge 1 has two lanes
        assert!(!graph.edge_data_compatible(0, 1));
    }
}
