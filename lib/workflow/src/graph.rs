//! Read-only traversal index over a workflow document using petgraph.
//!
//! The document keeps nodes and edges as plain ordered lists so it can be
//! serialized as-is. Traversals run on a [`GraphIndex`], a petgraph
//! projection built once per operation:
//! - every document node becomes a petgraph node whose weight is its
//!   position in `nodes`, so `NodeIndex::index()` equals that position
//! - an ID map resolves node IDs, first occurrence winning when an ID is
//!   duplicated
//! - only edges whose endpoints both resolve are indexed; the weight is the
//!   edge's position in `edges`
//!
//! Neighbour lists are always returned in document edge order so every
//! traversal built on top of them is deterministic.

use crate::definition::WorkflowGraph;
use crate::edge::Edge;
use crate::node::Node;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// A petgraph index borrowed from a [`WorkflowGraph`].
#[derive(Debug, Clone)]
pub struct GraphIndex<'a> {
    document: &'a WorkflowGraph,
    graph: DiGraph<usize, usize>,
    node_index_map: HashMap<&'a str, NodeIndex>,
}

impl<'a> GraphIndex<'a> {
    /// Builds the index for a document.
    #[must_use]
    pub fn new(document: &'a WorkflowGraph) -> Self {
        let mut graph = DiGraph::with_capacity(document.nodes.len(), document.edges.len());
        let mut node_index_map = HashMap::with_capacity(document.nodes.len());

        for (position, node) in document.nodes.iter().enumerate() {
            let index = graph.add_node(position);
            node_index_map.entry(node.id.as_str()).or_insert(index);
        }

        for (position, edge) in document.edges.iter().enumerate() {
            let (Some(&source), Some(&target)) = (
                node_index_map.get(edge.from.as_str()),
                node_index_map.get(edge.to.as_str()),
            ) else {
                continue;
            };
            graph.add_edge(source, target, position);
        }

        Self {
            document,
            graph,
            node_index_map,
        }
    }

    /// Returns the indexed document.
    #[must_use]
    pub fn document(&self) -> &'a WorkflowGraph {
        self.document
    }

    /// Returns the number of indexed nodes, duplicates included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges whose endpoints both resolve.
    #[must_use]
    pub fn resolved_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Looks up a node by ID.
    #[must_use]
    pub fn node_by_id(&self, node_id: &str) -> Option<&'a Node> {
        self.node_index(node_id).map(|index| self.node_at(index))
    }

    /// Resolves a node ID to its petgraph index.
    #[must_use]
    pub fn node_index(&self, node_id: &str) -> Option<NodeIndex> {
        self.node_index_map.get(node_id).copied()
    }

    /// Returns the node stored at a petgraph index.
    ///
    /// # Panics
    ///
    /// Panics if the index does not belong to this graph.
    #[must_use]
    pub fn node_at(&self, index: NodeIndex) -> &'a Node {
        &self.document.nodes[self.graph[index]]
    }

    /// Returns all node indices in document order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Returns true if both endpoints of the edge exist in the graph.
    #[must_use]
    pub fn resolves(&self, edge: &Edge) -> bool {
        self.node_index_map.contains_key(edge.from.as_str())
            && self.node_index_map.contains_key(edge.to.as_str())
    }

    /// Returns the resolved edges leaving a node, in document order.
    #[must_use]
    pub fn outgoing(&self, node_id: &str) -> Vec<&'a Edge> {
        self.edges_of(node_id, Direction::Outgoing)
    }

    /// Returns the resolved edges entering a node, in document order.
    #[must_use]
    pub fn incoming(&self, node_id: &str) -> Vec<&'a Edge> {
        self.edges_of(node_id, Direction::Incoming)
    }

    /// Returns the direct successors of a node, in document edge order.
    ///
    /// A successor reached by several parallel edges is listed once per edge.
    #[must_use]
    pub fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_in_order(index, Direction::Outgoing)
    }

    /// Returns the direct predecessors of a node, in document edge order.
    #[must_use]
    pub fn predecessors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_in_order(index, Direction::Incoming)
    }

    /// Returns nodes without incoming edges, in document order.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<&'a Node> {
        self.graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .edges_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|index| self.node_at(index))
            .collect()
    }

    fn edges_of(&self, node_id: &str, direction: Direction) -> Vec<&'a Edge> {
        let Some(index) = self.node_index(node_id) else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = self
            .graph
            .edges_directed(index, direction)
            .map(|edge| *edge.weight())
            .collect();
        positions.sort_unstable();
        positions
            .into_iter()
            .map(|position| &self.document.edges[position])
            .collect()
    }

    fn neighbors_in_order(&self, index: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(index, direction)
            .map(|edge| {
                let neighbor = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (*edge.weight(), neighbor)
            })
            .collect();
        edges.sort_unstable_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, neighbor)| neighbor).collect()
    }
}
