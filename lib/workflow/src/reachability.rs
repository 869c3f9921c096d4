//! Upstream reachability.
//!
//! The variable picker of a node may only offer values from nodes that can
//! have run before it. [`upstream_of`] walks the incoming-edge relation
//! backwards, breadth first, and returns every predecessor with the length of
//! its shortest path to the queried node.
//!
//! Drafts are resolved before they are validated, so the walk keeps a visited
//! guard and terminates on cyclic or dangling graphs. The queried node itself
//! is never part of the result.

use crate::catalog::{NodeTypeCatalog, OutputField};
use crate::definition::WorkflowGraph;
use crate::node::Node;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// A node that can precede the queried node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamNode<'a> {
    pub node: &'a Node,
    /// Number of edges on the shortest path to the queried node.
    pub depth: usize,
}

/// An upstream node together with the variables it offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSource<'g, 'c> {
    pub node: &'g Node,
    pub depth: usize,
    pub fields: &'c [OutputField],
}

/// Returns the nodes that can structurally precede `node_id`.
///
/// Sorted by ascending depth; ties keep breadth-first discovery order.
/// Unknown IDs yield an empty list.
#[instrument(skip(graph), fields(workflow_id = %graph.id))]
pub fn upstream_of<'a>(graph: &'a WorkflowGraph, node_id: &str) -> Vec<UpstreamNode<'a>> {
    let index = graph.index();
    let Some(start) = index.node_index(node_id) else {
        debug!("node not in graph, nothing upstream");
        return Vec::new();
    };

    let mut visited = vec![false; index.node_count()];
    visited[start.index()] = true;
    let mut queue = VecDeque::from([(start, 0usize)]);
    let mut upstream = Vec::new();

    while let Some((current, depth)) = queue.pop_front() {
        for predecessor in index.predecessors(current) {
            if visited[predecessor.index()] {
                continue;
            }
            visited[predecessor.index()] = true;
            upstream.push(UpstreamNode {
                node: index.node_at(predecessor),
                depth: depth + 1,
            });
            queue.push_back((predecessor, depth + 1));
        }
    }

    debug!(upstream = upstream.len(), "resolved upstream nodes");
    upstream
}

/// Returns the upstream nodes that declare at least one output field.
///
/// This is the filter the variable picker applies on top of [`upstream_of`].
pub fn variable_candidates<'g, 'c>(
    graph: &'g WorkflowGraph,
    node_id: &str,
    catalog: &'c dyn NodeTypeCatalog,
) -> Vec<VariableSource<'g, 'c>> {
    upstream_of(graph, node_id)
        .into_iter()
        .filter_map(|upstream| {
            let fields = catalog.output_fields(&upstream.node.node_type);
            (!fields.is_empty()).then_some(VariableSource {
                node: upstream.node,
                depth: upstream.depth,
                fields,
            })
        })
        .collect()
}
