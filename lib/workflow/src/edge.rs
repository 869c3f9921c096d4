//! Edge types for workflow graphs.
//!
//! An edge connects a source node to a target node. Its `edgeType` tells the
//! canvas how to draw it; `condition` is an opaque expression the engine
//! carries but never evaluates.

use crate::node::DiffStatus;
use flowstudio_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// The kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Execution order.
    #[default]
    Control,
    /// Data flow.
    Data,
    /// Conditional branch.
    Condition,
    /// Error path. The diff engine also uses it to mark edges of removed nodes.
    Error,
}

/// An edge connecting two nodes in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Identifier, unique within the graph.
    pub id: EdgeId,
    /// Source node ID.
    pub from: NodeId,
    /// Target node ID.
    pub to: NodeId,
    /// Edge kind.
    #[serde(default)]
    pub edge_type: EdgeType,
    /// Branch condition expression, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Diff classification. Only set on graphs produced by the diff engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_status: Option<DiffStatus>,
}

impl Edge {
    /// Creates a control edge.
    #[must_use]
    pub fn new(id: impl Into<EdgeId>, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            edge_type: EdgeType::Control,
            condition: None,
            diff_status: None,
        }
    }

    /// Creates a control edge with a freshly generated ID.
    #[must_use]
    pub fn connect(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self::new(EdgeId::generate(), from, to)
    }

    /// Sets the edge kind.
    #[must_use]
    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }

    /// Turns the edge into a conditional branch.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.edge_type = EdgeType::Condition;
        self.condition = Some(condition.into());
        self
    }

    /// Returns true if the edge starts and ends at the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Compares endpoints, kind and condition, ignoring the diff status.
    #[must_use]
    pub fn same_connection(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.edge_type == other.edge_type
            && self.condition == other.condition
    }
}
