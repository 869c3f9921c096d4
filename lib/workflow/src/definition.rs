//! Workflow DSL document.
//!
//! A [`WorkflowGraph`] is the structural projection of one saved version of a
//! workflow: identity, orchestration mode, and ordered node and edge lists.
//! Snapshots are treated as immutable; every engine operation takes them by
//! reference and returns new values.

use crate::edge::Edge;
use crate::error::DocumentError;
use crate::graph::GraphIndex;
use crate::node::Node;
use flowstudio_core::WorkflowId;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orchestration topology a graph must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// A single chain: no fan-out, no cycles.
    Linear,
    /// Any acyclic graph.
    Dag,
    /// Topic, competing agents and a single judge.
    Debate,
}

impl Mode {
    /// Returns the document name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Dag => "DAG",
            Self::Debate => "DEBATE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LINEAR" => Ok(Self::Linear),
            "DAG" => Ok(Self::Dag),
            "DEBATE" => Ok(Self::Debate),
            other => Err(DocumentError::Parse {
                details: format!("unknown mode '{other}', expected LINEAR, DAG or DEBATE"),
            }),
        }
    }
}

/// A workflow DSL document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    /// Workflow identifier, shared by all versions of the same workflow.
    pub id: WorkflowId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Declared orchestration mode.
    pub mode: Mode,
    /// Nodes in document order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in document order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl WorkflowGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(id: impl Into<WorkflowId>, name: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Appends a node.
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge.
    #[must_use]
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a well-formed workflow document.
    pub fn from_json(json: &str) -> Result<Self, Report<DocumentError>> {
        let graph = serde_json::from_str(json).map_err(|e| DocumentError::Parse {
            details: e.to_string(),
        })?;
        Ok(graph)
    }

    /// Parses a document from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not match the document shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Report<DocumentError>> {
        let graph = serde_json::from_value(value).map_err(|e| DocumentError::Parse {
            details: e.to_string(),
        })?;
        Ok(graph)
    }

    /// Serializes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, Report<DocumentError>> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialize {
            details: e.to_string(),
        })?;
        Ok(json)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Builds the read-only traversal index for this graph.
    #[must_use]
    pub fn index(&self) -> GraphIndex<'_> {
        GraphIndex::new(self)
    }
}
