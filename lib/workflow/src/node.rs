//! Workflow node types.
//!
//! A node is one step of a workflow DSL document. The engine only looks at
//! a node's identity, its `type` key (resolved to a category through the
//! node-type catalog) and, for diffing, its domain fields. The `config`
//! object is opaque: it is compared for equality and otherwise left alone.

use flowstudio_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Opaque, schema-less node configuration.
pub type NodeConfig = Map<String, JsonValue>;

/// Per-element classification produced by the diff engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    /// Present in the target version only.
    Added,
    /// Present in the base version only.
    Removed,
    /// Present in both versions with different domain fields.
    Modified,
    /// Present in both versions with identical domain fields.
    Unchanged,
}

impl DiffStatus {
    /// Returns the lowercase name used in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canvas position in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Identifier, unique within the graph.
    pub id: NodeId,
    /// Key into the node-type catalog.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Human-readable label.
    #[serde(default)]
    pub name: String,
    /// Whether the node takes part in execution.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Node-type specific configuration.
    #[serde(default)]
    pub config: NodeConfig,
    /// Diff classification. Only set on graphs produced by the diff engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_status: Option<DiffStatus>,
    /// Canvas position. Never part of the node's domain identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

fn default_enabled() -> bool {
    true
}

impl Node {
    /// Creates an enabled node with an empty configuration.
    #[must_use]
    pub fn new(
        id: impl Into<NodeId>,
        node_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            name: name.into(),
            enabled: true,
            config: NodeConfig::new(),
            diff_status: None,
            position: None,
        }
    }

    /// Creates a node with a freshly generated ID.
    #[must_use]
    pub fn generated(node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeId::generate(), node_type, name)
    }

    /// Sets a configuration entry.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Marks the node as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Sets the canvas position.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Returns a copy without diff status or position.
    #[must_use]
    pub fn without_transient(&self) -> Self {
        Self {
            diff_status: None,
            position: None,
            ..self.clone()
        }
    }
}
