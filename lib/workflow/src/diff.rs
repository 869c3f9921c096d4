//! Version-to-version diff and merge.
//!
//! [`diff`] compares two snapshots of the same workflow and returns one
//! merged graph in which every node and edge carries a [`DiffStatus`]:
//! - target nodes are `added` or, when the base has the same ID, `modified`
//!   or `unchanged` depending on their domain fields
//! - base nodes the target no longer has are appended as `removed`
//! - target edges are kept verbatim and classified by ID
//! - a base edge that vanished is brought back, marked as an error edge,
//!   only when one of its endpoints was removed; edges that were merely
//!   rewired stay gone
//!
//! Positions and previously attached diff statuses never count as changes.
//! Config comparison is deep and ignores key order. Embedded JSON blobs are
//! compared structurally, and a blob that cannot be parsed counts as a change
//! unless both sides hold the identical text.

use crate::definition::WorkflowGraph;
use crate::edge::{Edge, EdgeType};
use crate::node::{DiffStatus, Node};
use flowstudio_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument};

/// Node counts per diff status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffStats {
    fn record(&mut self, status: DiffStatus) {
        match status {
            DiffStatus::Added => self.added += 1,
            DiffStatus::Removed => self.removed += 1,
            DiffStatus::Modified => self.modified += 1,
            DiffStatus::Unchanged => self.unchanged += 1,
        }
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified + self.unchanged
    }

    /// True if anything was added, removed or modified.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.modified > 0
    }
}

/// A domain field of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeField {
    Type,
    Name,
    Enabled,
    Config,
}

/// What changed on a modified node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeChange {
    pub node_id: NodeId,
    pub fields: Vec<NodeField>,
    /// Config keys whose values differ, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_keys: Vec<String>,
}

/// Result of comparing two versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Target graph plus removed nodes and their edges, fully annotated.
    #[serde(rename = "mergedGraph")]
    pub merged: WorkflowGraph,
    pub stats: DiffStats,
    /// One entry per modified node, in merged order.
    pub changes: Vec<NodeChange>,
}

/// Compares `base` against `target`.
#[instrument(skip_all, fields(base = %base.id, target = %target.id))]
pub fn diff(base: &WorkflowGraph, target: &WorkflowGraph) -> DiffResult {
    let mut base_nodes: HashMap<&str, &Node> = HashMap::with_capacity(base.nodes.len());
    for node in &base.nodes {
        base_nodes.entry(node.id.as_str()).or_insert(node);
    }

    let mut matched: HashSet<&str> = HashSet::new();
    let mut statuses: HashMap<&str, DiffStatus> = HashMap::new();
    let mut nodes = Vec::with_capacity(target.nodes.len() + base.nodes.len());
    let mut changes = Vec::new();

    for node in &target.nodes {
        let status = match base_nodes.get(node.id.as_str()) {
            None => DiffStatus::Added,
            Some(base_node) => {
                matched.insert(node.id.as_str());
                match compare_nodes(base_node, node) {
                    Some(change) => {
                        changes.push(change);
                        DiffStatus::Modified
                    }
                    None => DiffStatus::Unchanged,
                }
            }
        };
        statuses.entry(node.id.as_str()).or_insert(status);
        nodes.push(Node {
            diff_status: Some(status),
            ..node.clone()
        });
    }

    let base_ids: Vec<&str> = unique_ids(base.nodes.iter().map(|node| node.id.as_str()));
    for removed_id in base_ids.into_iter().filter(|id| !matched.contains(id)) {
        let Some(node) = base_nodes.get(removed_id) else {
            continue;
        };
        statuses.insert(removed_id, DiffStatus::Removed);
        nodes.push(Node {
            diff_status: Some(DiffStatus::Removed),
            ..(*node).clone()
        });
    }

    let edges = merge_edges(base, target, &statuses);

    let mut stats = DiffStats::default();
    for node in &nodes {
        if let Some(status) = node.diff_status {
            stats.record(status);
        }
    }

    debug!(
        added = stats.added,
        removed = stats.removed,
        modified = stats.modified,
        unchanged = stats.unchanged,
        edges = edges.len(),
        "diff computed"
    );

    DiffResult {
        merged: WorkflowGraph {
            id: target.id.clone(),
            name: target.name.clone(),
            mode: target.mode,
            nodes,
            edges,
        },
        stats,
        changes,
    }
}

fn merge_edges(
    base: &WorkflowGraph,
    target: &WorkflowGraph,
    statuses: &HashMap<&str, DiffStatus>,
) -> Vec<Edge> {
    let mut base_edges: HashMap<&str, &Edge> = HashMap::with_capacity(base.edges.len());
    for edge in &base.edges {
        base_edges.entry(edge.id.as_str()).or_insert(edge);
    }
    let target_edge_ids: HashSet<&str> = target.edges.iter().map(|edge| edge.id.as_str()).collect();

    let mut edges: Vec<Edge> = target
        .edges
        .iter()
        .map(|edge| {
            let status = match base_edges.get(edge.id.as_str()) {
                None => DiffStatus::Added,
                Some(base_edge) if base_edge.same_connection(edge) => DiffStatus::Unchanged,
                Some(_) => DiffStatus::Modified,
            };
            Edge {
                diff_status: Some(status),
                ..edge.clone()
            }
        })
        .collect();

    let mut reincluded = HashSet::new();
    for edge in &base.edges {
        if target_edge_ids.contains(edge.id.as_str()) || !reincluded.insert(edge.id.as_str()) {
            continue;
        }
        let (Some(&from), Some(&to)) = (
            statuses.get(edge.from.as_str()),
            statuses.get(edge.to.as_str()),
        ) else {
            continue;
        };
        if from == DiffStatus::Removed || to == DiffStatus::Removed {
            edges.push(Edge {
                edge_type: EdgeType::Error,
                diff_status: Some(DiffStatus::Removed),
                ..edge.clone()
            });
        }
    }

    edges
}

fn unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// Returns the changed domain fields, or `None` if the nodes are equal.
fn compare_nodes(base: &Node, target: &Node) -> Option<NodeChange> {
    let mut fields = Vec::new();
    if base.node_type != target.node_type {
        fields.push(NodeField::Type);
    }
    if base.name != target.name {
        fields.push(NodeField::Name);
    }
    if base.enabled != target.enabled {
        fields.push(NodeField::Enabled);
    }

    let keys: BTreeSet<&String> = base.config.keys().chain(target.config.keys()).collect();
    let config_keys: Vec<String> = keys
        .into_iter()
        .filter(|key| match (base.config.get(*key), target.config.get(*key)) {
            (Some(before), Some(after)) => !values_equivalent(before, after),
            _ => true,
        })
        .cloned()
        .collect();
    if !config_keys.is_empty() {
        fields.push(NodeField::Config);
    }

    (!fields.is_empty()).then(|| NodeChange {
        node_id: target.id.clone(),
        fields,
        config_keys,
    })
}

/// Deep, key-order-insensitive equality with embedded JSON blob support.
fn values_equivalent(before: &JsonValue, after: &JsonValue) -> bool {
    match (before, after) {
        (JsonValue::String(a), JsonValue::String(b)) => a == b || embedded_json_equal(a, b),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equivalent(x, y))
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equivalent(x, y)))
        }
        _ => before == after,
    }
}

/// Compares two differing strings that both hold serialized JSON documents.
///
/// Returns false when either side is not a blob or fails to parse.
fn embedded_json_equal(a: &str, b: &str) -> bool {
    let (Some(a), Some(b)) = (as_blob(a), as_blob(b)) else {
        return false;
    };
    match (
        serde_json::from_str::<JsonValue>(a),
        serde_json::from_str::<JsonValue>(b),
    ) {
        (Ok(x), Ok(y)) => values_equivalent(&x, &y),
        _ => {
            debug!("embedded config blob failed to parse, treating as modified");
            false
        }
    }
}

fn as_blob(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.starts_with('{') || trimmed.starts_with('[')).then_some(trimmed)
}
