//! Mode-aware structural validation.
//!
//! The validator never fails. It accumulates every violated invariant into a
//! [`ValidationReport`] so the caller can show all problems at once and
//! decide for itself whether to block a publish. Errors make the graph
//! invalid; warnings are advisory.
//!
//! Checks run in two stages:
//! - common checks for every mode: duplicate IDs, dangling edges,
//!   connectivity of trigger and functional nodes, unknown node types
//! - mode rules: cycle detection and fan-out for LINEAR, cycle detection and
//!   join advice for DAG, category cardinalities for DEBATE

use crate::catalog::{NodeCategory, NodeTypeCatalog};
use crate::definition::{Mode, WorkflowGraph};
use crate::graph::GraphIndex;
use crate::node::Node;
use flowstudio_core::{EdgeId, NodeId};
use petgraph::graph::NodeIndex;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, instrument};

/// Stable machine-readable issue code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCode {
    #[serde(rename = "structural-duplicate-id")]
    DuplicateId,
    #[serde(rename = "structural-dangling-edge")]
    DanglingEdge,
    #[serde(rename = "connectivity-isolated-node")]
    IsolatedNode,
    #[serde(rename = "topology-cycle")]
    Cycle,
    #[serde(rename = "topology-linear-fan-out")]
    LinearFanOut,
    #[serde(rename = "topology-mode-constraint")]
    ModeConstraint,
    #[serde(rename = "advisory-missing-join")]
    MissingJoin,
    #[serde(rename = "advisory-unknown-node-type")]
    UnknownNodeType,
}

impl IssueCode {
    /// Returns the stable code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateId => "structural-duplicate-id",
            Self::DanglingEdge => "structural-dangling-edge",
            Self::IsolatedNode => "connectivity-isolated-node",
            Self::Cycle => "topology-cycle",
            Self::LinearFanOut => "topology-linear-fan-out",
            Self::ModeConstraint => "topology-mode-constraint",
            Self::MissingJoin => "advisory-missing-join",
            Self::UnknownNodeType => "advisory-unknown-node-type",
        }
    }

    /// Returns the taxonomy bucket of the code.
    #[must_use]
    pub const fn category(self) -> IssueCategory {
        match self {
            Self::DuplicateId | Self::DanglingEdge => IssueCategory::Structural,
            Self::IsolatedNode => IssueCategory::Connectivity,
            Self::Cycle | Self::LinearFanOut | Self::ModeConstraint => IssueCategory::Topology,
            Self::MissingJoin | Self::UnknownNodeType => IssueCategory::Advisory,
        }
    }

    /// Returns whether the code invalidates the graph.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self.category() {
            IssueCategory::Advisory => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy bucket of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Structural,
    Topology,
    Connectivity,
    Advisory,
}

/// Whether an issue blocks validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One detected problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub code: IssueCode,
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<EdgeId>,
}

impl Issue {
    fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            category: code.category(),
            message: message.into(),
            node_id: None,
            edge_id: None,
        }
    }

    fn on_node(mut self, node_id: &NodeId) -> Self {
        self.node_id = Some(node_id.clone());
        self
    }

    fn on_edge(mut self, edge_id: &EdgeId) -> Self {
        self.edge_id = Some(edge_id.clone());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Outcome of validating one graph against one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// The mode the graph was checked against.
    pub mode: Mode,
    /// Violations, in detection order.
    pub errors: Vec<Issue>,
    /// Advisories, in detection order.
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    /// True iff no errors were found. Warnings do not count.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the errors carrying a given code.
    pub fn errors_with(&self, code: IssueCode) -> impl Iterator<Item = &Issue> {
        self.errors.iter().filter(move |issue| issue.code == code)
    }

    fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ValidationReport", 4)?;
        state.serialize_field("mode", &self.mode)?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.end()
    }
}

/// Tunable validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Minimum number of agent nodes a DEBATE graph needs.
    #[serde(default = "default_debate_min_agents")]
    pub debate_min_agents: usize,
}

fn default_debate_min_agents() -> usize {
    2
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            debate_min_agents: default_debate_min_agents(),
        }
    }
}

/// Structural validator bound to a node-type catalog.
#[derive(Clone, Copy)]
pub struct Validator<'c> {
    catalog: &'c dyn NodeTypeCatalog,
    options: &'c ValidationOptions,
}

impl<'c> Validator<'c> {
    /// Creates a validator.
    #[must_use]
    pub fn new(catalog: &'c dyn NodeTypeCatalog, options: &'c ValidationOptions) -> Self {
        Self { catalog, options }
    }

    /// Validates a graph against a declared mode.
    #[instrument(skip_all, fields(workflow_id = %graph.id, mode = %mode, nodes = graph.nodes.len(), edges = graph.edges.len()))]
    pub fn validate(&self, graph: &WorkflowGraph, mode: Mode) -> ValidationReport {
        let mut report = ValidationReport {
            mode,
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        let degrees = Degrees::of(graph);

        check_duplicate_ids(graph, &mut report);
        check_dangling_edges(graph, &mut report);
        self.check_connectivity(graph, &degrees, &mut report);
        self.check_known_types(graph, &mut report);

        match mode {
            Mode::Linear => {
                detect_cycle(&graph.index(), &mut report);
                check_linear_fan_out(graph, &degrees, &mut report);
            }
            Mode::Dag => {
                detect_cycle(&graph.index(), &mut report);
                advise_missing_join(graph, &degrees, &mut report);
            }
            Mode::Debate => self.check_debate_roster(graph, &mut report),
        }

        debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validation finished"
        );
        report
    }

    fn check_connectivity(&self, graph: &WorkflowGraph, degrees: &Degrees<'_>, report: &mut ValidationReport) {
        for node in unique_nodes(graph) {
            let category = self.catalog.category(&node.node_type);
            match category {
                Some(NodeCategory::Group) => {}
                Some(NodeCategory::Trigger) => {
                    if degrees.outgoing(node) == 0 {
                        report.push(
                            Issue::new(
                                IssueCode::IsolatedNode,
                                format!("trigger node {} has no outgoing edge", label(node)),
                            )
                            .on_node(&node.id),
                        );
                    }
                }
                _ => {
                    if degrees.incoming(node) == 0 {
                        report.push(
                            Issue::new(
                                IssueCode::IsolatedNode,
                                format!("node {} has no incoming edge", label(node)),
                            )
                            .on_node(&node.id),
                        );
                    }
                }
            }
        }
    }

    fn check_known_types(&self, graph: &WorkflowGraph, report: &mut ValidationReport) {
        for node in unique_nodes(graph) {
            if self.catalog.category(&node.node_type).is_none() {
                report.push(
                    Issue::new(
                        IssueCode::UnknownNodeType,
                        format!("node {} has unknown type '{}'", label(node), node.node_type),
                    )
                    .on_node(&node.id),
                );
            }
        }
    }

    fn check_debate_roster(&self, graph: &WorkflowGraph, report: &mut ValidationReport) {
        let mut counts: HashMap<NodeCategory, usize> = HashMap::new();
        for node in unique_nodes(graph) {
            if let Some(category) = self.catalog.category(&node.node_type) {
                *counts.entry(category).or_default() += 1;
            }
        }
        let count = |category: NodeCategory| counts.get(&category).copied().unwrap_or(0);

        let topics = count(NodeCategory::Topic);
        if topics != 1 {
            report.push(Issue::new(
                IssueCode::ModeConstraint,
                format!("expected exactly 1 topic node, found {topics}"),
            ));
        }

        let agents = count(NodeCategory::Agent);
        let min_agents = self.options.debate_min_agents;
        if agents < min_agents {
            report.push(Issue::new(
                IssueCode::ModeConstraint,
                format!("expected at least {min_agents} agent nodes, found {agents}"),
            ));
        }

        let judges = count(NodeCategory::Judge);
        if judges != 1 {
            report.push(Issue::new(
                IssueCode::ModeConstraint,
                format!("expected exactly 1 judge node, found {judges}"),
            ));
        }
    }
}

/// Validates a graph with default options.
#[must_use]
pub fn validate(graph: &WorkflowGraph, mode: Mode, catalog: &dyn NodeTypeCatalog) -> ValidationReport {
    let options = ValidationOptions::default();
    Validator::new(catalog, &options).validate(graph, mode)
}

/// Raw edge counts per node ID, dangling edges included.
struct Degrees<'a> {
    outgoing: HashMap<&'a str, usize>,
    incoming: HashMap<&'a str, usize>,
}

impl<'a> Degrees<'a> {
    fn of(graph: &'a WorkflowGraph) -> Self {
        let mut outgoing = HashMap::new();
        let mut incoming = HashMap::new();
        for edge in &graph.edges {
            *outgoing.entry(edge.from.as_str()).or_default() += 1;
            *incoming.entry(edge.to.as_str()).or_default() += 1;
        }
        Self { outgoing, incoming }
    }

    fn outgoing(&self, node: &Node) -> usize {
        self.outgoing.get(node.id.as_str()).copied().unwrap_or(0)
    }

    fn incoming(&self, node: &Node) -> usize {
        self.incoming.get(node.id.as_str()).copied().unwrap_or(0)
    }
}

/// Nodes in document order, skipping repeated IDs.
fn unique_nodes(graph: &WorkflowGraph) -> impl Iterator<Item = &Node> {
    let mut seen = HashSet::new();
    graph
        .nodes
        .iter()
        .filter(move |node| seen.insert(node.id.as_str()))
}

fn label(node: &Node) -> String {
    if node.name.is_empty() {
        format!("'{}'", node.id)
    } else {
        format!("'{}' ({})", node.name, node.id)
    }
}

fn check_duplicate_ids(graph: &WorkflowGraph, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            report.push(
                Issue::new(IssueCode::DuplicateId, format!("duplicate node id '{}'", node.id))
                    .on_node(&node.id),
            );
        }
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for edge in &graph.edges {
        if !seen.insert(edge.id.as_str()) && reported.insert(edge.id.as_str()) {
            report.push(
                Issue::new(IssueCode::DuplicateId, format!("duplicate edge id '{}'", edge.id))
                    .on_edge(&edge.id),
            );
        }
    }
}

fn check_dangling_edges(graph: &WorkflowGraph, report: &mut ValidationReport) {
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    for edge in &graph.edges {
        let missing: Vec<String> = [&edge.from, &edge.to]
            .into_iter()
            .filter(|id| !node_ids.contains(id.as_str()))
            .map(|id| format!("'{id}'"))
            .collect();
        if missing.is_empty() {
            continue;
        }
        let noun = if missing.len() == 1 { "node" } else { "nodes" };
        report.push(
            Issue::new(
                IssueCode::DanglingEdge,
                format!(
                    "edge '{}' references unknown {noun} {}",
                    edge.id,
                    missing.join(" and ")
                ),
            )
            .on_edge(&edge.id),
        );
    }
}

fn check_linear_fan_out(graph: &WorkflowGraph, degrees: &Degrees<'_>, report: &mut ValidationReport) {
    for node in unique_nodes(graph) {
        let outgoing = degrees.outgoing(node);
        if outgoing > 1 {
            report.push(
                Issue::new(
                    IssueCode::LinearFanOut,
                    format!(
                        "node {} has {outgoing} outgoing edges; LINEAR mode allows at most 1",
                        label(node)
                    ),
                )
                .on_node(&node.id),
            );
        }
    }
}

fn advise_missing_join(graph: &WorkflowGraph, degrees: &Degrees<'_>, report: &mut ValidationReport) {
    let has_join = unique_nodes(graph).any(|node| degrees.incoming(node) > 1);
    if has_join {
        return;
    }
    if let Some(split) = unique_nodes(graph).find(|node| degrees.outgoing(node) > 1) {
        report.push(
            Issue::new(
                IssueCode::MissingJoin,
                format!(
                    "node {} splits the flow but no node joins the branches",
                    label(split)
                ),
            )
            .on_node(&split.id),
        );
    }
}

fn detect_cycle(index: &GraphIndex<'_>, report: &mut ValidationReport) {
    if let Some(node) = find_back_edge_target(index) {
        let node = index.node_at(node);
        report.push(
            Issue::new(
                IssueCode::Cycle,
                format!("graph contains a cycle through node {}", label(node)),
            )
            .on_node(&node.id),
        );
    }
}

/// One level of the explicit DFS stack.
struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    cursor: usize,
}

/// Iterative depth-first search that stops at the first back edge.
///
/// Returns the node the back edge points to.
fn find_back_edge_target(index: &GraphIndex<'_>) -> Option<NodeIndex> {
    let mut visited = vec![false; index.node_count()];
    let mut on_stack = vec![false; index.node_count()];

    for root in index.node_indices() {
        if visited[root.index()] {
            continue;
        }
        visited[root.index()] = true;
        on_stack[root.index()] = true;
        let mut stack = vec![Frame {
            node: root,
            successors: index.successors(root),
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = frame.successors.get(frame.cursor) else {
                on_stack[frame.node.index()] = false;
                stack.pop();
                continue;
            };
            frame.cursor += 1;

            if on_stack[next.index()] {
                return Some(next);
            }
            if !visited[next.index()] {
                visited[next.index()] = true;
                on_stack[next.index()] = true;
                stack.push(Frame {
                    node: next,
                    successors: index.successors(next),
                    cursor: 0,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::edge::Edge;

    fn linear(nodes: &[(&str, &str)], edges: &[(&str, &str, &str)]) -> WorkflowGraph {
        build(Mode::Linear, nodes, edges)
    }

    fn build(mode: Mode, nodes: &[(&str, &str)], edges: &[(&str, &str, &str)]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new("wf", "test", mode);
        for (id, node_type) in nodes {
            graph.nodes.push(Node::new(*id, *node_type, ""));
        }
        for (id, from, to) in edges {
            graph.edges.push(Edge::new(*id, *from, *to));
        }
        graph
    }

    fn check(graph: &WorkflowGraph, mode: Mode) -> ValidationReport {
        validate(graph, mode, &StaticCatalog::builtin())
    }

    #[test]
    fn linear_chain_is_valid() {
        let graph = linear(
            &[("trigger", "manual_trigger"), ("action", "http_request")],
            &[("e1", "trigger", "action")],
        );
        let report = check(&graph, Mode::Linear);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn linear_fan_out_is_reported_once() {
        let graph = linear(
            &[
                ("trigger", "manual_trigger"),
                ("action1", "http_request"),
                ("action2", "http_request"),
            ],
            &[("e1", "trigger", "action1"), ("e2", "trigger", "action2")],
        );
        let report = check(&graph, Mode::Linear);

        assert_eq!(report.errors.len(), 1);
        let issue = &report.errors[0];
        assert_eq!(issue.code, IssueCode::LinearFanOut);
        assert_eq!(issue.node_id.as_ref().map(NodeId::as_str), Some("trigger"));
        assert!(issue.message.contains("'trigger'"));
    }

    #[test]
    fn dag_cycle_is_reported_exactly_once() {
        let graph = build(
            Mode::Dag,
            &[("A", "http_request"), ("B", "http_request"), ("C", "http_request")],
            &[("e1", "A", "B"), ("e2", "B", "C"), ("e3", "C", "A")],
        );
        let report = check(&graph, Mode::Dag);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, IssueCode::Cycle);
        assert_eq!(report.errors[0].category, IssueCategory::Topology);
    }

    #[test]
    fn linear_mode_also_rejects_cycles() {
        let graph = linear(
            &[("t", "manual_trigger"), ("a", "http_request"), ("b", "http_request")],
            &[("e1", "t", "a"), ("e2", "a", "b"), ("e3", "b", "a")],
        );
        let report = check(&graph, Mode::Linear);
        assert_eq!(report.errors_with(IssueCode::Cycle).count(), 1);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let graph = build(
            Mode::Dag,
            &[("t", "manual_trigger"), ("a", "http_request")],
            &[("e1", "t", "a"), ("e2", "a", "a")],
        );
        let report = check(&graph, Mode::Dag);
        assert_eq!(report.errors_with(IssueCode::Cycle).count(), 1);
    }

    #[test]
    fn diamond_is_acyclic() {
        let graph = build(
            Mode::Dag,
            &[
                ("t", "manual_trigger"),
                ("l", "http_request"),
                ("r", "http_request"),
                ("j", "output"),
            ],
            &[("e1", "t", "l"), ("e2", "t", "r"), ("e3", "l", "j"), ("e4", "r", "j")],
        );
        let report = check(&graph, Mode::Dag);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn debate_with_two_judges_reports_cardinality() {
        let graph = build(
            Mode::Debate,
            &[
                ("start", "manual_trigger"),
                ("topic", "debate_topic"),
                ("pro", "debate_agent"),
                ("con", "debate_agent"),
                ("judge1", "debate_judge"),
                ("judge2", "debate_judge"),
            ],
            &[
                ("e1", "start", "topic"),
                ("e2", "topic", "pro"),
                ("e3", "topic", "con"),
                ("e4", "pro", "judge1"),
                ("e5", "con", "judge2"),
            ],
        );
        let report = check(&graph, Mode::Debate);

        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert_eq!(report.errors[0].code, IssueCode::ModeConstraint);
        assert!(
            report.errors[0]
                .message
                .contains("expected exactly 1 judge node, found 2")
        );
    }

    #[test]
    fn debate_reports_each_missing_category() {
        let graph = build(
            Mode::Debate,
            &[("start", "manual_trigger"), ("pro", "debate_agent")],
            &[("e1", "start", "pro")],
        );
        let report = check(&graph, Mode::Debate);
        let messages: Vec<_> = report
            .errors_with(IssueCode::ModeConstraint)
            .map(|issue| issue.message.as_str())
            .collect();

        assert_eq!(
            messages,
            vec![
                "expected exactly 1 topic node, found 0",
                "expected at least 2 agent nodes, found 1",
                "expected exactly 1 judge node, found 0",
            ]
        );
    }

    #[test]
    fn debate_agent_minimum_is_configurable() {
        let graph = build(
            Mode::Debate,
            &[
                ("start", "manual_trigger"),
                ("topic", "debate_topic"),
                ("pro", "debate_agent"),
                ("con", "debate_agent"),
                ("judge", "debate_judge"),
            ],
            &[
                ("e1", "start", "topic"),
                ("e2", "topic", "pro"),
                ("e3", "topic", "con"),
                ("e4", "pro", "judge"),
                ("e5", "con", "judge"),
            ],
        );
        let catalog = StaticCatalog::builtin();
        let options = ValidationOptions { debate_min_agents: 3 };
        let report = Validator::new(&catalog, &options).validate(&graph, Mode::Debate);

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("at least 3 agent nodes, found 2"));
        assert!(check(&graph, Mode::Debate).is_valid());
    }

    #[test]
    fn duplicate_ids_are_reported_once_each() {
        let graph = linear(
            &[
                ("t", "manual_trigger"),
                ("a", "http_request"),
                ("a", "http_request"),
                ("a", "http_request"),
            ],
            &[("e1", "t", "a"), ("e1", "t", "a")],
        );
        let report = check(&graph, Mode::Dag);
        let duplicates: Vec<_> = report
            .errors_with(IssueCode::DuplicateId)
            .map(|issue| issue.message.as_str())
            .collect();

        assert_eq!(duplicates, vec!["duplicate node id 'a'", "duplicate edge id 'e1'"]);
    }

    #[test]
    fn dangling_edge_names_missing_endpoint() {
        let graph = linear(
            &[("t", "manual_trigger"), ("a", "http_request")],
            &[("e1", "t", "a"), ("e2", "a", "ghost")],
        );
        let report = check(&graph, Mode::Dag);
        let dangling: Vec<_> = report.errors_with(IssueCode::DanglingEdge).collect();

        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].edge_id.as_ref().map(EdgeId::as_str), Some("e2"));
        assert!(dangling[0].message.contains("'ghost'"));
        assert_eq!(dangling[0].category, IssueCategory::Structural);
    }

    #[test]
    fn isolated_nodes_are_reported_per_node() {
        let graph = linear(
            &[
                ("t", "manual_trigger"),
                ("lonely", "http_request"),
                ("orphan", "output"),
                ("frame", "group"),
            ],
            &[],
        );
        let report = check(&graph, Mode::Dag);
        let isolated: Vec<_> = report
            .errors_with(IssueCode::IsolatedNode)
            .filter_map(|issue| issue.node_id.as_ref().map(NodeId::as_str))
            .collect();

        assert_eq!(isolated, vec!["t", "lonely", "orphan"]);
        assert!(report.errors[0].message.contains("no outgoing edge"));
        assert!(report.errors[1].message.contains("no incoming edge"));
    }

    #[test]
    fn missing_join_is_advisory() {
        let graph = build(
            Mode::Dag,
            &[("t", "manual_trigger"), ("a", "http_request"), ("b", "output")],
            &[("e1", "t", "a"), ("e2", "t", "b")],
        );
        let report = check(&graph, Mode::Dag);

        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, IssueCode::MissingJoin);
        assert_eq!(report.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn unknown_types_warn_and_count_as_functional() {
        let graph = build(
            Mode::Dag,
            &[("t", "manual_trigger"), ("x", "mystery")],
            &[("e1", "t", "x")],
        );
        let report = check(&graph, Mode::Dag);

        assert!(report.is_valid());
        assert_eq!(report.warnings[0].code, IssueCode::UnknownNodeType);
    }

    #[test]
    fn every_violation_is_accumulated() {
        let graph = build(
            Mode::Linear,
            &[("t", "manual_trigger"), ("a", "http_request"), ("b", "http_request")],
            &[("e1", "t", "a"), ("e2", "t", "b"), ("e3", "a", "ghost"), ("e4", "b", "b")],
        );
        let report = check(&graph, Mode::Linear);
        let codes: HashSet<_> = report.errors.iter().map(|issue| issue.code).collect();

        assert!(codes.contains(&IssueCode::DanglingEdge));
        assert!(codes.contains(&IssueCode::Cycle));
        assert!(codes.contains(&IssueCode::LinearFanOut));
    }

    #[test]
    fn report_serializes_validity_flag() {
        let graph = build(Mode::Dag, &[("x", "http_request")], &[]);
        let json = serde_json::to_value(check(&graph, Mode::Dag)).expect("serialize");

        assert_eq!(json["isValid"], false);
        assert_eq!(json["mode"], "DAG");
        assert_eq!(json["errors"][0]["code"], "connectivity-isolated-node");
        assert_eq!(json["errors"][0]["nodeId"], "x");
    }
}
