//! Property tests over randomly generated workflow graphs.

use flowstudio_workflow::{
    Direction, DiffStatus, Edge, IssueCode, LayoutOptions, Mode, Node, StaticCatalog,
    WorkflowGraph, diff, layout, upstream_of, validate,
};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build(node_count: usize, edges: &[(usize, usize)]) -> WorkflowGraph {
    let mut graph = WorkflowGraph::new("wf_prop", "generated", Mode::Dag);
    for i in 0..node_count {
        graph
            .nodes
            .push(Node::new(format!("n{i}"), "http_request", format!("step {i}")));
    }
    for (i, (from, to)) in edges.iter().enumerate() {
        graph
            .edges
            .push(Edge::new(format!("e{i}"), format!("n{from}"), format!("n{to}")));
    }
    graph
}

/// A graph with 1..12 nodes and arbitrary edges between them.
fn arb_graph() -> impl Strategy<Value = WorkflowGraph> {
    (1usize..12).prop_flat_map(|count| {
        prop::collection::vec((0..count, 0..count), 0..24)
            .prop_map(move |edges| build(count, &edges))
    })
}

/// A graph whose edges only point from lower to higher index.
fn arb_acyclic_graph() -> impl Strategy<Value = WorkflowGraph> {
    (2usize..12).prop_flat_map(|count| {
        prop::collection::vec((0..count, 0..count), 0..24).prop_map(move |pairs| {
            let edges: Vec<_> = pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect();
            build(count, &edges)
        })
    })
}

fn has_cycle(graph: &WorkflowGraph) -> bool {
    let mut g = DiGraph::<(), ()>::new();
    let nodes: Vec<_> = graph.nodes.iter().map(|_| g.add_node(())).collect();
    let position = |id: &str| graph.nodes.iter().position(|n| n.id == id);
    for edge in &graph.edges {
        if let (Some(from), Some(to)) = (position(edge.from.as_str()), position(edge.to.as_str())) {
            g.add_edge(nodes[from], nodes[to], ());
        }
    }
    is_cyclic_directed(&g)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Layout positions every node, ignores prior positions and is stable.
    #[test]
    fn layout_is_total_and_idempotent(graph in arb_graph(), left_right in any::<bool>()) {
        let direction = if left_right { Direction::LeftRight } else { Direction::TopDown };
        let options = LayoutOptions::default();

        let once = layout(&graph, direction, &options);
        prop_assert!(once.nodes.iter().all(|node| node.position.is_some()));
        prop_assert_eq!(&layout(&once, direction, &options), &once);
        prop_assert_eq!(&layout(&graph, direction, &options), &once);
    }

    /// No two nodes share a position.
    #[test]
    fn layout_does_not_overlap_nodes(graph in arb_graph()) {
        let laid_out = layout(&graph, Direction::TopDown, &LayoutOptions::default());
        let mut seen = HashSet::new();
        for node in &laid_out.nodes {
            let position = node.position.unwrap_or_default();
            prop_assert!(seen.insert((position.x.to_bits(), position.y.to_bits())));
        }
    }

    /// The validator reports a cycle exactly when the resolved graph has one.
    #[test]
    fn cycle_detection_matches_graph_structure(graph in arb_graph()) {
        let report = validate(&graph, Mode::Dag, &StaticCatalog::builtin());
        let reported = report.errors_with(IssueCode::Cycle).count() > 0;
        prop_assert_eq!(reported, has_cycle(&graph));
    }

    /// Forward-only graphs never produce cycle errors.
    #[test]
    fn acyclic_graphs_have_no_cycle_errors(graph in arb_acyclic_graph()) {
        let report = validate(&graph, Mode::Linear, &StaticCatalog::builtin());
        prop_assert_eq!(report.errors_with(IssueCode::Cycle).count(), 0);
    }

    /// A graph compared with itself is entirely unchanged.
    #[test]
    fn diff_is_reflexive(graph in arb_graph()) {
        let result = diff(&graph, &graph);
        prop_assert!(!result.stats.has_changes());
        prop_assert_eq!(result.stats.unchanged, graph.nodes.len());
        prop_assert!(result
            .merged
            .nodes
            .iter()
            .all(|node| node.diff_status == Some(DiffStatus::Unchanged)));
    }

    /// Every node of either side appears in the merged graph exactly once.
    #[test]
    fn diff_covers_both_sides(base in arb_graph(), target in arb_graph()) {
        let result = diff(&base, &target);
        let merged: HashSet<_> = result.merged.nodes.iter().map(|n| n.id.clone()).collect();

        prop_assert_eq!(merged.len(), result.merged.nodes.len());
        for node in base.nodes.iter().chain(&target.nodes) {
            prop_assert!(merged.contains(&node.id));
        }
        prop_assert_eq!(result.stats.total(), result.merged.nodes.len());
    }

    /// The queried node is never upstream of itself.
    #[test]
    fn upstream_excludes_the_query(graph in arb_graph(), pick in any::<prop::sample::Index>()) {
        let node = &graph.nodes[pick.index(graph.nodes.len())];
        let upstream = upstream_of(&graph, node.id.as_str());
        prop_assert!(upstream.iter().all(|u| u.node.id != node.id));
    }

    /// Adding an edge never shrinks an upstream set.
    #[test]
    fn upstream_is_monotonic(
        graph in arb_graph(),
        pick in any::<prop::sample::Index>(),
        extra in any::<(prop::sample::Index, prop::sample::Index)>(),
    ) {
        let count = graph.nodes.len();
        let node = graph.nodes[pick.index(count)].id.clone();
        let before: HashSet<_> = upstream_of(&graph, node.as_str())
            .into_iter()
            .map(|u| u.node.id.clone())
            .collect();

        let mut grown = graph.clone();
        grown.edges.push(Edge::new(
            "e_extra",
            graph.nodes[extra.0.index(count)].id.clone(),
            graph.nodes[extra.1.index(count)].id.clone(),
        ));
        let after: HashSet<_> = upstream_of(&grown, node.as_str())
            .into_iter()
            .map(|u| u.node.id.clone())
            .collect();

        prop_assert!(before.is_subset(&after));
    }
}
