//! Deterministic hierarchical auto-layout.
//!
//! Nodes are layered by longest path from the roots, ordered within each
//! layer by a barycenter sweep over their predecessors, then spaced evenly.
//! The result depends only on the graph structure, never on positions the
//! input already carries, so applying the layout twice changes nothing.
//!
//! Cycles are tolerated: when the topological walk stalls, the earliest
//! stalled node that already has a placed predecessor is placed anyway and
//! the edges closing the cycle are ignored for ranking.
//!
//! Coordinates are relative. Each layer is centred on the cross axis at 0;
//! fitting the drawing into a viewport is the caller's job.

use crate::definition::WorkflowGraph;
use crate::graph::GraphIndex;
use crate::node::Position;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Flow direction of the layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Layers stack downwards.
    #[default]
    TopDown,
    /// Layers stack to the right.
    LeftRight,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopDown => f.write_str("TOP_DOWN"),
            Self::LeftRight => f.write_str("LEFT_RIGHT"),
        }
    }
}

/// Error returned for an unrecognised direction name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown layout direction '{}', expected top-down or left-right",
            self.0
        )
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "top-down" | "tb" | "td" => Ok(Self::TopDown),
            "left-right" | "lr" => Ok(Self::LeftRight),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Spacing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_height")]
    pub node_height: f64,
    /// Gap between consecutive layers.
    #[serde(default = "default_rank_gap")]
    pub rank_gap: f64,
    /// Gap between neighbours within a layer.
    #[serde(default = "default_node_gap")]
    pub node_gap: f64,
}

fn default_node_width() -> f64 {
    200.0
}

fn default_node_height() -> f64 {
    80.0
}

fn default_rank_gap() -> f64 {
    80.0
}

fn default_node_gap() -> f64 {
    40.0
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: default_node_width(),
            node_height: default_node_height(),
            rank_gap: default_rank_gap(),
            node_gap: default_node_gap(),
        }
    }
}

/// Returns a copy of the graph with every node positioned.
#[instrument(skip(graph, options), fields(workflow_id = %graph.id, nodes = graph.nodes.len()))]
pub fn layout(graph: &WorkflowGraph, direction: Direction, options: &LayoutOptions) -> WorkflowGraph {
    let index = graph.index();
    let order = topological_order(&index);
    let ranks = longest_path_ranks(&index, &order);
    let layers = order_layers(&index, &ranks);

    let (main_step, cross_step) = match direction {
        Direction::TopDown => (
            options.node_height + options.rank_gap,
            options.node_width + options.node_gap,
        ),
        Direction::LeftRight => (
            options.node_width + options.rank_gap,
            options.node_height + options.node_gap,
        ),
    };

    let mut positions = vec![Position::default(); index.node_count()];
    for (rank, layer) in layers.iter().enumerate() {
        let main = rank as f64 * main_step;
        for (slot, node) in layer.iter().enumerate() {
            let cross = centered(slot, layer.len()) * cross_step;
            positions[node.index()] = match direction {
                Direction::TopDown => Position::new(cross, main),
                Direction::LeftRight => Position::new(main, cross),
            };
        }
    }

    debug!(layers = layers.len(), "layout computed");

    let mut laid_out = graph.clone();
    for (node, position) in laid_out.nodes.iter_mut().zip(positions) {
        node.position = Some(position);
    }
    laid_out
}

/// Offset of a slot from the middle of a layer, in slots.
fn centered(slot: usize, len: usize) -> f64 {
    slot as f64 - (len as f64 - 1.0) / 2.0
}

/// Kahn's algorithm that keeps going through cycles.
///
/// Ready nodes are taken in document order. On a stall, the earliest
/// unplaced node with a placed predecessor is forced; if there is none, the
/// earliest unplaced node is.
fn topological_order(index: &GraphIndex<'_>) -> Vec<NodeIndex> {
    let count = index.node_count();
    let mut remaining: Vec<usize> = index
        .node_indices()
        .map(|node| index.predecessors(node).len())
        .collect();
    let mut placed = vec![false; count];
    let mut ready: BTreeSet<usize> = (0..count).filter(|&i| remaining[i] == 0).collect();
    let mut order = Vec::with_capacity(count);

    while order.len() < count {
        let next = match ready.pop_first() {
            Some(next) => next,
            None => {
                let stalled = (0..count).filter(|&i| !placed[i]);
                let frontier = stalled.clone().find(|&i| {
                    index
                        .predecessors(NodeIndex::new(i))
                        .iter()
                        .any(|p| placed[p.index()])
                });
                let Some(forced) = frontier.or_else(|| stalled.clone().next()) else {
                    break;
                };
                debug!(node = %index.node_at(NodeIndex::new(forced)).id, "breaking cycle for layout");
                forced
            }
        };

        placed[next] = true;
        let node = NodeIndex::new(next);
        order.push(node);
        for successor in index.successors(node) {
            let s = successor.index();
            if placed[s] {
                continue;
            }
            remaining[s] = remaining[s].saturating_sub(1);
            if remaining[s] == 0 {
                ready.insert(s);
            }
        }
    }

    order
}

/// Longest path from a root, ignoring edges that point backwards in `order`.
fn longest_path_ranks(index: &GraphIndex<'_>, order: &[NodeIndex]) -> Vec<usize> {
    let mut order_position = vec![0; index.node_count()];
    for (position, node) in order.iter().enumerate() {
        order_position[node.index()] = position;
    }

    let mut ranks = vec![0; index.node_count()];
    for &node in order {
        for successor in index.successors(node) {
            if order_position[successor.index()] > order_position[node.index()] {
                ranks[successor.index()] = ranks[successor.index()].max(ranks[node.index()] + 1);
            }
        }
    }
    ranks
}

/// Groups nodes by rank and orders each layer by predecessor barycenter.
fn order_layers(index: &GraphIndex<'_>, ranks: &[usize]) -> Vec<Vec<NodeIndex>> {
    let layer_count = ranks.iter().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<NodeIndex>> = vec![Vec::new(); layer_count];
    for node in index.node_indices() {
        layers[ranks[node.index()]].push(node);
    }

    let mut cross = vec![0.0; index.node_count()];
    for (rank, layer) in layers.iter_mut().enumerate() {
        if rank > 0 {
            let len = layer.len();
            let mut scored: Vec<(f64, NodeIndex)> = layer
                .iter()
                .enumerate()
                .map(|(slot, &node)| {
                    let placed: Vec<f64> = index
                        .predecessors(node)
                        .into_iter()
                        .filter(|p| ranks[p.index()] < rank)
                        .map(|p| cross[p.index()])
                        .collect();
                    let score = if placed.is_empty() {
                        centered(slot, len)
                    } else {
                        placed.iter().sum::<f64>() / placed.len() as f64
                    };
                    (score, node)
                })
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            *layer = scored.into_iter().map(|(_, node)| node).collect();
        }

        for (slot, node) in layer.iter().enumerate() {
            cross[node.index()] = centered(slot, layer.len());
        }
    }

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Mode;
    use crate::edge::Edge;
    use crate::node::Node;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new("wf", "layout", Mode::Dag);
        for id in nodes {
            graph.nodes.push(Node::new(*id, "http_request", *id));
        }
        for (i, (from, to)) in edges.iter().enumerate() {
            graph.edges.push(Edge::new(format!("e{i}"), *from, *to));
        }
        graph
    }

    fn position(graph: &WorkflowGraph, id: &str) -> (f64, f64) {
        graph
            .nodes
            .iter()
            .find(|node| node.id == id)
            .and_then(|node| node.position)
            .map(|p| (p.x, p.y))
            .unwrap_or((f64::NAN, f64::NAN))
    }

    #[test]
    fn chain_stacks_downwards() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let laid_out = layout(&g, Direction::TopDown, &LayoutOptions::default());

        assert_eq!(position(&laid_out, "a"), (0.0, 0.0));
        assert_eq!(position(&laid_out, "b"), (0.0, 160.0));
        assert_eq!(position(&laid_out, "c"), (0.0, 320.0));
    }

    #[test]
    fn left_right_uses_width_on_main_axis() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let laid_out = layout(&g, Direction::LeftRight, &LayoutOptions::default());

        assert_eq!(position(&laid_out, "a"), (0.0, 0.0));
        assert_eq!(position(&laid_out, "b"), (280.0, 0.0));
    }

    #[test]
    fn siblings_are_centered() {
        let g = graph(
            &["start", "left", "right", "join"],
            &[("start", "left"), ("start", "right"), ("left", "join"), ("right", "join")],
        );
        let laid_out = layout(&g, Direction::TopDown, &LayoutOptions::default());

        assert_eq!(position(&laid_out, "left"), (-120.0, 160.0));
        assert_eq!(position(&laid_out, "right"), (120.0, 160.0));
        assert_eq!(position(&laid_out, "join"), (0.0, 320.0));
    }

    #[test]
    fn rank_is_longest_path() {
        // a -> b -> c and a -> c: c sits below b, not beside it
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        let laid_out = layout(&g, Direction::TopDown, &LayoutOptions::default());
        assert_eq!(position(&laid_out, "c").1, 320.0);
    }

    #[test]
    fn barycenter_untangles_crossing_edges() {
        let g = graph(&["a", "b", "y", "x"], &[("b", "y"), ("a", "x")]);
        let laid_out = layout(&g, Direction::TopDown, &LayoutOptions::default());

        assert!(position(&laid_out, "x").0 < position(&laid_out, "y").0);
    }

    #[test]
    fn cycles_still_get_layered() {
        let g = graph(
            &["a", "d", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d")],
        );
        let laid_out = layout(&g, Direction::TopDown, &LayoutOptions::default());

        assert_eq!(position(&laid_out, "a").1, 0.0);
        assert_eq!(position(&laid_out, "b").1, 160.0);
        assert_eq!(position(&laid_out, "c").1, 320.0);
        assert_eq!(position(&laid_out, "d").1, 480.0);
    }

    #[test]
    fn pure_cycle_without_roots_terminates() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let laid_out = layout(&g, Direction::TopDown, &LayoutOptions::default());
        assert!(laid_out.nodes.iter().all(|node| node.position.is_some()));
        assert_eq!(position(&laid_out, "b").1, 160.0);
    }

    #[test]
    fn layout_ignores_existing_positions() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let mut moved = g.clone();
        moved.nodes[0].position = Some(Position::new(999.0, -5.0));

        let options = LayoutOptions::default();
        let once = layout(&g, Direction::TopDown, &options);
        assert_eq!(layout(&moved, Direction::TopDown, &options), once);
        assert_eq!(layout(&once, Direction::TopDown, &options), once);
    }

    #[test]
    fn input_is_not_modified() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let before = g.clone();
        let _ = layout(&g, Direction::LeftRight, &LayoutOptions::default());
        assert_eq!(g, before);
    }

    #[test]
    fn custom_spacing_is_applied() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let options = LayoutOptions {
            node_height: 50.0,
            rank_gap: 10.0,
            ..LayoutOptions::default()
        };
        let laid_out = layout(&g, Direction::TopDown, &options);
        assert_eq!(position(&laid_out, "b"), (0.0, 60.0));
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("top-down".parse::<Direction>(), Ok(Direction::TopDown));
        assert_eq!("LEFT_RIGHT".parse::<Direction>(), Ok(Direction::LeftRight));
        assert!("diagonal".parse::<Direction>().is_err());
    }
}
