//! Entropy-based trimming of the call graph.
//!
//! 1. Nodes below the absolute node cutoff are dropped.
//! 2. The rest are scored on the graph left after the cutoff, ranked and
//!    cut to `max_nodes` according to the configured `TrimSelection`.
//! 3. The original forest is walked again; a kept node whose direct
//!    caller was dropped gets a residual edge from its nearest kept
//!    ancestor.
//! 4. Residual edges that duplicate an existing route are removed, then
//!    edges to dropped nodes and edges under the edge cutoff go too.

use super::builder::{compact, CallGraph, EdgeId, GraphEdge, GraphNodeId};
use crate::aggregator::Forest;
use crate::utils::config::{GraphTrimConfig, TrimSelection};
use log::debug;
use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

/// Absolute trimming limits
#[derive(Debug, Clone, PartialEq)]
pub struct TrimOptions {
    pub node_cutoff: f64,
    pub edge_cutoff: f64,
    /// 0 disables the node limit
    pub max_nodes: usize,
    pub selection: TrimSelection,
}

impl TrimOptions {
    /// Resolve cutoff fractions against the profile total
    pub fn from_config(config: &GraphTrimConfig, total: f64) -> Self {
        Self {
            node_cutoff: total * config.node_cutoff_fraction,
            edge_cutoff: total * config.edge_cutoff_fraction,
            max_nodes: config.max_nodes,
            selection: config.selection,
        }
    }
}

/// Shannon entropy of a set of edge weights, `self_value` counted as one more
pub fn edge_entropy_score(graph: &CallGraph, edges: &[EdgeId], self_value: f64) -> f64 {
    let weights: Vec<f64> = edges.iter().map(|&e| graph.edge(e).weight.abs()).collect();
    let total = self_value.abs() + weights.iter().sum::<f64>();
    if total == 0.0 {
        return 0.0;
    }

    let mut score: f64 = weights
        .iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| {
            let fraction = w / total;
            -fraction * fraction.log2()
        })
        .sum();

    if self_value > 0.0 {
        let fraction = self_value / total;
        score += -fraction * fraction.log2();
    }

    score
}

/// Importance of a node for the trimmed view
///
/// `(parent entropy + child entropy) * value + self`, where a side with no
/// edges contributes 0 and the child side counts self as an extra edge.
pub fn entropy_score(graph: &CallGraph, id: GraphNodeId) -> f64 {
    score_with_edges(graph, id, |_| true)
}

/// `entropy_score` over the edges accepted by `counts`
fn score_with_edges(
    graph: &CallGraph,
    id: GraphNodeId,
    counts: impl Fn(&GraphEdge) -> bool,
) -> f64 {
    let node = graph.node(id);
    let parent_edges: Vec<EdgeId> = node
        .parent_edges
        .iter()
        .copied()
        .filter(|&e| counts(graph.edge(e)))
        .collect();
    let child_edges: Vec<EdgeId> = node
        .child_edges
        .iter()
        .copied()
        .filter(|&e| counts(graph.edge(e)))
        .collect();

    let parent_score = if parent_edges.is_empty() {
        0.0
    } else {
        edge_entropy_score(graph, &parent_edges, 0.0)
    };
    let child_score = if child_edges.is_empty() {
        0.0
    } else {
        edge_entropy_score(graph, &child_edges, node.self_value)
    };

    (parent_score + child_score) * node.value + node.self_value
}

/// Node ids ordered best first
///
/// Score descending, then label ascending, then self descending.
pub fn rank_nodes(graph: &CallGraph, scores: &[f64], ids: &mut [GraphNodeId]) {
    ids.sort_by(|&a, &b| {
        let (na, nb) = (graph.node(a), graph.node(b));
        scores[b]
            .total_cmp(&scores[a])
            .then_with(|| na.label.cmp(&nb.label))
            .then_with(|| nb.self_value.total_cmp(&na.self_value))
            .then_with(|| na.label.cmp(&nb.label))
    });
}

/// Entropy score of every node, indexed by node id
pub fn score_nodes(graph: &CallGraph) -> Vec<f64> {
    (0..graph.len()).map(|id| entropy_score(graph, id)).collect()
}

/// Entropy scores of the graph restricted to `kept` nodes
///
/// Only edges between two kept nodes count. Dropped nodes score 0.
pub fn score_kept_nodes(graph: &CallGraph, kept: &[bool]) -> Vec<f64> {
    (0..graph.len())
        .map(|id| {
            if kept[id] {
                score_with_edges(graph, id, |e| kept[e.from] && kept[e.to])
            } else {
                0.0
            }
        })
        .collect()
}

/// Apply the node cutoff and the `max_nodes` selection
///
/// Returns the surviving node ids, best first.
pub fn select_nodes(graph: &CallGraph, scores: &[f64], options: &TrimOptions) -> Vec<GraphNodeId> {
    let mut candidates: Vec<GraphNodeId> = (0..graph.len())
        .filter(|&id| graph.node(id).value >= options.node_cutoff)
        .collect();
    rank_nodes(graph, scores, &mut candidates);

    match options.selection {
        TrimSelection::SkipTop => candidates.iter().skip(options.max_nodes).copied().collect(),
        TrimSelection::KeepTop if options.max_nodes == 0 => candidates,
        TrimSelection::KeepTop => candidates.iter().take(options.max_nodes).copied().collect(),
    }
}

/// Trim a deduplicated graph down to its significant part
///
/// **Public** - main entry point for trimming
///
/// Scores are taken after the node cutoff, so edges to nodes under the
/// cutoff do not raise their callers' rank.
pub fn trim_graph(graph: &CallGraph, forest: &Forest, options: &TrimOptions) -> CallGraph {
    let above_cutoff: Vec<bool> = graph
        .nodes()
        .iter()
        .map(|n| n.value >= options.node_cutoff)
        .collect();
    let scores = score_kept_nodes(graph, &above_cutoff);
    let selected = select_nodes(graph, &scores, options);

    debug!(
        "Trimming call graph: {} of {} nodes kept ({:?}, max {})",
        selected.len(),
        graph.len(),
        options.selection,
        options.max_nodes
    );

    retain_nodes(graph, forest, &scores, &selected, options.edge_cutoff)
}

/// Keep only `selected` nodes, reconnecting them with residual edges
///
/// `selected` also fixes the node order of the result.
pub fn retain_nodes(
    graph: &CallGraph,
    forest: &Forest,
    scores: &[f64],
    selected: &[GraphNodeId],
    edge_cutoff: f64,
) -> CallGraph {
    let mut kept = vec![false; graph.len()];
    for &id in selected {
        kept[id] = true;
    }

    let mut working = graph.clone();
    add_residual_edges(&mut working, forest, &kept);

    let mut alive = vec![true; working.edges().len()];
    remove_redundant_edges(&working, scores, &kept, &mut alive);

    let surviving = (0..working.edges().len()).filter(|&e| {
        let edge = working.edge(e);
        alive[e] && kept[edge.from] && kept[edge.to] && edge.weight >= edge_cutoff
    });

    let trimmed = compact(&working, selected, surviving);

    debug!(
        "Trimmed call graph: {} nodes, {} edges ({} residual)",
        trimmed.len(),
        trimmed.edges().len(),
        trimmed.edges().iter().filter(|e| e.residual).count()
    );

    trimmed
}

/// Reconnect kept nodes whose direct caller was dropped
///
/// **Private** - step 3 of trim_graph
fn add_residual_edges(graph: &mut CallGraph, forest: &Forest, kept: &[bool]) {
    // (tree node, nearest kept graph ancestor above it)
    let mut stack: Vec<(usize, Option<GraphNodeId>)> =
        forest.roots().iter().rev().map(|&r| (r, None)).collect();

    while let Some((id, nearest)) = stack.pop() {
        let node = forest.node(id);
        let is_root = node.parents.is_empty();
        let own = if is_root {
            None
        } else {
            graph.node_id(&node.label)
        };
        let own_kept = own.filter(|&g| kept[g]);

        if let (Some(current), Some(parent)) = (own_kept, forest.parent(id)) {
            let parent_node = forest.node(parent);
            let parent_kept = !parent_node.parents.is_empty()
                && graph.node_id(&parent_node.label).is_some_and(|g| kept[g]);

            if !parent_kept {
                if let Some(ancestor) = nearest.filter(|&a| a != current) {
                    graph.add_to_edge(ancestor, current, node.value, true);
                }
            }
        }

        let below = own_kept.or(nearest);
        for &child in node.children.iter().rev() {
            stack.push((child, below));
        }
    }
}

/// Drop residual edges already implied by another route
///
/// Nodes are visited from the lowest score up. Incoming edges are checked
/// residual first, heaviest first, and the scan stops at the first direct
/// edge.
///
/// **Private** - step 4 of trim_graph
fn remove_redundant_edges(graph: &CallGraph, scores: &[f64], kept: &[bool], alive: &mut [bool]) {
    let mut order: Vec<GraphNodeId> = (0..graph.len()).collect();
    rank_nodes(graph, scores, &mut order);
    order.reverse();

    for id in order {
        let mut incoming: Vec<EdgeId> = live_incoming(graph, id, kept, alive).collect();
        incoming.sort_by(|&a, &b| {
            let (ea, eb) = (graph.edge(a), graph.edge(b));
            eb.residual
                .cmp(&ea.residual)
                .then_with(|| eb.weight.partial_cmp(&ea.weight).unwrap_or(Ordering::Equal))
        });

        for edge in incoming {
            if !graph.edge(edge).residual {
                break;
            }
            if is_redundant_edge(graph, edge, kept, alive) {
                alive[edge] = false;
            }
        }
    }
}

/// True if `edge.from` still reaches `edge.to` without this edge
pub(crate) fn is_redundant_edge(
    graph: &CallGraph,
    edge: EdgeId,
    kept: &[bool],
    alive: &[bool],
) -> bool {
    let source = graph.edge(edge).from;
    let target = graph.edge(edge).to;

    let mut seen: HashSet<GraphNodeId> = HashSet::from([target]);
    let mut queue = VecDeque::from([target]);

    while let Some(current) = queue.pop_front() {
        for other in live_incoming(graph, current, kept, alive) {
            let from = graph.edge(other).from;
            if other == edge || seen.contains(&from) {
                continue;
            }
            if from == source {
                return true;
            }
            seen.insert(from);
            queue.push_back(from);
        }
    }

    false
}

/// Incoming edges that are still alive and come from a kept node
fn live_incoming<'a>(
    graph: &'a CallGraph,
    id: GraphNodeId,
    kept: &'a [bool],
    alive: &'a [bool],
) -> impl Iterator<Item = EdgeId> + 'a {
    graph
        .node(id)
        .parent_edges
        .iter()
        .copied()
        .filter(move |&e| alive[e] && kept[graph.edge(e).from])
}
