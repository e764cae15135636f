//! Deduplicated call graph built from the forest.
//!
//! Every distinct label becomes one graph node whose self and total are
//! summed over all its occurrences. An edge runs from a caller label to a
//! callee label. Roots are not part of the graph, and neither direct
//! self-recursion nor calls made by a root produce edges.

use crate::aggregator::Forest;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Index of a node in a call graph
pub type GraphNodeId = usize;

/// Index of an edge in a call graph
pub type EdgeId = usize;

/// One label, merged over all its occurrences
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub label: String,
    pub self_value: f64,
    pub value: f64,
    pub parent_edges: Vec<EdgeId>,
    pub child_edges: Vec<EdgeId>,
}

/// Caller to callee value flow
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: GraphNodeId,
    pub to: GraphNodeId,
    pub weight: f64,
    /// Stands in for a path through nodes that were trimmed away
    pub residual: bool,
}

/// Label-keyed graph with index-linked nodes and edges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallGraph {
    nodes: Vec<GraphNode>,
    node_index: HashMap<String, GraphNodeId>,
    edges: Vec<GraphEdge>,
    edge_index: HashMap<(GraphNodeId, GraphNodeId), EdgeId>,
}

impl CallGraph {
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: GraphNodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn edge(&self, id: EdgeId) -> &GraphEdge {
        &self.edges[id]
    }

    pub fn node_id(&self, label: &str) -> Option<GraphNodeId> {
        self.node_index.get(label).copied()
    }

    pub fn node_by_label(&self, label: &str) -> Option<&GraphNode> {
        self.node_id(label).map(|id| &self.nodes[id])
    }

    pub fn edge_id(&self, from: GraphNodeId, to: GraphNodeId) -> Option<EdgeId> {
        self.edge_index.get(&(from, to)).copied()
    }

    /// Edge between two labels, if any
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&GraphEdge> {
        let id = self.edge_id(self.node_id(from)?, self.node_id(to)?)?;
        Some(&self.edges[id])
    }

    /// Display key of an edge, `"{from}-{to}"`
    pub fn edge_key(&self, edge: &GraphEdge) -> String {
        format!("{}-{}", self.nodes[edge.from].label, self.nodes[edge.to].label)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn get_or_create_node(&mut self, label: &str) -> GraphNodeId {
        if let Some(&id) = self.node_index.get(label) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(GraphNode {
            label: label.to_string(),
            self_value: 0.0,
            value: 0.0,
            parent_edges: Vec::new(),
            child_edges: Vec::new(),
        });
        self.node_index.insert(label.to_string(), id);
        id
    }

    /// Add `weight` to the edge, creating and linking it on first use
    pub(crate) fn add_to_edge(
        &mut self,
        from: GraphNodeId,
        to: GraphNodeId,
        weight: f64,
        residual: bool,
    ) -> EdgeId {
        if let Some(&id) = self.edge_index.get(&(from, to)) {
            let edge = &mut self.edges[id];
            edge.weight += weight;
            edge.residual |= residual;
            return id;
        }

        let id = self.edges.len();
        self.edges.push(GraphEdge {
            from,
            to,
            weight,
            residual,
        });
        self.edge_index.insert((from, to), id);
        self.nodes[from].child_edges.push(id);
        self.nodes[to].parent_edges.push(id);
        id
    }
}

/// Build the deduplicated call graph of a forest
///
/// **Public** - main entry point for graph building
///
/// Edge weights accumulate the caller occurrence's total once per call
/// site, so a caller reaching the same callee label twice counts twice.
pub fn build_call_graph(forest: &Forest) -> CallGraph {
    let mut graph = CallGraph::default();
    let root_labels: HashSet<&str> = forest
        .roots()
        .iter()
        .map(|&r| forest.node(r).label.as_str())
        .collect();

    for (id, node) in forest.nodes().iter().enumerate() {
        let Some(parent) = forest.parent(id) else {
            continue;
        };

        let current = graph.get_or_create_node(&node.label);
        graph.nodes[current].self_value += node.self_value;
        graph.nodes[current].value += node.value;

        let parent_node = forest.node(parent);
        if parent_node.label == node.label || root_labels.contains(parent_node.label.as_str()) {
            continue;
        }

        let caller = graph.get_or_create_node(&parent_node.label);
        graph.add_to_edge(caller, current, parent_node.value, false);
    }

    debug!(
        "Built call graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );

    graph
}

/// Copy the kept nodes, in the given order, and the given edges
///
/// Indexes are renumbered; edges whose endpoints are not kept are dropped.
pub(crate) fn compact(
    graph: &CallGraph,
    kept_nodes: &[GraphNodeId],
    kept_edges: impl IntoIterator<Item = EdgeId>,
) -> CallGraph {
    let mut compacted = CallGraph::default();
    let mut renumbered: HashMap<GraphNodeId, GraphNodeId> = HashMap::new();

    for &old in kept_nodes {
        let source = &graph.nodes[old];
        let new = compacted.get_or_create_node(&source.label);
        compacted.nodes[new].self_value = source.self_value;
        compacted.nodes[new].value = source.value;
        renumbered.insert(old, new);
    }

    for id in kept_edges {
        let edge = &graph.edges[id];
        if let (Some(&from), Some(&to)) = (renumbered.get(&edge.from), renumbered.get(&edge.to)) {
            compacted.add_to_edge(from, to, edge.weight, edge.residual);
        }
    }

    compacted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_forest;
    use crate::parser::{parse_text_diagram, validate_frame};

    fn forest(diagram: &str) -> Forest {
        build_forest(&validate_frame(&parse_text_diagram(diagram).unwrap()).unwrap())
    }

    #[test]
    fn test_root_is_excluded() {
        let forest = forest(
            "
            [r//////]
            [a//////]
            [b/]
            ",
        );
        let graph = build_call_graph(&forest);

        assert!(graph.node_by_label("r").is_none());
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edge_key(&graph.edges()[0]), "a-b");
    }

    #[test]
    fn test_self_recursion_has_no_edge() {
        let forest = forest(
            "
            [r//////]
            [f//////]
            [f////]
            [g/]
            ",
        );
        let graph = build_call_graph(&forest);

        let f = graph.node_by_label("f").unwrap();
        assert_eq!(f.value, 16.0);
        assert!(graph.edge_between("f", "f").is_none());
        assert!(graph.edges().iter().all(|e| e.from != e.to));
        assert_eq!(graph.edge_between("f", "g").unwrap().weight, 7.0);
    }

    #[test]
    fn test_add_to_edge_links_once() {
        let mut graph = CallGraph::default();
        let a = graph.get_or_create_node("a");
        let b = graph.get_or_create_node("b");

        let first = graph.add_to_edge(a, b, 2.0, false);
        let second = graph.add_to_edge(a, b, 3.0, true);

        assert_eq!(first, second);
        assert_eq!(graph.edge(first).weight, 5.0);
        assert!(graph.edge(first).residual);
        assert_eq!(graph.node(a).child_edges, vec![first]);
        assert_eq!(graph.node(b).parent_edges, vec![first]);
    }
}
