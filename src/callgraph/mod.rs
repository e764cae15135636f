//! Label-deduplicated call graph and its entropy-based trimming.

pub mod builder;
pub mod trim;

pub use builder::{build_call_graph, CallGraph, EdgeId, GraphEdge, GraphNode, GraphNodeId};
pub use trim::{
    edge_entropy_score, entropy_score, rank_nodes, retain_nodes, score_kept_nodes, score_nodes,
    select_nodes, trim_graph, TrimOptions,
};
