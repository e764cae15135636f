//! One profile with everything derived from it.

use super::collapse::{build_collapsed_map, CollapsedMap};
use super::forest_builder::{build_forest, Forest, NodeId};
use super::metrics::{build_label_table, LabelStats};
use super::sandwich::{build_sandwich, SandwichView};
use crate::callgraph::{build_call_graph, trim_graph, CallGraph, TrimOptions};
use crate::parser::ProfileData;
use crate::utils::config::{GraphTrimConfig, ViewConfig};
use log::debug;

/// Profile rows, their forest and the current collapse state
///
/// The forest is built once; views are derived from it on demand.
#[derive(Debug, Clone)]
pub struct FlameGraphData {
    data: ProfileData,
    forest: Forest,
    collapsed: CollapsedMap,
}

impl FlameGraphData {
    pub fn new(data: ProfileData, config: &ViewConfig) -> Self {
        let forest = build_forest(&data);
        let collapsed = build_collapsed_map(&forest, &config.collapsing);
        Self {
            data,
            forest,
            collapsed,
        }
    }

    pub fn data(&self) -> &ProfileData {
        &self.data
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn is_diff(&self) -> bool {
        self.data.is_diff()
    }

    pub fn levels(&self) -> &[Vec<NodeId>] {
        self.forest.levels()
    }

    pub fn nodes_with_label(&self, label: &str) -> &[NodeId] {
        self.forest.nodes_with_label(label)
    }

    pub fn sandwich_levels(&self, label: &str) -> SandwichView {
        build_sandwich(&self.forest, label)
    }

    pub fn collapsed_map(&self) -> &CollapsedMap {
        &self.collapsed
    }

    /// Replace the collapse state, typically with the result of a toggle
    pub fn set_collapsed_map(&mut self, collapsed: CollapsedMap) {
        self.collapsed = collapsed;
    }

    /// Deduplicated call graph, trimmed per `config`
    pub fn call_graph(&self, config: &GraphTrimConfig) -> CallGraph {
        let graph = build_call_graph(&self.forest);
        let options = TrimOptions::from_config(config, self.forest.total());
        debug!("Trimming call graph with {:?}", options);
        trim_graph(&graph, &self.forest, &options)
    }

    pub fn label_table(&self, top_n: usize) -> Vec<LabelStats> {
        build_label_table(&self.forest, top_n)
    }
}
