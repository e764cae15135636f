//! Build the level forest from nested-set rows.
//!
//! Rows arrive in depth-first pre-order with an explicit level, so a single
//! pass is enough to recover parent/child links:
//!
//! ```text
//! level value label        level 0: [main/////////]
//! 0     10    main         level 1: [a////][b///]
//! 1     5     a            level 2: [c/]
//! 2     3     c
//! 1     4     b
//! ```
//!
//! Nodes live in one arena and refer to each other by `NodeId`, so parent
//! and child lists are plain index lists.

use crate::parser::ProfileData;
use log::{debug, warn};
use std::collections::HashMap;

/// Index of a node inside its forest's arena
pub type NodeId = usize;

/// One frame occurrence, or several merged ones in derived views
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub label: String,

    /// Offset within the level, in value units
    pub start: f64,

    /// Total value; in diff mode baseline and comparison combined
    pub value: f64,

    /// Self value, combined the same way as `value`
    pub self_value: f64,

    /// Comparison-only total, diff mode only
    pub value_right: Option<f64>,

    /// Comparison-only self, diff mode only
    pub self_right: Option<f64>,

    /// Profile rows merged into this node
    pub item_indexes: Vec<usize>,

    pub children: Vec<NodeId>,

    /// At most one entry in the primary forest
    pub parents: Vec<NodeId>,

    pub level: usize,
}

/// Label to nodes mapping that remembers first-insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelIndex {
    order: Vec<String>,
    nodes: HashMap<String, Vec<NodeId>>,
}

impl LabelIndex {
    pub(crate) fn insert(&mut self, label: &str, node: NodeId) {
        match self.nodes.get_mut(label) {
            Some(list) => list.push(node),
            None => {
                self.order.push(label.to_string());
                self.nodes.insert(label.to_string(), vec![node]);
            }
        }
    }

    /// Nodes carrying `label`, empty if none
    pub fn get(&self, label: &str) -> &[NodeId] {
        self.nodes.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    /// Labels in the order they were first seen
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Level-indexed forest of tree nodes
///
/// Immutable once built; rebuild it when the profile changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    levels: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
    label_index: LabelIndex,
}

impl Forest {
    /// Assemble a forest from an arena whose nodes already carry their links
    pub(crate) fn from_parts(nodes: Vec<TreeNode>, levels: Vec<Vec<NodeId>>) -> Self {
        let mut label_index = LabelIndex::default();
        for level in &levels {
            for &id in level {
                label_index.insert(&nodes[id].label, id);
            }
        }
        let roots: Vec<NodeId> = levels
            .iter()
            .flatten()
            .copied()
            .filter(|&id| nodes[id].parents.is_empty())
            .collect();

        Self {
            nodes,
            levels,
            roots,
            label_index,
        }
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn levels(&self) -> &[Vec<NodeId>] {
        &self.levels
    }

    /// Nodes without a parent, left to right
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn label_index(&self) -> &LabelIndex {
        &self.label_index
    }

    pub fn nodes_with_label(&self, label: &str) -> &[NodeId] {
        self.label_index.get(label)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Sum of all root values
    pub fn total(&self) -> f64 {
        self.roots.iter().map(|&r| self.nodes[r].value).sum()
    }

    /// First parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parents.first().copied()
    }

    /// Walk first parents from `id` (exclusive) up to its root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Node covering `offset` on `level`, if any
    pub fn node_at(&self, level: usize, offset: f64) -> Option<NodeId> {
        let row = self.levels.get(level)?;
        let idx = row.partition_point(|&id| self.nodes[id].start <= offset);
        let candidate = *row.get(idx.checked_sub(1)?)?;
        let node = &self.nodes[candidate];
        (offset < node.start + node.value).then_some(candidate)
    }
}

/// Build the forest from validated rows
///
/// **Public** - main entry point for forest building
///
/// # Algorithm
/// 1. The parent of a row is the nearest open node with a smaller level
/// 2. A first child starts where its parent starts
/// 3. A later sibling starts where the previous sibling ends
/// 4. Each node is registered in its level and in the label index
pub fn build_forest(data: &ProfileData) -> Forest {
    debug!("Building forest from {} profile rows", data.len());

    let mut nodes: Vec<TreeNode> = Vec::with_capacity(data.len());
    let mut levels: Vec<Vec<NodeId>> = Vec::new();
    let mut roots: Vec<NodeId> = Vec::new();
    let mut label_index = LabelIndex::default();
    let mut previous: Option<NodeId> = None;
    let is_diff = data.is_diff();

    for i in 0..data.len() {
        let level = data.level(i);

        let mut parent = previous;
        while let Some(p) = parent {
            if nodes[p].level < level {
                break;
            }
            parent = nodes[p].parents.first().copied();
        }

        let start = match parent {
            Some(p) => {
                if nodes[p].level + 1 != level {
                    warn!(
                        "Row {} jumps from level {} to level {}",
                        i, nodes[p].level, level
                    );
                }
                match nodes[p].children.last() {
                    Some(&sibling) => nodes[sibling].start + nodes[sibling].value,
                    None => nodes[p].start,
                }
            }
            None => match roots.last() {
                Some(&sibling) => nodes[sibling].start + nodes[sibling].value,
                None => 0.0,
            },
        };

        let id = nodes.len();
        nodes.push(TreeNode {
            label: data.label(i).to_string(),
            start,
            value: data.value(i) + data.value_right(i),
            self_value: data.self_value(i) + data.self_right(i),
            value_right: is_diff.then(|| data.value_right(i)),
            self_right: is_diff.then(|| data.self_right(i)),
            item_indexes: vec![i],
            children: Vec::new(),
            parents: parent.into_iter().collect(),
            level,
        });

        match parent {
            Some(p) => nodes[p].children.push(id),
            None => roots.push(id),
        }
        label_index.insert(data.label(i), id);
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(id);
        previous = Some(id);
    }

    if roots.len() > 1 {
        warn!("Profile has {} roots, treating them as separate trees", roots.len());
    }

    debug!(
        "Built forest: {} nodes, {} levels, {} distinct labels",
        nodes.len(),
        levels.len(),
        label_index.len()
    );

    Forest {
        nodes,
        levels,
        roots,
        label_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{validate_frame, DataFrame};

    fn data(levels: &[usize], values: &[f64], labels: &[&str]) -> ProfileData {
        let selfs = vec![0.0; levels.len()];
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        validate_frame(&DataFrame::from_columns(levels, values, &selfs, &labels)).unwrap()
    }

    #[test]
    fn test_empty_profile() {
        let forest = build_forest(&data(&[], &[], &[]));
        assert!(forest.is_empty());
        assert!(forest.levels().is_empty());
        assert_eq!(forest.total(), 0.0);
    }

    #[test]
    fn test_label_index_keeps_reserved_words() {
        let forest = build_forest(&data(
            &[0, 1, 1],
            &[3.0, 1.0, 1.0],
            &["constructor", "__proto__", "constructor"],
        ));

        assert_eq!(forest.nodes_with_label("constructor"), &[0, 2]);
        assert_eq!(forest.nodes_with_label("__proto__"), &[1]);
        assert!(forest.nodes_with_label("toString").is_empty());
        let labels: Vec<&str> = forest.label_index().labels().collect();
        assert_eq!(labels, vec!["constructor", "__proto__"]);
    }

    #[test]
    fn test_multiple_roots_sit_side_by_side() {
        let forest = build_forest(&data(&[0, 1, 0], &[4.0, 2.0, 3.0], &["a", "b", "c"]));

        assert_eq!(forest.roots(), &[0, 2]);
        assert_eq!(forest.node(2).start, 4.0);
        assert!(forest.node(2).parents.is_empty());
        assert_eq!(forest.total(), 7.0);
    }

    #[test]
    fn test_level_gap_is_tolerated() {
        let forest = build_forest(&data(&[0, 2, 1], &[4.0, 1.0, 2.0], &["a", "b", "c"]));

        assert_eq!(forest.depth(), 3);
        assert_eq!(forest.parent(1), Some(0));
        assert_eq!(forest.parent(2), Some(0));
        assert_eq!(forest.node(2).start, 1.0);
    }

    #[test]
    fn test_node_at() {
        let forest = build_forest(&data(&[0, 1, 1], &[10.0, 5.0, 4.0], &["a", "b", "c"]));

        assert_eq!(forest.node_at(0, 9.5), Some(0));
        assert_eq!(forest.node_at(1, 0.0), Some(1));
        assert_eq!(forest.node_at(1, 5.0), Some(2));
        assert_eq!(forest.node_at(1, 9.5), None);
        assert_eq!(forest.node_at(3, 1.0), None);
    }

    #[test]
    fn test_ancestors() {
        let forest = build_forest(&data(&[0, 1, 2], &[3.0, 2.0, 1.0], &["a", "b", "c"]));
        let chain: Vec<NodeId> = forest.ancestors(2).collect();
        assert_eq!(chain, vec![1, 0]);
    }
}
