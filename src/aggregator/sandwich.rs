//! Sandwich views: merged callers and callees of one label.
//!
//! Every occurrence of the target label is taken as a subtree root. The
//! callees view merges the subtrees below the occurrences; the callers
//! view merges the ancestor chains above them and is returned inverted,
//! with the outermost callers on level 0 and the target on the deepest
//! level. In both views the target's merged node carries the summed value
//! of all occurrences, so it is the 100% of the view.

use super::forest_builder::{Forest, NodeId, TreeNode};
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Callers and callees of one label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SandwichView {
    pub callers: Forest,
    pub callees: Forest,
}

impl SandwichView {
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty() && self.callees.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Children,
    Parents,
}

impl Direction {
    fn next(self, node: &TreeNode) -> &[NodeId] {
        match self {
            Direction::Children => &node.children,
            Direction::Parents => &node.parents,
        }
    }

    fn next_mut(self, node: &mut TreeNode) -> &mut Vec<NodeId> {
        match self {
            Direction::Children => &mut node.children,
            Direction::Parents => &mut node.parents,
        }
    }

    fn back_mut(self, node: &mut TreeNode) -> &mut Vec<NodeId> {
        match self {
            Direction::Children => &mut node.parents,
            Direction::Parents => &mut node.children,
        }
    }
}

struct Pending {
    previous: Option<NodeId>,
    items: Vec<NodeId>,
    level: usize,
}

/// Build both sandwich views for `label`
///
/// **Public** - main entry point; empty views if the label never occurs
pub fn build_sandwich(forest: &Forest, label: &str) -> SandwichView {
    let occurrences = forest.nodes_with_label(label);
    if occurrences.is_empty() {
        debug!("No occurrences of `{}`, sandwich is empty", label);
        return SandwichView::default();
    }

    debug!(
        "Building sandwich for `{}` from {} occurrences",
        label,
        occurrences.len()
    );

    SandwichView {
        callers: merge_callers(forest, occurrences),
        callees: merge_callees(forest, occurrences),
    }
}

/// Merge the subtrees below the given roots
pub fn merge_callees(forest: &Forest, roots: &[NodeId]) -> Forest {
    merge_subtrees(forest.nodes(), roots, Direction::Children)
}

/// Merge the ancestor chains above the given roots, inverted
pub fn merge_callers(forest: &Forest, roots: &[NodeId]) -> Forest {
    let (chains, heads) = parent_chains(forest, roots);
    merge_subtrees(&chains, &heads, Direction::Parents)
}

/// Copy each root's ancestor chain, sized to the root
///
/// An ancestor only contributed the root's value to the root, so every
/// copied ancestor takes the value of the occurrence it leads to and has
/// no self of its own.
///
/// **Private** - internal helper for merge_callers
fn parent_chains(forest: &Forest, roots: &[NodeId]) -> (Vec<TreeNode>, Vec<NodeId>) {
    let mut chains: Vec<TreeNode> = Vec::new();
    let mut heads = Vec::with_capacity(roots.len());

    for &root in roots {
        let occurrence = forest.node(root);
        let head = chains.len();
        chains.push(TreeNode {
            children: Vec::new(),
            parents: Vec::new(),
            ..occurrence.clone()
        });
        heads.push(head);

        let mut child = head;
        for ancestor in forest.ancestors(root) {
            let original = forest.node(ancestor);
            let copy = chains.len();
            chains.push(TreeNode {
                label: original.label.clone(),
                start: original.start,
                value: occurrence.value,
                self_value: 0.0,
                value_right: occurrence.value_right,
                self_right: occurrence.self_right.map(|_| 0.0),
                item_indexes: original.item_indexes.clone(),
                children: vec![child],
                parents: Vec::new(),
                level: original.level,
            });
            chains[child].parents.push(copy);
            child = copy;
        }
    }

    (chains, heads)
}

/// Merge mergeable subtrees into one leveled forest
///
/// The roots must share a label. Walking breadth-first in `direction`,
/// items reached from the same merged node are grouped by label and each
/// group becomes one node whose values are the sums of its members.
///
/// **Private** - shared by both sandwich sides
fn merge_subtrees(arena: &[TreeNode], roots: &[NodeId], direction: Direction) -> Forest {
    let mut nodes: Vec<TreeNode> = Vec::new();
    let mut levels: Vec<Vec<NodeId>> = Vec::new();
    let mut queue = VecDeque::from([Pending {
        previous: None,
        items: roots.to_vec(),
        level: 0,
    }]);

    while let Some(pending) = queue.pop_front() {
        let members: Vec<&TreeNode> = pending.items.iter().map(|&i| &arena[i]).collect();
        let Some(first) = members.first() else {
            continue;
        };
        let is_diff = first.value_right.is_some();

        let start = match pending.previous {
            Some(prev) => {
                let placed: f64 = direction
                    .next(&nodes[prev])
                    .iter()
                    .map(|&s| nodes[s].value)
                    .sum();
                nodes[prev].start + placed
            }
            None => 0.0,
        };

        let id = nodes.len();
        let mut merged = TreeNode {
            label: first.label.clone(),
            start,
            value: members.iter().map(|m| m.value).sum(),
            self_value: members.iter().map(|m| m.self_value).sum(),
            value_right: is_diff
                .then(|| members.iter().map(|m| m.value_right.unwrap_or(0.0)).sum()),
            self_right: is_diff
                .then(|| members.iter().map(|m| m.self_right.unwrap_or(0.0)).sum()),
            item_indexes: members.iter().flat_map(|m| m.item_indexes.iter().copied()).collect(),
            children: Vec::new(),
            parents: Vec::new(),
            level: pending.level,
        };
        if let Some(prev) = pending.previous {
            direction.back_mut(&mut merged).push(prev);
        }
        nodes.push(merged);
        if let Some(prev) = pending.previous {
            direction.next_mut(&mut nodes[prev]).push(id);
        }

        if levels.len() <= pending.level {
            levels.resize_with(pending.level + 1, Vec::new);
        }
        levels[pending.level].push(id);

        // Group the next step by label, in first-seen order
        let mut groups: Vec<Vec<NodeId>> = Vec::new();
        let mut group_of: HashMap<&str, usize> = HashMap::new();
        for member in &members {
            for &next in direction.next(member) {
                let label = arena[next].label.as_str();
                match group_of.get(label) {
                    Some(&g) => groups[g].push(next),
                    None => {
                        group_of.insert(label, groups.len());
                        groups.push(vec![next]);
                    }
                }
            }
        }

        for items in groups {
            queue.push_back(Pending {
                previous: Some(id),
                items,
                level: pending.level + 1,
            });
        }
    }

    if direction == Direction::Parents {
        levels.reverse();
        for (index, level) in levels.iter().enumerate() {
            for &id in level {
                nodes[id].level = index;
            }
        }
    }

    Forest::from_parts(nodes, levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::forest_builder::build_forest;
    use crate::parser::{parse_text_diagram, validate_frame};

    fn forest(diagram: &str) -> Forest {
        build_forest(&validate_frame(&parse_text_diagram(diagram).unwrap()).unwrap())
    }

    fn labels(forest: &Forest) -> Vec<Vec<String>> {
        forest
            .levels()
            .iter()
            .map(|level| level.iter().map(|&id| forest.node(id).label.clone()).collect())
            .collect()
    }

    #[test]
    fn test_missing_label_gives_empty_views() {
        let forest = forest("[0//]\n[1/]");
        let view = build_sandwich(&forest, "nope");
        assert!(view.is_empty());
    }

    #[test]
    fn test_callees_merge_children_by_label() {
        let forest = forest(
            "
            [0///////////////]
            [1///////][2/////]
            [3///][4] [3/]
            ",
        );

        let callees = build_sandwich(&forest, "3").callees;
        assert_eq!(labels(&callees), vec![vec!["3"]]);
        assert_eq!(callees.node(0).value, 10.0);
        assert_eq!(callees.node(0).item_indexes.len(), 2);
    }

    #[test]
    fn test_callers_are_inverted() {
        let forest = forest(
            "
            [0///////////////]
            [1///////][2/////]
            [3///][4] [3/]
            ",
        );

        let callers = build_sandwich(&forest, "3").callers;
        assert_eq!(
            labels(&callers),
            vec![vec!["0", "0"], vec!["1", "2"], vec!["3"]]
        );

        let target = callers.levels()[2][0];
        assert_eq!(callers.node(target).value, 10.0);
        assert_eq!(callers.node(target).parents.len(), 2);

        // Callers are sized by what they contributed to the target
        let via_one = callers.levels()[1][0];
        let via_two = callers.levels()[1][1];
        assert_eq!(callers.node(via_one).value, 6.0);
        assert_eq!(callers.node(via_two).value, 4.0);
        assert_eq!(callers.node(via_two).start, 6.0);

        // Chains are only merged below a shared merged node
        let outer_two = callers.levels()[0][1];
        assert_eq!(callers.node(callers.levels()[0][0]).value, 6.0);
        assert_eq!(callers.node(outer_two).value, 4.0);
        assert_eq!(callers.node(outer_two).start, 6.0);
        assert_eq!(callers.roots().len(), 2);
    }
}
