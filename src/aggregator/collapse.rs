//! Collapse groups for near-identical single-child chains.
//!
//! A child that is its parent's only child and carries more than
//! `threshold` of the parent's value adds nothing visually, so the two are
//! put in one group. Chains fold transitively into a single group. Nodes
//! with siblings are never grouped.
//!
//! `CollapsedMap` is immutable: toggling returns a new map. Members of a
//! group share one `Arc<CollapseGroup>`, so a toggle is visible from every
//! member and untouched groups stay shared with the previous map.

use super::forest_builder::{Forest, NodeId};
use crate::utils::config::CollapsingConfig;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// A run of nodes rendered as one, ordered root to leaf
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseGroup {
    pub items: Vec<NodeId>,
    pub collapsed: bool,
}

/// Node to shared collapse group mapping
#[derive(Debug, Clone, Default)]
pub struct CollapsedMap {
    groups: HashMap<NodeId, Arc<CollapseGroup>>,
}

impl CollapsedMap {
    pub fn get(&self, node: NodeId) -> Option<&CollapseGroup> {
        self.groups.get(&node).map(Arc::as_ref)
    }

    /// True when both nodes point at the very same group record
    pub fn same_group(&self, a: NodeId, b: NodeId) -> bool {
        match (self.groups.get(&a), self.groups.get(&b)) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Number of grouped nodes
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups.keys().copied()
    }

    /// Each distinct group once, ordered by its first node
    pub fn groups(&self) -> Vec<&CollapseGroup> {
        let mut seen = HashMap::new();
        for group in self.groups.values() {
            seen.entry(Arc::as_ptr(group)).or_insert(group.as_ref());
        }
        let mut groups: Vec<&CollapseGroup> = seen.into_values().collect();
        groups.sort_by_key(|g| g.items.first().copied());
        groups
    }

    /// Return a map where the group of `node` has the given state
    ///
    /// Nodes outside any group leave the map unchanged.
    pub fn set_collapsed_status(&self, node: NodeId, collapsed: bool) -> CollapsedMap {
        let mut groups = self.groups.clone();

        if let Some(group) = self.groups.get(&node) {
            let updated = Arc::new(CollapseGroup {
                items: group.items.clone(),
                collapsed,
            });
            for &item in &group.items {
                groups.insert(item, Arc::clone(&updated));
            }
        } else {
            debug!("Node {} is not part of a collapse group", node);
        }

        CollapsedMap { groups }
    }

    /// Return a map where every group has the given state
    pub fn set_all_collapsed_status(&self, collapsed: bool) -> CollapsedMap {
        let mut replaced: HashMap<*const CollapseGroup, Arc<CollapseGroup>> = HashMap::new();
        let mut groups = HashMap::with_capacity(self.groups.len());

        for (&node, group) in &self.groups {
            let updated = replaced.entry(Arc::as_ptr(group)).or_insert_with(|| {
                Arc::new(CollapseGroup {
                    items: group.items.clone(),
                    collapsed,
                })
            });
            groups.insert(node, Arc::clone(updated));
        }

        CollapsedMap { groups }
    }
}

/// Accumulates collapse groups while walking a forest
///
/// The scratch state is local to one build and never exposed.
#[derive(Debug)]
pub struct CollapsedMapBuilder {
    threshold: f64,
    membership: HashMap<NodeId, usize>,
    chains: Vec<Vec<NodeId>>,
}

impl CollapsedMapBuilder {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            membership: HashMap::new(),
            chains: Vec::new(),
        }
    }

    /// Visit every node below `root`, parents before children
    pub fn add_tree(&mut self, forest: &Forest, root: NodeId) {
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let node = forest.node(current);
            if let Some(&parent) = node.parents.first() {
                self.add_item(forest, current, parent);
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Group `item` with `parent` if it is an only child above threshold
    pub fn add_item(&mut self, forest: &Forest, item: NodeId, parent: NodeId) {
        let parent_node = forest.node(parent);
        let item_node = forest.node(item);

        if parent_node.children.len() != 1
            || item_node.value <= parent_node.value * self.threshold
        {
            return;
        }

        match self.membership.get(&parent) {
            Some(&chain) => {
                self.chains[chain].push(item);
                self.membership.insert(item, chain);
            }
            None => {
                let chain = self.chains.len();
                self.chains.push(vec![parent, item]);
                self.membership.insert(parent, chain);
                self.membership.insert(item, chain);
            }
        }
    }

    /// Freeze the collected chains; every group starts collapsed
    pub fn build(self) -> CollapsedMap {
        let shared: Vec<Arc<CollapseGroup>> = self
            .chains
            .into_iter()
            .map(|items| {
                Arc::new(CollapseGroup {
                    items,
                    collapsed: true,
                })
            })
            .collect();

        let groups = self
            .membership
            .into_iter()
            .map(|(node, chain)| (node, Arc::clone(&shared[chain])))
            .collect();

        CollapsedMap { groups }
    }
}

/// Build the collapse map for a whole forest
///
/// **Public** - main entry point; empty when collapsing is disabled
pub fn build_collapsed_map(forest: &Forest, config: &CollapsingConfig) -> CollapsedMap {
    if !config.enabled {
        debug!("Collapsing disabled, skipping collapse groups");
        return CollapsedMap::default();
    }

    let mut builder = CollapsedMapBuilder::new(config.threshold);
    for &root in forest.roots() {
        builder.add_tree(forest, root);
    }
    let map = builder.build();

    debug!(
        "Built {} collapse groups over {} nodes",
        map.groups().len(),
        map.len()
    );

    map
}
