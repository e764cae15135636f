//! Nested-set rows turned into a forest and the views derived from it.
//!
//! This module provides:
//! - The level forest (absolute offsets, label index)
//! - Collapse groups for single-child chains
//! - Sandwich views of callers and callees
//! - Per-label statistics

pub mod collapse;
pub mod container;
pub mod forest_builder;
pub mod metrics;
pub mod sandwich;

// Re-export main types and functions
pub use collapse::{build_collapsed_map, CollapseGroup, CollapsedMap, CollapsedMapBuilder};
pub use container::FlameGraphData;
pub use forest_builder::{build_forest, Forest, LabelIndex, NodeId, TreeNode};
pub use metrics::{build_label_table, diff_percent, LabelStats};
pub use sandwich::{build_sandwich, merge_callees, merge_callers, SandwichView};
