//! Flamegraph Studio
//!
//! Data transforms behind flame graph views of nested-set profiles.
//!
//! A profile is a list of rows in depth-first pre-order, each with a
//! level, a total value, a self value and a label. From it this crate
//! derives:
//!
//! - the level forest with absolute offsets (`aggregator::build_forest`)
//! - collapse groups for single-child chains (`aggregator::build_collapsed_map`)
//! - sandwich views of one label (`aggregator::build_sandwich`)
//! - a label-deduplicated call graph trimmed by entropy
//!   (`callgraph::build_call_graph`, `callgraph::trim_graph`)
//!
//! ## Getting Started
//!
//! ```bash
//! flame-studio summary --file profile.json
//! flame-studio graph --file profile.json --max-nodes 40
//! ```

pub mod aggregator;
pub mod callgraph;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
