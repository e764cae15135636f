//! Per-label statistics for the top table.
//!
//! Every occurrence of a label contributes its self and total, so a label
//! that shows up under several callers is reported once with the sums.

use super::forest_builder::Forest;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summed values of one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStats {
    pub label: String,

    /// Self value; baseline and comparison combined in diff mode
    pub self_value: f64,

    /// Total value, combined the same way
    pub total: f64,

    /// Comparison-only self, diff mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_right: Option<f64>,

    /// Comparison-only total, diff mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_right: Option<f64>,

    /// Change of the label's share of the comparison versus the baseline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_percent: Option<f64>,
}

impl LabelStats {
    fn empty(label: &str, is_diff: bool) -> Self {
        Self {
            label: label.to_string(),
            self_value: 0.0,
            total: 0.0,
            self_right: is_diff.then_some(0.0),
            total_right: is_diff.then_some(0.0),
            diff_percent: None,
        }
    }

    /// Baseline-only total, equal to `total` outside diff mode
    pub fn total_left(&self) -> f64 {
        self.total - self.total_right.unwrap_or(0.0)
    }
}

/// Build the label table of a forest
///
/// **Public** - main entry point for the top table
///
/// # Arguments
/// * `forest` - Forest to summarize
/// * `top_n` - Maximum number of rows, 0 for all
///
/// # Returns
/// Rows sorted by self descending, then label ascending
pub fn build_label_table(forest: &Forest, top_n: usize) -> Vec<LabelStats> {
    let is_diff = forest
        .nodes()
        .first()
        .is_some_and(|n| n.value_right.is_some());
    let mut table: HashMap<&str, LabelStats> = HashMap::new();

    for node in forest.nodes() {
        let stats = table
            .entry(node.label.as_str())
            .or_insert_with(|| LabelStats::empty(&node.label, is_diff));
        stats.self_value += node.self_value;
        stats.total += node.value;
        if let (Some(self_right), Some(acc)) = (node.self_right, stats.self_right.as_mut()) {
            *acc += self_right;
        }
        if let (Some(value_right), Some(acc)) = (node.value_right, stats.total_right.as_mut()) {
            *acc += value_right;
        }
    }

    let mut rows: Vec<LabelStats> = table.into_values().collect();

    if is_diff {
        let total_right: f64 = forest
            .roots()
            .iter()
            .filter_map(|&r| forest.node(r).value_right)
            .sum();
        let total_left = forest.total() - total_right;
        for row in &mut rows {
            row.diff_percent = diff_percent(
                row.total_left(),
                total_left,
                row.total_right.unwrap_or(0.0),
                total_right,
            );
        }
    }

    rows.sort_by(|a, b| {
        b.self_value
            .total_cmp(&a.self_value)
            .then_with(|| a.label.cmp(&b.label))
    });

    if top_n > 0 {
        rows.truncate(top_n);
    }

    debug!("Built label table with {} rows", rows.len());
    rows
}

/// Relative change of a share between baseline and comparison
///
/// None when either side has nothing to compare against.
pub fn diff_percent(left: f64, total_left: f64, right: f64, total_right: f64) -> Option<f64> {
    if total_left <= 0.0 || total_right <= 0.0 || left <= 0.0 {
        return None;
    }
    let share_left = left / total_left;
    let share_right = right / total_right;
    Some((share_right - share_left) / share_left * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::forest_builder::build_forest;
    use crate::parser::{parse_text_diagram, validate_frame, DataFrame, Field};
    use serde_json::json;

    #[test]
    fn test_label_table_sums_occurrences() {
        let data = validate_frame(
            &parse_text_diagram(
                "
                [0///////////////]
                [1///////][2/////]
                [3///][4] [3/]
                ",
            )
            .unwrap(),
        )
        .unwrap();
        let table = build_label_table(&build_forest(&data), 0);

        assert_eq!(table[0].label, "3");
        assert_eq!(table[0].self_value, 10.0);
        assert_eq!(table[0].total, 10.0);
        assert!(table[0].diff_percent.is_none());

        let labels: Vec<&str> = table.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["3", "2", "4", "1", "0"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let data = validate_frame(&parse_text_diagram("[0////]\n[1/][2]").unwrap()).unwrap();
        let table = build_label_table(&build_forest(&data), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].label, "1");
    }

    #[test]
    fn test_diff_percent_in_diff_mode() {
        let frame = DataFrame::new(vec![
            Field::new("level", vec![json!(0), json!(1)]),
            Field::new("value", vec![json!(10), json!(5)]),
            Field::new("self", vec![json!(5), json!(5)]),
            Field::new("label", vec![json!("root"), json!("a")]),
            Field::new("valueRight", vec![json!(10), json!(2)]),
            Field::new("selfRight", vec![json!(8), json!(2)]),
        ]);
        let forest = build_forest(&validate_frame(&frame).unwrap());
        let table = build_label_table(&forest, 0);

        let a = table.iter().find(|r| r.label == "a").unwrap();
        assert_eq!(a.total, 7.0);
        assert_eq!(a.total_right, Some(2.0));
        assert_eq!(a.self_right, Some(2.0));
        // 50% of the baseline, 20% of the comparison
        assert!((a.diff_percent.unwrap() + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_diff_percent_without_baseline() {
        assert_eq!(diff_percent(0.0, 10.0, 1.0, 10.0), None);
        assert_eq!(diff_percent(1.0, 0.0, 1.0, 10.0), None);
        assert!((diff_percent(1.0, 10.0, 2.0, 10.0).unwrap() - 100.0).abs() < 1e-9);
    }
}
