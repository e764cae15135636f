//! Terminal output: text diagrams and forest summaries.

use crate::aggregator::{CollapsedMap, Forest, LabelStats};
use crate::callgraph::CallGraph;
use crate::utils::config::MAX_DIAGRAM_COLUMNS;

/// Draw a forest as a text diagram
///
/// **Public** - inverse of `parser::parse_text_diagram`
///
/// Same as `render_text_diagram_with_width` capped at `MAX_DIAGRAM_COLUMNS`.
pub fn render_text_diagram(forest: &Forest) -> String {
    render_text_diagram_with_width(forest, MAX_DIAGRAM_COLUMNS)
}

/// Draw a forest in at most `max_columns` columns
///
/// A forest whose total fits is drawn one column per value unit, so it
/// parses back to the same forest. A wider one is scaled down to
/// `max_columns`. Boxes narrower than two columns are left out and labels
/// that do not fit their box are cut.
pub fn render_text_diagram_with_width(forest: &Forest, max_columns: usize) -> String {
    let total = forest.total();
    let limit = max_columns as f64;
    let scale = if !total.is_finite() {
        0.0
    } else if total > limit {
        limit / total
    } else {
        1.0
    };
    let column = |offset: f64| -> usize {
        let scaled = (offset * scale).round();
        if scaled.is_finite() && scaled > 0.0 {
            scaled.min(limit) as usize
        } else {
            0
        }
    };

    let mut lines = Vec::with_capacity(forest.depth());

    for level in forest.levels() {
        let mut line = String::new();
        let mut current = 0;
        for &id in level {
            let node = forest.node(id);
            let start = column(node.start);
            let width = column(node.start + node.value).saturating_sub(start);
            if width < 2 || start < current {
                continue;
            }

            line.push_str(&" ".repeat(start - current));
            let label: String = node.label.chars().take(width - 2).collect();
            let padding = width - 2 - label.chars().count();
            line.push('[');
            line.push_str(&label);
            line.push_str(&"/".repeat(padding));
            line.push(']');
            current = start + width;
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// One row per node, indented by level
///
/// Used where exact values matter more than the picture.
pub fn render_levels(forest: &Forest) -> String {
    let mut lines = Vec::with_capacity(forest.len());

    for (depth, level) in forest.levels().iter().enumerate() {
        for &id in level {
            let node = forest.node(id);
            let mut line = format!(
                "  {:indent$}{}  total {}  self {}",
                "",
                node.label,
                node.value,
                node.self_value,
                indent = depth * 2
            );
            if let (Some(value_right), Some(self_right)) = (node.value_right, node.self_right) {
                line.push_str(&format!("  (right: total {}  self {})", value_right, self_right));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Human-readable forest summary
///
/// **Public** - printed by the `summary` command
pub fn render_summary(forest: &Forest, collapsed: &CollapsedMap, table: &[LabelStats]) -> String {
    let mut lines = Vec::new();
    let total = forest.total();

    lines.push("  FLAME GRAPH SUMMARY".to_string());
    lines.push(format!("  Nodes:           {}", forest.len()));
    lines.push(format!("  Levels:          {}", forest.depth()));
    lines.push(format!("  Roots:           {}", forest.roots().len()));
    lines.push(format!("  Total:           {}", total));
    lines.push(format!("  Distinct labels: {}", forest.label_index().len()));
    lines.push(format!(
        "  Collapse groups: {} ({} nodes)",
        collapsed.groups().len(),
        collapsed.len()
    ));

    if table.is_empty() {
        return lines.join("\n");
    }

    let is_diff = table.iter().any(|row| row.total_right.is_some());
    lines.push(String::new());
    lines.push("  TOP LABELS BY SELF".to_string());
    if is_diff {
        lines.push(format!(
            "  {:<40} {:>12} {:>12} {:>9}",
            "Label", "Self", "Total", "Diff"
        ));
    } else {
        lines.push(format!(
            "  {:<40} {:>12} {:>12} {:>7}",
            "Label", "Self", "Total", "%"
        ));
    }

    for row in table {
        let label = truncate_label(&row.label, 40);
        if is_diff {
            let diff = row
                .diff_percent
                .map(|d| format!("{:+.1}%", d))
                .unwrap_or_else(|| "new".to_string());
            lines.push(format!(
                "  {:<40} {:>12} {:>12} {:>9}",
                label, row.self_value, row.total, diff
            ));
        } else {
            let percentage = if total > 0.0 {
                row.self_value / total * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {:<40} {:>12} {:>12} {:>6.1}%",
                label, row.self_value, row.total, percentage
            ));
        }
    }

    lines.join("\n")
}

/// Edge list of a call graph, heaviest first
pub fn render_graph(graph: &CallGraph) -> String {
    let mut lines = vec![format!(
        "  CALL GRAPH: {} nodes, {} edges",
        graph.len(),
        graph.edges().len()
    )];

    let mut edges: Vec<_> = graph.edges().iter().collect();
    edges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    for edge in edges {
        let marker = if edge.residual { " (residual)" } else { "" };
        lines.push(format!(
            "  {:<50} {:>12}{}",
            truncate_label(&graph.edge_key(edge), 50),
            edge.weight,
            marker
        ));
    }

    lines.join("\n")
}

/// Keep the end of long labels, where the function name usually is
fn truncate_label(label: &str, max: usize) -> String {
    let count = label.chars().count();
    if count <= max {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}
