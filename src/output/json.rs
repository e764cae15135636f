//! JSON report writer.
//!
//! Reports are serializable snapshots of forests, sandwich views and call
//! graphs. They carry the schema version and a generation timestamp.

use crate::aggregator::{FlameGraphData, Forest, LabelStats, SandwichView};
use crate::callgraph::CallGraph;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// One forest node, positioned on its level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    pub label: String,
    pub start: f64,
    pub value: f64,
    pub self_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_right: Option<f64>,
}

/// Forest snapshot with collapse groups and the label table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestReport {
    pub version: String,
    pub total: f64,
    pub levels: Vec<Vec<NodeReport>>,
    /// Node indexes of each collapse group, in level order
    pub collapse_groups: Vec<Vec<usize>>,
    pub label_table: Vec<LabelStats>,
    pub generated_at: String,
}

/// Callers and callees of one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandwichReport {
    pub version: String,
    pub label: String,
    pub callers: Vec<Vec<NodeReport>>,
    pub callees: Vec<Vec<NodeReport>>,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNodeReport {
    pub label: String,
    pub self_value: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdgeReport {
    /// `"{from}-{to}"`
    pub key: String,
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub residual: bool,
}

/// Trimmed call graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    pub version: String,
    pub nodes: Vec<GraphNodeReport>,
    pub edges: Vec<GraphEdgeReport>,
    pub generated_at: String,
}

impl ForestReport {
    pub fn new(data: &FlameGraphData, top_n: usize) -> Self {
        let forest = data.forest();
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            total: forest.total(),
            levels: level_reports(forest),
            collapse_groups: data
                .collapsed_map()
                .groups()
                .iter()
                .map(|g| g.items.clone())
                .collect(),
            label_table: data.label_table(top_n),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

impl SandwichReport {
    pub fn new(label: &str, view: &SandwichView) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            label: label.to_string(),
            callers: level_reports(&view.callers),
            callees: level_reports(&view.callees),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

impl GraphReport {
    pub fn new(graph: &CallGraph) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            nodes: graph
                .nodes()
                .iter()
                .map(|n| GraphNodeReport {
                    label: n.label.clone(),
                    self_value: n.self_value,
                    value: n.value,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| GraphEdgeReport {
                    key: graph.edge_key(e),
                    from: graph.node(e.from).label.clone(),
                    to: graph.node(e.to).label.clone(),
                    weight: e.weight,
                    residual: e.residual,
                })
                .collect(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Flatten a forest into per-level node lists
///
/// **Private** - shared by the forest and sandwich reports
fn level_reports(forest: &Forest) -> Vec<Vec<NodeReport>> {
    forest
        .levels()
        .iter()
        .map(|level| {
            level
                .iter()
                .map(|&id| {
                    let node = forest.node(id);
                    NodeReport {
                        label: node.label.clone(),
                        start: node.start,
                        value: node.value,
                        self_value: node.self_value,
                        value_right: node.value_right,
                        self_right: node.self_right,
                    }
                })
                .collect()
        })
        .collect()
}

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report<T: Serialize>(
    report: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a report without touching the disk
pub fn report_to_string<T: Serialize>(report: &T) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report).map_err(OutputError::SerializationFailed)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a report back from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reused for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report<T: DeserializeOwned>(input_path: impl AsRef<Path>) -> Result<T, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    serde_json::from_reader(file).map_err(OutputError::SerializationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_sandwich;
    use crate::callgraph::build_call_graph;
    use crate::parser::{parse_text_diagram, validate_frame};
    use crate::utils::config::ViewConfig;
    use tempfile::NamedTempFile;

    fn container() -> FlameGraphData {
        let frame = parse_text_diagram(
            "
            [0///////]
            [1///////]
            [2//][3//]
            ",
        )
        .unwrap();
        FlameGraphData::new(validate_frame(&frame).unwrap(), &ViewConfig::default())
    }

    #[test]
    fn test_write_and_read_forest_report() {
        let report = ForestReport::new(&container(), 10);
        let temp_file = NamedTempFile::new().unwrap();

        write_report(&report, temp_file.path()).unwrap();
        let loaded: ForestReport = read_report(temp_file.path()).unwrap();

        assert_eq!(loaded.version, REPORT_SCHEMA_VERSION);
        assert_eq!(loaded.total, 10.0);
        assert_eq!(loaded.levels[2][1].label, "3");
        assert_eq!(loaded.levels[2][1].start, 5.0);
        assert_eq!(loaded.collapse_groups, vec![vec![0, 1]]);
    }

    #[test]
    fn test_graph_report_uses_edge_keys() {
        let data = container();
        let report = GraphReport::new(&build_call_graph(data.forest()));

        let keys: Vec<&str> = report.edges.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["1-2", "1-3"]);
        assert!(report.edges.iter().all(|e| !e.residual));
    }

    #[test]
    fn test_sandwich_report() {
        let data = container();
        let report = SandwichReport::new("2", &build_sandwich(data.forest(), "2"));

        assert_eq!(report.label, "2");
        assert_eq!(report.callers.len(), 3);
        assert_eq!(report.callees.len(), 1);
        let json = report_to_string(&report).unwrap();
        assert!(json.contains("\"callers\""));
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/report.json");

        write_report(&GraphReport::new(&CallGraph::default()), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
