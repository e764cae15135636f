use flamegraph_studio::commands::{
    execute_graph, execute_render, execute_sandwich, execute_summary, load_container, GraphArgs,
    SandwichArgs, SummaryArgs,
};
use flamegraph_studio::output::{read_report, ForestReport, GraphReport};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DIAGRAM: &str = "
[main//////////////////////]
[load/////////][run////////]
[alloc/]       [alloc//][io]
";

fn write_inputs(dir: &TempDir) -> (PathBuf, PathBuf) {
    let profile = dir.path().join("profile.txt");
    fs::write(&profile, DIAGRAM).unwrap();

    let config = dir.path().join("view.toml");
    fs::write(
        &config,
        "[collapsing]\nenabled = false\n\n[graph]\nmax_nodes = 0\nnode_cutoff_fraction = 0.0\nedge_cutoff_fraction = 0.0\n",
    )
    .unwrap();

    (profile, config)
}

#[test]
fn test_load_container_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let (profile, config) = write_inputs(&dir);

    let (data, view) = load_container(&profile, Some(&config)).unwrap();
    assert!(!view.collapsing.enabled);
    assert!(data.collapsed_map().is_empty());
    assert_eq!(data.forest().total(), 28.0);
}

#[test]
fn test_summary_writes_forest_report() {
    let dir = tempfile::tempdir().unwrap();
    let (profile, _) = write_inputs(&dir);
    let output = dir.path().join("out/forest.json");

    execute_summary(SummaryArgs {
        input: profile,
        output: Some(output.clone()),
        ..SummaryArgs::default()
    })
    .unwrap();

    let report: ForestReport = read_report(&output).unwrap();
    assert_eq!(report.levels.len(), 3);
}

#[test]
fn test_graph_writes_untrimmed_graph() {
    let dir = tempfile::tempdir().unwrap();
    let (profile, config) = write_inputs(&dir);
    let output = dir.path().join("graph.json");

    execute_graph(GraphArgs {
        input: profile,
        config: Some(config),
        max_nodes: None,
        output: Some(output.clone()),
    })
    .unwrap();

    let report: GraphReport = read_report(&output).unwrap();
    assert_eq!(report.nodes.len(), 4);
    assert!(report.edges.iter().any(|e| e.key == "load-alloc"));
    assert!(report.edges.iter().all(|e| !e.residual));
}

#[test]
fn test_render_large_profile() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("large.json");
    fs::write(
        &profile,
        r#"{"fields": [
            {"name": "level", "values": [0, 1]},
            {"name": "value", "values": [1000000000, 400000000]},
            {"name": "self", "values": [600000000, 400000000]},
            {"name": "label", "values": ["main", "work"]}
        ]}"#,
    )
    .unwrap();

    execute_render(&profile, 120).unwrap();
}

#[test]
fn test_sandwich_of_unknown_label_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (profile, _) = write_inputs(&dir);

    let result = execute_sandwich(SandwichArgs {
        input: profile,
        label: "missing".to_string(),
        output: None,
    });
    assert!(result.is_err());
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (profile, _) = write_inputs(&dir);
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[collapsing]\nthreshold = 2.0\n").unwrap();

    let err = load_container(&profile, Some(&config)).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load config"));
}
