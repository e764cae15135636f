use flamegraph_studio::aggregator::{build_collapsed_map, build_forest, CollapsedMap, Forest};
use flamegraph_studio::parser::{validate_frame, DataFrame};
use flamegraph_studio::utils::config::CollapsingConfig;

fn forest(levels: &[usize], values: &[f64], labels: &[&str]) -> Forest {
    let selfs = vec![0.0; levels.len()];
    let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
    build_forest(&validate_frame(&DataFrame::from_columns(levels, values, &selfs, &labels)).unwrap())
}

fn collapse(forest: &Forest) -> CollapsedMap {
    build_collapsed_map(forest, &CollapsingConfig::default())
}

#[test]
fn test_single_child_above_threshold_is_grouped() {
    let forest = forest(&[0, 1], &[100.0, 99.1], &["parent", "child"]);
    let map = collapse(&forest);

    assert!(map.same_group(0, 1));
    assert_eq!(map.get(1).unwrap().items, vec![0, 1]);
}

#[test]
fn test_single_child_at_threshold_is_not_grouped() {
    let forest = forest(&[0, 1], &[100.0, 99.0], &["parent", "child"]);
    assert!(collapse(&forest).is_empty());
}

#[test]
fn test_parent_with_two_children_is_never_grouped() {
    let forest = forest(&[0, 1, 1], &[100.0, 99.1, 0.9], &["parent", "big", "small"]);
    let map = collapse(&forest);

    assert!(map.get(0).is_none());
    assert!(map.get(1).is_none());
    assert!(map.get(2).is_none());
}

#[test]
fn test_custom_threshold() {
    let forest = forest(&[0, 1], &[100.0, 60.0], &["parent", "child"]);
    let config = CollapsingConfig {
        enabled: true,
        threshold: 0.5,
    };

    assert!(build_collapsed_map(&forest, &config).same_group(0, 1));
}

#[test]
fn test_set_collapsed_status_leaves_receiver_untouched() {
    let forest = forest(&[0, 1], &[100.0, 99.5], &["parent", "child"]);
    let old = collapse(&forest);

    let expanded = old.set_collapsed_status(0, false);
    let collapsed_again = expanded.set_collapsed_status(1, true);

    assert!(old.get(0).unwrap().collapsed);
    assert!(!expanded.get(0).unwrap().collapsed);
    assert!(!expanded.get(1).unwrap().collapsed);
    assert!(collapsed_again.get(0).unwrap().collapsed);
    assert!(!expanded.get(1).unwrap().collapsed);
}

#[test]
fn test_groups_are_listed_once() {
    let forest = forest(
        &[0, 1, 2, 0, 1],
        &[10.0, 10.0, 10.0, 5.0, 5.0],
        &["a", "b", "c", "x", "y"],
    );
    let map = collapse(&forest);

    let groups = map.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].items, vec![0, 1, 2]);
    assert_eq!(groups[1].items, vec![3, 4]);
    assert_eq!(map.len(), 5);
}
