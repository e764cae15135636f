use flamegraph_studio::aggregator::{build_forest, build_sandwich, Forest};
use flamegraph_studio::parser::{parse_text_diagram, validate_frame, DataFrame, Field};
use serde_json::json;
use pretty_assertions::assert_eq;

fn forest(diagram: &str) -> Forest {
    build_forest(&validate_frame(&parse_text_diagram(diagram).unwrap()).unwrap())
}

fn level_labels(forest: &Forest) -> Vec<Vec<String>> {
    forest
        .levels()
        .iter()
        .map(|level| level.iter().map(|&id| forest.node(id).label.clone()).collect())
        .collect()
}

const PROFILE: &str = "
    [main//////////////////////]
    [load/////////][run////////]
    [alloc/]       [alloc//][io]
    [zero]         [zero]
";

#[test]
fn test_callees_merge_every_occurrence() {
    let view = build_sandwich(&forest(PROFILE), "alloc");

    assert_eq!(level_labels(&view.callees), vec![vec!["alloc"], vec!["zero"]]);
    let alloc = view.callees.node(view.callees.levels()[0][0]);
    assert_eq!(alloc.value, 17.0);
    assert_eq!(alloc.start, 0.0);
    let zero = view.callees.node(view.callees.levels()[1][0]);
    assert_eq!(zero.value, 12.0);
    assert_eq!(zero.item_indexes.len(), 2);
}

#[test]
fn test_callers_end_in_target() {
    let view = build_sandwich(&forest(PROFILE), "alloc");

    assert_eq!(
        level_labels(&view.callers),
        vec![vec!["main", "main"], vec!["load", "run"], vec!["alloc"]]
    );
    let target = view.callers.node(view.callers.levels()[2][0]);
    assert_eq!(target.value, 17.0);
    assert_eq!(target.children.len(), 0);
    assert_eq!(target.parents.len(), 2);
    for &caller in &target.parents {
        assert_eq!(view.callers.node(caller).self_value, 0.0);
    }
}

#[test]
fn test_recursive_label_is_counted_per_occurrence() {
    let view = build_sandwich(
        &forest(
            "
            [f///////]
            [f/////]
            ",
        ),
        "f",
    );

    let callees = view.callees.node(view.callees.levels()[0][0]);
    assert_eq!(callees.value, 18.0);
    assert_eq!(view.callees.levels().len(), 2);
}

#[test]
fn test_unknown_label() {
    let view = build_sandwich(&forest(PROFILE), "missing");
    assert!(view.is_empty());
    assert!(view.callers.levels().is_empty());
}

#[test]
fn test_diff_sandwich_carries_right_values() {
    // root -> a -> t, root -> b -> t; left and right sides per row
    let frame = DataFrame::new(vec![
        Field::new("level", vec![json!(0), json!(1), json!(2), json!(1), json!(2)]),
        Field::new("value", vec![json!(10), json!(5), json!(3), json!(4), json!(2)]),
        Field::new("self", vec![json!(1), json!(2), json!(3), json!(2), json!(2)]),
        Field::new("label", vec![json!("root"), json!("a"), json!("t"), json!("b"), json!("t")]),
        Field::new("valueRight", vec![json!(14), json!(8), json!(6), json!(5), json!(4)]),
        Field::new("selfRight", vec![json!(1), json!(2), json!(6), json!(1), json!(4)]),
    ]);
    let view = build_sandwich(&build_forest(&validate_frame(&frame).unwrap()), "t");

    let callee = view.callees.node(view.callees.levels()[0][0]);
    assert_eq!(callee.value, 15.0);
    assert_eq!(callee.value_right, Some(10.0));
    assert_eq!(callee.self_right, Some(10.0));

    assert_eq!(
        level_labels(&view.callers),
        vec![vec!["root", "root"], vec!["a", "b"], vec!["t"]]
    );
    let callers = &view.callers.levels()[1];
    let a = view.callers.node(callers[0]);
    assert_eq!((a.value, a.value_right, a.self_value, a.self_right), (9.0, Some(6.0), 0.0, Some(0.0)));
    let b = view.callers.node(callers[1]);
    assert_eq!((b.value, b.value_right, b.self_right), (6.0, Some(4.0), Some(0.0)));

    let target = view.callers.node(view.callers.levels()[2][0]);
    assert_eq!(target.value, 15.0);
    assert_eq!(target.value_right, Some(10.0));
}
