//! Rejection tests covering every `TreeError` variant

use dotted_tree::{AttrLimit, DottedTree, Limits, TreeError};
use serde_json::{json, Value};

fn wrap_with(doc: Value, limits: Limits) -> Result<DottedTree, TreeError> {
    DottedTree::wrap(doc, limits)
}

#[test]
fn rejects_scalar_and_array_documents() {
    for doc in [json!("FUUUUUUU"), json!(12), json!([{"id": 1}]), Value::Null] {
        let err = wrap_with(doc, Limits::default()).expect_err("not a mapping");
        assert!(matches!(err, TreeError::InvalidInput { .. }));
    }
}

#[test]
fn rejects_merge_with_non_mapping() {
    let mut tree = DottedTree::default();
    let err = tree.merge(json!(["a", "b"])).expect_err("array merge");
    assert!(matches!(err, TreeError::InvalidInput { ref found } if found == "array"));
    assert!(tree.is_empty());
}

#[test]
fn default_depth_allows_ten_levels_below_root() {
    let mut doc = json!({"leaf": true});
    for _ in 0..10 {
        doc = json!({ "k": doc });
    }
    let tree = wrap_with(doc.clone(), Limits::default()).expect("depth 10 allowed");
    assert_eq!(tree.max_depth_reached(), 10);

    let deeper = json!({ "k": doc });
    let err = wrap_with(deeper, Limits::default()).expect_err("depth 11 rejected");
    assert!(matches!(err, TreeError::DepthExceeded { depth: 11, max_depth: 10 }));
}

#[test]
fn depth_applies_to_mappings_inside_arrays() {
    let limits = Limits::default().with_max_depth(1);
    assert!(wrap_with(json!({"items": [{"a": 1}]}), limits.clone()).is_ok());
    let err = wrap_with(json!({"items": [{"a": {"b": 1}}]}), limits).expect_err("too deep");
    assert!(matches!(err, TreeError::DepthExceeded { depth: 2, .. }));
}

#[test]
fn default_attribute_limit_is_ten() {
    let eleven: serde_json::Map<String, Value> =
        (0..11).map(|i| (format!("k{i}"), json!(i))).collect();
    let err = wrap_with(Value::Object(eleven), Limits::default()).expect_err("11 keys");
    assert!(matches!(
        err,
        TreeError::AttributeLimitExceeded { ref key, count: 11, limit: 10, .. } if key == "k10"
    ));
}

#[test]
fn per_depth_table_without_default_leaves_other_depths_unlimited() {
    let limits = Limits::default().with_max_attrs(AttrLimit::per_depth([(1, 1)], None));
    let wide: serde_json::Map<String, Value> =
        (0..25).map(|i| (format!("k{i}"), json!(i))).collect();
    assert!(wrap_with(Value::Object(wide), limits.clone()).is_ok());

    let err = wrap_with(json!({"child": {"a": 1, "b": 2}}), limits).expect_err("depth 1");
    assert!(matches!(err, TreeError::AttributeLimitExceeded { depth: 1, limit: 1, .. }));
}

#[test]
fn synthesized_nodes_count_against_attribute_limit() {
    let mut tree = DottedTree::wrap(json!({"a": 1}), Limits::default().with_max_attrs(1)).unwrap();
    let err = tree
        .recursive_assign("b.c", "x")
        .expect_err("b would be a second root attribute");
    assert!(matches!(err, TreeError::AttributeLimitExceeded { ref key, .. } if key == "b"));
    assert!(!tree.contains_key("b"));
}

#[test]
fn size_limit_applies_to_later_writes() {
    let mut tree = DottedTree::new(Limits::default().with_max_size(32)).unwrap();
    tree.assign("a", "0123456789").unwrap();
    let err = tree.assign("b", "0123456789012345").expect_err("over 32 bytes");
    assert!(matches!(err, TreeError::SizeLimitExceeded { max_size: 32, .. }));
    assert_eq!(tree.len(), 1);
}

#[test]
fn size_check_is_the_sum_of_fragments() {
    // Node `{"a":"x"}` (9 bytes) plus replacement `"y"` (3 bytes) is 12,
    // even though the resulting document is still 9 bytes.
    let mut tree = DottedTree::wrap(json!({"a": "x"}), Limits::default().with_max_size(11))
        .unwrap();
    assert!(matches!(
        tree.assign("a", "y"),
        Err(TreeError::SizeLimitExceeded { size: 12, .. })
    ));
}

#[test]
fn failed_assignment_leaves_earlier_keys_in_place() {
    let mut tree = DottedTree::wrap(json!({"kept": 1}), Limits::default().with_max_depth(0))
        .unwrap();
    assert!(tree.assign("nested", json!({"a": 1})).is_err());
    assert_eq!(tree.to_json_value(), json!({"kept": 1}));
}

#[test]
fn path_conflict_through_sequences() {
    let mut tree = DottedTree::wrap(json!({"list": [1, 2]}), Limits::default()).unwrap();
    let err = tree.recursive_assign("list.first", 1).expect_err("list is not a node");
    assert!(matches!(err, TreeError::PathConflict { .. }));
}

#[test]
fn hard_maximums_are_enforced_before_wrapping() {
    let limits = Limits::default().with_max_size(usize::MAX);
    assert!(matches!(
        DottedTree::new(limits),
        Err(TreeError::ConfigurationExceedsHardLimits { .. })
    ));
}

#[test]
fn dotted_assignment_into_child_is_bounded_by_whole_tree_size() {
    let mut tree = wrap_with(json!({"a": {}}), Limits::default().with_max_size(20))
        .expect("small document");
    let err = tree
        .recursive_assign("a.x", "0123456789")
        .expect_err("whole tree would measure 24 bytes");
    assert!(matches!(
        err,
        TreeError::SizeLimitExceeded { ref key, size: 24, max_size: 20 } if key == "a.x"
    ));
    assert_eq!(tree.to_json_value(), json!({"a": {}}));
}

#[test]
fn deeply_nested_text_is_a_depth_error() {
    let text = format!("{}null{}", r#"{"k":"#.repeat(200), "}".repeat(200));
    let err = DottedTree::from_json_str(&text, Limits::default()).expect_err("too deep");
    assert!(matches!(err, TreeError::DepthExceeded { max_depth: 10, .. }));
}
