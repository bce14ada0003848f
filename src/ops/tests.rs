// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use rstest::rstest;

use crate::model::{find_node, fixtures, PageWindow, TreeNode};

use super::{
    add_rule_above_root, add_rule_at_leaf, finalize_tree, focus_on_rule_node, load_more_entries,
    remove_below, remove_edge, remove_rule_above, EditError,
};

fn leaf_addresses(root: &TreeNode) -> Vec<Vec<usize>> {
    fn walk(node: &TreeNode, out: &mut Vec<Vec<usize>>) {
        if node.children().is_empty() {
            out.push(node.address().to_vec());
        }
        for child in node.children() {
            walk(child, out);
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

#[test]
fn add_rule_above_root_synthesizes_head_table_and_reinserts_old_root() {
    let root = fixtures::parent_table();
    let rule = Arc::new(fixtures::rule_ancestor_base());

    let mut old_root = root.clone();
    finalize_tree(&mut old_root);
    let new_root = add_rule_above_root(old_root.clone(), &rule, None).expect("graft");

    assert_eq!(new_root.name(), "ancestor");
    let table = new_root.as_table().expect("table");
    assert!(table.is_root_node());

    let rule_node = &new_root.children()[0];
    assert!(rule_node.is_rule());
    assert_eq!(rule_node.children().len(), 1);

    // The old root sits at its body position, data intact.
    let reinserted = &rule_node.children()[0];
    assert_eq!(reinserted.name(), "parent");
    assert_eq!(
        reinserted.as_table().expect("table").entries(),
        old_root.as_table().expect("table").entries()
    );
    assert_eq!(reinserted.address().as_slice(), &[0, 0]);
    assert!(!reinserted.as_table().expect("table").is_root_node());
}

#[test]
fn add_rule_above_root_with_repeated_predicate_requires_a_position() {
    let mut root = TreeNode::table("path", vec!["X".to_owned(), "Y".to_owned()]);
    finalize_tree(&mut root);
    let rule = Arc::new(fixtures::rule_path_transitive());

    let err = add_rule_above_root(root.clone(), &rule, None).expect_err("ambiguous");
    assert_eq!(
        err,
        EditError::AmbiguousPosition {
            predicate: "path".to_owned(),
            positions: vec![0, 1],
        }
    );

    let new_root = add_rule_above_root(root, &rule, Some(1)).expect("explicit position");
    let rule_node = &new_root.children()[0];
    assert_eq!(rule_node.children().len(), 2);
    assert_eq!(rule_node.children()[0].name(), "path");
    assert!(rule_node.children()[0]
        .as_table()
        .expect("table")
        .entries()
        .is_empty());
}

#[rstest]
#[case(Some(5), EditError::PositionOutOfRange { position: 5, body_len: 1 })]
#[case(None, EditError::PredicateNotInBody { predicate: "edge".to_owned() })]
fn add_rule_above_root_validates_positions(
    #[case] position: Option<usize>,
    #[case] expected: EditError,
) {
    let mut root = TreeNode::table("edge", vec![]);
    finalize_tree(&mut root);
    let rule = Arc::new(fixtures::rule_ancestor_base());

    let err = add_rule_above_root(root, &rule, position).expect_err("invalid");
    assert_eq!(err, expected);
}

#[test]
fn add_rule_at_leaf_attaches_placeholders_and_clears_leaf_flag() {
    let mut root = fixtures::ancestry_tree();
    // The ancestor leaf under the step rule.
    let leaf = vec![0, 1];
    let rule = Arc::new(fixtures::rule_ancestor_step());

    add_rule_at_leaf(&mut root, &leaf, &rule, None).expect("graft below");

    let node = find_node(&root, &leaf).expect("leaf node");
    let table = node.as_table().expect("table");
    assert!(!table.is_leaf_node());
    assert_eq!(node.children().len(), 1);

    let rule_node = &node.children()[0];
    assert!(rule_node.is_rule());
    assert_eq!(rule_node.children().len(), 2);
    for (child, body) in rule_node.children().iter().zip(&rule.body_predicates) {
        assert_eq!(child.name(), body.name);
        assert!(child.as_table().expect("table").is_leaf_node());
    }
}

#[test]
fn add_rule_at_leaf_blocks_on_ambiguous_body_until_a_position_is_given() {
    let mut root = TreeNode::table("path", vec!["X".to_owned(), "Z".to_owned()]);
    finalize_tree(&mut root);
    let rule = Arc::new(fixtures::rule_path_transitive());

    let err = add_rule_at_leaf(&mut root, &[], &rule, None).expect_err("ambiguous");
    assert!(matches!(err, EditError::AmbiguousPosition { .. }));
    // The blocked edit must not have touched the tree.
    assert!(root.children().is_empty());

    add_rule_at_leaf(&mut root, &[], &rule, Some(0)).expect("explicit position");
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].children().len(), 2);
}

#[test]
fn add_rule_at_leaf_rejects_non_leaves() {
    let mut root = fixtures::ancestry_tree();
    let rule = Arc::new(fixtures::rule_ancestor_base());

    let err = add_rule_at_leaf(&mut root, &[], &rule, None).expect_err("root has a derivation");
    assert_eq!(err, EditError::NotALeaf { address: vec![] });
}

#[test]
fn remove_rule_above_promotes_the_node_and_discards_the_rest() {
    let root = fixtures::ancestry_tree();
    let new_root = remove_rule_above(root, &[0, 0]).expect("promote");

    assert_eq!(new_root.name(), "parent");
    let table = new_root.as_table().expect("table");
    assert!(table.is_root_node());
    assert!(table.is_leaf_node());
    assert!(new_root.address().is_empty());
    assert_eq!(table.entries().len(), 2);
}

#[test]
fn remove_rule_above_of_the_root_is_a_no_op() {
    let root = fixtures::ancestry_tree();
    let same = remove_rule_above(root.clone(), &[]).expect("no-op");
    assert_eq!(same, root);
}

#[test]
fn remove_rule_above_rejects_rule_nodes() {
    let root = fixtures::ancestry_tree();
    let err = remove_rule_above(root, &[0]).expect_err("rule node");
    assert_eq!(err, EditError::NotATable { address: vec![0] });
}

#[test]
fn remove_edge_cuts_one_branch_and_reindexes_siblings() {
    let mut root = fixtures::ancestry_tree();
    remove_edge(&mut root, &[0], &[0, 0]).expect("cut");

    let rule_node = &root.children()[0];
    assert_eq!(rule_node.children().len(), 1);
    // The surviving sibling moved up to index 0 and its address follows.
    let survivor = &rule_node.children()[0];
    assert_eq!(survivor.name(), "ancestor");
    assert_eq!(survivor.address().as_slice(), &[0, 0]);
}

#[test]
fn remove_edge_rejects_non_child_targets() {
    let mut root = fixtures::ancestry_tree();
    let err = remove_edge(&mut root, &[0], &[0, 0, 0]).expect_err("not a direct child");
    assert_eq!(
        err,
        EditError::NotAChild {
            source: vec![0],
            target: vec![0, 0, 0],
        }
    );
}

#[test]
fn remove_below_keeps_the_node_and_drops_its_derivation() {
    let mut root = fixtures::ancestry_tree();
    remove_below(&mut root, &[]).expect("clear below");

    assert!(root.children().is_empty());
    let table = root.as_table().expect("table");
    assert!(table.is_root_node());
    assert!(table.is_leaf_node());
    assert_eq!(table.entries().len(), 1);
}

#[test]
fn focus_on_rule_node_reroots_at_the_parent_table() {
    let mut root = fixtures::ancestry_tree();
    let rule = Arc::new(fixtures::rule_ancestor_base());
    add_rule_at_leaf(&mut root, &[0, 0], &rule, None).expect("extend tree");

    // Rule node freshly grafted under the parent table at [0, 0].
    let new_root = focus_on_rule_node(root, &[0, 0, 0]).expect("focus");
    assert_eq!(new_root.name(), "parent");
    assert!(new_root.as_table().expect("table").is_root_node());
    assert_eq!(new_root.children().len(), 1);
}

#[test]
fn focus_on_rule_node_is_a_no_op_for_unresolvable_addresses() {
    let root = fixtures::ancestry_tree();

    let unchanged = focus_on_rule_node(root.clone(), &[7, 7]).expect("missing node");
    assert_eq!(unchanged, root);

    // A table address is not a rule selection.
    let unchanged = focus_on_rule_node(root.clone(), &[0, 0]).expect("table node");
    assert_eq!(unchanged, root);
}

#[test]
fn load_more_entries_updates_only_the_pagination() {
    let mut root = fixtures::ancestry_tree();
    let before = root.clone();

    load_more_entries(&mut root, &[0, 0], PageWindow::new(20, 50)).expect("window");

    let table = find_node(&root, &[0, 0])
        .expect("node")
        .as_table()
        .expect("table");
    assert_eq!(table.pagination(), PageWindow::new(20, 50));
    assert_eq!(leaf_addresses(&root), leaf_addresses(&before));
    assert_eq!(table.entries(), before
        .children()[0]
        .children()[0]
        .as_table()
        .expect("table")
        .entries());
}

#[test]
fn load_more_entries_rejects_rule_nodes() {
    let mut root = fixtures::ancestry_tree();
    let err = load_more_entries(&mut root, &[0], PageWindow::new(0, 20)).expect_err("rule node");
    assert_eq!(err, EditError::NotATable { address: vec![0] });
}
