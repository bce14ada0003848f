// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::rule::{Predicate, Rule};
use super::tree::{TableEntry, TreeNode};

fn pred(name: &str, parameters: &[&str]) -> Predicate {
    Predicate::new(name, parameters.iter().map(|p| (*p).to_owned()).collect())
}

fn entry(entry_id: u64, terms: &[&str]) -> TableEntry {
    TableEntry::new(entry_id, terms.iter().map(|t| (*t).to_owned()).collect())
}

/// `ancestor(X, Y) :- parent(X, Y) .`
pub(crate) fn rule_ancestor_base() -> Rule {
    Rule {
        id: 1,
        relevant_head_predicate: pred("ancestor", &["X", "Y"]),
        relevant_head_predicate_index: 0,
        body_predicates: vec![pred("parent", &["X", "Y"])],
        string_representation: "ancestor(X, Y) :- parent(X, Y) .".to_owned(),
    }
}

/// `ancestor(X, Z) :- parent(X, Y), ancestor(Y, Z) .`
pub(crate) fn rule_ancestor_step() -> Rule {
    Rule {
        id: 2,
        relevant_head_predicate: pred("ancestor", &["X", "Z"]),
        relevant_head_predicate_index: 0,
        body_predicates: vec![pred("parent", &["X", "Y"]), pred("ancestor", &["Y", "Z"])],
        string_representation: "ancestor(X, Z) :- parent(X, Y), ancestor(Y, Z) .".to_owned(),
    }
}

/// `path(X, Z) :- path(X, Y), path(Y, Z) .` — body mentions `path` twice, so
/// grafting it onto a `path` node is position-ambiguous.
pub(crate) fn rule_path_transitive() -> Rule {
    Rule {
        id: 3,
        relevant_head_predicate: pred("path", &["X", "Z"]),
        relevant_head_predicate_index: 0,
        body_predicates: vec![pred("path", &["X", "Y"]), pred("path", &["Y", "Z"])],
        string_representation: "path(X, Z) :- path(X, Y), path(Y, Z) .".to_owned(),
    }
}

/// A `parent(X, Y)` table with the rows `[alice, bob]` and `[bob, carol]`.
pub(crate) fn parent_table() -> TreeNode {
    let mut node = TreeNode::table("parent", vec!["X".to_owned(), "Y".to_owned()]);
    let table = node.as_table_mut().expect("table data");
    table.set_entries(vec![entry(0, &["alice", "bob"]), entry(1, &["bob", "carol"])]);
    node
}

/// `ancestor(alice, carol)` derived via the step rule:
///
/// ```text
/// ancestor ── rule#2 ──┬── parent
///                      └── ancestor (leaf)
/// ```
///
/// Addresses and root/leaf flags are already recomputed.
pub(crate) fn ancestry_tree() -> TreeNode {
    let mut root = TreeNode::table("ancestor", vec!["X".to_owned(), "Z".to_owned()]);
    root.as_table_mut()
        .expect("table data")
        .set_entries(vec![entry(0, &["alice", "carol"])]);

    let mut rule_node = TreeNode::rule(Arc::new(rule_ancestor_step()));
    rule_node.add_child(parent_table());

    let mut ancestor_leaf = TreeNode::table("ancestor", vec!["Y".to_owned(), "Z".to_owned()]);
    ancestor_leaf
        .as_table_mut()
        .expect("table data")
        .set_entries(vec![entry(0, &["bob", "carol"])]);
    rule_node.add_child(ancestor_leaf);

    root.add_child(rule_node);
    crate::ops::finalize_tree(&mut root);
    root
}
