// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Transient visual flag propagation.
//!
//! Pure, idempotent tree walks: they set or clear per-node booleans (grey-out
//! previews, search hits) and never touch structural data. Reachability for
//! outdated marking is recomputed on demand, not cached.

use crate::model::{find_node, TreeNode};

/// The per-node booleans the walks operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Greyed,
    Collapsed,
    Searched,
}

impl Flag {
    fn set(self, node: &mut TreeNode, value: bool) {
        match self {
            Self::Greyed => node.set_greyed(value),
            Self::Collapsed => node.set_collapsed(value),
            Self::Searched => node.set_got_searched(value),
        }
    }
}

/// Clears `flag` on every node of the tree.
pub fn reset_flag(root: &mut TreeNode, flag: Flag) {
    flag.set(root, false);
    for child in root.children_mut() {
        reset_flag(child, flag);
    }
}

/// Sets `flag` on every node on the path from the root to `target`'s parent:
/// the preview for everything a remove-above would discard.
pub fn set_flag_until_node(root: &mut TreeNode, target: &[usize], flag: Flag) {
    let Some((_, parents)) = target.split_last() else {
        return;
    };

    let mut node = root;
    flag.set(node, true);
    for &index in parents {
        let Some(child) = node.children_mut().get_mut(index) else {
            return;
        };
        node = child;
        flag.set(node, true);
    }
}

/// Sets `flag` on every strict descendant of `source`: the preview for
/// everything an edge cut would discard.
pub fn set_flag_below(root: &mut TreeNode, source: &[usize], flag: Flag) {
    let Some(node) = crate::model::find_node_mut(root, source) else {
        return;
    };
    for child in node.children_mut() {
        set_all(child, flag);
    }
}

fn set_all(node: &mut TreeNode, flag: Flag) {
    flag.set(node, true);
    for child in node.children_mut() {
        set_all(child, flag);
    }
}

/// Sets `flag` on every node except `target` and its descendants, dimming
/// everything outside the focused subtree.
pub fn set_flag_focus(root: &mut TreeNode, target: &[usize], flag: Flag) {
    fn walk(node: &mut TreeNode, target: &[usize], flag: Flag) {
        if node.address().as_slice() == target {
            return;
        }
        flag.set(node, true);
        for child in node.children_mut() {
            walk(child, target, flag);
        }
    }
    walk(root, target, flag);
}

/// Marks `got_searched` on exactly the table nodes whose rows match `text`
/// (comma-separated terms, whitespace-normalized; see
/// [`crate::model::TableData::is_value_inside_table`]).
pub fn search_for_entry(root: &mut TreeNode, text: &str) {
    let hit = root
        .as_table()
        .is_some_and(|table| table.is_value_inside_table(text));
    root.set_got_searched(hit);
    for child in root.children_mut() {
        search_for_entry(child, text);
    }
}

/// Whether the node at `address` still exists with the given predicate name.
///
/// Used by external panels to decide whether their subject went outdated
/// after an edit replaced the tree.
pub fn is_node_in_tree(root: &TreeNode, address: &[usize], predicate: &str) -> bool {
    find_node(root, address)
        .is_some_and(|node| node.is_table() && node.name() == predicate)
}
