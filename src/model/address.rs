// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

use smallvec::SmallVec;

use super::tree::TreeNode;

/// Child-index path from the tree root to a node.
///
/// Addresses are the stable cross-snapshot identity: after a rebuild the same
/// logical node is found at the same path, not at the same allocation. Proof
/// trees are shallow, so the path almost never spills to the heap.
pub type NodeAddress = SmallVec<[usize; 8]>;

/// Recomputes the address of every node in the tree.
///
/// Full recomputation, not incremental; runs after every structural mutation.
pub fn assign_addresses(root: &mut TreeNode) {
    assign(root, NodeAddress::new());
}

fn assign(node: &mut TreeNode, address: NodeAddress) {
    node.set_address(address.clone());
    for (index, child) in node.children_mut().iter_mut().enumerate() {
        let mut child_address = address.clone();
        child_address.push(index);
        assign(child, child_address);
    }
}

/// Resolves an address against a (possibly freshly rebuilt) tree.
///
/// Returns `None` when the path walks off the tree; callers tolerate that and
/// mark dependents outdated instead of erroring.
pub fn find_node<'a>(root: &'a TreeNode, address: &[usize]) -> Option<&'a TreeNode> {
    let mut node = root;
    for &index in address {
        node = node.children().get(index)?;
    }
    Some(node)
}

pub fn find_node_mut<'a>(root: &'a mut TreeNode, address: &[usize]) -> Option<&'a mut TreeNode> {
    let mut node = root;
    for &index in address {
        node = node.children_mut().get_mut(index)?;
    }
    Some(node)
}

/// Detaches and returns the subtree at `address`. The root itself cannot be
/// detached.
pub fn take_subtree(root: &mut TreeNode, address: &[usize]) -> Option<TreeNode> {
    let (&last, prefix) = address.split_last()?;
    let parent = find_node_mut(root, prefix)?;
    parent.remove_child(last)
}
