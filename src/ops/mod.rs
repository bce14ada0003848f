// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Structural edit operations over the proof tree.
//!
//! Every operation recomputes addresses and root/leaf flags before returning,
//! so the tree never carries stale structure. Operations only reshape the
//! tree; they never fabricate row data — the caller follows up with a refresh
//! query for the resulting tree.

use std::fmt;
use std::sync::Arc;

use crate::model::{
    assign_addresses, find_node, find_node_mut, take_subtree, PageWindow, Rule, TreeNode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    NodeNotFound {
        address: Vec<usize>,
    },
    NotATable {
        address: Vec<usize>,
    },
    NotALeaf {
        address: Vec<usize>,
    },
    NotAChild {
        source: Vec<usize>,
        target: Vec<usize>,
    },
    PredicateNotInBody {
        predicate: String,
    },
    PositionOutOfRange {
        position: usize,
        body_len: usize,
    },
    PositionPredicateMismatch {
        position: usize,
        predicate: String,
    },
    /// The rule body mentions the target predicate more than once; the caller
    /// must disambiguate with an explicit position before the edit proceeds.
    AmbiguousPosition {
        predicate: String,
        positions: Vec<usize>,
    },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { address } => write!(f, "no node at address {address:?}"),
            Self::NotATable { address } => write!(f, "node at {address:?} is not a table node"),
            Self::NotALeaf { address } => {
                write!(f, "node at {address:?} already has a derivation below it")
            }
            Self::NotAChild { source, target } => {
                write!(f, "{target:?} is not a direct child of {source:?}")
            }
            Self::PredicateNotInBody { predicate } => {
                write!(f, "rule body does not mention '{predicate}'")
            }
            Self::PositionOutOfRange { position, body_len } => {
                write!(f, "body position {position} out of range (body has {body_len})")
            }
            Self::PositionPredicateMismatch { position, predicate } => {
                write!(f, "body position {position} does not hold '{predicate}'")
            }
            Self::AmbiguousPosition { predicate, positions } => {
                write!(f, "'{predicate}' occurs at body positions {positions:?}, pick one")
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Recomputes every address and every table's root/leaf flag.
///
/// Cheap full recomputation; runs after each structural mutation so the flags
/// are never stale.
pub fn finalize_tree(root: &mut TreeNode) {
    assign_addresses(root);
    refresh_structure_flags(root);
}

fn refresh_structure_flags(node: &mut TreeNode) {
    let is_root = node.address().is_empty();
    let is_leaf = node.children().is_empty();
    if let Some(table) = node.as_table_mut() {
        table.set_root_node(is_root);
        table.set_leaf_node(is_leaf);
    }
    for child in node.children_mut() {
        refresh_structure_flags(child);
    }
}

/// Picks the body position the current node occupies in `rule`'s body.
///
/// An explicit `position` is validated; without one the position must be
/// unique or the edit is reported ambiguous.
fn resolve_body_position(
    rule: &Rule,
    predicate: &str,
    position: Option<usize>,
) -> Result<usize, EditError> {
    let body_len = rule.body_predicates.len();
    if let Some(position) = position {
        let body = rule
            .body_predicates
            .get(position)
            .ok_or(EditError::PositionOutOfRange { position, body_len })?;
        if body.name != predicate {
            return Err(EditError::PositionPredicateMismatch {
                position,
                predicate: predicate.to_owned(),
            });
        }
        return Ok(position);
    }

    let positions = rule.body_positions_of(predicate);
    match positions.as_slice() {
        [] => Err(EditError::PredicateNotInBody {
            predicate: predicate.to_owned(),
        }),
        [only] => Ok(*only),
        _ => Err(EditError::AmbiguousPosition {
            predicate: predicate.to_owned(),
            positions,
        }),
    }
}

fn placeholder_table(rule: &Rule, body_position: usize) -> TreeNode {
    let predicate = &rule.body_predicates[body_position];
    TreeNode::table(&predicate.name, predicate.parameters.clone())
}

/// Grafts `rule` above the current root: the old root is reinserted at its
/// body position among fresh sibling placeholders, and a freshly synthesized
/// table for the rule's head predicate becomes the new root.
pub fn add_rule_above_root(
    root: TreeNode,
    rule: &Arc<Rule>,
    position: Option<usize>,
) -> Result<TreeNode, EditError> {
    let position = resolve_body_position(rule, root.name(), position)?;

    let mut siblings: Vec<TreeNode> = (0..rule.body_predicates.len())
        .map(|body_position| placeholder_table(rule, body_position))
        .collect();
    siblings[position] = root;

    let mut rule_node = TreeNode::rule(rule.clone());
    for sibling in siblings {
        rule_node.add_child(sibling);
    }

    let mut new_root = TreeNode::table(
        rule.head_name(),
        rule.relevant_head_predicate.parameters.clone(),
    );
    new_root.add_child(rule_node);
    finalize_tree(&mut new_root);
    Ok(new_root)
}

/// Attaches a rule application (with placeholder tables for every body
/// predicate) below a leaf table, so the leaf stops being a leaf.
pub fn add_rule_at_leaf(
    root: &mut TreeNode,
    leaf: &[usize],
    rule: &Arc<Rule>,
    position: Option<usize>,
) -> Result<(), EditError> {
    let node = find_node_mut(root, leaf).ok_or_else(|| EditError::NodeNotFound {
        address: leaf.to_vec(),
    })?;
    if !node.is_table() {
        return Err(EditError::NotATable {
            address: leaf.to_vec(),
        });
    }
    if !node.children().is_empty() {
        return Err(EditError::NotALeaf {
            address: leaf.to_vec(),
        });
    }

    // Grafting below is position-ambiguous exactly when the body repeats the
    // leaf's predicate; a unique or absent occurrence needs no choice.
    let occurrences = rule.body_positions_of(node.name());
    if occurrences.len() > 1 {
        resolve_body_position(rule, node.name(), position)?;
    } else if let Some(position) = position {
        let body_len = rule.body_predicates.len();
        if position >= body_len {
            return Err(EditError::PositionOutOfRange { position, body_len });
        }
    }

    let mut rule_node = TreeNode::rule(rule.clone());
    for body_position in 0..rule.body_predicates.len() {
        rule_node.add_child(placeholder_table(rule, body_position));
    }
    node.add_child(rule_node);

    finalize_tree(root);
    Ok(())
}

/// Promotes the table node at `node` to be the new root, discarding
/// everything above it. Promoting the root itself is a no-op.
pub fn remove_rule_above(root: TreeNode, node: &[usize]) -> Result<TreeNode, EditError> {
    if node.is_empty() {
        return Ok(root);
    }
    let found = find_node(&root, node).ok_or_else(|| EditError::NodeNotFound {
        address: node.to_vec(),
    })?;
    if !found.is_table() {
        return Err(EditError::NotATable {
            address: node.to_vec(),
        });
    }

    let mut root = root;
    let mut new_root = take_subtree(&mut root, node).ok_or_else(|| EditError::NodeNotFound {
        address: node.to_vec(),
    })?;
    finalize_tree(&mut new_root);
    Ok(new_root)
}

/// Cuts the derivation branch `target` out of `source`'s children.
pub fn remove_edge(
    root: &mut TreeNode,
    source: &[usize],
    target: &[usize],
) -> Result<(), EditError> {
    let is_direct_child =
        target.len() == source.len() + 1 && target.starts_with(source);
    if !is_direct_child {
        return Err(EditError::NotAChild {
            source: source.to_vec(),
            target: target.to_vec(),
        });
    }

    let parent = find_node_mut(root, source).ok_or_else(|| EditError::NodeNotFound {
        address: source.to_vec(),
    })?;
    let child_index = target[target.len() - 1];
    parent
        .remove_child(child_index)
        .ok_or_else(|| EditError::NodeNotFound {
            address: target.to_vec(),
        })?;

    finalize_tree(root);
    Ok(())
}

/// Keeps `node` but discards its entire derivation below.
pub fn remove_below(root: &mut TreeNode, node: &[usize]) -> Result<(), EditError> {
    let found = find_node_mut(root, node).ok_or_else(|| EditError::NodeNotFound {
        address: node.to_vec(),
    })?;
    found.remove_children();
    finalize_tree(root);
    Ok(())
}

/// Re-roots the tree at the table node a rule node hangs under.
///
/// Entered from a rule selection; when the address does not resolve to a rule
/// node the tree is returned unchanged.
pub fn focus_on_rule_node(root: TreeNode, rule_node: &[usize]) -> Result<TreeNode, EditError> {
    let is_rule = find_node(&root, rule_node).is_some_and(TreeNode::is_rule);
    if !is_rule || rule_node.is_empty() {
        return Ok(root);
    }

    let parent = &rule_node[..rule_node.len() - 1];
    remove_rule_above(root, parent)
}

/// Updates the loaded window of one table; the shape stays as it is and the
/// caller re-queries for the new window.
pub fn load_more_entries(
    root: &mut TreeNode,
    node: &[usize],
    window: PageWindow,
) -> Result<(), EditError> {
    let found = find_node_mut(root, node).ok_or_else(|| EditError::NodeNotFound {
        address: node.to_vec(),
    })?;
    let table = found.as_table_mut().ok_or_else(|| EditError::NotATable {
        address: node.to_vec(),
    })?;
    table.set_pagination(window);
    Ok(())
}

#[cfg(test)]
mod tests;
