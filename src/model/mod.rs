// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Core proof-tree data model.
//!
//! A tree alternates table nodes (fact windows of a relation) and rule nodes
//! (one rule application each); addresses are child-index paths recomputed
//! after every structural change.

pub mod address;
pub(crate) mod fixtures;
pub mod rule;
pub mod tree;

pub use address::{assign_addresses, find_node, find_node_mut, take_subtree, NodeAddress};
pub use rule::{Predicate, Rule, RuleId};
pub use tree::{
    EntryQuery, NodeKind, PageWindow, RuleData, TableData, TableEntry, TableEntryId, TreeNode,
};
