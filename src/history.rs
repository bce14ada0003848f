// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Snapshot-based undo/redo over whole-tree state.
//!
//! Deliberately simple: each entry is a deep clone of the full tree plus the
//! active restriction list. Interactive trees are small, so whole-tree
//! snapshots beat diffing.

use crate::model::{EntryQuery, TreeNode};

/// One captured state: the tree and the restriction that was active with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    root: TreeNode,
    restriction: Vec<EntryQuery>,
}

impl Snapshot {
    pub fn new(root: TreeNode, restriction: Vec<EntryQuery>) -> Self {
        Self { root, restriction }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn restriction(&self) -> &[EntryQuery] {
        &self.restriction
    }

    pub fn into_parts(self) -> (TreeNode, Vec<EntryQuery>) {
        (self.root, self.restriction)
    }
}

/// Linear undo/redo stacks, no branching.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    undos: Vec<Snapshot>,
    redos: Vec<Snapshot>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pre-mutation state. A brand-new mutation invalidates
    /// whatever was redoable.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undos.push(snapshot);
        self.redos.clear();
    }

    /// Swaps `current` with the most recent undo entry.
    ///
    /// Returns `None` (and leaves `current` untouched) when there is nothing
    /// to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undos.pop()?;
        self.redos.push(current);
        Some(restored)
    }

    /// Symmetric to [`HistoryStack::undo`].
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redos.pop()?;
        self.undos.push(current);
        Some(restored)
    }

    pub fn has_undos(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn has_redos(&self) -> bool {
        !self.redos.is_empty()
    }
}
