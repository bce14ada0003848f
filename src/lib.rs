// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Proofscope — derivation-tree model and query session for rule reasoners.
//!
//! The tree alternates table nodes (facts of one predicate) and rule nodes
//! (one rule application). Sessions mutate the shape locally, mirror it into
//! refresh queries for an external engine, and keep full undo/redo history.

pub mod bridge;
pub mod flags;
pub mod history;
pub mod model;
pub mod ops;
pub mod query;
pub mod session;

#[cfg(test)]
mod tests {
    #[test]
    fn sanity() {
        assert_eq!(2 + 2, 4);
    }
}
