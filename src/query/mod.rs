// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Wire protocol with the reasoning engine.
//!
//! Two request/response families: initial load ("treeForTable") builds a new
//! tree, refresh ("tableEntriesForTreeNodes") re-derives entries for an
//! unchanged shape.

pub mod codec;
pub mod wire;

pub use codec::{
    apply_refresh, decode_tree, initial_load_query, refresh_query, CodecError, MIN_PAGE_SIZE,
};
pub use wire::{
    NodeEntriesResponse, QueryEnvelope, QueryPayload, RefreshChildInformation,
    RefreshTableEntries, ResponseEnvelope, ResponsePagination, ResponsePayload,
    ResponseTableEntries, TableEntriesForTreeNodesQuery, TreeForTableChildInformation,
    TreeForTableQuery, TreeForTableQueryEntries, TreeForTableResponse,
};
