// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Wire types exchanged with the reasoning engine.
//!
//! Field names are the wire contract (`tableEntries`, `possibleRulesAbove`,
//! `childInformation`, `addressInTree`, ...) and must serialize byte-for-byte;
//! every rename here is deliberate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{EntryQuery, PageWindow, Rule, RuleId, TableEntry};

/// Pagination as it appears in responses: the engine reports where the window
/// starts and whether rows beyond it exist, never a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePagination {
    pub start: i64,
    #[serde(default)]
    pub more_entries_exist: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTableEntries {
    pub entries: Vec<TableEntry>,
    pub pagination: ResponsePagination,
}

/// Request for a brand-new tree rooted at `predicate` ("initial load").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeForTableQuery {
    pub predicate: String,
    pub table_entries: TreeForTableQueryEntries,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeForTableQueryEntries {
    /// Term-tuple or row-id restrictions; empty means unrestricted.
    pub queries: Vec<EntryQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageWindow>,
}

/// Response carrying a full tree rooted at one predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeForTableResponse {
    pub predicate: String,
    pub table_entries: ResponseTableEntries,
    #[serde(default)]
    pub possible_rules_above: Vec<Rule>,
    #[serde(default)]
    pub possible_rules_below: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_greyed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub got_searched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_information: Option<TreeForTableChildInformation>,
}

/// The rule application below a table in a tree response, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeForTableChildInformation {
    pub rule: Rule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_greyed: Option<bool>,
    pub children: Vec<TreeForTableResponse>,
}

/// Refresh request mirroring the current tree shape ("table entries for tree
/// nodes"). Only the root carries the predicate and the restriction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableEntriesForTreeNodesQuery {
    pub predicate: String,
    pub table_entries: RefreshTableEntries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_information: Option<RefreshChildInformation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTableEntries {
    pub queries: Vec<EntryQuery>,
    pub pagination: PageWindow,
}

/// A rule node inside a refresh request: catalogue id only, never the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshChildInformation {
    pub rule: RuleId,
    pub head_index: usize,
    pub children: Vec<TableEntriesForTreeNodesQuery>,
}

/// One element of a refresh response: data for the node at `addressInTree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeEntriesResponse {
    pub predicate: String,
    pub table_entries: ResponseTableEntries,
    #[serde(default)]
    pub possible_rules_above: Vec<Rule>,
    #[serde(default)]
    pub possible_rules_below: Vec<Rule>,
    pub address_in_tree: Vec<usize>,
}

/// Outbound message: purpose-tagged payload plus the correlation id the
/// engine echoes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryEnvelope {
    pub request_id: u64,
    #[serde(flatten)]
    pub payload: QueryPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "queryType", content = "payload", rename_all = "camelCase")]
pub enum QueryPayload {
    TreeForTable(TreeForTableQuery),
    TableEntriesForTreeNodes(TableEntriesForTreeNodesQuery),
}

/// Inbound message. `request_id` is optional: engines that do not echo ids
/// are matched by arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "responseType", content = "payload", rename_all = "camelCase")]
pub enum ResponsePayload {
    TreeForTable(TreeForTableResponse),
    TableEntriesForTreeNodes(Vec<NodeEntriesResponse>),
    /// The engine reports an error string instead of table entries.
    Error { error: String },
}
