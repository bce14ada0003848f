// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::address::NodeAddress;
use super::rule::Rule;

/// Identifier of a fact row, unique within one table snapshot.
pub type TableEntryId = u64;

/// One fact row of a table node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableEntry {
    pub entry_id: TableEntryId,
    pub term_tuple: Vec<String>,
}

impl TableEntry {
    pub fn new(entry_id: TableEntryId, term_tuple: Vec<String>) -> Self {
        Self {
            entry_id,
            term_tuple,
        }
    }

    /// The restriction literal for this row (`"alice,bob"`).
    pub fn restriction_literal(&self) -> String {
        self.term_tuple.join(",")
    }
}

/// One element of a restriction list: either a literal comma-joined term
/// tuple or a direct row id. On the wire the id form stays a bare number,
/// never a quoted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EntryQuery {
    Id(TableEntryId),
    Literal(String),
}

impl From<TableEntryId> for EntryQuery {
    fn from(entry_id: TableEntryId) -> Self {
        Self::Id(entry_id)
    }
}

impl From<String> for EntryQuery {
    fn from(literal: String) -> Self {
        Self::Literal(literal)
    }
}

impl From<&str> for EntryQuery {
    fn from(literal: &str) -> Self {
        Self::Literal(literal.to_owned())
    }
}

/// The currently loaded window into a potentially larger fact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub start: i64,
    pub count: i64,
}

impl PageWindow {
    pub fn new(start: i64, count: i64) -> Self {
        Self { start, count }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        // -1/-1 marks "no window loaded yet", matching the engine's convention.
        Self {
            start: -1,
            count: -1,
        }
    }
}

/// A node of the displayed proof tree.
///
/// The table/rule distinction is a closed sum ([`NodeKind`]); everything else
/// (name, children, address, transient display flags) is shared. Children are
/// owned exclusively by their parent and their order is semantically
/// meaningful: under a rule node, position encodes which body predicate a
/// child answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    children: Vec<TreeNode>,
    address: NodeAddress,
    is_collapsed: bool,
    is_expanded: bool,
    is_greyed: bool,
    got_searched: bool,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Table(TableData),
    Rule(RuleData),
}

/// Data of a relation/fact-set node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableData {
    entries: Vec<TableEntry>,
    pagination: PageWindow,
    more_entries_exist: bool,
    rules_above: Vec<Rule>,
    rules_below: Vec<Rule>,
    parameter_predicate: Vec<String>,
    is_root_node: bool,
    is_leaf_node: bool,
    is_highlighted: Option<usize>,
    is_outdated: bool,
}

/// Data of a derivation-step node: a reference into the rule catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleData {
    rule: Arc<Rule>,
}

impl RuleData {
    pub fn rule(&self) -> &Arc<Rule> {
        &self.rule
    }
}

impl TreeNode {
    pub fn table(name: impl Into<String>, parameter_predicate: Vec<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            address: NodeAddress::new(),
            is_collapsed: false,
            is_expanded: false,
            is_greyed: false,
            got_searched: false,
            kind: NodeKind::Table(TableData {
                parameter_predicate,
                ..TableData::default()
            }),
        }
    }

    pub fn rule(rule: Arc<Rule>) -> Self {
        Self {
            name: rule.string_representation.clone(),
            children: Vec::new(),
            address: NodeAddress::new(),
            is_collapsed: false,
            is_expanded: false,
            is_greyed: false,
            got_searched: false,
            kind: NodeKind::Rule(RuleData { rule }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [TreeNode] {
        &mut self.children
    }

    pub fn add_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    pub fn remove_children(&mut self) {
        self.children.clear();
    }

    pub fn remove_child(&mut self, index: usize) -> Option<TreeNode> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn take_children(&mut self) -> Vec<TreeNode> {
        std::mem::take(&mut self.children)
    }

    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    pub(crate) fn set_address(&mut self, address: NodeAddress) {
        self.address = address;
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, NodeKind::Table(_))
    }

    pub fn is_rule(&self) -> bool {
        matches!(self.kind, NodeKind::Rule(_))
    }

    pub fn as_table(&self) -> Option<&TableData> {
        match &self.kind {
            NodeKind::Table(table) => Some(table),
            NodeKind::Rule(_) => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableData> {
        match &mut self.kind {
            NodeKind::Table(table) => Some(table),
            NodeKind::Rule(_) => None,
        }
    }

    pub fn as_rule(&self) -> Option<&RuleData> {
        match &self.kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Table(_) => None,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.is_collapsed = collapsed;
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.is_expanded = expanded;
    }

    pub fn is_greyed(&self) -> bool {
        self.is_greyed
    }

    pub fn set_greyed(&mut self, greyed: bool) {
        self.is_greyed = greyed;
    }

    pub fn got_searched(&self) -> bool {
        self.got_searched
    }

    pub fn set_got_searched(&mut self, got_searched: bool) {
        self.got_searched = got_searched;
    }

    /// Empties every table node's rows and pagination in this subtree.
    ///
    /// Run before a full re-query so stale rows are never shown.
    pub fn clear_table_entries_in_subtree(&mut self) {
        if let NodeKind::Table(table) = &mut self.kind {
            table.entries.clear();
            table.pagination = PageWindow::new(0, 0);
            table.more_entries_exist = false;
        }
        for child in &mut self.children {
            child.clear_table_entries_in_subtree();
        }
    }
}

impl TableData {
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<TableEntry>) {
        self.entries = entries;
    }

    pub fn pagination(&self) -> PageWindow {
        self.pagination
    }

    pub fn set_pagination(&mut self, pagination: PageWindow) {
        self.pagination = pagination;
    }

    pub fn more_entries_exist(&self) -> bool {
        self.more_entries_exist
    }

    pub fn set_more_entries_exist(&mut self, more: bool) {
        self.more_entries_exist = more;
    }

    pub fn rules_above(&self) -> &[Rule] {
        &self.rules_above
    }

    pub fn set_rules_above(&mut self, rules: Vec<Rule>) {
        self.rules_above = rules;
    }

    pub fn rules_below(&self) -> &[Rule] {
        &self.rules_below
    }

    pub fn set_rules_below(&mut self, rules: Vec<Rule>) {
        self.rules_below = rules;
    }

    pub fn parameter_predicate(&self) -> &[String] {
        &self.parameter_predicate
    }

    pub fn set_parameter_predicate(&mut self, parameters: Vec<String>) {
        self.parameter_predicate = parameters;
    }

    pub fn is_root_node(&self) -> bool {
        self.is_root_node
    }

    pub fn set_root_node(&mut self, is_root: bool) {
        self.is_root_node = is_root;
    }

    pub fn is_leaf_node(&self) -> bool {
        self.is_leaf_node
    }

    pub fn set_leaf_node(&mut self, is_leaf: bool) {
        self.is_leaf_node = is_leaf;
    }

    pub fn is_highlighted(&self) -> Option<usize> {
        self.is_highlighted
    }

    pub fn set_highlighted(&mut self, slot: Option<usize>) {
        self.is_highlighted = slot;
    }

    pub fn is_outdated(&self) -> bool {
        self.is_outdated
    }

    pub fn set_outdated(&mut self, outdated: bool) {
        self.is_outdated = outdated;
    }

    pub fn is_single_entry_table(&self) -> bool {
        !self.more_entries_exist && self.entries.len() == 1
    }

    /// Whether some row satisfies every comma-separated term of `value`.
    ///
    /// Terms match cells by equality after stripping all whitespace and
    /// lowercasing; all terms must each match some cell of the same row.
    pub fn is_value_inside_table(&self, value: &str) -> bool {
        let terms: Vec<String> = value
            .split(',')
            .map(normalize_term)
            .filter(|term| !term.is_empty())
            .collect();
        if terms.is_empty() {
            return false;
        }

        self.entries.iter().any(|entry| {
            terms.iter().all(|term| {
                entry
                    .term_tuple
                    .iter()
                    .any(|cell| normalize_term(cell) == *term)
            })
        })
    }
}

fn normalize_term(value: &str) -> String {
    static WHITESPACE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    whitespace.replace_all(value, "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{PageWindow, TableEntry, TreeNode};
    use crate::model::fixtures;

    #[test]
    fn table_node_starts_without_children_or_entries() {
        let node = TreeNode::table("parent", vec!["X".to_owned(), "Y".to_owned()]);
        assert!(node.is_table());
        assert!(node.children().is_empty());
        let table = node.as_table().expect("table data");
        assert!(table.entries().is_empty());
        assert_eq!(table.pagination(), PageWindow::default());
    }

    #[test]
    fn rule_node_takes_its_name_from_the_string_representation() {
        let rule = std::sync::Arc::new(fixtures::rule_ancestor_step());
        let node = TreeNode::rule(rule.clone());
        assert!(node.is_rule());
        assert_eq!(node.name(), rule.string_representation);
    }

    #[test]
    fn clear_table_entries_in_subtree_empties_every_table() {
        let mut root = fixtures::ancestry_tree();
        root.clear_table_entries_in_subtree();

        fn assert_cleared(node: &TreeNode) {
            if let Some(table) = node.as_table() {
                assert!(table.entries().is_empty());
                assert!(!table.more_entries_exist());
            }
            for child in node.children() {
                assert_cleared(child);
            }
        }
        assert_cleared(&root);
    }

    #[test]
    fn is_value_inside_table_normalizes_case_whitespace_and_terms() {
        let mut node = TreeNode::table("parent", vec![]);
        let table = node.as_table_mut().expect("table data");
        table.set_entries(vec![
            TableEntry::new(0, vec!["alice smith".to_owned(), "bob".to_owned()]),
            TableEntry::new(1, vec!["bob".to_owned(), "carol".to_owned()]),
        ]);

        let table = node.as_table().expect("table data");
        assert!(table.is_value_inside_table("alicesmith"));
        assert!(table.is_value_inside_table("Alice Smith"));
        assert!(table.is_value_inside_table(" alice smith , bob "));
        assert!(table.is_value_inside_table("bob, carol"));
        // "alice smith" and "carol" never share a row.
        assert!(!table.is_value_inside_table("alicesmith, carol"));
        assert!(!table.is_value_inside_table(""));
        assert!(!table.is_value_inside_table("   "));
    }
}
