// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Builds outbound queries from a tree and decodes responses back into it.
//!
//! Encoding mirrors the tree shape; decoding either builds a fresh tree
//! (initial load) or overlays data onto the existing shape (refresh). The
//! codec never adds or removes nodes during a refresh.

use std::fmt;
use std::sync::Arc;

use crate::model::{find_node, find_node_mut, EntryQuery, PageWindow, TableEntry, TreeNode};
use crate::ops::finalize_tree;

use super::wire::{
    NodeEntriesResponse, RefreshChildInformation, RefreshTableEntries,
    TableEntriesForTreeNodesQuery, TreeForTableChildInformation, TreeForTableQuery,
    TreeForTableQueryEntries, TreeForTableResponse,
};

/// Floor for the effective page size, so a restrictive query cannot shrink
/// later windows to pathological 1-row pages.
pub const MIN_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A refresh response with zero entries: the proof shape has no
    /// supporting facts. Surfaced to the user, never treated as "zero rows".
    EmptyRefresh,
    UnknownAddress { address: Vec<usize> },
    UnexpectedNodeKind { address: Vec<usize> },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRefresh => f.write_str("proof tree of that form does not exist"),
            Self::UnknownAddress { address } => {
                write!(f, "response address {address:?} is not in the tree")
            }
            Self::UnexpectedNodeKind { address } => {
                write!(f, "node at {address:?} has the wrong kind for this payload")
            }
        }
    }
}

impl std::error::Error for CodecError {}

fn floored_count(entry_count: usize) -> i64 {
    let count = entry_count as i64;
    if count >= MIN_PAGE_SIZE {
        count
    } else {
        MIN_PAGE_SIZE
    }
}

/// Request deriving a brand-new tree from a predicate and optional restriction.
pub fn initial_load_query(predicate: &str, restriction: &[EntryQuery]) -> TreeForTableQuery {
    TreeForTableQuery {
        predicate: predicate.to_owned(),
        table_entries: TreeForTableQueryEntries {
            queries: restriction.to_vec(),
            pagination: None,
        },
    }
}

/// Request re-deriving entries for the whole current tree in one round trip.
///
/// Only the root table carries its predicate and the restriction list; inner
/// tables are identified purely by their position in the mirrored shape.
pub fn refresh_query(
    root: &TreeNode,
    restriction: &[EntryQuery],
) -> Result<TableEntriesForTreeNodesQuery, CodecError> {
    encode_table(root, Some(restriction))
}

fn encode_table(
    node: &TreeNode,
    restriction: Option<&[EntryQuery]>,
) -> Result<TableEntriesForTreeNodesQuery, CodecError> {
    let table = node.as_table().ok_or_else(|| CodecError::UnexpectedNodeKind {
        address: node.address().to_vec(),
    })?;

    let (predicate, queries) = match restriction {
        Some(queries) => (node.name().to_owned(), queries.to_vec()),
        None => (String::new(), Vec::new()),
    };

    // A table node has at most one generation of children: its rule node.
    let child_information = node
        .children()
        .first()
        .map(encode_rule)
        .transpose()?;

    Ok(TableEntriesForTreeNodesQuery {
        predicate,
        table_entries: RefreshTableEntries {
            queries,
            pagination: table.pagination(),
        },
        child_information,
    })
}

fn encode_rule(node: &TreeNode) -> Result<RefreshChildInformation, CodecError> {
    let rule = node
        .as_rule()
        .ok_or_else(|| CodecError::UnexpectedNodeKind {
            address: node.address().to_vec(),
        })?
        .rule();

    let children = node
        .children()
        .iter()
        .map(|child| encode_table(child, None))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RefreshChildInformation {
        rule: rule.id,
        head_index: rule.relevant_head_predicate_index,
        children,
    })
}

/// Builds a fresh tree from an initial-load response, top-down.
///
/// The new root is marked as root and all addresses are assigned before the
/// tree is returned.
pub fn decode_tree(response: &TreeForTableResponse) -> TreeNode {
    let parameters = response
        .child_information
        .as_ref()
        .map(|child| child.rule.relevant_head_predicate.parameters.clone())
        .unwrap_or_default();

    let mut root = decode_table(response, parameters);
    finalize_tree(&mut root);
    root
}

fn decode_table(response: &TreeForTableResponse, parameters: Vec<String>) -> TreeNode {
    let mut node = TreeNode::table(&response.predicate, parameters);
    node.set_collapsed(response.is_collapsed.unwrap_or(false));
    node.set_greyed(response.is_greyed.unwrap_or(false));
    node.set_got_searched(response.got_searched.unwrap_or(false));

    install_entries(
        &mut node,
        &response.table_entries.entries,
        response.table_entries.pagination.start,
        response.table_entries.pagination.more_entries_exist,
    );
    if let Some(table) = node.as_table_mut() {
        table.set_rules_above(response.possible_rules_above.clone());
        table.set_rules_below(response.possible_rules_below.clone());
    }

    if let Some(child) = &response.child_information {
        node.add_child(decode_rule(child));
    }
    node
}

fn decode_rule(response: &TreeForTableChildInformation) -> TreeNode {
    let rule = Arc::new(response.rule.clone());
    let mut node = TreeNode::rule(rule.clone());
    node.set_collapsed(response.is_collapsed.unwrap_or(false));
    node.set_greyed(response.is_greyed.unwrap_or(false));

    for (position, child) in response.children.iter().enumerate() {
        let parameters = rule
            .body_predicates
            .get(position)
            .map(|predicate| predicate.parameters.clone())
            .unwrap_or_default();
        node.add_child(decode_table(child, parameters));
    }
    node
}

/// Walks a refresh response and overwrites each addressed node's data.
///
/// Tree shape is untouched: a refresh only replaces entries, pagination and
/// rule candidates. An empty response is the engine saying the proof shape
/// has no supporting facts. All addresses are validated up front, so a
/// rejected response leaves the tree exactly as it was.
pub fn apply_refresh(root: &mut TreeNode, items: &[NodeEntriesResponse]) -> Result<(), CodecError> {
    if items.is_empty() {
        return Err(CodecError::EmptyRefresh);
    }

    for item in items {
        let node = find_node(root, &item.address_in_tree).ok_or_else(|| {
            CodecError::UnknownAddress {
                address: item.address_in_tree.clone(),
            }
        })?;
        if !node.is_table() {
            return Err(CodecError::UnexpectedNodeKind {
                address: item.address_in_tree.clone(),
            });
        }
    }

    for item in items {
        let node = find_node_mut(root, &item.address_in_tree).ok_or_else(|| {
            CodecError::UnknownAddress {
                address: item.address_in_tree.clone(),
            }
        })?;

        node.set_name(&item.predicate);
        install_entries(
            node,
            &item.table_entries.entries,
            item.table_entries.pagination.start,
            item.table_entries.pagination.more_entries_exist,
        );
        if let Some(table) = node.as_table_mut() {
            table.set_rules_above(item.possible_rules_above.clone());
            table.set_rules_below(item.possible_rules_below.clone());
        }
    }
    Ok(())
}

fn install_entries(node: &mut TreeNode, entries: &[TableEntry], start: i64, more: bool) {
    let Some(table) = node.as_table_mut() else {
        return;
    };
    table.set_pagination(PageWindow::new(start, floored_count(entries.len())));
    table.set_more_entries_exist(more);
    table.set_entries(entries.to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::query::wire::{ResponsePagination, ResponseTableEntries};

    fn node_response(
        predicate: &str,
        entries: Vec<TableEntry>,
        address: Vec<usize>,
    ) -> NodeEntriesResponse {
        NodeEntriesResponse {
            predicate: predicate.to_owned(),
            table_entries: ResponseTableEntries {
                entries,
                pagination: ResponsePagination {
                    start: 0,
                    more_entries_exist: false,
                },
            },
            possible_rules_above: vec![],
            possible_rules_below: vec![],
            address_in_tree: address,
        }
    }

    #[test]
    fn refresh_query_mirrors_the_tree_shape() {
        let root = fixtures::ancestry_tree();
        let restriction = vec![EntryQuery::from("alice,carol")];
        let query = refresh_query(&root, &restriction).expect("refresh query");

        assert_eq!(query.predicate, "ancestor");
        assert_eq!(query.table_entries.queries, restriction);

        let rule = query.child_information.expect("rule application");
        assert_eq!(rule.rule, fixtures::rule_ancestor_step().id);
        assert_eq!(rule.children.len(), 2);
        // Inner tables never repeat predicate or restriction.
        for child in &rule.children {
            assert_eq!(child.predicate, "");
            assert!(child.table_entries.queries.is_empty());
        }
    }

    #[test]
    fn decode_tree_builds_the_response_shape_and_marks_the_root() {
        let rule = fixtures::rule_ancestor_step();
        let response = TreeForTableResponse {
            predicate: "ancestor".to_owned(),
            table_entries: ResponseTableEntries {
                entries: vec![TableEntry::new(0, vec!["alice".into(), "carol".into()])],
                pagination: ResponsePagination {
                    start: 0,
                    more_entries_exist: false,
                },
            },
            possible_rules_above: vec![],
            possible_rules_below: vec![],
            is_collapsed: None,
            is_greyed: None,
            got_searched: None,
            child_information: Some(TreeForTableChildInformation {
                rule: rule.clone(),
                is_collapsed: None,
                is_greyed: None,
                children: vec![
                    TreeForTableResponse {
                        predicate: "parent".to_owned(),
                        table_entries: ResponseTableEntries::default(),
                        possible_rules_above: vec![],
                        possible_rules_below: vec![],
                        is_collapsed: None,
                        is_greyed: None,
                        got_searched: None,
                        child_information: None,
                    },
                    TreeForTableResponse {
                        predicate: "ancestor".to_owned(),
                        table_entries: ResponseTableEntries::default(),
                        possible_rules_above: vec![],
                        possible_rules_below: vec![],
                        is_collapsed: None,
                        is_greyed: None,
                        got_searched: None,
                        child_information: None,
                    },
                ],
            }),
        };

        let root = decode_tree(&response);
        let table = root.as_table().expect("root table");
        assert!(table.is_root_node());
        assert_eq!(table.parameter_predicate(), &["X".to_owned(), "Z".to_owned()]);

        let rule_node = &root.children()[0];
        assert!(rule_node.is_rule());
        assert_eq!(rule_node.children().len(), 2);
        // Child tables inherit their column names from the rule body.
        let parent_table = rule_node.children()[0].as_table().expect("table");
        assert_eq!(parent_table.parameter_predicate(), &["X".to_owned(), "Y".to_owned()]);
        assert!(parent_table.is_leaf_node());
    }

    #[test]
    fn apply_refresh_overwrites_data_but_not_shape() {
        let mut root = fixtures::ancestry_tree();
        let shape_before: Vec<Vec<usize>> = collect_addresses(&root);

        let items = vec![
            node_response(
                "ancestor",
                vec![TableEntry::new(9, vec!["alice".into(), "carol".into()])],
                vec![],
            ),
            node_response(
                "parent",
                vec![TableEntry::new(10, vec!["alice".into(), "bob".into()])],
                vec![0, 0],
            ),
            node_response(
                "ancestor",
                vec![TableEntry::new(11, vec!["bob".into(), "carol".into()])],
                vec![0, 1],
            ),
        ];
        apply_refresh(&mut root, &items).expect("refresh applies");

        assert_eq!(collect_addresses(&root), shape_before);
        let parent = crate::model::find_node(&root, &[0, 0]).expect("parent node");
        let table = parent.as_table().expect("table");
        assert_eq!(table.entries().len(), 1);
        assert_eq!(table.entries()[0].entry_id, 10);
    }

    #[test]
    fn apply_refresh_floors_the_page_size() {
        let mut root = fixtures::parent_table();
        finalize_tree(&mut root);

        let items = vec![node_response(
            "parent",
            vec![TableEntry::new(0, vec!["alice".into(), "bob".into()])],
            vec![],
        )];
        apply_refresh(&mut root, &items).expect("refresh applies");

        let table = root.as_table().expect("table");
        assert_eq!(table.pagination().count, MIN_PAGE_SIZE);
    }

    #[test]
    fn apply_refresh_rejects_an_empty_response() {
        let mut root = fixtures::ancestry_tree();
        assert_eq!(apply_refresh(&mut root, &[]), Err(CodecError::EmptyRefresh));
    }

    #[test]
    fn apply_refresh_reports_unknown_addresses() {
        let mut root = fixtures::ancestry_tree();
        let items = vec![node_response("parent", vec![], vec![4, 4])];
        assert_eq!(
            apply_refresh(&mut root, &items),
            Err(CodecError::UnknownAddress {
                address: vec![4, 4]
            })
        );
    }

    #[test]
    fn a_rejected_refresh_writes_nothing() {
        let mut root = fixtures::ancestry_tree();
        let before = root.clone();

        // The first item is valid, the second walks off the tree.
        let items = vec![
            node_response(
                "ancestor",
                vec![TableEntry::new(9, vec!["dora".into(), "erin".into()])],
                vec![],
            ),
            node_response("parent", vec![], vec![4, 4]),
        ];
        assert_eq!(
            apply_refresh(&mut root, &items),
            Err(CodecError::UnknownAddress {
                address: vec![4, 4]
            })
        );
        assert_eq!(root, before, "valid items before the bad one must not land");
    }

    fn collect_addresses(root: &TreeNode) -> Vec<Vec<usize>> {
        fn walk(node: &TreeNode, out: &mut Vec<Vec<usize>>) {
            out.push(node.address().to_vec());
            for child in node.children() {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(root, &mut out);
        out
    }
}
