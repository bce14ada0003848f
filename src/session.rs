// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! The interactive session: one owner of the current tree.
//!
//! All mutation entry points live here and run to completion on the caller's
//! single control flow. Each structural edit snapshots history, reshapes the
//! tree, and hands back the refresh query that re-derives entries for the
//! whole result; the caller sends it to the engine and feeds the response
//! back through [`Session::handle_response`]. While a request is pending the
//! session is busy and further mutations are rejected.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::flags::{self, Flag};
use crate::history::{HistoryStack, Snapshot};
use crate::model::{find_node, find_node_mut, EntryQuery, PageWindow, Rule, TableEntry, TreeNode};
use crate::ops::{self, EditError};
use crate::query::{
    apply_refresh, decode_tree, initial_load_query, refresh_query, CodecError, QueryEnvelope,
    QueryPayload, ResponseEnvelope, ResponsePayload,
};

/// Size of the bounded highlight palette for table panels.
pub const HIGHLIGHT_PALETTE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A request is in flight; input is blocked until its response arrives.
    Busy,
    Edit(EditError),
    Codec(CodecError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("a request is still pending"),
            Self::Edit(err) => write!(f, "edit rejected: {err}"),
            Self::Codec(err) => write!(f, "query could not be built: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Busy => None,
            Self::Edit(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<EditError> for SessionError {
    fn from(err: EditError) -> Self {
        Self::Edit(err)
    }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

/// User-visible notices produced while digesting responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A restricted refresh came back empty: no proof of that shape exists.
    /// The edited tree shape is kept; only the lack of data is reported.
    NoProofOfThatShape,
    /// A refresh widened the root table past a single row.
    RestrictionLifted,
    /// The engine reported an error string instead of data.
    EngineError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An initial-load response installed a fresh tree.
    TreeInstalled,
    /// A refresh response overlaid new data onto the current shape.
    DataRefreshed,
    Notice(Notice),
    /// The response did not belong to the pending request and was dropped.
    StaleResponseIgnored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestPurpose {
    InitialLoad,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRequest {
    id: u64,
    purpose: RequestPurpose,
}

/// An externally displayed table dialog tracking one node by address.
///
/// The panel keeps its own copy of the node so it can keep displaying data
/// after the subject disappears from the tree; the copy is then marked
/// outdated instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    address: Vec<usize>,
    node: TreeNode,
    highlight: usize,
}

impl Panel {
    pub fn address(&self) -> &[usize] {
        &self.address
    }

    pub fn node(&self) -> &TreeNode {
        &self.node
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn is_outdated(&self) -> bool {
        self.node
            .as_table()
            .map(|table| table.is_outdated())
            .unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct Session {
    root: TreeNode,
    restriction: Vec<EntryQuery>,
    history: HistoryStack,
    panels: Vec<Panel>,
    next_request_id: u64,
    pending: Option<PendingRequest>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let mut root = TreeNode::table("predicate", vec![]);
        ops::finalize_tree(&mut root);
        Self {
            root,
            restriction: Vec::new(),
            history: HistoryStack::new(),
            panels: Vec::new(),
            next_request_id: 1,
            pending: None,
        }
    }

    /// Starts a session on an already built tree, skipping the initial load.
    #[cfg(test)]
    pub(crate) fn with_root(mut root: TreeNode, restriction: Vec<EntryQuery>) -> Self {
        ops::finalize_tree(&mut root);
        Self {
            root,
            restriction,
            history: HistoryStack::new(),
            panels: Vec::new(),
            next_request_id: 1,
            pending: None,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn restriction(&self) -> &[EntryQuery] {
        &self.restriction
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_undos(&self) -> bool {
        self.history.has_undos()
    }

    pub fn has_redos(&self) -> bool {
        self.history.has_redos()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    // ---- bootstrap & initial load ------------------------------------------

    /// Translates out-of-band page parameters into one initial-load request.
    ///
    /// Both parameters must be present and the restriction must be valid
    /// JSON; otherwise no query is issued and the failure is only logged.
    /// JSON that parses but is not an array degrades to an unrestricted load.
    pub fn bootstrap(&mut self, predicate: Option<&str>, query: Option<&str>) -> Option<QueryEnvelope> {
        let (Some(predicate), Some(query)) = (predicate, query) else {
            return None;
        };
        let restriction = match parse_bootstrap_restriction(query) {
            Ok(restriction) => restriction,
            Err(reason) => {
                warn!("ignoring malformed bootstrap restriction {query:?}: {reason}");
                return None;
            }
        };
        self.initial_load(predicate, restriction).ok()
    }

    /// Asks the engine for a brand-new tree rooted at `predicate`.
    pub fn initial_load(
        &mut self,
        predicate: &str,
        restriction: Vec<EntryQuery>,
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let query = initial_load_query(predicate, &restriction);
        self.restriction = restriction;
        Ok(self.issue(RequestPurpose::InitialLoad, QueryPayload::TreeForTable(query)))
    }

    /// Re-roots the exploration on a single fact row: a fresh initial load
    /// restricted to that row's term tuple. Undoable.
    pub fn focus_on_row(
        &mut self,
        entry: &TableEntry,
        predicate: &str,
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        self.push_current_snapshot();
        self.restriction = vec![EntryQuery::Literal(entry.restriction_literal())];
        let query = initial_load_query(predicate, &self.restriction);
        Ok(self.issue(RequestPurpose::InitialLoad, QueryPayload::TreeForTable(query)))
    }

    // ---- structural mutations ----------------------------------------------

    /// Grafts a rule above the current root; the rule's head table becomes
    /// the new root.
    pub fn add_rule_above(
        &mut self,
        rule: &Arc<Rule>,
        position: Option<usize>,
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let new_root = ops::add_rule_above_root(self.root.clone(), rule, position)?;
        self.commit_structural(new_root)
    }

    /// Grafts a rule derivation below a leaf table.
    pub fn add_rule_below(
        &mut self,
        leaf: &[usize],
        rule: &Arc<Rule>,
        position: Option<usize>,
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let mut working = self.root.clone();
        ops::add_rule_at_leaf(&mut working, leaf, rule, position)?;
        self.commit_structural(working)
    }

    /// Promotes `node` to root, discarding everything above it.
    pub fn remove_above(&mut self, node: &[usize]) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let new_root = ops::remove_rule_above(self.root.clone(), node)?;
        self.commit_structural(new_root)
    }

    /// Cuts the derivation branch between `source` and its child `target`.
    pub fn remove_edge(
        &mut self,
        source: &[usize],
        target: &[usize],
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let mut working = self.root.clone();
        ops::remove_edge(&mut working, source, target)?;
        self.commit_structural(working)
    }

    /// Keeps `node` but discards its derivation below.
    pub fn remove_below(&mut self, node: &[usize]) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let mut working = self.root.clone();
        ops::remove_below(&mut working, node)?;
        self.commit_structural(working)
    }

    /// Re-roots on the table above a rule node. `Ok(None)` when the address
    /// does not resolve to a rule node (a no-op, not an error).
    pub fn focus_rule(&mut self, rule_node: &[usize]) -> Result<Option<QueryEnvelope>, SessionError> {
        self.ensure_idle()?;
        let new_root = ops::focus_on_rule_node(self.root.clone(), rule_node)?;
        if new_root == self.root {
            debug!("focus on {rule_node:?} did not resolve to a rule node, nothing to do");
            return Ok(None);
        }
        self.commit_structural(new_root).map(Some)
    }

    /// Changes one table's loaded window and re-queries. Snapshot semantics
    /// follow the reference behavior: pagination changes are undoable too.
    pub fn load_more(
        &mut self,
        node: &[usize],
        window: PageWindow,
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        let mut working = self.root.clone();
        ops::load_more_entries(&mut working, node, window)?;
        self.commit_structural(working)
    }

    /// Replaces the restriction list; empty lifts every restriction. The
    /// tree shape is untouched, only a refresh is issued.
    pub fn set_restriction(
        &mut self,
        queries: Vec<EntryQuery>,
    ) -> Result<QueryEnvelope, SessionError> {
        self.ensure_idle()?;
        self.push_current_snapshot();
        self.restriction = queries;
        let query = refresh_query(&self.root, &self.restriction)?;
        // The query has the old windows encoded; now blank the rows so stale
        // data is never shown while the round trip is pending.
        self.root.clear_table_entries_in_subtree();
        Ok(self.issue(
            RequestPurpose::Refresh,
            QueryPayload::TableEntriesForTreeNodes(query),
        ))
    }

    fn push_current_snapshot(&mut self) {
        self.history
            .push(Snapshot::new(self.root.clone(), self.restriction.clone()));
    }

    /// Installs an edited tree: snapshot the old state, drop the restriction
    /// (a reshaped tree is always re-derived unrestricted), refresh panels
    /// and build the refresh query for the whole new tree.
    fn commit_structural(&mut self, new_root: TreeNode) -> Result<QueryEnvelope, SessionError> {
        let previous_root = std::mem::replace(&mut self.root, new_root);
        let previous_restriction = std::mem::take(&mut self.restriction);
        self.history
            .push(Snapshot::new(previous_root, previous_restriction));

        let query = refresh_query(&self.root, &self.restriction)?;
        // The query has the old windows encoded; now blank the rows so stale
        // data is never shown while the round trip is pending.
        self.root.clear_table_entries_in_subtree();
        self.refresh_panels();
        Ok(self.issue(
            RequestPurpose::Refresh,
            QueryPayload::TableEntriesForTreeNodes(query),
        ))
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    fn issue(&mut self, purpose: RequestPurpose, payload: QueryPayload) -> QueryEnvelope {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.pending = Some(PendingRequest { id, purpose });
        debug!("issuing request {id} ({purpose:?})");
        QueryEnvelope {
            request_id: id,
            payload,
        }
    }

    // ---- undo / redo -------------------------------------------------------

    /// Restores the previous snapshot. `false` when there is nothing to undo
    /// or a request is still pending.
    pub fn undo(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let current = Snapshot::new(self.root.clone(), self.restriction.clone());
        let Some(restored) = self.history.undo(current) else {
            return false;
        };
        self.install_snapshot(restored);
        true
    }

    /// Restores the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let current = Snapshot::new(self.root.clone(), self.restriction.clone());
        let Some(restored) = self.history.redo(current) else {
            return false;
        };
        self.install_snapshot(restored);
        true
    }

    fn install_snapshot(&mut self, snapshot: Snapshot) {
        let (mut root, restriction) = snapshot.into_parts();
        ops::finalize_tree(&mut root);
        self.root = root;
        self.restriction = restriction;
        self.refresh_panels();
    }

    // ---- responses ---------------------------------------------------------

    /// Digests one engine response. Responses that do not match the pending
    /// request (stale, duplicate, or wrong family) are dropped.
    pub fn handle_response(&mut self, envelope: ResponseEnvelope) -> SessionEvent {
        let Some(pending) = self.pending else {
            warn!("dropping response with no request pending");
            return SessionEvent::StaleResponseIgnored;
        };
        if let Some(id) = envelope.request_id {
            if id != pending.id {
                warn!("dropping stale response {id} (pending {})", pending.id);
                return SessionEvent::StaleResponseIgnored;
            }
        }

        match envelope.payload {
            ResponsePayload::TreeForTable(response) => {
                if pending.purpose != RequestPurpose::InitialLoad {
                    warn!("dropping treeForTable response while a refresh is pending");
                    return SessionEvent::StaleResponseIgnored;
                }
                self.pending = None;
                // The restriction stays whatever the caller asked for; the
                // returned rows are data, not a narrowing of the query.
                self.root = decode_tree(&response);
                self.refresh_panels();
                SessionEvent::TreeInstalled
            }
            ResponsePayload::TableEntriesForTreeNodes(items) => {
                if pending.purpose != RequestPurpose::Refresh {
                    warn!("dropping refresh response while an initial load is pending");
                    return SessionEvent::StaleResponseIgnored;
                }
                self.pending = None;
                match apply_refresh(&mut self.root, &items) {
                    Ok(()) => {
                        self.refresh_panels();
                        let root_rows = self
                            .root
                            .as_table()
                            .map(|table| table.entries().len())
                            .unwrap_or(0);
                        if root_rows > 1 {
                            SessionEvent::Notice(Notice::RestrictionLifted)
                        } else {
                            SessionEvent::DataRefreshed
                        }
                    }
                    Err(CodecError::EmptyRefresh) => {
                        SessionEvent::Notice(Notice::NoProofOfThatShape)
                    }
                    Err(err) => {
                        warn!("refresh response did not apply cleanly: {err}");
                        SessionEvent::Notice(Notice::EngineError(err.to_string()))
                    }
                }
            }
            ResponsePayload::Error { error } => {
                self.pending = None;
                SessionEvent::Notice(Notice::EngineError(error))
            }
        }
    }

    /// Clears the pending request, e.g. after a timed-out round trip, so the
    /// session accepts input again.
    pub fn abort_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            warn!("aborting pending request {}", pending.id);
        }
    }

    // ---- flags, search, previews -------------------------------------------

    pub fn search(&mut self, text: &str) {
        flags::search_for_entry(&mut self.root, text);
    }

    /// Greys the path that a remove-above of `node` would discard.
    pub fn preview_remove_above(&mut self, node: &[usize]) {
        flags::set_flag_until_node(&mut self.root, node, Flag::Greyed);
    }

    /// Greys everything an edge cut below `source` would discard.
    pub fn preview_remove_edge(&mut self, source: &[usize]) {
        flags::set_flag_below(&mut self.root, source, Flag::Greyed);
    }

    /// Greys everything outside the subtree of `node`.
    pub fn preview_focus(&mut self, node: &[usize]) {
        flags::reset_flag(&mut self.root, Flag::Greyed);
        flags::set_flag_focus(&mut self.root, node, Flag::Greyed);
    }

    pub fn clear_previews(&mut self) {
        flags::reset_flag(&mut self.root, Flag::Greyed);
    }

    pub fn set_collapsed(&mut self, node: &[usize], collapsed: bool) -> Result<(), SessionError> {
        let found = find_node_mut(&mut self.root, node).ok_or(SessionError::Edit(
            EditError::NodeNotFound {
                address: node.to_vec(),
            },
        ))?;
        found.set_collapsed(collapsed);
        Ok(())
    }

    // ---- table panels ------------------------------------------------------

    /// Opens a tracking panel for the table at `address`, assigning a free
    /// slot of the bounded highlight palette (the oldest panel is evicted
    /// when the palette is exhausted).
    pub fn open_panel(&mut self, address: &[usize]) -> Result<(), SessionError> {
        let node = find_node(&self.root, address).ok_or(SessionError::Edit(
            EditError::NodeNotFound {
                address: address.to_vec(),
            },
        ))?;
        if !node.is_table() {
            return Err(SessionError::Edit(EditError::NotATable {
                address: address.to_vec(),
            }));
        }
        if self.panels.iter().any(|panel| panel.address == address) {
            return Ok(());
        }

        if self.panels.len() >= HIGHLIGHT_PALETTE_SIZE {
            let evicted = self.panels.remove(0);
            if let Some(node) = find_node_mut(&mut self.root, &evicted.address) {
                if let Some(table) = node.as_table_mut() {
                    table.set_highlighted(None);
                }
            }
        }

        let used: Vec<usize> = self.panels.iter().map(Panel::highlight).collect();
        let slot = (0..HIGHLIGHT_PALETTE_SIZE)
            .find(|slot| !used.contains(slot))
            .unwrap_or(0);

        let node = find_node_mut(&mut self.root, address).ok_or(SessionError::Edit(
            EditError::NodeNotFound {
                address: address.to_vec(),
            },
        ))?;
        if let Some(table) = node.as_table_mut() {
            table.set_highlighted(Some(slot));
        }
        self.panels.push(Panel {
            address: address.to_vec(),
            node: node.clone(),
            highlight: slot,
        });
        Ok(())
    }

    /// Closes the panel tracking `address` and releases its highlight slot.
    pub fn close_panel(&mut self, address: &[usize]) {
        let Some(position) = self
            .panels
            .iter()
            .position(|panel| panel.address == address)
        else {
            return;
        };
        let panel = self.panels.remove(position);
        if let Some(node) = find_node_mut(&mut self.root, &panel.address) {
            if let Some(table) = node.as_table_mut() {
                table.set_highlighted(None);
            }
        }
    }

    pub fn move_panel_left(&mut self, address: &[usize]) {
        if let Some(position) = self
            .panels
            .iter()
            .position(|panel| panel.address == address)
        {
            if position > 0 {
                self.panels.swap(position - 1, position);
            }
        }
    }

    pub fn move_panel_right(&mut self, address: &[usize]) {
        if let Some(position) = self
            .panels
            .iter()
            .position(|panel| panel.address == address)
        {
            if position + 1 < self.panels.len() {
                self.panels.swap(position, position + 1);
            }
        }
    }

    /// Re-resolves every panel subject against the current tree: reachable
    /// panels get fresh data and their highlight restored, unreachable ones
    /// are marked outdated.
    fn refresh_panels(&mut self) {
        for panel in &mut self.panels {
            let subject = panel.node.name().to_owned();
            if flags::is_node_in_tree(&self.root, &panel.address, &subject) {
                if let Some(node) = find_node_mut(&mut self.root, &panel.address) {
                    if let Some(table) = node.as_table_mut() {
                        table.set_highlighted(Some(panel.highlight));
                    }
                    panel.node = node.clone();
                    if let Some(table) = panel.node.as_table_mut() {
                        table.set_outdated(false);
                    }
                }
            } else if let Some(table) = panel.node.as_table_mut() {
                table.set_outdated(true);
            }
        }
    }
}

/// Parses the bootstrap restriction parameter: a JSON array whose elements
/// are term-tuples (arrays joined with commas), literals, or bare row ids.
/// Any other well-formed JSON value degrades to an unrestricted load.
fn parse_bootstrap_restriction(raw: &str) -> Result<Vec<EntryQuery>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {err}"))?;
    let serde_json::Value::Array(elements) = value else {
        debug!("bootstrap restriction is not an array, loading unrestricted");
        return Ok(Vec::new());
    };

    let mut restriction = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            serde_json::Value::Array(terms) => {
                let terms: Result<Vec<String>, String> =
                    terms.into_iter().map(literal_term).collect();
                restriction.push(EntryQuery::Literal(terms?.join(",")));
            }
            serde_json::Value::Number(number) => match number.as_u64() {
                Some(entry_id) => restriction.push(EntryQuery::Id(entry_id)),
                None => restriction.push(EntryQuery::Literal(number.to_string())),
            },
            other => restriction.push(EntryQuery::Literal(literal_term(other)?)),
        }
    }
    Ok(restriction)
}

fn literal_term(value: serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(term) => Ok(term),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(format!("unsupported restriction element: {other}")),
    }
}
