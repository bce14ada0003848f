// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier of a rule inside the reasoning engine's catalogue.
pub type RuleId = u64;

/// A predicate as the engine reports it: name plus column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub name: String,
    pub parameters: Vec<String>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// An immutable rule descriptor owned by the engine's catalogue.
///
/// The core references descriptors (via `Arc`) and never edits head or body;
/// on the wire only the `id` identifies the rule inside refresh queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    pub relevant_head_predicate: Predicate,
    pub relevant_head_predicate_index: usize,
    pub body_predicates: Vec<Predicate>,
    pub string_representation: String,
}

impl Rule {
    /// Positions in the rule body whose predicate name equals `predicate`.
    ///
    /// More than one position means a graft involving this rule and that
    /// predicate is ambiguous and needs an explicit position.
    pub fn body_positions_of(&self, predicate: &str) -> Vec<usize> {
        self.body_predicates
            .iter()
            .enumerate()
            .filter(|(_, body)| body.name == predicate)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn head_name(&self) -> &str {
        &self.relevant_head_predicate.name
    }
}
