//! # Scope Validator
//!
//! Confines a batch to an editing boundary before it reaches the engine.
//!
//! - **Global**: every batch passes
//! - **Node**: every referenced id must lie in the selected node's subtree
//!
//! The permitted set is walked in batch order. An in-scope `add_node`
//! admits its new id for the rest of the batch, so an agent can create a
//! node and edit it in the same request. Reordering such a batch can change
//! the verdict.

use crate::model::TreeState;
use crate::operations::Operation;
use crate::subtree::subtree_ids;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Global,
    Node,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Node => "node",
        }
    }
}

/// Editing boundary supplied alongside an agent batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRequest {
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<String>,
}

impl ScopeRequest {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn node(selected_node_id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Node,
            selected_node_id: Some(selected_node_id.into()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Node scope requires a selected node")]
    MissingSelection,

    #[error("Selected node not found: {0}")]
    SelectedNotFound(String),

    #[error("{kind} (operation {index}) references {node_id}, which is outside the selected subtree")]
    OutOfScope {
        index: usize,
        kind: &'static str,
        node_id: String,
    },
}

/// Check that `operations` stay inside `request`'s boundary
#[instrument(skip_all, fields(scope = request.scope.as_str(), operations = operations.len()))]
pub fn validate_scope(state: &TreeState, request: &ScopeRequest, operations: &[Operation]) -> Result<(), ScopeError> {
    let selected = match request.scope {
        Scope::Global => return Ok(()),
        Scope::Node => request
            .selected_node_id
            .as_deref()
            .ok_or(ScopeError::MissingSelection)?,
    };

    let mut permitted: BTreeSet<String> =
        subtree_ids(state, selected).map_err(|_| ScopeError::SelectedNotFound(selected.to_string()))?;
    debug!(selected, permitted = permitted.len(), "Validating batch against subtree");

    for (index, operation) in operations.iter().enumerate() {
        let required: Vec<&str> = match operation {
            Operation::AddNode { parent_id, .. } => vec![parent_id.as_str()],
            Operation::RenameNode { node_id, .. } => vec![node_id.as_str()],
            Operation::UpdateNotes { node_id, .. } => vec![node_id.as_str()],
            Operation::MoveNode { node_id, new_parent_id, .. } => {
                vec![node_id.as_str(), new_parent_id.as_str()]
            }
            Operation::DeleteNode { node_id } => vec![node_id.as_str()],
            Operation::ReorderChildren { parent_id, ordered_child_ids } => {
                let mut ids = vec![parent_id.as_str()];
                ids.extend(ordered_child_ids.iter().map(String::as_str));
                ids
            }
        };

        if let Some(outside) = required.into_iter().find(|id| !permitted.contains(*id)) {
            warn!(index, kind = operation.kind(), node_id = outside, "Operation outside scope");
            return Err(ScopeError::OutOfScope {
                index,
                kind: operation.kind(),
                node_id: outside.to_string(),
            });
        }

        if let Operation::AddNode { node_id, .. } = operation {
            permitted.insert(node_id.clone());
        }
    }

    Ok(())
}
