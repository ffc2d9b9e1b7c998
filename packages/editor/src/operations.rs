//! # Operations
//!
//! The closed set of structural edits on a [`TreeState`], and the engine
//! that applies an ordered batch of them.
//!
//! ## Batch semantics
//!
//! - Operations run strictly in list order
//! - The engine works on a clone; the first failure discards the clone
//! - Callers keep their original state as the fallback value
//!
//! ## Ordering
//!
//! Insertion (`add_node`, `move_node`) shifts every sibling at or after the
//! target index one slot to the right. Removal (`move_node`, `delete_node`)
//! recompacts the sibling group it leaves to `0..n-1`. Out-of-range indices
//! clamp to "append".

use crate::model::{Node, TreeState};
use crate::subtree::subtree_ids;
use crate::summary::BatchSummary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Structural edit (the only sanctioned way to change a document)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Insert a new node under `parent_id` (append when `index` is absent)
    AddNode {
        node_id: String,
        parent_id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Replace a node's label
    RenameNode { node_id: String, text: String },

    /// Replace (or clear) a node's notes
    UpdateNotes {
        node_id: String,
        #[serde(default)]
        notes: Option<String>,
    },

    /// Relocate a node, with its subtree, under a new parent
    MoveNode {
        node_id: String,
        new_parent_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Remove a node and all of its descendants
    DeleteNode { node_id: String },

    /// Rewrite the sibling order of `parent_id`'s children
    ReorderChildren {
        parent_id: String,
        ordered_child_ids: Vec<String>,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Node already exists: {0}")]
    AlreadyExists(String),

    #[error("Node text must not be empty: {0}")]
    EmptyText(String),

    #[error("Cannot move the root node")]
    CannotMoveRoot,

    #[error("Cannot delete the root node")]
    CannotDeleteRoot,

    #[error("Cannot move a node into its descendant: {node_id} -> {new_parent_id}")]
    IntoDescendant {
        node_id: String,
        new_parent_id: String,
    },

    #[error("reorder_children must include all current children of {parent_id} (expected {expected}, got {actual})")]
    IncompleteChildren {
        parent_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("{child_id} is not a child of {parent_id}")]
    NotAChild { parent_id: String, child_id: String },

    #[error("Duplicate child id in reorder_children: {0}")]
    DuplicateChild(String),
}

/// Batch failure: which operation failed and why
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Operation {index} ({kind}) failed: {source}")]
pub struct ApplyError {
    /// Zero-based position in the batch
    pub index: usize,
    pub kind: &'static str,
    pub source: OperationError,
}

/// Successful batch result
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedBatch {
    pub state: TreeState,
    pub summary: BatchSummary,
}

impl Operation {
    /// Wire name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AddNode { .. } => "add_node",
            Operation::RenameNode { .. } => "rename_node",
            Operation::UpdateNotes { .. } => "update_notes",
            Operation::MoveNode { .. } => "move_node",
            Operation::DeleteNode { .. } => "delete_node",
            Operation::ReorderChildren { .. } => "reorder_children",
        }
    }

    /// Every node id this operation mentions, in field order
    pub fn referenced_ids(&self) -> Vec<&str> {
        match self {
            Operation::AddNode { node_id, parent_id, .. } => vec![node_id.as_str(), parent_id.as_str()],
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
        }
    }

    /// Check this operation against `state` without changing it
    pub fn validate(&self, state: &TreeState) -> Result<(), OperationError> {
        match self {
            Operation::AddNode { node_id, parent_id, text, .. } => {
                if !state.contains(parent_id) {
                    return Err(OperationError::ParentNotFound(parent_id.clone()));
                }
                if state.contains(node_id) {
                    return Err(OperationError::AlreadyExists(node_id.clone()));
                }
                require_text(node_id, text)
            }

            Operation::RenameNode { node_id, text } => {
                require_node(state, node_id)?;
                require_text(node_id, text)
            }

            Operation::UpdateNotes { node_id, .. } => require_node(state, node_id),

            Operation::MoveNode { node_id, new_parent_id, .. } => {
                require_node(state, node_id)?;
                if *node_id == state.root_node_id {
                    return Err(OperationError::CannotMoveRoot);
                }
                if !state.contains(new_parent_id) {
                    return Err(OperationError::ParentNotFound(new_parent_id.clone()));
                }

                // Walk up from the new parent; meeting the moved node means a cycle
                let mut cursor = Some(new_parent_id.as_str());
                let mut steps = 0;
                while let Some(current) = cursor {
                    steps += 1;
                    if current == node_id.as_str() || steps > state.len() {
                        return Err(OperationError::IntoDescendant {
                            node_id: node_id.clone(),
                            new_parent_id: new_parent_id.clone(),
                        });
                    }
                    cursor = state.node(current).and_then(|node| node.parent_id.as_deref());
                }
                Ok(())
            }

            Operation::DeleteNode { node_id } => {
                require_node(state, node_id)?;
                if *node_id == state.root_node_id {
                    return Err(OperationError::CannotDeleteRoot);
                }
                Ok(())
            }

            Operation::ReorderChildren { parent_id, ordered_child_ids } => {
                if !state.contains(parent_id) {
                    return Err(OperationError::ParentNotFound(parent_id.clone()));
                }
                let current = sibling_ids(state, Some(parent_id.as_str()));
                let current: HashSet<&str> = current.iter().map(String::as_str).collect();

                let mut seen = HashSet::new();
                for child_id in ordered_child_ids {
                    if !current.contains(child_id.as_str()) {
                        return Err(OperationError::NotAChild {
                            parent_id: parent_id.clone(),
                            child_id: child_id.clone(),
                        });
                    }
                    if !seen.insert(child_id.as_str()) {
                        return Err(OperationError::DuplicateChild(child_id.clone()));
                    }
                }
                if ordered_child_ids.len() != current.len() {
                    return Err(OperationError::IncompleteChildren {
                        parent_id: parent_id.clone(),
                        expected: current.len(),
                        actual: ordered_child_ids.len(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Validate, then apply to `state` in place.
    ///
    /// On error `state` is untouched.
    pub fn apply(&self, state: &mut TreeState) -> Result<(), OperationError> {
        self.validate(state)?;

        match self {
            Operation::AddNode { node_id, parent_id, text, index } => {
                let position = insertion_point(state, parent_id, *index);
                shift_right(state, parent_id, position);
                state.nodes.insert(
                    node_id.clone(),
                    Node::new(node_id.clone(), Some(parent_id.clone()), text.clone(), position),
                );
                Ok(())
            }

            Operation::RenameNode { node_id, text } => {
                node_mut(state, node_id)?.text = text.clone();
                Ok(())
            }

            Operation::UpdateNotes { node_id, notes } => {
                node_mut(state, node_id)?.notes = notes.clone();
                Ok(())
            }

            Operation::MoveNode { node_id, new_parent_id, index } => {
                // Detach first so the node never counts as its own sibling
                let mut moved = state
                    .nodes
                    .remove(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
                let old_parent = moved.parent_id.take();
                recompact(state, old_parent.as_deref());

                let position = insertion_point(state, new_parent_id, *index);
                shift_right(state, new_parent_id, position);
                moved.parent_id = Some(new_parent_id.clone());
                moved.order_index = position;
                state.nodes.insert(node_id.clone(), moved);
                Ok(())
            }

            Operation::DeleteNode { node_id } => {
                let doomed = subtree_ids(state, node_id)
                    .map_err(|_| OperationError::NodeNotFound(node_id.clone()))?;
                let parent = state.node(node_id).and_then(|node| node.parent_id.clone());
                for id in &doomed {
                    state.nodes.remove(id);
                }
                recompact(state, parent.as_deref());
                Ok(())
            }

            Operation::ReorderChildren { ordered_child_ids, .. } => {
                for (position, child_id) in ordered_child_ids.iter().enumerate() {
                    node_mut(state, child_id)?.order_index = position;
                }
                Ok(())
            }
        }
    }
}

/// Apply `operations` to a copy of `state`; all or nothing
pub fn apply(state: &TreeState, operations: &[Operation]) -> Result<TreeState, ApplyError> {
    apply_batch(state, operations).map(|applied| applied.state)
}

/// Like [`apply`], also reporting what the batch did
#[instrument(skip_all, fields(nodes = state.len(), operations = operations.len()))]
pub fn apply_batch(state: &TreeState, operations: &[Operation]) -> Result<AppliedBatch, ApplyError> {
    let mut working = state.clone();
    let mut summary = BatchSummary::default();

    for (index, operation) in operations.iter().enumerate() {
        debug!(index, kind = operation.kind(), "Applying operation");
        summary.record(operation, &working);
        if let Err(source) = operation.apply(&mut working) {
            warn!(index, kind = operation.kind(), error = %source, "Operation rejected, discarding batch");
            return Err(ApplyError {
                index,
                kind: operation.kind(),
                source,
            });
        }
    }

    info!(nodes = working.len(), summary = %summary, "Batch applied");
    Ok(AppliedBatch {
        state: working,
        summary,
    })
}

/// Replay a batch for its summary only
pub fn summarize_batch(state: &TreeState, operations: &[Operation]) -> Result<BatchSummary, ApplyError> {
    apply_batch(state, operations).map(|applied| applied.summary)
}

fn require_node(state: &TreeState, node_id: &str) -> Result<(), OperationError> {
    if state.contains(node_id) {
        Ok(())
    } else {
        Err(OperationError::NodeNotFound(node_id.to_string()))
    }
}

fn require_text(node_id: &str, text: &str) -> Result<(), OperationError> {
    if text.trim().is_empty() {
        Err(OperationError::EmptyText(node_id.to_string()))
    } else {
        Ok(())
    }
}

fn node_mut<'a>(state: &'a mut TreeState, node_id: &str) -> Result<&'a mut Node, OperationError> {
    state
        .nodes
        .get_mut(node_id)
        .ok_or_else(|| OperationError::NodeNotFound(node_id.to_string()))
}

/// Ids of the sibling group under `parent_id`, in current order
fn sibling_ids(state: &TreeState, parent_id: Option<&str>) -> Vec<String> {
    let mut siblings: Vec<&Node> = state
        .nodes
        .values()
        .filter(|node| node.parent_id.as_deref() == parent_id)
        .collect();
    siblings.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.id.cmp(&b.id)));
    siblings.into_iter().map(|node| node.id.clone()).collect()
}

fn insertion_point(state: &TreeState, parent_id: &str, requested: Option<usize>) -> usize {
    let count = state
        .nodes
        .values()
        .filter(|node| node.parent_id.as_deref() == Some(parent_id))
        .count();
    requested.map_or(count, |index| index.min(count))
}

fn shift_right(state: &mut TreeState, parent_id: &str, from: usize) {
    for node in state.nodes.values_mut() {
        if node.parent_id.as_deref() == Some(parent_id) && node.order_index >= from {
            node.order_index += 1;
        }
    }
}

fn recompact(state: &mut TreeState, parent_id: Option<&str>) {
    let Some(parent_id) = parent_id else {
        return;
    };
    for (position, id) in sibling_ids(state, Some(parent_id)).into_iter().enumerate() {
        if let Some(node) = state.nodes.get_mut(&id) {
            node.order_index = position;
        }
    }
}
